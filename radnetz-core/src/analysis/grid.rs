//! Uniform grid over a study area and per-cell length comparison

use geo::{
    Area, BooleanOps, BoundingRect, Distance, Euclidean, Length, LineString, MultiLineString,
    MultiPolygon, Polygon, Rect, coord,
};
use hashbrown::HashMap;
use log::debug;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

use crate::Error;
use crate::loading::dissolve;
use crate::model::features::Measured;
use crate::model::{InfrClass, LineRecord, Table, infra::ClassFilter};

use super::{LengthColumn, round_half_even};

/// Cell of a quadrat grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub grid_id: usize,
    pub geometry: Polygon<f64>,
}

/// `n` evenly spaced values from `start` to `end`, both included
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![start];
    }
    #[allow(clippy::cast_precision_loss)]
    let step = (end - start) / (n - 1) as f64;
    #[allow(clippy::cast_precision_loss)]
    (0..n).map(|i| start + step * i as f64).collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn split_count(span: f64, cell_size: f64) -> usize {
    (span / cell_size).ceil() as usize + 1
}

/// Cuts the union of `area` into quadrats of roughly `cell_size` width.
///
/// The bounding box is divided evenly, so cells are at most `cell_size`
/// wide. Each quadrat is clipped to the area; quadrats falling apart into
/// several pieces give one cell per piece. Ids are sequential.
///
/// # Errors
///
/// Returns [`Error::InvalidCellSize`] for non-positive or non-finite sizes.
pub fn create_grid(area: &Table<Polygon<f64>>, cell_size: f64) -> Result<Table<GridCell>, Error> {
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(Error::InvalidCellSize(cell_size));
    }

    let union = dissolve(area);
    let Some(bounds) = union.bounding_rect() else {
        return Ok(Table::empty(area.crs));
    };

    let xs = linspace(
        bounds.min().x,
        bounds.max().x,
        split_count(bounds.width(), cell_size),
    );
    let ys = linspace(
        bounds.min().y,
        bounds.max().y,
        split_count(bounds.height(), cell_size),
    );

    let mut cells = Vec::new();
    for x in xs.windows(2) {
        for y in ys.windows(2) {
            let quadrat = Rect::new(coord! { x: x[0], y: y[0] }, coord! { x: x[1], y: y[1] });
            let clipped = union.intersection(&MultiPolygon::new(vec![quadrat.to_polygon()]));
            for piece in clipped {
                if piece.unsigned_area() > 0.0 {
                    cells.push(GridCell {
                        grid_id: cells.len(),
                        geometry: piece,
                    });
                }
            }
        }
    }

    debug!("Created grid of {} cells", cells.len());
    Ok(Table::new(area.crs, cells))
}

/// Piece of an edge lying inside one grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct GridEdge {
    /// `None` only for placeholder rows
    pub grid_id: Option<usize>,
    pub geometry: LineString<f64>,
    pub infr_class: Option<InfrClass>,
    pub geom_length: f64,
    pub infr_length: f64,
}

impl Measured for GridEdge {
    fn geom_length(&self) -> f64 {
        self.geom_length
    }

    fn infr_length(&self) -> f64 {
        self.infr_length
    }

    fn infr_class(&self) -> Option<InfrClass> {
        self.infr_class
    }
}

type CellBox = GeomWithData<Rectangle<[f64; 2]>, usize>;

fn envelope(rect: Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

const BORDER_TOLERANCE: f64 = 1e-9;

/// Whether every vertex of `part` lies in `cell` or on its border
fn covers(cell: &Polygon<f64>, part: &LineString<f64>) -> bool {
    part.points().all(|p| Euclidean.distance(cell, &p) <= BORDER_TOLERANCE)
}

/// Splits every edge along the grid and tags each piece with its cell.
///
/// Piece lengths are measured again; the infrastructure length is shared
/// out in proportion to the geometric length. A piece running along a
/// border shared by several cells goes to the one with the lowest id.
pub fn overlay_grid<R: LineRecord + Measured>(
    edges: &Table<R>,
    grid: &Table<GridCell>,
) -> Table<GridEdge> {
    let index: RTree<CellBox> = RTree::bulk_load(
        grid.iter()
            .enumerate()
            .filter_map(|(idx, cell)| {
                let rect = cell.geometry.bounding_rect()?;
                let aabb = envelope(rect);
                Some(GeomWithData::new(
                    Rectangle::from_corners(aabb.lower(), aabb.upper()),
                    idx,
                ))
            })
            .collect(),
    );

    let mut pieces = Vec::new();
    for edge in edges {
        let line = edge.geometry();
        let Some(rect) = line.bounding_rect() else {
            continue;
        };
        let total = edge.geom_length();
        let ratio = if total > 0.0 {
            edge.infr_length() / total
        } else {
            1.0
        };

        let mut hits: Vec<usize> = index
            .locate_in_envelope_intersecting(&envelope(rect))
            .map(|hit| hit.data)
            .collect();
        hits.sort_unstable();

        for (pos, &idx) in hits.iter().enumerate() {
            let cell = &grid.rows[idx];
            let clipped = cell
                .geometry
                .clip(&MultiLineString::new(vec![line.clone()]), false);
            for part in clipped {
                let geom_length = Euclidean.length(&part);
                if geom_length <= 0.0
                    || hits[..pos]
                        .iter()
                        .any(|&lower| covers(&grid.rows[lower].geometry, &part))
                {
                    continue;
                }
                pieces.push(GridEdge {
                    grid_id: Some(cell.grid_id),
                    geometry: part,
                    infr_class: edge.infr_class(),
                    geom_length,
                    infr_length: geom_length * ratio,
                });
            }
        }
    }

    Table::new(edges.crs, pieces)
}

/// Replaces an empty table by a single placeholder row with zero lengths
pub fn fill_empty(edges: Table<GridEdge>) -> Table<GridEdge> {
    if !edges.is_empty() {
        return edges;
    }
    Table::new(
        edges.crs,
        vec![GridEdge {
            grid_id: None,
            geometry: LineString::new(Vec::new()),
            infr_class: None,
            geom_length: 0.0,
            infr_length: 0.0,
        }],
    )
}

/// Summed length of one cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellLength {
    pub grid_id: usize,
    pub geometry: Polygon<f64>,
    pub length: f64,
}

/// Sums `column` per cell over the edges matching `filter`.
///
/// Only cells with at least one matching edge are returned, in grid order.
pub fn grid_density(
    edges: &Table<GridEdge>,
    filter: ClassFilter,
    column: LengthColumn,
    grid: &Table<GridCell>,
) -> Table<CellLength> {
    let mut sums: HashMap<usize, f64> = HashMap::new();
    for edge in edges.iter().filter(|e| filter.matches(e.infr_class)) {
        if let Some(grid_id) = edge.grid_id {
            *sums.entry(grid_id).or_insert(0.0) += column.of(edge);
        }
    }

    let cells = grid
        .iter()
        .filter_map(|cell| {
            sums.get(&cell.grid_id).map(|&length| CellLength {
                grid_id: cell.grid_id,
                geometry: cell.geometry.clone(),
                length,
            })
        })
        .collect();
    Table::new(grid.crs, cells)
}

/// Per-cell lengths of both sources and their difference
#[derive(Debug, Clone, PartialEq)]
pub struct CellDiff {
    pub grid_id: usize,
    pub geometry: Polygon<f64>,
    pub length_gip: f64,
    pub length_osm: f64,
    /// `length_gip - length_osm`, rounded to whole units
    pub diff_absolute: f64,
}

/// Joins both aggregations onto `base`; cells missing from one side count
/// as zero length there.
pub fn grid_length_diff(
    osm: &Table<CellLength>,
    gip: &Table<CellLength>,
    base: &Table<GridCell>,
) -> Table<CellDiff> {
    let lookup = |table: &Table<CellLength>| -> HashMap<usize, f64> {
        table.iter().map(|c| (c.grid_id, c.length)).collect()
    };
    let osm = lookup(osm);
    let gip = lookup(gip);

    base.clone().map(|cell| {
        let length_gip = gip.get(&cell.grid_id).copied().unwrap_or(0.0);
        let length_osm = osm.get(&cell.grid_id).copied().unwrap_or(0.0);
        CellDiff {
            grid_id: cell.grid_id,
            geometry: cell.geometry,
            length_gip,
            length_osm,
            diff_absolute: round_half_even(length_gip - length_osm, 0),
        }
    })
}
