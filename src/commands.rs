use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use geo::Polygon;
use geojson::FeatureCollection;
use radnetz_core::analysis::{
    DistanceStatistics, attribute_presence, class_length_km, create_grid, dangling_nodes,
    distance_statistics, fill_empty, find_adjacent_components, get_subgraphs, grid_density,
    grid_length_diff, match_proportion, overlay_grid,
};
use radnetz_core::export::{
    adjacency_to_geojson, cell_diffs_to_geojson, components_to_geojson, lines_to_geojson,
    network_edges_to_geojson, nodes_to_geojson, to_geojson_string,
};
use radnetz_core::loading::{
    ClassLoad, GeoJsonDirSource, load_gip_dataset, load_infrastructure_classes, load_line_file,
    load_study_area,
};
use radnetz_core::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::RunConfig;

/// Network the topology analysis runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NetworkSource {
    Osm,
    Gip,
}

#[derive(Debug, Serialize)]
struct ClassSummary {
    class: String,
    osm_km: f64,
    gip_km: f64,
}

#[derive(Debug, Serialize)]
struct PresenceSummary {
    name: String,
    with_attribute: usize,
    selected: usize,
    proportion: Option<f64>,
}

#[derive(Debug, Default, Serialize)]
struct ComparisonSummary {
    classes: Vec<ClassSummary>,
    presence: Vec<PresenceSummary>,
    /// Matched share of length in percent, per class
    match_proportion: BTreeMap<String, Option<f64>>,
    match_distance: Option<DistanceStatistics>,
    mean_osm_attributes: Option<f64>,
}

fn write_collection(dir: &Path, name: &str, collection: &FeatureCollection) -> Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, to_geojson_string(collection)?)
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    info!("Written {} feature(s) to {}", collection.features.len(), path.display());
    Ok(())
}

fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    let file =
        File::create(&path).with_context(|| format!("Failed to create '{}'", path.display()))?;
    serde_json::to_writer_pretty(file, value)?;
    info!("Written {}", path.display());
    Ok(())
}

fn file_stem(class: InfrClass) -> String {
    class.as_str().to_lowercase().replace(' ', "_")
}

fn load_area(config: &RunConfig) -> Result<Table<Polygon<f64>>> {
    Ok(load_study_area(&config.data.area_path, config.data.crs)?)
}

/// Loads, classifies and reconciles the GIP dataset of the study area
fn reconciled_gip(config: &RunConfig, area: &Table<Polygon<f64>>) -> Result<EdgeNodeModel> {
    let gip = load_gip_dataset(&config.data, Some(area))?;

    let (links, conflicts) = classify_links(gip.links);
    if !conflicts.is_empty() {
        warn!(
            "{} link(s) with conflicting bike_tow and bike_bkw left unclassified",
            conflicts.len()
        );
        write_json(&config.analysis.output_dir, "classification_conflicts.json", &conflicts)?;
    }

    let model = build_edge_node_model(links, &gip.turnuses, &gip.nodes)?;
    info!(
        "Edge-node model with {} edges, {} of them connectors; {} turnuse(s) with unknown via node",
        model.edges.len(),
        model.connectors,
        model.unresolved
    );
    if let Some(node) = model.busiest_node() {
        match node.lon_lat() {
            Ok(position) => info!(
                "Busiest via node {} with {} turnuses at lon {:.6}, lat {:.6}",
                node.node_id,
                node.degree,
                position.x(),
                position.y()
            ),
            Err(e) => info!(
                "Busiest via node {} with {} turnuses ({e})",
                node.node_id, node.degree
            ),
        }
    }
    Ok(model)
}

/// OSM lines per class; classes configured more than once are concatenated
fn osm_tables(
    config: &RunConfig,
    area: &Table<Polygon<f64>>,
) -> Result<BTreeMap<InfrClass, Table<LineFeature>>> {
    let crs = config.data.crs;
    let source = GeoJsonDirSource::new(config.data.osm_dir.clone(), crs);
    let clip_area = config.data.clip.then_some(area);

    let mut tables: BTreeMap<InfrClass, Table<LineFeature>> = BTreeMap::new();
    for (class, load) in load_infrastructure_classes(&source, &config.data.classes, clip_area) {
        if let ClassLoad::Empty(reason) = &load {
            info!("OSM {class}: {reason}");
        }
        let table = load.into_table(crs);
        let merged = match tables.remove(&class) {
            Some(previous) => previous.concat(table)?,
            None => table,
        };
        tables.insert(class, merged);
    }
    Ok(tables)
}

fn osm_total(
    tables: BTreeMap<InfrClass, Table<LineFeature>>,
    crs: Crs,
) -> Result<Table<LineFeature>> {
    let total = tables
        .into_values()
        .try_fold(Table::empty(crs), Table::concat)?;
    Ok(total)
}

/// Builds the GIP edge-node model and writes it with its class lengths
pub fn reconcile(config: &RunConfig) -> Result<()> {
    let area = load_area(config)?;
    let model = reconciled_gip(config, &area)?;

    for class in InfrClass::CLASSIFIABLE {
        let km = class_length_km(&model.edges.rows, class.into(), LengthColumn::Geom);
        info!("GIP {class}: {km} km");
    }
    write_collection(
        &config.analysis.output_dir,
        "gip_edge_node_model.geojson",
        &lines_to_geojson(&model.edges)?,
    )
}

/// Compares OSM and GIP per class: lengths, grid differences, attribute
/// presence and, with matcher output, match proportions
pub fn compare(config: &RunConfig) -> Result<()> {
    let crs = config.data.crs;
    let out = &config.analysis.output_dir;
    let area = load_area(config)?;

    let grid = create_grid(&area, config.analysis.cell_size)?;
    info!("Grid with {} cell(s) of {} units", grid.len(), config.analysis.cell_size);

    let model = reconciled_gip(config, &area)?;
    let gip_edges = fill_empty(overlay_grid(&model.edges, &grid));
    let osm = osm_tables(config, &area)?;

    let mut summary = ComparisonSummary::default();
    for class in InfrClass::CLASSIFIABLE {
        let filter = ClassFilter::from(class);
        let osm_edges = fill_empty(match osm.get(&class) {
            Some(table) => overlay_grid(table, &grid),
            None => Table::empty(crs),
        });

        let osm_density = grid_density(&osm_edges, filter, LengthColumn::Infr, &grid);
        let gip_density = grid_density(&gip_edges, filter, LengthColumn::Infr, &grid);
        let diff = grid_length_diff(&osm_density, &gip_density, &grid);
        write_collection(
            out,
            &format!("grid_diff_{}.geojson", file_stem(class)),
            &cell_diffs_to_geojson(&diff)?,
        )?;

        summary.classes.push(ClassSummary {
            class: filter.to_string(),
            osm_km: osm
                .get(&class)
                .map_or(0.0, |t| class_length_km(&t.rows, filter, LengthColumn::Infr)),
            gip_km: class_length_km(&model.edges.rows, filter, LengthColumn::Infr),
        });
    }

    let osm_lines = osm_total(osm, crs)?;
    summary.classes.push(ClassSummary {
        class: ClassFilter::Total.to_string(),
        osm_km: class_length_km(&osm_lines.rows, ClassFilter::Total, LengthColumn::Infr),
        gip_km: class_length_km(&model.edges.rows, ClassFilter::Total, LengthColumn::Infr),
    });
    if !osm_lines.is_empty() {
        let attributes: usize = osm_lines.iter().map(LineFeature::attribute_amount).sum();
        #[allow(clippy::cast_precision_loss)]
        let mean = attributes as f64 / osm_lines.len() as f64;
        summary.mean_osm_attributes = Some(mean);
    }

    for query in &config.presence {
        let presence = attribute_presence(&osm_lines, "OSM", &query.preselect, &query.analyze)?
            .into_presence(crs);
        summary.presence.push(PresenceSummary {
            name: query.name.clone(),
            with_attribute: presence.with_attribute.len(),
            selected: presence.selected.len(),
            proportion: presence.proportion(),
        });
    }

    if let (Some(matched), Some(unmatched)) =
        (&config.analysis.matched_path, &config.analysis.unmatched_path)
    {
        let key = config.analysis.edge_id_key.as_str();
        let matched = load_line_file(matched, crs)?;
        let distances: Vec<f64> = matched
            .iter()
            .filter_map(|row| row.tags.get("distance")?.parse().ok())
            .collect();
        summary.match_distance = distance_statistics(&distances);

        let matched = group_by_edge_id(matched, key);
        let unmatched = group_by_edge_id(load_line_file(unmatched, crs)?, key);
        let filters = std::iter::once(ClassFilter::Total)
            .chain(InfrClass::CLASSIFIABLE.into_iter().map(ClassFilter::from));
        for filter in filters {
            let proportion =
                match_proportion(&matched.rows, &unmatched.rows, LengthColumn::Infr, filter);
            summary.match_proportion.insert(filter.to_string(), proportion);
        }
    }

    write_json(out, "comparison_summary.json", &summary)
}

/// Dangling nodes, components and adjacent components of one network
pub fn topology(config: &RunConfig, source: NetworkSource) -> Result<()> {
    let area = load_area(config)?;
    match source {
        NetworkSource::Osm => {
            let lines = osm_total(osm_tables(config, &area)?, config.data.crs)?;
            analyze_network(config, "osm", &NetworkGraph::from_lines(lines))
        }
        NetworkSource::Gip => {
            let model = reconciled_gip(config, &area)?;
            analyze_network(config, "gip", &NetworkGraph::from_lines(model.edges))
        }
    }
}

fn analyze_network<E: LineRecord + Measured + Clone>(
    config: &RunConfig,
    label: &str,
    network: &NetworkGraph<E>,
) -> Result<()> {
    let out = &config.analysis.output_dir;
    info!(
        "{label} network with {} node(s) and {} edge(s)",
        network.node_count(),
        network.edge_count()
    );
    write_collection(
        out,
        &format!("{label}_edges.geojson"),
        &network_edges_to_geojson(network)?,
    )?;

    let dangling = dangling_nodes(network);
    info!("{} dangling node(s)", dangling.len());
    write_collection(
        out,
        &format!("{label}_dangling_nodes.geojson"),
        &nodes_to_geojson(&dangling)?,
    )?;

    let components = get_subgraphs(network);
    if let Some(largest) = components.first() {
        info!(
            "{} component(s), the largest with {} edge(s) and {:.1} units of infrastructure",
            components.len(),
            largest.edges.len(),
            largest.infr_length
        );
    }
    write_collection(
        out,
        &format!("{label}_components.geojson"),
        &components_to_geojson(&components)?,
    )?;

    let adjacent = find_adjacent_components(&components, config.analysis.buffer_dist);
    info!(
        "{} pair(s) of edges closer than {} between different components",
        adjacent.len(),
        config.analysis.buffer_dist
    );
    write_collection(
        out,
        &format!("{label}_adjacent_components.geojson"),
        &adjacency_to_geojson(&adjacent)?,
    )
}
