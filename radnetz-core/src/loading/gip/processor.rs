use std::path::Path;

use geo::{Intersects, Polygon};
use log::info;

use super::de::parse_id;
use super::parser::{deserialize_csv_file, parse_line, parse_point};
use super::raw_types::{FeedNode, FeedTurnUse};
use crate::loading::{LoadConfig, dissolve};
use crate::model::{Crs, GipLink, GipNode, Table, Tags, TurnUse};
use crate::reconcile::clean_turnuse;
use crate::Error;

/// The three GIP tables of one study area
#[derive(Debug, Clone)]
pub struct GipDataset {
    pub links: Table<GipLink>,
    pub turnuses: Table<TurnUse>,
    pub nodes: Table<GipNode>,
}

fn take_non_empty(record: &mut Tags, column: &str) -> Option<String> {
    record.remove(column).filter(|value| !value.trim().is_empty())
}

/// Builds a link from one CSV record. Columns other than the id, use id,
/// facility codes and geometry are kept as attributes.
///
/// # Errors
///
/// Fails when `gip_lu_id` or `geometry` are missing or malformed.
pub fn link_from_record(mut record: Tags) -> Result<GipLink, Error> {
    let id = take_non_empty(&mut record, "gip_lu_id")
        .ok_or_else(|| Error::InvalidData("Link without 'gip_lu_id'".to_string()))
        .and_then(|value| parse_id("gip_lu_id", &value))?;
    let use_id = take_non_empty(&mut record, "idf_use_id")
        .map(|value| parse_id("idf_use_id", &value))
        .transpose()?;
    let geometry = take_non_empty(&mut record, "geometry")
        .ok_or_else(|| Error::InvalidData(format!("Link {id} without geometry")))
        .and_then(|wkt| parse_line(&wkt))?;

    Ok(GipLink {
        id,
        use_id,
        geometry,
        bike_tow: take_non_empty(&mut record, "bike_tow"),
        bike_bkw: take_non_empty(&mut record, "bike_bkw"),
        attributes: record,
        infr_class: None,
    })
}

fn load_links(path: &Path, crs: Crs) -> Result<Table<GipLink>, Error> {
    let links = deserialize_csv_file::<Tags>(path)?
        .into_iter()
        .map(link_from_record)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Table::new(crs, links))
}

fn load_turnuses(path: &Path, crs: Crs) -> Result<Table<TurnUse>, Error> {
    let turnuses = deserialize_csv_file::<FeedTurnUse>(path)?
        .into_iter()
        .map(|raw| {
            Ok(TurnUse {
                object_id: raw.object_id,
                via_node_id: raw.via_node_id,
                use_from_id: raw.use_from_id,
                use_to_id: raw.use_to_id,
                timestamp: raw.timestamp.filter(|t| !t.is_empty()),
                geometry: parse_line(&raw.geometry)?,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(Table::new(crs, turnuses))
}

fn load_nodes(path: &Path, crs: Crs) -> Result<Table<GipNode>, Error> {
    let nodes = deserialize_csv_file::<FeedNode>(path)?
        .into_iter()
        .map(|raw| {
            Ok(GipNode {
                id: raw.object_id,
                position: parse_point(&raw.geometry)?,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(Table::new(crs, nodes))
}

/// Loads links, turn uses and nodes of the GIP export.
///
/// With an `area`, only links touching it are kept. Turn uses are always
/// cleaned against the kept links.
///
/// # Errors
///
/// Returns an error if a file cannot be read or holds a malformed row.
pub fn load_gip_dataset(
    config: &LoadConfig,
    area: Option<&Table<Polygon<f64>>>,
) -> Result<GipDataset, Error> {
    info!("Processing GIP links: {}", config.links_path.display());
    let mut links = load_links(&config.links_path, config.crs)?;
    if let Some(area) = area {
        let area = dissolve(area);
        let total = links.len();
        links = links.retain(|link| link.geometry.intersects(&area));
        info!("{} of {total} GIP links touch the study area", links.len());
    }

    info!("Processing GIP turnuses: {}", config.turnuse_path.display());
    let turnuses = load_turnuses(&config.turnuse_path, config.crs)?;
    let total = turnuses.len();
    let turnuses = clean_turnuse(turnuses, &links);
    info!("{} of {total} turnuses connect kept links", turnuses.len());

    info!("Processing GIP nodes: {}", config.nodes_path.display());
    let nodes = load_nodes(&config.nodes_path, config.crs)?;

    Ok(GipDataset {
        links,
        turnuses,
        nodes,
    })
}
