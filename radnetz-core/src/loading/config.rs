use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Error;
use crate::model::Crs;

use super::osm::InfraClassQuery;

/// Input locations and options for loading one study area
#[derive(Debug, Clone, Deserialize)]
pub struct LoadConfig {
    /// Projected reference all tables are expressed in
    pub crs: Crs,
    /// GIP linear uses (`gip_lu_id`, `bike_tow`, `bike_bkw`, WKT `geometry`)
    pub links_path: PathBuf,
    /// GIP turn uses
    pub turnuse_path: PathBuf,
    /// GIP nodes
    pub nodes_path: PathBuf,
    /// Study area polygons as GeoJSON
    pub area_path: PathBuf,
    /// Directory holding `export_<class>.geojson` files
    pub osm_dir: PathBuf,
    #[serde(default)]
    pub classes: Vec<InfraClassQuery>,
    /// Clip OSM data to the study area
    #[serde(default = "default_clip")]
    pub clip: bool,
}

fn default_clip() -> bool {
    true
}

fn require_file(path: &Path, what: &str) -> Result<(), Error> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{what} not found: {}", path.display()),
        )))
    }
}

/// Checks that every configured input exists before any loading starts
///
/// # Errors
///
/// Returns an error naming the first missing input, or when no
/// infrastructure class is configured at all.
pub fn validate_config(config: &LoadConfig) -> Result<(), Error> {
    require_file(&config.links_path, "GIP links file")?;
    require_file(&config.turnuse_path, "GIP turnuse file")?;
    require_file(&config.nodes_path, "GIP nodes file")?;
    require_file(&config.area_path, "Study area file")?;

    if !config.osm_dir.is_dir() {
        return Err(Error::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("OSM export directory not found: {}", config.osm_dir.display()),
        )));
    }

    if config.classes.is_empty() {
        return Err(Error::InvalidData(
            "No infrastructure classes provided in the configuration".to_string(),
        ));
    }

    Ok(())
}
