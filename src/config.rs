use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use radnetz_core::loading::{LoadConfig, validate_config};
use serde::Deserialize;

/// Contents of the TOML run configuration
#[derive(Debug, Deserialize)]
pub struct RunConfig {
    #[serde(flatten)]
    pub data: LoadConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub presence: Vec<PresenceQuery>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Grid cell width in CRS units
    pub cell_size: f64,
    /// Distance below which unconnected components count as adjacent
    pub buffer_dist: f64,
    pub output_dir: PathBuf,
    /// Matcher output; match proportions are reported when both are set
    pub matched_path: Option<PathBuf>,
    pub unmatched_path: Option<PathBuf>,
    /// Property holding the id of the edge a matched segment belongs to
    pub edge_id_key: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cell_size: 1000.0,
            buffer_dist: 5.0,
            output_dir: PathBuf::from("output"),
            matched_path: None,
            unmatched_path: None,
            edge_id_key: "edge_id".to_string(),
        }
    }
}

/// Attribute presence evaluation over the OSM data
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceQuery {
    pub name: String,
    /// `key=value` filters; empty means the whole dataset
    #[serde(default)]
    pub preselect: Vec<String>,
    pub analyze: Vec<String>,
}

pub fn load_config(path: &Path) -> Result<RunConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config '{}'", path.display()))?;
    let config: RunConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config '{}'", path.display()))?;

    validate_config(&config.data)?;
    if !config.analysis.cell_size.is_finite() || config.analysis.cell_size <= 0.0 {
        bail!("cell_size must be positive, got {}", config.analysis.cell_size);
    }
    if !config.analysis.buffer_dist.is_finite() || config.analysis.buffer_dist < 0.0 {
        bail!("buffer_dist must not be negative, got {}", config.analysis.buffer_dist);
    }
    for query in &config.presence {
        if query.analyze.is_empty() {
            bail!("presence query '{}' analyzes no attribute", query.name);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_section_is_optional() {
        let config: RunConfig = toml::from_str(
            r#"
            crs = 31287
            links_path = "gip/links.csv"
            turnuse_path = "gip/turnuse.csv"
            nodes_path = "gip/nodes.csv"
            area_path = "area.geojson"
            osm_dir = "osm"

            [[classes]]
            class = "Cycle Lanes"
            name = "cycle_lanes"
            query = "[cycleway=lane]"

            [[presence]]
            name = "surface"
            preselect = ["highway=cycleway"]
            analyze = ["surface"]
            "#,
        )
        .unwrap();

        assert_eq!(config.data.crs.epsg(), 31287);
        assert!(config.data.clip);
        assert_eq!(config.data.classes.len(), 1);
        assert_eq!(config.analysis.cell_size, 1000.0);
        assert_eq!(config.analysis.edge_id_key, "edge_id");
        assert_eq!(config.presence[0].preselect, vec!["highway=cycleway".to_string()]);
    }
}
