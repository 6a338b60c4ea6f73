use serde::Deserialize;

use super::de::deserialize_gip_id;
use crate::GipId;

#[derive(Debug, Deserialize)]
pub struct FeedTurnUse {
    #[serde(rename = "OBJECTID", deserialize_with = "deserialize_gip_id")]
    pub object_id: GipId,
    #[serde(rename = "VIA_NODE_ID", deserialize_with = "deserialize_gip_id")]
    pub via_node_id: GipId,
    #[serde(rename = "USE_FROM_ID", deserialize_with = "deserialize_gip_id")]
    pub use_from_id: GipId,
    #[serde(rename = "USE_TO_ID", deserialize_with = "deserialize_gip_id")]
    pub use_to_id: GipId,
    #[serde(rename = "TIMESTAMP", default)]
    pub timestamp: Option<String>,
    pub geometry: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedNode {
    #[serde(rename = "OBJECTID", deserialize_with = "deserialize_gip_id")]
    pub object_id: GipId,
    pub geometry: String,
}
