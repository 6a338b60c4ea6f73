use serde::Deserialize;

use crate::{Error, GipId};

/// Parses an id column. Integral floats such as `"12.0"` are accepted since
/// GIS exports often write ids that way.
pub(super) fn parse_id(column: &str, value: &str) -> Result<GipId, Error> {
    let value = value.trim();
    if let Ok(id) = value.parse::<GipId>() {
        return Ok(id);
    }
    match value.parse::<f64>() {
        #[allow(clippy::cast_possible_truncation)]
        Ok(float) if float.fract() == 0.0 && float.is_finite() => Ok(float as GipId),
        _ => Err(Error::InvalidData(format!(
            "Column '{column}' holds '{value}', which is not an id"
        ))),
    }
}

pub(super) fn deserialize_gip_id<'de, D>(deserializer: D) -> Result<GipId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_id("id", &value).map_err(serde::de::Error::custom)
}
