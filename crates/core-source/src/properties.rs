//! Item-properties payload: optional JSON a plugin can supply per item.

use crate::{SourceError, SourceResult};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PropertyField {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PropertySection {
    pub title: String,
    #[serde(default)]
    pub fields: Vec<PropertyField>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ItemProperties {
    pub title: String,
    #[serde(default)]
    pub sections: Vec<PropertySection>,
}

/// Parse a plugin's properties JSON. Unknown fields are tolerated so plugin
/// schemas can grow without breaking older panes.
pub fn parse_item_properties(json: &str) -> SourceResult<ItemProperties> {
    serde_json::from_str(json).map_err(|e| {
        tracing::debug!(target: "source.properties", error = %e, "properties_parse_failed");
        SourceError::InvalidData("malformed item properties payload")
    })
}
