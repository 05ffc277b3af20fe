use std::collections::HashMap;
use std::io::Read;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One notification delivered to the handler, in the shape of a CloudWatch/EventBridge event.
///
/// Nothing is required and nothing is validated. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRecord {
    pub id: Option<String>,
    pub source: Option<String>,
    pub account: Option<String>,
    pub region: Option<String>,
    #[serde(rename = "detail-type")]
    pub detail_type: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub resources: Option<Vec<String>>,
    #[serde(
        rename = "detail",
        alias = "details",
        deserialize_with = "deserialize_details"
    )]
    pub details: Option<HashMap<String, String>>,
}

impl EventRecord {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse event JSON")
    }

    pub fn from_reader(reader: impl Read) -> anyhow::Result<Self> {
        serde_json::from_reader(reader).context("Failed to read event JSON")
    }

    /// The event id for log output, empty when the event has none.
    pub fn id_or_empty(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

/// Keeps string values as they are and stores any other JSON value as its compact text, so that
/// a detail object with numbers or nested objects is still accepted. `null` values are dropped.
fn deserialize_details<'de, D>(deserializer: D) -> Result<Option<HashMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<HashMap<String, serde_json::Value>>::deserialize(deserializer)?;

    Ok(raw.map(|details| {
        details
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect()
    }))
}
