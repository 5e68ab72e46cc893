//! types.rs — Raw event rows as the collectors export them.

use serde::{Deserialize, Serialize};

/// One row of the combined events CSV, untouched. Normalization into
/// [`crate::records::EventRecord`] happens in [`crate::ingest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEventRow {
    #[serde(rename = "EventType")]
    pub event_type: String,
    #[serde(rename = "Subject")]
    pub subject: String,
    /// Raw date-range text, e.g. "令和7年9月20日" or "2025-08-01～2025-08-03".
    #[serde(rename = "DateText")]
    pub date_text: String,
    #[serde(rename = "Location", default)]
    pub location: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Organizer", default)]
    pub organizer: String,
    #[serde(rename = "Contact", default)]
    pub contact: String,
    #[serde(rename = "DataSource", default)]
    pub source: String,
}
