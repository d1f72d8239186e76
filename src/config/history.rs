// src/config/history.rs
use serde::{Serialize, Deserialize};
use super::CarAnalysis;

/// One successful analysis, as persisted in local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub analysis: CarAnalysis,
    /// Unix time in milliseconds.
    pub timestamp: i64,
    /// `data:<mime>;base64,...` URL of the submitted image.
    #[serde(alias = "imageUrl")]
    pub image_data: String,
}
