use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Document;

/// The persisted unit: one source file as loaded in one iteration.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    #[serde(flatten)]
    pub dataset: Document,
    pub file_meta: Document,
    pub meta: RecordMeta,
}

impl Record {
    pub fn to_bson(&self) -> Result<bson::Document, bson::ser::Error> {
        bson::to_document(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordMeta {
    #[serde(rename = "fn")]
    pub file_name: String,
    pub version: u32,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
    pub study: u32,
    #[serde(rename = "studyInstanceUID")]
    pub study_instance_uid: String,
    #[serde(rename = "seriesInstanceUID")]
    pub series_instance_uid: String,
    #[serde(flatten)]
    pub pixels: Option<PixelCapture>,
}

/// Decoded pixel samples as captured at ingest time.
#[derive(Debug, Clone, Serialize)]
pub struct PixelCapture {
    pub dtype: String,
    #[serde(rename = "r")]
    pub rows: u32,
    #[serde(rename = "c")]
    pub columns: u32,
    pub frames: u32,
    pub samples: u16,
    #[serde(with = "serde_bytes")]
    pub pixels: Vec<u8>,
}
