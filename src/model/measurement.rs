use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    DcmProcess,
    InsertTime,
    SeriesTime,
    SingleRead,
    TotalRead,
    ImgProcess,
}

/// One timed observation, written to the `metrics` collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementEvent {
    pub measure: Measure,
    pub items_processed: u64,
    /// Milliseconds.
    pub process_time: f64,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
}

impl MeasurementEvent {
    pub fn new(measure: Measure, items_processed: u64, elapsed: Duration) -> Self {
        Self {
            measure,
            items_processed,
            process_time: elapsed.as_secs_f64() * 1000.0,
            date: Utc::now(),
        }
    }

    pub fn since(measure: Measure, items_processed: u64, started: Instant) -> Self {
        Self::new(measure, items_processed, started.elapsed())
    }
}
