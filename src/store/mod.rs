mod mongo;

#[cfg(test)]
pub mod memory;

pub use mongo::MongoStore;

use bson::{Bson, Document};

use crate::error::StoreError;
use crate::model::MeasurementEvent;

pub const RECORDS_COLLECTION: &str = "dcm";
pub const METRICS_COLLECTION: &str = "metrics";

/// Compound indexes created on the records collection after a drop.
pub const RECORD_INDEXES: [&[&str]; 3] = [
    &["meta.study", "meta.version"],
    &[
        "meta.studyInstanceUID",
        "meta.seriesInstanceUID",
        "meta.version",
    ],
    &["meta.study", "meta.studyInstanceUID", "meta.version"],
];

/// The query shapes the harnesses need from a document store.
pub trait DocumentStore {
    /// Drop everything and recreate [`RECORD_INDEXES`].
    fn reset(&mut self) -> Result<(), StoreError>;

    /// Bulk insert; returns the number of acknowledged documents.
    fn insert_records(&mut self, records: Vec<Document>) -> Result<usize, StoreError>;

    fn insert_events(&mut self, events: &[MeasurementEvent]) -> Result<usize, StoreError>;

    fn distinct_studies(&self) -> Result<Vec<u32>, StoreError>;

    /// Stream every record of `study` and count them.
    fn count_study(&self, study: u32) -> Result<u64, StoreError>;

    fn find_one_by_study(&self, study: u32) -> Result<Option<Document>, StoreError>;

    fn count_records(&self) -> Result<u64, StoreError>;

    fn find_at(&self, offset: u64) -> Result<Option<Document>, StoreError>;
}

pub(crate) fn study_of(value: &Bson) -> Option<u32> {
    match value {
        Bson::Int32(v) => u32::try_from(*v).ok(),
        Bson::Int64(v) => u32::try_from(*v).ok(),
        Bson::Double(v) if v.fract() == 0.0 && *v >= 0.0 && *v <= f64::from(u32::MAX) => {
            Some(*v as u32)
        }
        _ => None,
    }
}
