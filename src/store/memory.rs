use bson::Document;

use super::{study_of, DocumentStore};
use crate::error::StoreError;
use crate::model::MeasurementEvent;

/// In-process store with injectable write failures.
#[derive(Default)]
pub struct MemoryStore {
    pub records: Vec<Document>,
    pub events: Vec<MeasurementEvent>,
    pub resets: usize,
    pub failing_record_writes: usize,
    pub failing_event_writes: usize,
}

impl MemoryStore {
    pub fn events_of(&self, measure: crate::model::Measure) -> Vec<&MeasurementEvent> {
        self.events.iter().filter(|e| e.measure == measure).collect()
    }

    fn study(document: &Document) -> Option<u32> {
        document
            .get_document("meta")
            .ok()
            .and_then(|meta| meta.get("study"))
            .and_then(study_of)
    }
}

impl DocumentStore for MemoryStore {
    fn reset(&mut self) -> Result<(), StoreError> {
        self.records.clear();
        self.events.clear();
        self.resets += 1;
        Ok(())
    }

    fn insert_records(&mut self, records: Vec<Document>) -> Result<usize, StoreError> {
        if self.failing_record_writes > 0 {
            self.failing_record_writes -= 1;
            return Err(StoreError::Rejected("injected record write failure".into()));
        }
        let count = records.len();
        self.records.extend(records);
        Ok(count)
    }

    fn insert_events(&mut self, events: &[MeasurementEvent]) -> Result<usize, StoreError> {
        if self.failing_event_writes > 0 {
            self.failing_event_writes -= 1;
            return Err(StoreError::Rejected("injected metrics write failure".into()));
        }
        self.events.extend_from_slice(events);
        Ok(events.len())
    }

    fn distinct_studies(&self) -> Result<Vec<u32>, StoreError> {
        let mut studies: Vec<u32> = self.records.iter().filter_map(Self::study).collect();
        studies.sort_unstable();
        studies.dedup();
        Ok(studies)
    }

    fn count_study(&self, study: u32) -> Result<u64, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|document| Self::study(document) == Some(study))
            .count() as u64)
    }

    fn find_one_by_study(&self, study: u32) -> Result<Option<Document>, StoreError> {
        Ok(self
            .records
            .iter()
            .find(|document| Self::study(document) == Some(study))
            .cloned())
    }

    fn count_records(&self) -> Result<u64, StoreError> {
        Ok(self.records.len() as u64)
    }

    fn find_at(&self, offset: u64) -> Result<Option<Document>, StoreError> {
        Ok(usize::try_from(offset)
            .ok()
            .and_then(|offset| self.records.get(offset))
            .cloned())
    }
}
