use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;

use super::Bench;
use crate::error::StoreError;
use crate::model::{Measure, MeasurementEvent};
use crate::store::DocumentStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadSummary {
    pub reads: u32,
    pub documents: u64,
}

impl<S: DocumentStore, R: Rng> Bench<S, R> {
    /// Read all documents of a random study `reads` times, recording each read
    /// as `single_read` and the whole run as `total_read`.
    pub fn run_read(&mut self, reads: u32) -> Result<ReadSummary, StoreError> {
        log::info!("Attempting {reads} reads");
        let started = Instant::now();
        let studies = self.store.distinct_studies()?;
        if studies.is_empty() {
            log::warn!("No studies loaded, every read will return zero documents");
        }

        let mut documents = 0;
        for _ in 0..reads {
            let read_started = Instant::now();
            let count = match studies.choose(&mut self.rng) {
                Some(&study) => self.store.count_study(study)?,
                None => 0,
            };
            documents += count;
            self.metrics.record(MeasurementEvent::since(
                Measure::SingleRead,
                count,
                read_started,
            ));
            self.flush_metrics();
        }

        self.metrics.record(MeasurementEvent::since(
            Measure::TotalRead,
            documents,
            started,
        ));
        if let Err(err) = self.drain() {
            log::error!("{err}");
        }
        log::info!("Finished reading {documents} records");

        Ok(ReadSummary { reads, documents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsRecorder;
    use crate::store::memory::MemoryStore;
    use bson::doc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bench(store: MemoryStore) -> Bench<MemoryStore, StdRng> {
        Bench::new(store, MetricsRecorder::new(1000), StdRng::seed_from_u64(11))
    }

    #[test]
    fn empty_store_reads_zero_every_time() {
        let mut bench = bench(MemoryStore::default());

        let summary = bench.run_read(5).unwrap();
        assert_eq!(summary, ReadSummary { reads: 5, documents: 0 });

        let store = bench.store();
        let single = store.events_of(Measure::SingleRead);
        assert_eq!(single.len(), 5);
        assert!(single.iter().all(|e| e.items_processed == 0));
        let total = store.events_of(Measure::TotalRead);
        assert_eq!(total.len(), 1);
        assert_eq!(total[0].items_processed, 0);
        assert!(bench.metrics().is_empty());
    }

    #[test]
    fn reads_count_documents_of_the_chosen_study() {
        let mut store = MemoryStore::default();
        for (study, copies) in [(1_i64, 2), (2, 2)] {
            for version in 0..copies {
                store
                    .records
                    .push(doc! { "meta": { "study": study, "version": version } });
            }
        }
        let mut bench = bench(store);

        let summary = bench.run_read(4).unwrap();
        assert_eq!(summary.documents, 8);

        let single = bench.store().events_of(Measure::SingleRead);
        assert!(single.iter().all(|e| e.items_processed == 2));
        let total = bench.store().events_of(Measure::TotalRead);
        assert_eq!(total[0].items_processed, 8);
    }

    #[test]
    fn failed_final_flush_keeps_events_buffered() {
        let mut bench = bench(MemoryStore {
            failing_event_writes: 1,
            ..MemoryStore::default()
        });

        bench.run_read(2).unwrap();
        assert_eq!(bench.metrics().len(), 3);

        assert_eq!(bench.drain().unwrap(), 3);
        assert_eq!(bench.store().events.len(), 3);
    }
}
