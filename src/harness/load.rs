use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::Rng;
use walkdir::WalkDir;

use super::Bench;
use crate::error::{DecodeError, LoadError};
use crate::model::loader::ingest;
use crate::model::{Measure, MeasurementEvent};
use crate::store::DocumentStore;

#[derive(Debug, Clone)]
pub struct LoadSettings {
    pub source_dir: PathBuf,
    pub iterations: u32,
    pub studies: u32,
    pub capture_pixels: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub written: usize,
    pub failed_iterations: u32,
}

impl<S: DocumentStore, R: Rng> Bench<S, R> {
    /// Load every file under the source directory once per iteration, each
    /// iteration as a new version under a randomly drawn study.
    ///
    /// A rejected bulk write drops that iteration's batch and the run moves
    /// on; a file that cannot be decoded ends the run.
    pub fn run_load(&mut self, settings: &LoadSettings) -> Result<LoadSummary, DecodeError> {
        log::info!(
            "Attempting to insert data from {} ({} iterations)",
            settings.source_dir.display(),
            settings.iterations
        );
        let mut summary = LoadSummary::default();

        for iteration in 1..=settings.iterations {
            match self.load_iteration(settings, iteration) {
                Ok(written) => summary.written += written,
                Err(LoadError::Decode(err)) => return Err(err),
                Err(err @ LoadError::Write { .. }) => {
                    log::error!("Insert many failure: {err}");
                    summary.failed_iterations += 1;
                }
            }
            self.flush_metrics();
        }

        Ok(summary)
    }

    /// One iteration: decode and convert every file, then write the batch in
    /// a single call. Records `insert_time` for the write alone and
    /// `series_time` for the whole iteration.
    pub fn load_iteration(
        &mut self,
        settings: &LoadSettings,
        iteration: u32,
    ) -> Result<usize, LoadError> {
        let started = Instant::now();
        let study = self.rng.gen_range(1..=settings.studies.max(1));

        let mut batch = Vec::new();
        for path in source_files(&settings.source_dir) {
            let (record, event) = ingest(&path, iteration, study, settings.capture_pixels)?;
            self.metrics.record(event);
            let document = record
                .to_bson()
                .map_err(|source| DecodeError::Encode { path, source })?;
            batch.push(document);
        }

        let files = batch.len() as u64;
        let outcome = self.write_batch(iteration, batch);
        self.metrics
            .record(MeasurementEvent::since(Measure::SeriesTime, files, started));
        outcome
    }

    fn write_batch(
        &mut self,
        iteration: u32,
        batch: Vec<bson::Document>,
    ) -> Result<usize, LoadError> {
        if batch.is_empty() {
            log::warn!("Iteration {iteration}: no source files, nothing to insert");
            return Ok(0);
        }

        let submitted = batch.len();
        let started = Instant::now();
        match self.store.insert_records(batch) {
            Ok(written) => {
                self.metrics.record(MeasurementEvent::since(
                    Measure::InsertTime,
                    written as u64,
                    started,
                ));
                log::info!("Iteration {iteration}: inserted {written} records");
                Ok(written)
            }
            Err(source) => Err(LoadError::Write {
                iteration,
                discarded: submitted,
                source,
            }),
        }
    }
}

/// Every regular file below `dir`, in a stable order. Unreadable entries are
/// logged and skipped.
pub fn source_files(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(entry.into_path()),
            Ok(_) => None,
            Err(err) => {
                log::warn!("Skipping unreadable path: {err}");
                None
            }
        })
}
