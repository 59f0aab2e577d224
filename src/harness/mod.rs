//! Benchmark workloads. All of them share one store connection and one
//! metrics buffer, owned by [`Bench`].

mod images;
mod load;
mod read;

pub use images::SampleStrategy;
pub use load::{source_files, LoadSettings, LoadSummary};
pub use read::ReadSummary;

use rand::Rng;

use crate::error::MetricsFlushError;
use crate::metrics::MetricsRecorder;
use crate::store::DocumentStore;

pub struct Bench<S, R> {
    store: S,
    metrics: MetricsRecorder,
    rng: R,
}

impl<S: DocumentStore, R: Rng> Bench<S, R> {
    pub fn new(store: S, metrics: MetricsRecorder, rng: R) -> Self {
        Self {
            store,
            metrics,
            rng,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Unconditionally write whatever is still buffered.
    pub fn drain(&mut self) -> Result<usize, MetricsFlushError> {
        self.metrics.flush(&mut self.store, false)
    }

    /// Threshold-triggered flush; a failure keeps the events and is only logged.
    fn flush_metrics(&mut self) {
        if let Err(err) = self.metrics.flush(&mut self.store, true) {
            log::error!("{err}");
        }
    }
}
