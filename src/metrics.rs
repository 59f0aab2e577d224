use crate::error::MetricsFlushError;
use crate::model::MeasurementEvent;
use crate::store::DocumentStore;

pub const DEFAULT_WATERMARK: usize = 1000;

/// Client-side buffer of measurement events.
///
/// Events leave the buffer only through a successful [`flush`](Self::flush);
/// a failed write keeps them for the next attempt.
#[derive(Debug)]
pub struct MetricsRecorder {
    buffer: Vec<MeasurementEvent>,
    watermark: usize,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_WATERMARK)
    }
}

impl MetricsRecorder {
    pub fn new(watermark: usize) -> Self {
        Self {
            buffer: Vec::new(),
            watermark,
        }
    }

    pub fn record(&mut self, event: MeasurementEvent) {
        self.buffer.push(event);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn pending(&self) -> &[MeasurementEvent] {
        &self.buffer
    }

    /// Write the buffer as one batch. When `thresholded`, nothing happens
    /// until the buffer holds more than the watermark.
    pub fn flush<S: DocumentStore + ?Sized>(
        &mut self,
        store: &mut S,
        thresholded: bool,
    ) -> Result<usize, MetricsFlushError> {
        if self.buffer.is_empty() || (thresholded && self.buffer.len() <= self.watermark) {
            return Ok(0);
        }

        log::debug!("Attempting to insert {} metrics", self.buffer.len());
        match store.insert_events(&self.buffer) {
            Ok(inserted) => {
                log::info!("Inserted {inserted} metrics");
                self.buffer.clear();
                Ok(inserted)
            }
            Err(source) => Err(MetricsFlushError {
                retained: self.buffer.len(),
                source,
            }),
        }
    }
}
