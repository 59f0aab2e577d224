use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;

use super::Bench;
use crate::error::RenderError;
use crate::image_pipeline::{ImageSink, StoredPixels};
use crate::model::{Measure, MeasurementEvent};
use crate::store::DocumentStore;

/// How the image sampler picks a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleStrategy {
    /// First document of a random study.
    #[default]
    ByStudy,
    /// Random skip offset over the whole collection.
    ByOffset,
}

enum Pool {
    Studies(Vec<u32>),
    Offsets(u64),
}

impl<S: DocumentStore, R: Rng> Bench<S, R> {
    /// Rebuild `count` random stored images and hand them to `sink`.
    /// Returns how many were rendered.
    pub fn sample_images<K: ImageSink + ?Sized>(
        &mut self,
        count: u32,
        strategy: SampleStrategy,
        sink: &mut K,
    ) -> Result<u32, RenderError> {
        log::debug!("Attempting to plot random images from datastore");
        let pool = match strategy {
            SampleStrategy::ByStudy => Pool::Studies(self.store.distinct_studies()?),
            SampleStrategy::ByOffset => Pool::Offsets(self.store.count_records()?),
        };

        let mut rendered = 0;
        for index in 0..count {
            let started = Instant::now();
            let document = match &pool {
                Pool::Studies(studies) => match studies.choose(&mut self.rng) {
                    Some(&study) => self.store.find_one_by_study(study)?,
                    None => None,
                },
                Pool::Offsets(0) => None,
                Pool::Offsets(total) => self.store.find_at(self.rng.gen_range(0..*total))?,
            };
            let Some(document) = document else {
                log::warn!("No stored documents to sample images from");
                break;
            };

            let pixels = StoredPixels::from_document(&document)?;
            log::info!("Attempting to build image for: {}", pixels.file_name);
            let grid = pixels.to_grid()?;
            self.metrics
                .record(MeasurementEvent::since(Measure::ImgProcess, 1, started));

            sink.render(index, &pixels, &grid)?;
            rendered += 1;
        }

        self.flush_metrics();
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::PixelGrid;
    use crate::metrics::MetricsRecorder;
    use crate::store::memory::MemoryStore;
    use bson::spec::BinarySubtype;
    use bson::{doc, Binary};
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct Collect(Vec<(u32, PixelGrid)>);

    impl ImageSink for Collect {
        fn render(
            &mut self,
            index: u32,
            _pixels: &StoredPixels,
            grid: &PixelGrid,
        ) -> Result<(), RenderError> {
            self.0.push((index, grid.clone()));
            Ok(())
        }
    }

    fn store_with_image() -> MemoryStore {
        let pixels = Binary {
            subtype: BinarySubtype::Generic,
            bytes: vec![1, 2, 3, 4],
        };
        let mut store = MemoryStore::default();
        store.records.push(doc! {
            "meta": {
                "fn": "data/ot/1.dcm",
                "study": 4_i64,
                "dtype": "uint8",
                "r": 2_i64,
                "c": 2_i64,
                "pixels": pixels,
            }
        });
        store
    }

    fn bench(store: MemoryStore) -> Bench<MemoryStore, StdRng> {
        Bench::new(store, MetricsRecorder::new(1000), StdRng::seed_from_u64(5))
    }

    #[test]
    fn samples_by_study_and_by_offset() {
        for strategy in [SampleStrategy::ByStudy, SampleStrategy::ByOffset] {
            let mut bench = bench(store_with_image());
            let mut sink = Collect::default();

            assert_eq!(bench.sample_images(3, strategy, &mut sink).unwrap(), 3);
            assert_eq!(sink.0.len(), 3);
            assert_eq!(sink.0[2].0, 2);
            assert_eq!(sink.0[0].1, PixelGrid::U8(array![[1, 2], [3, 4]]));

            let events = bench.metrics().pending();
            assert_eq!(events.len(), 3);
            assert!(events.iter().all(|e| e.measure == Measure::ImgProcess));
        }
    }

    #[test]
    fn empty_store_renders_nothing() {
        let mut bench = bench(MemoryStore::default());
        let mut sink = Collect::default();

        let rendered = bench
            .sample_images(10, SampleStrategy::ByOffset, &mut sink)
            .unwrap();
        assert_eq!(rendered, 0);
        assert!(sink.0.is_empty());
    }

    #[test]
    fn documents_without_pixels_are_an_error() {
        let mut store = MemoryStore::default();
        store.records.push(doc! { "meta": { "fn": "x", "study": 1_i64 } });
        let mut bench = bench(store);

        let result = bench.sample_images(1, SampleStrategy::ByStudy, &mut Collect::default());
        assert!(matches!(result, Err(RenderError::NoPixels)));
    }
}
