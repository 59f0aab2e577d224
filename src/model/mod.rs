pub mod converter;
pub mod document;
pub mod loader;
pub mod measurement;
pub mod pixel;
pub mod record;

pub use converter::{convert, convert_file_meta};
pub use document::{Document, Node, NodeValue, Scalar};
pub use measurement::{Measure, MeasurementEvent};
pub use pixel::PixelDtype;
pub use record::{PixelCapture, Record, RecordMeta};
