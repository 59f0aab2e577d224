use std::path::PathBuf;

use thiserror::Error;

/// A source file could not be turned into a record.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{path}: failed to open DICOM file ({message})")]
    Open { path: PathBuf, message: String },

    #[error("{path}: missing mandatory attribute {attribute}")]
    MissingAttribute {
        path: PathBuf,
        attribute: &'static str,
    },

    #[error("{path}: failed to decode pixel data ({message})")]
    Pixels { path: PathBuf, message: String },

    #[error("{path}: unsupported pixel layout ({bits} bits allocated)")]
    UnsupportedPixels { path: PathBuf, bits: u16 },

    #[error("{path}: record could not be encoded ({source})")]
    Encode {
        path: PathBuf,
        #[source]
        source: bson::ser::Error,
    },
}

/// A single call against the document store failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection string does not name a database: {0}")]
    NoDatabase(String),

    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("unexpected document shape: {0}")]
    Shape(String),

    #[error("write rejected: {0}")]
    Rejected(String),
}

impl From<bson::document::ValueAccessError> for StoreError {
    fn from(err: bson::document::ValueAccessError) -> Self {
        StoreError::Shape(err.to_string())
    }
}

/// Metrics could not be written; the buffered events are still held.
#[derive(Debug, Error)]
#[error("failed to insert metrics ({retained} events retained): {source}")]
pub struct MetricsFlushError {
    pub retained: usize,
    #[source]
    pub source: StoreError,
}

/// Failure of one load iteration.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("iteration {iteration}: bulk write failed, {discarded} documents discarded: {source}")]
    Write {
        iteration: u32,
        discarded: usize,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("document has no captured pixels")]
    NoPixels,

    #[error("unsupported pixel dtype `{0}`")]
    Dtype(String),

    #[error("pixel buffer of {len} bytes does not fit {rows}x{columns} of {dtype}")]
    Shape {
        len: usize,
        rows: usize,
        columns: usize,
        dtype: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to write image {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to prepare image directory: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to fetch {name}: {source}")]
    Fetch {
        name: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to extract {path}: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
