//! Load DICOM files into MongoDB as nested documents and measure load, read
//! and image-rendering latency.

pub mod app;
pub mod cli;
pub mod download;
pub mod error;
pub mod harness;
pub mod image_pipeline;
pub mod metrics;
pub mod model;
pub mod store;
pub mod utils;

#[cfg(test)]
mod fixtures;
