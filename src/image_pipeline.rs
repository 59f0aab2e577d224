use std::fs;
use std::path::{Path, PathBuf};

use bson::{Bson, Document};
use image::GrayImage;
use ndarray::Array2;

use crate::error::{RenderError, StoreError};
use crate::model::PixelDtype;
use crate::store::study_of;

/// Pixel buffer and layout read back from a stored record's `meta`.
#[derive(Debug, Clone)]
pub struct StoredPixels {
    pub file_name: String,
    pub study: Option<u32>,
    pub dtype: PixelDtype,
    pub rows: usize,
    pub columns: usize,
    pub frames: usize,
    pub samples: usize,
    pub bytes: Vec<u8>,
}

impl StoredPixels {
    pub fn from_document(document: &Document) -> Result<Self, RenderError> {
        let meta = document.get_document("meta").map_err(StoreError::from)?;
        let bytes = match meta.get("pixels") {
            Some(Bson::Binary(binary)) => binary.bytes.clone(),
            _ => return Err(RenderError::NoPixels),
        };
        let dtype_name = meta.get_str("dtype").map_err(StoreError::from)?;
        let dtype = PixelDtype::from_name(dtype_name)
            .ok_or_else(|| RenderError::Dtype(dtype_name.to_owned()))?;

        Ok(Self {
            file_name: meta.get_str("fn").unwrap_or_default().to_owned(),
            study: meta.get("study").and_then(study_of),
            dtype,
            rows: dimension(meta, "r")?,
            columns: dimension(meta, "c")?,
            frames: optional_dimension(meta, "frames").unwrap_or(1),
            samples: optional_dimension(meta, "samples").unwrap_or(1),
            bytes,
        })
    }

    /// Reinterpret the first frame as a row-major `rows x columns` grid of
    /// little-endian samples.
    pub fn to_grid(&self) -> Result<PixelGrid, RenderError> {
        let frame_len = self.rows * self.columns * self.dtype.size();
        if self.samples != 1 || frame_len == 0 || self.bytes.len() != frame_len * self.frames {
            return Err(self.shape_error());
        }
        let frame = &self.bytes[..frame_len];

        let grid = match self.dtype {
            PixelDtype::U8 => PixelGrid::U8(self.shaped(frame, u8::from_le_bytes)?),
            PixelDtype::I8 => PixelGrid::I8(self.shaped(frame, i8::from_le_bytes)?),
            PixelDtype::U16 => PixelGrid::U16(self.shaped(frame, u16::from_le_bytes)?),
            PixelDtype::I16 => PixelGrid::I16(self.shaped(frame, i16::from_le_bytes)?),
            PixelDtype::U32 => PixelGrid::U32(self.shaped(frame, u32::from_le_bytes)?),
            PixelDtype::I32 => PixelGrid::I32(self.shaped(frame, i32::from_le_bytes)?),
        };
        Ok(grid)
    }

    fn shaped<T, const N: usize>(
        &self,
        frame: &[u8],
        from_le: fn([u8; N]) -> T,
    ) -> Result<Array2<T>, RenderError> {
        let values = frame
            .chunks_exact(N)
            .map(|chunk| {
                let mut raw = [0u8; N];
                raw.copy_from_slice(chunk);
                from_le(raw)
            })
            .collect();
        Array2::from_shape_vec((self.rows, self.columns), values).map_err(|_| self.shape_error())
    }

    fn shape_error(&self) -> RenderError {
        RenderError::Shape {
            len: self.bytes.len(),
            rows: self.rows,
            columns: self.columns,
            dtype: self.dtype.name(),
        }
    }
}

fn dimension(meta: &Document, key: &str) -> Result<usize, RenderError> {
    optional_dimension(meta, key)
        .ok_or_else(|| StoreError::Shape(format!("meta.{key} is missing or not a size")).into())
}

fn optional_dimension(meta: &Document, key: &str) -> Option<usize> {
    match meta.get(key)? {
        Bson::Int32(v) => usize::try_from(*v).ok(),
        Bson::Int64(v) => usize::try_from(*v).ok(),
        _ => None,
    }
}

/// A reconstructed 2-D sample grid, keeping the recorded element type.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelGrid {
    U8(Array2<u8>),
    I8(Array2<i8>),
    U16(Array2<u16>),
    I16(Array2<i16>),
    U32(Array2<u32>),
    I32(Array2<i32>),
}

impl PixelGrid {
    /// (rows, columns)
    pub fn dim(&self) -> (usize, usize) {
        match self {
            PixelGrid::U8(a) => a.dim(),
            PixelGrid::I8(a) => a.dim(),
            PixelGrid::U16(a) => a.dim(),
            PixelGrid::I16(a) => a.dim(),
            PixelGrid::U32(a) => a.dim(),
            PixelGrid::I32(a) => a.dim(),
        }
    }

    fn samples(&self) -> Vec<f64> {
        match self {
            PixelGrid::U8(a) => a.iter().map(|&v| f64::from(v)).collect(),
            PixelGrid::I8(a) => a.iter().map(|&v| f64::from(v)).collect(),
            PixelGrid::U16(a) => a.iter().map(|&v| f64::from(v)).collect(),
            PixelGrid::I16(a) => a.iter().map(|&v| f64::from(v)).collect(),
            PixelGrid::U32(a) => a.iter().map(|&v| f64::from(v)).collect(),
            PixelGrid::I32(a) => a.iter().map(|&v| f64::from(v)).collect(),
        }
    }

    /// Window the grid onto 0..=255 using its own min and max.
    pub fn to_gray8(&self) -> Vec<u8> {
        let samples = self.samples();
        let (min, max) = min_max(&samples).unwrap_or((0.0, 0.0));
        samples
            .iter()
            .map(|&value| normalize(value, min, max))
            .collect()
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().copied().fold(None, |acc, value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

fn normalize(value: f64, min: f64, max: f64) -> u8 {
    if max <= min {
        return 0;
    }

    let normalized = (value - min) / (max - min);
    (normalized * 255.0).clamp(0.0, 255.0).round() as u8
}

/// Receives each sampled image.
pub trait ImageSink {
    fn render(&mut self, index: u32, pixels: &StoredPixels, grid: &PixelGrid)
        -> Result<(), RenderError>;
}

/// Writes grayscale PNGs into a directory.
pub struct PngSink {
    dir: PathBuf,
}

impl PngSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, RenderError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ImageSink for PngSink {
    fn render(
        &mut self,
        index: u32,
        pixels: &StoredPixels,
        grid: &PixelGrid,
    ) -> Result<(), RenderError> {
        let (rows, columns) = grid.dim();
        let image = GrayImage::from_raw(columns as u32, rows as u32, grid.to_gray8())
            .ok_or_else(|| pixels.shape_error())?;

        let name = match pixels.study {
            Some(study) => format!("{index:03}_study{study}.png"),
            None => format!("{index:03}.png"),
        };
        let path = self.dir.join(name);
        image
            .save(&path)
            .map_err(|source| RenderError::Write {
                path: path.clone(),
                source,
            })?;
        log::info!("Rendered {} to {}", pixels.file_name, path.display());
        Ok(())
    }
}
