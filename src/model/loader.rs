use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use dicom::core::Tag;
use dicom::dictionary_std::tags;
use dicom::object::{DefaultDicomObject, OpenFileOptions};
use dicom::pixeldata::PixelDecoder;

use super::{
    convert, convert_file_meta, Measure, MeasurementEvent, PixelCapture, PixelDtype, Record,
    RecordMeta,
};
use crate::error::DecodeError;

/// Read one DICOM file into a [`Record`], timing the whole step as a
/// `dcm_process` event.
///
/// With `capture_pixels` off the file is only parsed up to Pixel Data.
pub fn ingest(
    path: &Path,
    version: u32,
    study: u32,
    capture_pixels: bool,
) -> Result<(Record, MeasurementEvent), DecodeError> {
    log::debug!("Reading DICOM file: {}", path.display());
    let started = Instant::now();

    let mut options = OpenFileOptions::new();
    if !capture_pixels {
        options = options.read_until(tags::PIXEL_DATA);
    }
    let object = options.open_file(path).map_err(|err| DecodeError::Open {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    let study_instance_uid =
        required_text(&object, path, tags::STUDY_INSTANCE_UID, "StudyInstanceUID")?;
    let series_instance_uid =
        required_text(&object, path, tags::SERIES_INSTANCE_UID, "SeriesInstanceUID")?;

    let dataset = convert(&object);
    let file_meta = convert_file_meta(object.meta());

    let pixels = if capture_pixels {
        Some(capture(&object, path)?)
    } else {
        None
    };

    let record = Record {
        dataset,
        file_meta,
        meta: RecordMeta {
            file_name: path.display().to_string(),
            version,
            date: Utc::now(),
            study,
            study_instance_uid,
            series_instance_uid,
            pixels,
        },
    };

    Ok((record, MeasurementEvent::since(Measure::DcmProcess, 1, started)))
}

fn capture(object: &DefaultDicomObject, path: &Path) -> Result<PixelCapture, DecodeError> {
    let decoded = object
        .decode_pixel_data()
        .map_err(|err| DecodeError::Pixels {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    let bits = decoded.bits_allocated();
    let dtype = PixelDtype::from_layout(bits, decoded.pixel_representation()).ok_or_else(|| {
        DecodeError::UnsupportedPixels {
            path: path.to_path_buf(),
            bits,
        }
    })?;

    Ok(PixelCapture {
        dtype: dtype.name().to_owned(),
        rows: decoded.rows(),
        columns: decoded.columns(),
        frames: decoded.number_of_frames(),
        samples: decoded.samples_per_pixel(),
        pixels: decoded.data().to_vec(),
    })
}

fn required_text(
    object: &DefaultDicomObject,
    path: &Path,
    tag: Tag,
    attribute: &'static str,
) -> Result<String, DecodeError> {
    attribute_text(object, tag).ok_or_else(|| DecodeError::MissingAttribute {
        path: path.to_path_buf(),
        attribute,
    })
}

fn attribute_text(object: &DefaultDicomObject, tag: Tag) -> Option<String> {
    object
        .element(tag)
        .ok()
        .and_then(|element| element.to_str().ok())
        .map(|value| value.trim_end_matches('\0').trim().to_string())
        .filter(|value| !value.is_empty())
}
