//! DICOM files written on the fly for the unit tests.

use std::path::{Path, PathBuf};

use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::dictionary_std::{tags, uids};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};

pub struct Instance {
    pub study_uid: String,
    pub series_uid: String,
    pub sop_uid: String,
    pub rows: u16,
    pub columns: u16,
    pub pixels: Vec<u8>,
}

impl Default for Instance {
    fn default() -> Self {
        Self {
            study_uid: "1.2.826.0.1.3680043.2.1125.1".to_owned(),
            series_uid: "1.2.826.0.1.3680043.2.1125.1.2".to_owned(),
            sop_uid: "1.2.826.0.1.3680043.2.1125.1.2.3".to_owned(),
            rows: 2,
            columns: 3,
            pixels: vec![0, 10, 20, 30, 40, 50],
        }
    }
}

/// Write an 8-bit monochrome secondary capture instance to `dir/name`.
pub fn write_instance(dir: &Path, name: &str, instance: &Instance) -> PathBuf {
    let mut elements = vec![
        DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(uids::SECONDARY_CAPTURE_IMAGE_STORAGE),
        ),
        DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(instance.sop_uid.as_str()),
        ),
        DataElement::new(tags::PATIENT_NAME, VR::PN, PrimitiveValue::from("Doe^Jane")),
        DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("OT")),
        DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)),
        DataElement::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from("MONOCHROME2"),
        ),
        DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(instance.rows)),
        DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(instance.columns)),
        DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(8_u16)),
        DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(8_u16)),
        DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(7_u16)),
        DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0_u16)),
        DataElement::new(
            tags::PIXEL_DATA,
            VR::OB,
            PrimitiveValue::U8(instance.pixels.clone().into()),
        ),
    ];
    if !instance.study_uid.is_empty() {
        elements.push(DataElement::new(
            tags::STUDY_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(instance.study_uid.as_str()),
        ));
    }
    if !instance.series_uid.is_empty() {
        elements.push(DataElement::new(
            tags::SERIES_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(instance.series_uid.as_str()),
        ));
    }

    let file = InMemDicomObject::from_element_iter(elements)
        .with_meta(
            FileMetaTableBuilder::new()
                .media_storage_sop_class_uid(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(instance.sop_uid.as_str())
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN),
        )
        .unwrap();

    let path = dir.join(name);
    file.write_to_file(&path).unwrap();
    path
}
