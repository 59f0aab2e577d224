use dicom::core::{Tag, VR};

/// Record key for a tag: group and element as eight lowercase hex digits.
pub fn tag_key(tag: Tag) -> String {
    format!("{:04x}{:04x}", tag.group(), tag.element())
}

pub fn is_binary_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::OB | VR::OD | VR::OF | VR::OL | VR::OV | VR::OW | VR::UN
    )
}

/// Strip the space/NUL padding DICOM uses to reach even value lengths.
pub fn trim_padding(value: &str) -> &str {
    value.trim_end_matches([' ', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_key_is_zero_padded_lowercase() {
        assert_eq!(tag_key(Tag(0x0008, 0x0020)), "00080020");
        assert_eq!(tag_key(Tag(0x7FE0, 0x0010)), "7fe00010");
    }

    #[test]
    fn trims_trailing_padding_only() {
        assert_eq!(trim_padding(" 1.2.3\0"), " 1.2.3");
        assert_eq!(trim_padding("CT "), "CT");
    }
}
