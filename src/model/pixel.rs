use dicom::pixeldata::PixelRepresentation;

/// Element type of a captured pixel buffer, named the way numpy names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelDtype {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
}

impl PixelDtype {
    pub fn from_layout(bits_allocated: u16, representation: PixelRepresentation) -> Option<Self> {
        let signed = matches!(representation, PixelRepresentation::Signed);
        match (bits_allocated, signed) {
            (1..=8, false) => Some(Self::U8),
            (1..=8, true) => Some(Self::I8),
            (9..=16, false) => Some(Self::U16),
            (9..=16, true) => Some(Self::I16),
            (17..=32, false) => Some(Self::U32),
            (17..=32, true) => Some(Self::I32),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "uint8" => Some(Self::U8),
            "int8" => Some(Self::I8),
            "uint16" => Some(Self::U16),
            "int16" => Some(Self::I16),
            "uint32" => Some(Self::U32),
            "int32" => Some(Self::I32),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "uint8",
            Self::I8 => "int8",
            Self::U16 => "uint16",
            Self::I16 => "int16",
            Self::U32 => "uint32",
            Self::I32 => "int32",
        }
    }

    /// Bytes per sample.
    pub fn size(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 => 4,
        }
    }
}
