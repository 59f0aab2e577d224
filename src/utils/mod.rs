mod formatting;

pub use formatting::{is_binary_vr, tag_key, trim_padding};
