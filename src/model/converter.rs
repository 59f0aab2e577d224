use dicom::core::header::Header;
use dicom::core::value::{PrimitiveValue, Value};
use dicom::core::{DataElement, VR};
use dicom::dictionary_std::tags;
use dicom::object::mem::InMemElement;
use dicom::object::{FileMetaTable, InMemDicomObject};

use super::{Document, Node, Scalar};
use crate::utils::{is_binary_vr, tag_key, trim_padding};

/// Convert a dataset into a [`Document`].
///
/// Every element except Pixel Data (7FE0,0010) becomes a node keyed by its
/// hex tag. Sequences are converted item by item; items are fully built
/// before the parent node is inserted. Traversal keeps its own stack, so the
/// nesting depth of the source is not bounded by the native call stack.
pub fn convert(dataset: &InMemDicomObject) -> Document {
    let mut stack = vec![Frame::dataset(dataset)];

    loop {
        let step = match stack.last_mut() {
            Some(Frame::Dataset { elements, document }) => match elements.next() {
                Some(element) if element.tag() == tags::PIXEL_DATA => continue,
                Some(element) => match element.value() {
                    Value::Sequence(sequence) => Step::Enter(Frame::Sequence {
                        key: tag_key(element.tag()),
                        vr: element.vr().to_string(),
                        items: sequence.items().iter(),
                        done: Vec::with_capacity(sequence.items().len()),
                    }),
                    value => {
                        document.insert(tag_key(element.tag()), leaf_node(element.vr(), value));
                        continue;
                    }
                },
                None => Step::Leave,
            },
            Some(Frame::Sequence { items, .. }) => match items.next() {
                Some(item) => Step::Enter(Frame::dataset(item)),
                None => Step::Leave,
            },
            None => return Document::new(),
        };

        match step {
            Step::Enter(frame) => stack.push(frame),
            Step::Leave => match (stack.pop(), stack.last_mut()) {
                (Some(Frame::Dataset { document, .. }), None) => return document,
                (Some(Frame::Dataset { document, .. }), Some(Frame::Sequence { done, .. })) => {
                    done.push(document)
                }
                (
                    Some(Frame::Sequence { key, vr, done, .. }),
                    Some(Frame::Dataset { document, .. }),
                ) => document.insert(key, Node::items(vr, done)),
                _ => unreachable!("sequence frames only ever sit on top of dataset frames"),
            },
        }
    }
}

/// Convert the file meta group (0002,xxxx) with the same rules as the dataset.
pub fn convert_file_meta(meta: &FileMetaTable) -> Document {
    let elements = meta.clone().into_element_iter().map(|element| {
        let (header, value) = element.into_parts();
        let primitive = value.into_primitive().unwrap_or(PrimitiveValue::Empty);
        DataElement::new(header.tag, header.vr, primitive)
    });
    convert(&InMemDicomObject::from_element_iter(elements))
}

enum Frame<'a> {
    Dataset {
        elements: std::vec::IntoIter<&'a InMemElement>,
        document: Document,
    },
    Sequence {
        key: String,
        vr: &'static str,
        items: std::slice::Iter<'a, InMemDicomObject>,
        done: Vec<Document>,
    },
}

impl<'a> Frame<'a> {
    fn dataset(dataset: &'a InMemDicomObject) -> Self {
        Frame::Dataset {
            elements: dataset.iter().collect::<Vec<_>>().into_iter(),
            document: Document::new(),
        }
    }
}

enum Step<'a> {
    Enter(Frame<'a>),
    Leave,
}

fn leaf_node<I, P: AsRef<[u8]>>(vr: VR, value: &Value<I, P>) -> Node {
    let mut values = match value {
        Value::Primitive(primitive) => primitive_values(vr, primitive),
        Value::PixelSequence(sequence) => sequence
            .fragments()
            .iter()
            .map(|fragment| Scalar::bytes(fragment.as_ref()))
            .collect(),
        Value::Sequence(_) => Vec::new(),
    };

    if values.is_empty() {
        values.push(Scalar::Null);
    }
    Node::leaf(vr.to_string(), values)
}

fn primitive_values(vr: VR, value: &PrimitiveValue) -> Vec<Scalar> {
    if matches!(value, PrimitiveValue::Empty) {
        return Vec::new();
    }
    if is_binary_vr(vr) {
        return vec![Scalar::bytes(value.to_bytes().into_owned())];
    }

    match value {
        PrimitiveValue::Empty => Vec::new(),
        PrimitiveValue::Str(_)
        | PrimitiveValue::Strs(_)
        | PrimitiveValue::Date(_)
        | PrimitiveValue::Time(_)
        | PrimitiveValue::DateTime(_) => value
            .to_multi_str()
            .iter()
            .map(|text| text_scalar(vr, text))
            .collect(),
        PrimitiveValue::Tags(values) => values
            .iter()
            .map(|tag| Scalar::Str(tag_key(*tag)))
            .collect(),
        PrimitiveValue::U8(values) => ints(values.iter().map(|&v| i64::from(v))),
        PrimitiveValue::I16(values) => ints(values.iter().map(|&v| i64::from(v))),
        PrimitiveValue::U16(values) => ints(values.iter().map(|&v| i64::from(v))),
        PrimitiveValue::I32(values) => ints(values.iter().map(|&v| i64::from(v))),
        PrimitiveValue::U32(values) => ints(values.iter().map(|&v| i64::from(v))),
        PrimitiveValue::I64(values) => ints(values.iter().copied()),
        PrimitiveValue::U64(values) => values
            .iter()
            .map(|&v| i64::try_from(v).map_or(Scalar::Float(v as f64), Scalar::Int))
            .collect(),
        PrimitiveValue::F32(values) => values
            .iter()
            .map(|&v| Scalar::Float(f64::from(v)))
            .collect(),
        PrimitiveValue::F64(values) => values.iter().map(|&v| Scalar::Float(v)).collect(),
    }
}

fn ints(values: impl Iterator<Item = i64>) -> Vec<Scalar> {
    values.map(Scalar::Int).collect()
}

/// Person names keep their raw `Family^Given` form; IS and DS become numbers
/// when they parse.
fn text_scalar(vr: VR, raw: &str) -> Scalar {
    let text = trim_padding(raw);
    match vr {
        VR::IS => text
            .trim()
            .parse::<i64>()
            .map_or_else(|_| Scalar::from(text), Scalar::Int),
        VR::DS => text
            .trim()
            .parse::<f64>()
            .map_or_else(|_| Scalar::from(text), Scalar::Float),
        _ => Scalar::from(text),
    }
}
