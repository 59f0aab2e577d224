use std::collections::BTreeMap;

use serde::Serialize;
use serde_bytes::ByteBuf;

/// Converted dataset, keyed by lowercase hex tag (`"00080020"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document(BTreeMap<String, Node>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, node: Node) {
        self.0.insert(key, node);
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One element of a [`Document`]. Serializes as `{ "vr": .., "Value": [..] }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub vr: String,
    #[serde(rename = "Value")]
    pub value: NodeValue,
}

impl Node {
    pub fn leaf(vr: impl Into<String>, values: Vec<Scalar>) -> Self {
        Self {
            vr: vr.into(),
            value: NodeValue::Leaf(values),
        }
    }

    pub fn items(vr: impl Into<String>, items: Vec<Document>) -> Self {
        Self {
            vr: vr.into(),
            value: NodeValue::Items(items),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeValue {
    /// Nested sequence items, in source order.
    Items(Vec<Document>),
    /// Never empty.
    Leaf(Vec<Scalar>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(ByteBuf),
}

impl Scalar {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Scalar::Bytes(ByteBuf::from(bytes.into()))
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_owned())
    }
}
