//! `Sadder` — an order-preserving key-event mapping.
//!
//! A key event dict keeps insertion order: `"vs"` must stay the first
//! field so the version string stays within reach of a stream sniffer.
//! `serde_json`/`rmp-serde`/`serde_cbor` all serialize via `serde`'s map
//! model, which does not by itself guarantee order, so field order is
//! carried explicitly through an [`indexmap::IndexMap`] and a hand-rolled
//! `Serialize`/`Deserialize` pair for the dynamic value type.

use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::fmt;

/// A dynamically typed field value inside a [`Sadder`].
#[derive(Clone, Debug, PartialEq)]
pub enum SadValue {
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<SadValue>),
    Object(Sadder),
}

/// An order-preserving key event mapping.
pub type Sadder = IndexMap<String, SadValue>;

impl SadValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SadValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[SadValue]> {
        match self {
            SadValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Sadder> {
        match self {
            SadValue::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl From<&str> for SadValue {
    fn from(s: &str) -> Self {
        SadValue::String(s.to_string())
    }
}

impl From<String> for SadValue {
    fn from(s: String) -> Self {
        SadValue::String(s)
    }
}

impl From<i64> for SadValue {
    fn from(n: i64) -> Self {
        SadValue::Number(Number::from(n))
    }
}

impl From<bool> for SadValue {
    fn from(b: bool) -> Self {
        SadValue::Bool(b)
    }
}

impl<T: Into<SadValue>> From<Vec<T>> for SadValue {
    fn from(v: Vec<T>) -> Self {
        SadValue::Array(v.into_iter().map(Into::into).collect())
    }
}

impl Serialize for SadValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SadValue::Bool(b) => serializer.serialize_bool(*b),
            SadValue::Number(n) => n.serialize(serializer),
            SadValue::String(s) => serializer.serialize_str(s),
            SadValue::Array(a) => {
                let mut seq = serializer.serialize_seq(Some(a.len()))?;
                for v in a {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            SadValue::Object(o) => {
                let mut map = serializer.serialize_map(Some(o.len()))?;
                for (k, v) in o {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

struct SadVisitor;

impl<'de> Visitor<'de> for SadVisitor {
    type Value = SadValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a key event field value")
    }

    fn visit_bool<E>(self, v: bool) -> std::result::Result<Self::Value, E> {
        Ok(SadValue::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E> {
        Ok(SadValue::Number(Number::from(v)))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E> {
        Ok(SadValue::Number(Number::from(v)))
    }

    fn visit_f64<E>(self, v: f64) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Number::from_f64(v)
            .map(SadValue::Number)
            .ok_or_else(|| de::Error::custom("non-finite float"))
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E> {
        Ok(SadValue::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> std::result::Result<Self::Value, E> {
        Ok(SadValue::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(elem) = seq.next_element()? {
            out.push(elem);
        }
        Ok(SadValue::Array(out))
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut obj = Sadder::new();
        while let Some((key, value)) = map.next_entry()? {
            obj.insert(key, value);
        }
        Ok(SadValue::Object(obj))
    }
}

impl<'de> Deserialize<'de> for SadValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SadVisitor)
    }
}
