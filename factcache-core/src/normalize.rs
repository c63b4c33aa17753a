//! Payload normalization
//!
//! Verification results arrive as a [`Payload`]: a tree that may carry numeric
//! wrapper scalars ([`NumScalar`]) and n-dimensional arrays ([`NumArray`]) next
//! to plain values. [`normalize`] reduces the tree to canonical JSON built only
//! from plain numbers, strings, bools, null, sequences and mappings.
//!
//! Wrapper types are adapted to a canonical variant first, then the generic
//! walk recurses over sequences and mappings.

use ndarray::{ArrayD, ArrayViewD};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use crate::error::NormalizationError;

/// Maximum nesting of sequences/mappings accepted by [`normalize`].
pub const MAX_DEPTH: usize = 128;

/// A verification result as produced by a verifier, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Scalar(NumScalar),
    Array(NumArray),
    Seq(Vec<Payload>),
    Map(BTreeMap<String, Payload>),
}

/// Fixed-width numeric scalar wrappers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumScalar {
    F32(f32),
    F64(f64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
}

/// Dense n-dimensional arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum NumArray {
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    Bool(ArrayD<bool>),
}

impl Payload {
    /// Look up a key when this payload is a mapping.
    pub fn get(&self, key: &str) -> Option<&Payload> {
        match self {
            Payload::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view of plain and wrapper scalars.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Payload::Int(i) => Some(*i as f64),
            Payload::Float(f) => Some(*f),
            Payload::Scalar(s) => Some(s.as_f64()),
            _ => None,
        }
    }
}

impl NumScalar {
    pub fn as_f64(&self) -> f64 {
        match *self {
            NumScalar::F32(x) => f64::from(x),
            NumScalar::F64(x) => x,
            NumScalar::I8(x) => f64::from(x),
            NumScalar::I16(x) => f64::from(x),
            NumScalar::I32(x) => f64::from(x),
            NumScalar::I64(x) => x as f64,
            NumScalar::U8(x) => f64::from(x),
            NumScalar::U16(x) => f64::from(x),
            NumScalar::U32(x) => f64::from(x),
            NumScalar::U64(x) => x as f64,
        }
    }

    fn adapt(&self, path: &str) -> Result<Value, NormalizationError> {
        match *self {
            NumScalar::F32(x) => float(f64::from(x), path),
            NumScalar::F64(x) => float(x, path),
            NumScalar::I8(x) => Ok(Value::from(x)),
            NumScalar::I16(x) => Ok(Value::from(x)),
            NumScalar::I32(x) => Ok(Value::from(x)),
            NumScalar::I64(x) => Ok(Value::from(x)),
            NumScalar::U8(x) => Ok(Value::from(x)),
            NumScalar::U16(x) => Ok(Value::from(x)),
            NumScalar::U32(x) => Ok(Value::from(x)),
            NumScalar::U64(x) => Ok(Value::from(x)),
        }
    }
}

impl NumArray {
    /// Nested lists following the array's shape; a 0-d array becomes its element.
    fn adapt(&self, path: &str) -> Result<Value, NormalizationError> {
        match self {
            NumArray::F32(a) => nested(a.view(), &|x: &f32| float(f64::from(*x), path)),
            NumArray::F64(a) => nested(a.view(), &|x: &f64| float(*x, path)),
            NumArray::I32(a) => nested(a.view(), &|x: &i32| Ok(Value::from(*x))),
            NumArray::I64(a) => nested(a.view(), &|x: &i64| Ok(Value::from(*x))),
            NumArray::Bool(a) => nested(a.view(), &|x: &bool| Ok(Value::Bool(*x))),
        }
    }
}

fn nested<A, F>(view: ArrayViewD<'_, A>, leaf: &F) -> Result<Value, NormalizationError>
where
    F: Fn(&A) -> Result<Value, NormalizationError>,
{
    if view.ndim() == 0 {
        return match view.iter().next() {
            Some(x) => leaf(x),
            None => Ok(Value::Null),
        };
    }
    view.outer_iter()
        .map(|sub| nested(sub, leaf))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn float(x: f64, path: &str) -> Result<Value, NormalizationError> {
    Number::from_f64(x)
        .map(Value::Number)
        .ok_or_else(|| NormalizationError::NonFiniteFloat {
            path: path.to_string(),
        })
}

/// Reduce a payload to canonical JSON.
///
/// Mapping keys are kept as-is. Fails on non-finite floats and on nesting
/// deeper than [`MAX_DEPTH`]; nothing is written anywhere in either case.
pub fn normalize(value: &Payload) -> Result<Value, NormalizationError> {
    walk(value, "$", 0)
}

fn walk(value: &Payload, path: &str, depth: usize) -> Result<Value, NormalizationError> {
    if depth > MAX_DEPTH {
        return Err(NormalizationError::TooDeep {
            path: path.to_string(),
            limit: MAX_DEPTH,
        });
    }

    match value {
        Payload::Null => Ok(Value::Null),
        Payload::Bool(b) => Ok(Value::Bool(*b)),
        Payload::Int(i) => Ok(Value::from(*i)),
        Payload::Float(f) => float(*f, path),
        Payload::Str(s) => Ok(Value::String(s.clone())),
        Payload::Scalar(s) => s.adapt(path),
        Payload::Array(a) => a.adapt(path),
        Payload::Seq(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| walk(item, &format!("{}[{}]", path, i), depth + 1))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Payload::Map(map) => {
            let mut out = Map::new();
            for (key, item) in map {
                let child = walk(item, &format!("{}.{}", path, key), depth + 1)?;
                out.insert(key.clone(), child);
            }
            Ok(Value::Object(out))
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Payload::Null,
            Value::Bool(b) => Payload::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Payload::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Payload::Scalar(NumScalar::U64(u))
                } else {
                    Payload::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Payload::Str(s),
            Value::Array(items) => Payload::Seq(items.into_iter().map(Payload::from).collect()),
            Value::Object(map) => Payload::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Payload::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Payload {
    fn from(b: bool) -> Self {
        Payload::Bool(b)
    }
}

impl From<i64> for Payload {
    fn from(i: i64) -> Self {
        Payload::Int(i)
    }
}

impl From<f64> for Payload {
    fn from(f: f64) -> Self {
        Payload::Float(f)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Str(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Str(s)
    }
}

impl From<NumScalar> for Payload {
    fn from(s: NumScalar) -> Self {
        Payload::Scalar(s)
    }
}

impl From<NumArray> for Payload {
    fn from(a: NumArray) -> Self {
        Payload::Array(a)
    }
}

impl From<Vec<Payload>> for Payload {
    fn from(items: Vec<Payload>) -> Self {
        Payload::Seq(items)
    }
}

impl<K: Into<String>> FromIterator<(K, Payload)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, Payload)>>(iter: I) -> Self {
        Payload::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
