//! Conversion of raw record fields into values the driver can bind.
//!
//! Two passes run per field. Binary payloads are first turned into text at any
//! nesting depth. Then, for text-like columns only, a remaining map or array is
//! serialized to JSON text. Columns of any other category receive the
//! normalized value as is.

use crate::{
    error::{CoercionCause, CoercionError},
    schema::catalog::ColumnSchema,
};
use model::{
    core::{data_type::TypeCategory, value::Value},
    records::record::Record,
};
use sink_config::settings::CoercionPolicy;

/// Replaces every `Bytes` value, at any depth, with its text form. Invalid
/// UTF-8 sequences are replaced with U+FFFD. The input is not modified.
pub fn normalize_binary(value: &Value) -> Value {
    match fold(value, &mut NormalizeBinary) {
        Ok(normalized) => normalized,
        Err(never) => match never {},
    }
}

/// Encodes a value as compact JSON text. Object keys come out sorted.
pub fn to_json(value: &Value) -> Result<String, CoercionCause> {
    let json = fold(value, &mut JsonEncode)?;
    serde_json::to_string(&json).map_err(|e| CoercionCause::Json(e.to_string()))
}

/// Bottom-up rebuild of a value tree. Containers are assembled from the
/// already folded children.
trait Fold {
    type Output;
    type Error;

    /// Called for every value that is neither an array nor a map.
    fn scalar(&mut self, value: &Value) -> Result<Self::Output, Self::Error>;
    fn array(&mut self, items: Vec<Self::Output>) -> Result<Self::Output, Self::Error>;
    fn map(&mut self, entries: Vec<(Self::Output, Self::Output)>) -> Result<Self::Output, Self::Error>;
}

/// An open container whose children are still being folded.
enum Frame<'a, T> {
    Array {
        items: std::slice::Iter<'a, Value>,
        out: Vec<T>,
    },
    Map {
        entries: std::slice::Iter<'a, (Value, Value)>,
        out: Vec<(T, T)>,
        key: Option<T>,
        value: Option<&'a Value>,
    },
}

impl<'a, T> Frame<'a, T> {
    fn open(value: &'a Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Frame::Array {
                items: items.iter(),
                out: Vec::with_capacity(items.len()),
            }),
            Value::Map(entries) => Some(Frame::Map {
                entries: entries.iter(),
                out: Vec::with_capacity(entries.len()),
                key: None,
                value: None,
            }),
            _ => None,
        }
    }

    /// Map entries yield the key, then the value.
    fn next_child(&mut self) -> Option<&'a Value> {
        match self {
            Frame::Array { items, .. } => items.next(),
            Frame::Map { entries, value, .. } => match value.take() {
                Some(pending) => Some(pending),
                None => entries.next().map(|(k, v)| {
                    *value = Some(v);
                    k
                }),
            },
        }
    }

    fn accept(&mut self, child: T) {
        match self {
            Frame::Array { out, .. } => out.push(child),
            Frame::Map { out, key, value, .. } => {
                if value.is_some() {
                    *key = Some(child);
                } else if let Some(k) = key.take() {
                    out.push((k, child));
                }
            }
        }
    }

    fn close<F: Fold<Output = T>>(self, folder: &mut F) -> Result<T, F::Error> {
        match self {
            Frame::Array { out, .. } => folder.array(out),
            Frame::Map { out, .. } => folder.map(out),
        }
    }
}

/// Walks the tree with an explicit stack, so nesting depth is bounded by
/// memory rather than by the call stack.
fn fold<F: Fold>(root: &Value, folder: &mut F) -> Result<F::Output, F::Error> {
    let mut stack: Vec<Frame<'_, F::Output>> = Vec::new();
    let mut next = root;

    loop {
        // Descend to the first value that completes on its own.
        let mut done = loop {
            match Frame::open(next) {
                Some(mut frame) => match frame.next_child() {
                    Some(child) => {
                        stack.push(frame);
                        next = child;
                    }
                    None => break frame.close(folder)?,
                },
                None => break folder.scalar(next)?,
            }
        };

        // Climb until some open container still has children left.
        loop {
            let Some(mut frame) = stack.pop() else {
                return Ok(done);
            };
            frame.accept(done);
            match frame.next_child() {
                Some(child) => {
                    stack.push(frame);
                    next = child;
                    break;
                }
                None => done = frame.close(folder)?,
            }
        }
    }
}

struct NormalizeBinary;

impl Fold for NormalizeBinary {
    type Output = Value;
    type Error = std::convert::Infallible;

    fn scalar(&mut self, value: &Value) -> Result<Value, Self::Error> {
        Ok(match value {
            Value::Bytes(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
            other => other.clone(),
        })
    }

    fn array(&mut self, items: Vec<Value>) -> Result<Value, Self::Error> {
        Ok(Value::Array(items))
    }

    fn map(&mut self, entries: Vec<(Value, Value)>) -> Result<Value, Self::Error> {
        Ok(Value::Map(entries))
    }
}

struct JsonEncode;

impl Fold for JsonEncode {
    type Output = serde_json::Value;
    type Error = CoercionCause;

    fn scalar(&mut self, value: &Value) -> Result<serde_json::Value, CoercionCause> {
        let json = match value {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Uint(u) => serde_json::Value::from(*u),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or(CoercionCause::NonFiniteFloat)?,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(bytes) => {
                serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
            }
            Value::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
            Value::Array(_) | Value::Map(_) => {
                return Err(CoercionCause::Json(format!("unexpected {} as scalar", value.kind())));
            }
        };

        Ok(json)
    }

    fn array(&mut self, items: Vec<serde_json::Value>) -> Result<serde_json::Value, CoercionCause> {
        Ok(serde_json::Value::Array(items))
    }

    fn map(
        &mut self,
        entries: Vec<(serde_json::Value, serde_json::Value)>,
    ) -> Result<serde_json::Value, CoercionCause> {
        let mut object = serde_json::Map::with_capacity(entries.len());
        for (k, v) in entries {
            object.insert(json_key(k)?, v);
        }
        Ok(serde_json::Value::Object(object))
    }
}

fn json_key(key: serde_json::Value) -> Result<String, CoercionCause> {
    match key {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Null => Err(CoercionCause::NonTextKey("null")),
        serde_json::Value::Array(_) => Err(CoercionCause::NonTextKey("array")),
        serde_json::Value::Object(_) => Err(CoercionCause::NonTextKey("map")),
    }
}

/// Coerces one field for a column of the given category.
///
/// A missing field or `Null` is returned as `Null` without further work.
pub fn coerce(value: Option<&Value>, category: TypeCategory) -> Result<Value, CoercionCause> {
    let value = match value {
        None | Some(Value::Null) => return Ok(Value::Null),
        Some(value) => value,
    };

    let normalized = normalize_binary(value);

    if normalized.is_composite() && category.is_text_like() {
        return Ok(Value::String(to_json(&normalized)?));
    }

    Ok(normalized)
}

/// Parameters for one row plus the fields that fell back to NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundRow {
    pub params: Vec<Value>,
    pub fallbacks: Vec<CoercionError>,
}

/// Builds per-row parameter tuples in schema column order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCoercer {
    policy: CoercionPolicy,
}

impl ValueCoercer {
    pub fn new(policy: CoercionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CoercionPolicy {
        self.policy
    }

    /// Always yields exactly `columns.len()` parameters. Fields the record does
    /// not carry bind as NULL and record fields without a column are ignored.
    pub fn bind(&self, columns: &[ColumnSchema], record: &Record) -> Result<BoundRow, CoercionError> {
        let mut params = Vec::with_capacity(columns.len());
        let mut fallbacks = Vec::new();

        for column in columns {
            match coerce(record.get(&column.name), column.category) {
                Ok(value) => params.push(value),
                Err(cause) => {
                    let err = CoercionError {
                        field: column.name.clone(),
                        cause,
                    };
                    match self.policy {
                        CoercionPolicy::Abort => return Err(err),
                        CoercionPolicy::BindNull => {
                            params.push(Value::Null);
                            fallbacks.push(err);
                        }
                    }
                }
            }
        }

        Ok(BoundRow { params, fallbacks })
    }
}
