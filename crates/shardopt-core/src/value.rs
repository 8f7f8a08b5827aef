//! Bound parameter values.
//!
//! A statement arrives with its placeholders still unresolved; the values
//! substituted into them travel alongside as `BoundArgs`. The optimizer never
//! inspects them, it only attaches the same sequence to every leaf it builds.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    Bin(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Loose parsing used by the CLI: integers, floats, `true`/`false`, `null`,
    /// and everything else as a string.
    pub fn parse_loose(s: &str) -> Self {
        if s.eq_ignore_ascii_case("null") {
            return Value::Null;
        }
        if let Ok(b) = s.parse::<bool>() {
            return Value::Bool(b);
        }
        if let Ok(i) = s.parse::<i64>() {
            return Value::I64(i);
        }
        if let Ok(u) = s.parse::<u64>() {
            return Value::U64(u);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Value::F64(f);
        }
        Value::Str(s.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::I64(i) => write!(f, "{i}"),
            Value::U64(u) => write!(f, "{u}"),
            Value::F64(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "'{s}'"),
            Value::Bin(b) => write!(f, "x'{}'", hex(b)),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(&mut s, "{:02x}", b);
    }
    s
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

/// Ordered, immutable parameter values for one statement.
///
/// Cloning shares the underlying slice, so handing the same arguments to
/// every shard of a full expansion costs one refcount bump per leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundArgs(Arc<[Value]>);

impl BoundArgs {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values.into())
    }

    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// True if both handles point at the same allocation.
    pub fn shares_storage(&self, other: &BoundArgs) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for BoundArgs {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for BoundArgs {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for BoundArgs {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<Value> for BoundArgs {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
