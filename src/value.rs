//! Cell value storage types.

use serde::{Deserialize, Serialize};

/// Canonical bit pattern used for all NaN values in [`ValueKey`].
const CANONICAL_NAN: u64 = 0x7ff8_0000_0000_0000;

/// A single cell of tabular data.
///
/// This enum stores the different scalar types that can appear in a
/// search-space grid or a measurement table uniformly. `Missing` models an
/// absent entry (e.g. an unset fit number, or a hole in user-provided
/// measurement data that validation will reject).
///
/// The serialized form is untagged: floats, integers, strings, booleans,
/// and `null` map directly to their JSON counterparts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A string label.
    Str(String),
    /// A boolean value.
    Bool(bool),
    /// An absent entry.
    Missing,
}

impl Value {
    /// Returns `true` if this cell holds no value.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Returns `true` if this cell holds a numeric value.
    ///
    /// Booleans count as numeric, matching the convention of numeric
    /// dataframe dtypes where they widen to 0/1.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Bool(_))
    }

    /// Returns the cell as an `f64`, widening integers and booleans.
    ///
    /// Strings and missing entries return `None`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::Bool(v) => Some(f64::from(u8::from(*v))),
            Value::Str(_) | Value::Missing => None,
        }
    }

    /// Returns a hashable, totally ordered key for duplicate detection.
    ///
    /// Floats are keyed by bit pattern with `-0.0` canonicalized to `0.0`
    /// and all NaNs collapsed to a single pattern, so two cells compare
    /// equal under [`ValueKey`] exactly when they are indistinguishable as
    /// labels.
    #[must_use]
    pub fn key(&self) -> ValueKey {
        match self {
            Value::Int(v) => ValueKey::Int(*v),
            Value::Float(v) => {
                let bits = if v.is_nan() {
                    CANONICAL_NAN
                } else if *v == 0.0 {
                    0.0_f64.to_bits()
                } else {
                    v.to_bits()
                };
                ValueKey::Float(bits)
            }
            Value::Str(s) => ValueKey::Str(s.clone()),
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Missing => ValueKey::Missing,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Hashable, totally ordered form of a [`Value`], used as a duplicate-
/// detection key by constraints that collapse rows into label sets.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    /// Key of an integer cell.
    Int(i64),
    /// Key of a float cell (canonicalized bit pattern).
    Float(u64),
    /// Key of a string cell.
    Str(String),
    /// Key of a boolean cell.
    Bool(bool),
    /// Key of a missing cell.
    Missing,
}
