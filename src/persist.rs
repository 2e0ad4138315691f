//! Persisted feature records.
//!
//! Features saved by earlier runs (or by other tools) are stored as a
//! hierarchy of named fields:
//!
//! ```text
//! range
//! duration
//!   arena    { height, width, min { x, y }, max { x, y } }
//!   worm     { indices, times }
//!   head     { indices, times }
//!   midbody  { indices, times }
//!   tail     { indices, times }
//! curvature            (optional)
//! ```
//!
//! Numbers may be stored as scalars, flat arrays or single-row/column
//! matrices (`[[1.0], [2.0]]`); they are squeezed on load. `null` stands for
//! NaN in both directions.
//!
//! # Example
//!
//! ```
//! use worm_path::persist::{self, DurationRecord};
//! use worm_path::Duration;
//!
//! let json = r#"{
//!     "arena": { "height": [[4]], "width": 7,
//!                "min": { "x": 0.5, "y": -1.0 }, "max": { "x": 5.0, "y": 2.0 } },
//!     "worm":    { "indices": [[0, 3, 9]], "times": [[0.04, 0.08, 0.04]] },
//!     "head":    { "indices": [3], "times": [0.04] },
//!     "midbody": { "indices": [0, 9], "times": [0.04, 0.04] },
//!     "tail":    { "indices": [], "times": [] }
//! }"#;
//!
//! let record: DurationRecord = persist::from_json_str(json)?;
//! let duration = Duration::from_record(&record)?;
//! assert_eq!(duration.arena.height, 4.0);
//! assert_eq!(duration.worm.indices, vec![0, 3, 9]);
//! # Ok::<(), worm_path::PathError>(())
//! ```

use std::io::Read;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::duration::{Duration, DurationElement};
use crate::error::{PathError, Result};
use crate::range::Range;

/// A stored number, vector or single-row/column matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    /// A single value; `null` is NaN.
    Scalar(Option<f64>),
    /// A flat vector.
    Vector(Vec<Option<f64>>),
    /// A matrix, squeezed to a vector on load.
    Matrix(Vec<Vec<Option<f64>>>),
}

impl Numeric {
    /// Store a sequence, writing NaN as `null`.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        Self::Vector(values.iter().map(|&v| nan_to_none(v)).collect())
    }

    /// Store a single value.
    #[must_use]
    pub fn from_scalar(value: f64) -> Self {
        Self::Scalar(nan_to_none(value))
    }

    /// Squeeze to a flat sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if a matrix has more than one row and column.
    pub fn to_values(&self) -> Result<Vec<f64>> {
        let nan = |v: &Option<f64>| v.unwrap_or(f64::NAN);
        match self {
            Self::Scalar(v) => Ok(vec![nan(v)]),
            Self::Vector(values) => Ok(values.iter().map(nan).collect()),
            Self::Matrix(rows) => {
                if rows.len() == 1 {
                    Ok(rows[0].iter().map(nan).collect())
                } else if rows.iter().all(|r| r.len() == 1) {
                    Ok(rows.iter().map(|r| nan(&r[0])).collect())
                } else {
                    Err(PathError::invalid_input(format!(
                        "expected a vector, found a {}x{} matrix",
                        rows.len(),
                        rows.first().map_or(0, Vec::len)
                    )))
                }
            }
        }
    }

    /// The single stored value.
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly one value is stored.
    pub fn to_scalar(&self) -> Result<f64> {
        match self.to_values()?.as_slice() {
            [value] => Ok(*value),
            other => Err(PathError::invalid_input(format!(
                "expected a single value, found {}",
                other.len()
            ))),
        }
    }

    /// Squeeze to a sequence of grid indices.
    ///
    /// # Errors
    ///
    /// Returns an error for negative, fractional or missing indices.
    pub fn to_indices(&self) -> Result<Vec<usize>> {
        self.to_values()?
            .into_iter()
            .map(|v| {
                if v.is_finite() && v >= 0.0 && v.fract() == 0.0 {
                    Ok(v as usize)
                } else {
                    Err(PathError::invalid_input(format!("invalid cell index {v}")))
                }
            })
            .collect()
    }
}

fn nan_to_none(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

/// Stored `(x, y)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    /// X value.
    pub x: Numeric,
    /// Y value.
    pub y: Numeric,
}

/// Stored [`Arena`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaRecord {
    /// Grid rows.
    pub height: Numeric,
    /// Grid columns.
    pub width: Numeric,
    /// Lower bounds.
    pub min: PointRecord,
    /// Upper bounds.
    pub max: PointRecord,
}

/// Stored [`DurationElement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationElementRecord {
    /// Column-major cell indices.
    pub indices: Numeric,
    /// Seconds per cell.
    pub times: Numeric,
}

/// Stored [`Duration`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationRecord {
    /// Arena extent.
    pub arena: ArenaRecord,
    /// Whole skeleton.
    pub worm: DurationElementRecord,
    /// Head region.
    pub head: DurationElementRecord,
    /// Midbody region.
    pub midbody: DurationElementRecord,
    /// Tail region.
    pub tail: DurationElementRecord,
}

/// Stored path features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    /// Per-frame range.
    pub range: Numeric,
    /// Arena and occupancy.
    pub duration: DurationRecord,
    /// Per-frame curvature, absent in older files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curvature: Option<Numeric>,
}

/// Parse a record from a JSON string.
///
/// # Errors
///
/// Returns [`PathError::Persist`] if the JSON does not match the record.
pub fn from_json_str<T: DeserializeOwned>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a record from a JSON reader.
///
/// # Errors
///
/// Returns [`PathError::Persist`] on I/O or format errors.
pub fn from_reader<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    Ok(serde_json::from_reader(reader)?)
}

/// Serialize a record to JSON.
///
/// # Errors
///
/// Returns [`PathError::Persist`] if serialization fails.
pub fn to_json_string<T: Serialize>(record: &T) -> Result<String> {
    Ok(serde_json::to_string(record)?)
}

impl Range {
    /// Rebuild from a stored `range` value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a vector.
    pub fn from_record(range: &Numeric) -> Result<Self> {
        Ok(Self {
            value: range.to_values()?,
        })
    }

    /// Store as a `range` value.
    #[must_use]
    pub fn to_record(&self) -> Numeric {
        Numeric::from_values(&self.value)
    }
}

impl Arena {
    /// Rebuild from a stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if a field does not hold a single value.
    pub fn from_record(record: &ArenaRecord) -> Result<Self> {
        Ok(Self {
            height: record.height.to_scalar()?,
            width: record.width.to_scalar()?,
            min_x: record.min.x.to_scalar()?,
            min_y: record.min.y.to_scalar()?,
            max_x: record.max.x.to_scalar()?,
            max_y: record.max.y.to_scalar()?,
        })
    }

    /// Store as a record.
    #[must_use]
    pub fn to_record(&self) -> ArenaRecord {
        ArenaRecord {
            height: Numeric::from_scalar(self.height),
            width: Numeric::from_scalar(self.width),
            min: PointRecord {
                x: Numeric::from_scalar(self.min_x),
                y: Numeric::from_scalar(self.min_y),
            },
            max: PointRecord {
                x: Numeric::from_scalar(self.max_x),
                y: Numeric::from_scalar(self.max_y),
            },
        }
    }
}

impl DurationElement {
    /// Rebuild from a stored record.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid indices or mismatched lengths.
    pub fn from_record(record: &DurationElementRecord) -> Result<Self> {
        let indices = record.indices.to_indices()?;
        let times = record.times.to_values()?;
        if indices.len() != times.len() {
            return Err(PathError::invalid_input(format!(
                "{} indices but {} times",
                indices.len(),
                times.len()
            )));
        }
        Ok(Self { indices, times })
    }

    /// Store as a record.
    #[must_use]
    pub fn to_record(&self) -> DurationElementRecord {
        let indices: Vec<f64> = self.indices.iter().map(|&i| i as f64).collect();
        DurationElementRecord {
            indices: Numeric::from_values(&indices),
            times: Numeric::from_values(&self.times),
        }
    }
}

impl Duration {
    /// Rebuild from a stored record without recomputation.
    ///
    /// # Errors
    ///
    /// Returns an error if any part of the record is malformed.
    pub fn from_record(record: &DurationRecord) -> Result<Self> {
        Ok(Self {
            arena: Arena::from_record(&record.arena)?,
            worm: DurationElement::from_record(&record.worm)?,
            head: DurationElement::from_record(&record.head)?,
            midbody: DurationElement::from_record(&record.midbody)?,
            tail: DurationElement::from_record(&record.tail)?,
        })
    }

    /// Store as a record.
    #[must_use]
    pub fn to_record(&self) -> DurationRecord {
        DurationRecord {
            arena: self.arena.to_record(),
            worm: self.worm.to_record(),
            head: self.head.to_record(),
            midbody: self.midbody.to_record(),
            tail: self.tail.to_record(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squeeze_column_vector() {
        let column: Numeric = from_json_str("[[1.0], [null], [3.0]]").unwrap();
        let values = column.to_values().unwrap();
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 3.0);

        let row: Numeric = from_json_str("[[1.0, 2.0]]").unwrap();
        assert_eq!(row.to_values().unwrap(), vec![1.0, 2.0]);

        let matrix: Numeric = from_json_str("[[1.0, 2.0], [3.0, 4.0]]").unwrap();
        assert!(matrix.to_values().is_err());
    }

    #[test]
    fn test_scalars() {
        let wrapped: Numeric = from_json_str("[[12]]").unwrap();
        assert_eq!(wrapped.to_scalar().unwrap(), 12.0);

        let null: Numeric = from_json_str("null").unwrap();
        assert!(null.to_scalar().unwrap().is_nan());

        let pair: Numeric = from_json_str("[1, 2]").unwrap();
        assert!(pair.to_scalar().is_err());
    }

    #[test]
    fn test_indices_validation() {
        let good: Numeric = from_json_str("[0, 4, 17]").unwrap();
        assert_eq!(good.to_indices().unwrap(), vec![0, 4, 17]);

        let fractional: Numeric = from_json_str("[0.5]").unwrap();
        assert!(fractional.to_indices().is_err());

        let negative: Numeric = from_json_str("[-1]").unwrap();
        assert!(negative.to_indices().is_err());
    }

    #[test]
    fn test_null_arena_round_trip() {
        let record = Arena::null().to_record();
        let json = to_json_string(&record).unwrap();
        assert!(json.contains("null"));
        let back = Arena::from_record(&from_json_str(&json).unwrap()).unwrap();
        assert!(back.is_null());
    }

    #[test]
    fn test_element_length_mismatch() {
        let record: DurationElementRecord =
            from_json_str(r#"{ "indices": [1, 2], "times": [0.1] }"#).unwrap();
        assert!(DurationElement::from_record(&record).is_err());
    }

    #[test]
    fn test_malformed_json() {
        let result: Result<DurationRecord> = from_json_str(r#"{ "arena": 3 }"#);
        assert!(matches!(result, Err(PathError::Persist(_))));
    }

    #[test]
    fn test_range_from_reader() {
        let json = br#"[[0.0], [1.5], [null]]"#;
        let numeric: Numeric = from_reader(&json[..]).unwrap();
        let range = Range::from_record(&numeric).unwrap();
        assert_eq!(range.len(), 3);
        assert!(range.value[2].is_nan());
        assert_eq!(range.to_record(), Numeric::Vector(vec![Some(0.0), Some(1.5), None]));
    }
}
