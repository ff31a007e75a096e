//! Column Encoding
//!
//! Turns a column's values and declared type into a fixed-length,
//! unit-normalized feature vector. Slot layout per category:
//!
//! | slot | Numeric      | Text                 | Unknown   |
//! |------|--------------|----------------------|-----------|
//! | 0    | count        | count                | row count |
//! | 1    | mean         | mean length          | 10        |
//! | 2    | variance     | length variance      | 0         |
//! | 3    | min          | min length           | 10        |
//! | 4    | percentile25 | numeric char ratio   | 10        |
//! | 5    | median       | whitespace ratio     | 10        |
//! | 6    | percentile75 | max length           | 10        |
//! | 7    | max          | range                | 10        |
//! | 8    | range        | range                | 0         |

use crate::error::{UnionError, Result};
use crate::stats::{NumericSummary, TextSummary};
use serde::Serialize;
use std::fmt;

/// Number of slots in every feature vector
pub const VECTOR_DIM: usize = 9;

pub type FeatureVector = [f64; VECTOR_DIM];

/// Coarse type classification. Only columns of equal category are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    Numeric,
    Text,
    Unknown,
}

const INTEGER_TYPES: &[&str] = &[
    "int", "int2", "int4", "int8", "integer", "smallint", "bigint",
    "serial", "smallserial", "bigserial", "serial2", "serial4", "serial8",
];

const FLOAT_TYPES: &[&str] = &["float", "float4", "float8", "real", "double precision"];

const CHARACTER_TYPES: &[&str] = &[
    "varchar", "character varying", "char", "character", "bpchar", "text",
];

impl TypeCategory {
    /// Classify a declared SQL type name such as `int4`, `numeric(10,2)`
    /// or `character varying`.
    pub fn from_declared_type(declared_type: &str) -> Self {
        let lowered = declared_type.trim().to_lowercase();
        let base = lowered
            .split('(')
            .next()
            .unwrap_or_default()
            .trim();

        if base == "numeric"
            || base == "decimal"
            || INTEGER_TYPES.contains(&base)
            || FLOAT_TYPES.contains(&base)
        {
            TypeCategory::Numeric
        } else if CHARACTER_TYPES.contains(&base) {
            TypeCategory::Text
        } else {
            TypeCategory::Unknown
        }
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCategory::Numeric => write!(f, "numeric"),
            TypeCategory::Text => write!(f, "text"),
            TypeCategory::Unknown => write!(f, "unknown"),
        }
    }
}

/// Encoded column. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Encoding {
    pub table_name: String,
    pub column_name: String,
    pub type_category: TypeCategory,
    pub vector: FeatureVector,
}

/// Encode one column.
///
/// Fails with `Input` for an empty numeric or textual column. Slot 0 holds
/// the row count, so once that check passes the norm is never zero; the
/// remaining `DegenerateVector` case is a norm that overflows to infinity
/// (e.g. values near `1e200`, whose variance is not representable).
/// Unrecognized declared types are not an error: they get the fixed
/// fallback vector.
pub fn encode_column(
    values: &[Option<String>],
    declared_type: &str,
    column_name: &str,
    table_name: &str,
) -> Result<Encoding> {
    let type_category = TypeCategory::from_declared_type(declared_type);

    let mut vector = match type_category {
        TypeCategory::Text => {
            let stats = TextSummary::from_values(values)?;
            [
                stats.count,
                stats.mean,
                stats.stddev,
                stats.min,
                stats.average_numeric_char_ratio,
                stats.average_whitespace_ratio,
                stats.max,
                stats.range,
                stats.range,
            ]
        }
        TypeCategory::Numeric => {
            let stats = NumericSummary::from_values(values)?;
            [
                stats.count,
                stats.mean,
                stats.stddev * stats.stddev,
                stats.min,
                stats.percentile_25,
                stats.median,
                stats.percentile_75,
                stats.max,
                stats.range,
            ]
        }
        TypeCategory::Unknown => fallback_vector(values.len()),
    };

    normalize_vector(&mut vector).ok_or_else(|| UnionError::DegenerateVector {
        table: table_name.to_string(),
        column: column_name.to_string(),
    })?;

    Ok(Encoding {
        table_name: table_name.to_string(),
        column_name: column_name.to_string(),
        type_category,
        vector,
    })
}

fn fallback_vector(row_count: usize) -> FeatureVector {
    [row_count as f64, 10.0, 0.0, 10.0, 10.0, 10.0, 10.0, 10.0, 0.0]
}

/// Scale `vector` to unit length in place. Returns `None`, leaving the
/// vector untouched, when its norm is exactly zero or not finite.
pub fn normalize_vector(vector: &mut FeatureVector) -> Option<()> {
    let magnitude = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return None;
    }
    for x in vector.iter_mut() {
        *x /= magnitude;
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    fn norm(v: &FeatureVector) -> f64 {
        v.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    #[test]
    fn test_type_classification() {
        assert_eq!(TypeCategory::from_declared_type("int4"), TypeCategory::Numeric);
        assert_eq!(TypeCategory::from_declared_type("BIGINT"), TypeCategory::Numeric);
        assert_eq!(TypeCategory::from_declared_type("numeric(10,2)"), TypeCategory::Numeric);
        assert_eq!(TypeCategory::from_declared_type("float8"), TypeCategory::Numeric);
        assert_eq!(TypeCategory::from_declared_type("varchar"), TypeCategory::Text);
        assert_eq!(TypeCategory::from_declared_type("character varying(64)"), TypeCategory::Text);
        assert_eq!(TypeCategory::from_declared_type("text"), TypeCategory::Text);
        assert_eq!(TypeCategory::from_declared_type("interval"), TypeCategory::Unknown);
        assert_eq!(TypeCategory::from_declared_type("point"), TypeCategory::Unknown);
        assert_eq!(TypeCategory::from_declared_type("date"), TypeCategory::Unknown);
    }

    #[test]
    fn test_numeric_encoding_is_unit_length() {
        let enc = encode_column(&column(&["1", "2", "3", "4", "5"]), "int4", "id", "people").unwrap();
        assert_eq!(enc.type_category, TypeCategory::Numeric);
        assert!((norm(&enc.vector) - 1.0).abs() < 1e-12);

        // slot 2 holds the variance (2.0) relative to count (5.0)
        assert!((enc.vector[2] / enc.vector[0] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_text_encoding_layout() {
        let enc = encode_column(&column(&["ab", "abcd"]), "varchar", "name", "people").unwrap();
        assert_eq!(enc.type_category, TypeCategory::Text);
        assert!((norm(&enc.vector) - 1.0).abs() < 1e-12);
        // range is duplicated in the last two slots
        assert_eq!(enc.vector[7], enc.vector[8]);
        assert_eq!(enc.table_name, "people");
        assert_eq!(enc.column_name, "name");
    }

    #[test]
    fn test_unknown_type_uses_fallback() {
        let values = column(&["2024-01-01", "2024-02-01"]);
        let enc = encode_column(&values, "date", "created", "events").unwrap();
        assert_eq!(enc.type_category, TypeCategory::Unknown);

        let mut expected = fallback_vector(2);
        normalize_vector(&mut expected).unwrap();
        assert_eq!(enc.vector, expected);
    }

    #[test]
    fn test_zero_vector_cannot_be_normalized() {
        let mut zero = [0.0; VECTOR_DIM];
        assert!(normalize_vector(&mut zero).is_none());
        assert_eq!(zero, [0.0; VECTOR_DIM]);
    }

    #[test]
    fn test_all_zero_column_still_encodes() {
        // count keeps slot 0 non-zero
        let enc = encode_column(&column(&["0", "0"]), "numeric", "zeros", "t").unwrap();
        assert_eq!(enc.vector[0], 1.0);
        assert!(enc.vector[1..].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_overflowing_column_is_degenerate() {
        let err = encode_column(&column(&["1e200", "1"]), "numeric", "huge", "t").unwrap_err();
        assert!(matches!(
            err,
            UnionError::DegenerateVector { ref table, ref column } if table == "t" && column == "huge"
        ));

        let mut v = [1.0, f64::INFINITY, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert!(normalize_vector(&mut v).is_none());
        let mut v = [1.0, f64::NAN, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert!(normalize_vector(&mut v).is_none());
    }

    #[test]
    fn test_text_slots_hold_length_variance_and_ratios() {
        // lengths 1 and 5: variance 4, so a square root would give 2
        let enc = encode_column(&column(&["7", "ab cd"]), "text", "code", "t").unwrap();
        let count = 2.0;
        assert!((enc.vector[2] / enc.vector[0] - 4.0 / count).abs() < 1e-12);
        // mean length 3
        assert!((enc.vector[1] / enc.vector[0] - 3.0 / count).abs() < 1e-12);
        // numeric ratio (1/1 + 0/5) / 2, whitespace ratio (0 + 1/5) / 2
        assert!((enc.vector[4] / enc.vector[0] - 0.5 / count).abs() < 1e-12);
        assert!((enc.vector[5] / enc.vector[0] - 0.1 / count).abs() < 1e-12);
        // min 1, max 5, range 4
        assert!((enc.vector[3] / enc.vector[0] - 1.0 / count).abs() < 1e-12);
        assert!((enc.vector[6] / enc.vector[0] - 5.0 / count).abs() < 1e-12);
        assert!((enc.vector[7] / enc.vector[0] - 4.0 / count).abs() < 1e-12);
        assert_eq!(enc.vector[7], enc.vector[8]);
    }

    #[test]
    fn test_empty_column_propagates_input_error() {
        let err = encode_column(&[], "int8", "c", "t").unwrap_err();
        assert!(matches!(err, UnionError::Input(_)));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let values = column(&["3.5", "-1", "12", "7", "0.25"]);
        let a = encode_column(&values, "numeric", "x", "t").unwrap();
        let b = encode_column(&values, "numeric", "x", "t").unwrap();
        for (x, y) in a.vector.iter().zip(b.vector.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }
}
