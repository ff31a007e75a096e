//! Column Summary Statistics
//!
//! Descriptive statistics over the raw textual values of one column. Numeric
//! columns are summarized by their parsed values, textual columns by the
//! lengths and character make-up of their strings.

use crate::error::{UnionError, Result};
use serde::Serialize;

/// Statistics for a numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: f64,
    pub mean: f64,
    /// Population standard deviation (divides by `count`)
    pub stddev: f64,
    pub min: f64,
    pub percentile_25: f64,
    pub median: f64,
    pub percentile_75: f64,
    pub max: f64,
    pub range: f64,
}

impl NumericSummary {
    /// Summarize a column of raw values.
    ///
    /// Nulls and values that do not parse as a finite number count as `0.0`;
    /// no value is ever rejected.
    pub fn from_values(values: &[Option<String>]) -> Result<Self> {
        if values.is_empty() {
            return Err(UnionError::Input(
                "No values to calculate statistics.".to_string(),
            ));
        }

        let mut parsed: Vec<f64> = values
            .iter()
            .map(|v| parse_numeric(v.as_deref()))
            .collect();
        let count = parsed.len() as f64;

        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &parsed {
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        let mean = sum / count;

        let sum_squared_diff: f64 = parsed.iter().map(|v| (v - mean).powi(2)).sum();
        let stddev = (sum_squared_diff / count).sqrt();

        parsed.sort_by(|a, b| a.total_cmp(b));

        Ok(Self {
            count,
            mean,
            stddev,
            min,
            percentile_25: calculate_percentile(&parsed, 25.0),
            median: calculate_percentile(&parsed, 50.0),
            percentile_75: calculate_percentile(&parsed, 75.0),
            max,
            range: max - min,
        })
    }
}

/// Statistics for a textual column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSummary {
    pub count: f64,
    /// Mean string length
    pub mean: f64,
    /// Variance of string length. This is not square-rooted: the encoded
    /// vector relies on it holding the variance.
    pub stddev: f64,
    pub min: f64,
    pub average_numeric_char_ratio: f64,
    pub average_whitespace_ratio: f64,
    pub max: f64,
    pub range: f64,
}

impl TextSummary {
    /// Summarize a column of strings.
    ///
    /// Nulls are skipped when scanning characters but still count towards
    /// `count`, so they pull the averages down. When every value is null the
    /// length extremes are reported as zero.
    pub fn from_values(values: &[Option<String>]) -> Result<Self> {
        if values.is_empty() {
            return Err(UnionError::Input(
                "No values to calculate statistics.".to_string(),
            ));
        }

        let count = values.len() as f64;
        let mut total_numeric_ratio = 0.0;
        let mut total_whitespace_ratio = 0.0;
        let mut length_sum = 0.0;
        let mut length_sum_squared = 0.0;
        let mut extremes: Option<(f64, f64)> = None;

        for s in values.iter().flatten() {
            let mut total_chars = 0usize;
            let mut numeric_chars = 0usize;
            let mut whitespace_chars = 0usize;
            for c in s.chars() {
                total_chars += 1;
                if c.is_ascii_digit() {
                    numeric_chars += 1;
                } else if c.is_whitespace() {
                    whitespace_chars += 1;
                }
            }

            let len = total_chars as f64;
            extremes = Some(match extremes {
                Some((lo, hi)) => (lo.min(len), hi.max(len)),
                None => (len, len),
            });
            length_sum += len;
            length_sum_squared += len * len;

            // empty strings carry no ratio
            if total_chars > 0 {
                total_numeric_ratio += numeric_chars as f64 / len;
                total_whitespace_ratio += whitespace_chars as f64 / len;
            }
        }

        let (min, max) = extremes.unwrap_or((0.0, 0.0));
        let mean = length_sum / count;

        Ok(Self {
            count,
            mean,
            stddev: length_sum_squared / count - mean * mean,
            min,
            average_numeric_char_ratio: total_numeric_ratio / count,
            average_whitespace_ratio: total_whitespace_ratio / count,
            max,
            range: max - min,
        })
    }
}

/// Percentile of already-sorted values using linear interpolation between
/// the two nearest ranks. Returns `0.0` for an empty slice.
pub fn calculate_percentile(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = (percentile / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = lower + 1;
    let weight = index - lower as f64;
    if upper >= sorted.len() {
        return sorted[lower];
    }
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

fn parse_numeric(value: Option<&str>) -> f64 {
    value
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
