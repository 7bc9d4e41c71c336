//! Target column validation and mapping to binary labels

use anyhow::{Context, Result};
use polars::prelude::*;

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

/// Mapping configuration for converting target column values to binary 0/1
#[derive(Debug, Clone)]
pub struct TargetMapping {
    /// Value that maps to 1 (event)
    pub event_value: String,
    /// Value that maps to 0 (non-event)
    pub non_event_value: String,
}

impl TargetMapping {
    pub fn new(event_value: String, non_event_value: String) -> Self {
        Self {
            event_value,
            non_event_value,
        }
    }
}

/// Extract binary labels (0.0 / 1.0) from the target column.
///
/// Without a mapping the column must already be numeric 0/1. With a mapping,
/// values are compared as strings and anything that is neither the event nor
/// the non-event value is an error. Null targets are always an error.
pub fn extract_labels(
    df: &DataFrame,
    target: &str,
    mapping: Option<&TargetMapping>,
) -> Result<Vec<f64>> {
    let target_col = df
        .column(target)
        .with_context(|| format!("Target column '{}' not found", target))?;

    if target_col.len() == 0 {
        anyhow::bail!("Target column '{}' is empty", target);
    }

    if target_col.null_count() > 0 {
        anyhow::bail!(
            "Target column '{}' contains {} null value(s)",
            target,
            target_col.null_count()
        );
    }

    match mapping {
        Some(mapping) => map_labels(target_col, target, mapping),
        None => binary_labels(target_col, target),
    }
}

fn binary_labels(col: &Column, target: &str) -> Result<Vec<f64>> {
    if !col.dtype().is_primitive_numeric() && !col.dtype().is_bool() {
        anyhow::bail!(
            "Target column '{}' has type {}; use --event-value and --non-event-value to map it to 0/1",
            target,
            col.dtype()
        );
    }

    let float_col = col.cast(&DataType::Float64)?;
    let values: Vec<f64> = float_col.f64()?.into_iter().flatten().collect();

    if let Some(bad) = values
        .iter()
        .find(|&&v| (v - 0.0).abs() >= TOLERANCE && (v - 1.0).abs() >= TOLERANCE)
    {
        anyhow::bail!(
            "Target column '{}' must be binary (0/1), found value {}",
            target,
            bad
        );
    }

    Ok(values.into_iter().map(|v| v.round()).collect())
}

fn map_labels(col: &Column, target: &str, mapping: &TargetMapping) -> Result<Vec<f64>> {
    let as_str = col
        .cast(&DataType::String)
        .with_context(|| format!("Failed to read target column '{}' as text", target))?;

    as_str
        .str()?
        .into_iter()
        .map(|value| match value {
            Some(v) if v == mapping.event_value => Ok(1.0),
            Some(v) if v == mapping.non_event_value => Ok(0.0),
            Some(v) => anyhow::bail!(
                "Target value '{}' is neither the event value '{}' nor the non-event value '{}'",
                v,
                mapping.event_value,
                mapping.non_event_value
            ),
            None => anyhow::bail!("Target column '{}' contains null values", target),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_integer_target() {
        let df = df! { "target" => [0i32, 1, 1, 0] }.unwrap();
        let labels = extract_labels(&df, "target", None).unwrap();
        assert_eq!(labels, vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_non_binary_target_errors() {
        let df = df! { "target" => [0i32, 1, 2] }.unwrap();
        let result = extract_labels(&df, "target", None);
        assert!(result.unwrap_err().to_string().contains("must be binary"));
    }

    #[test]
    fn test_string_target_requires_mapping() {
        let df = df! { "target" => ["yes", "no"] }.unwrap();
        assert!(extract_labels(&df, "target", None).is_err());

        let mapping = TargetMapping::new("yes".to_string(), "no".to_string());
        let labels = extract_labels(&df, "target", Some(&mapping)).unwrap();
        assert_eq!(labels, vec![1.0, 0.0]);
    }

    #[test]
    fn test_mapping_rejects_unknown_values() {
        let df = df! { "target" => ["yes", "no", "maybe"] }.unwrap();
        let mapping = TargetMapping::new("yes".to_string(), "no".to_string());
        let result = extract_labels(&df, "target", Some(&mapping));
        assert!(result.unwrap_err().to_string().contains("'maybe'"));
    }

    #[test]
    fn test_null_target_errors() {
        let df = df! { "target" => [Some(1i32), None] }.unwrap();
        assert!(extract_labels(&df, "target", None).is_err());
    }

    #[test]
    fn test_missing_target_column_errors() {
        let df = df! { "x" => [1i32] }.unwrap();
        let result = extract_labels(&df, "target", None);
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
