//! Type conversion functions for data cleaning.
//!
//! Each function maps one raw column, whatever dtype the loader produced, to
//! its cleaned dtype. Rows are never added or removed here; callers filter.

use crate::error::Result;
use crate::imputers::NOT_RECORDED;
use crate::utils::{parse_boolean_like, series_as_f64, series_as_strings};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

static POSTCODE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)").unwrap());

/// Convert to `Float64`, stripping currency and thousands separators.
/// Unparseable values become null.
pub(crate) fn to_float(series: &Series) -> Result<Series> {
    let values = series_as_f64(series)?;
    Ok(Series::new(series.name().clone(), values))
}

/// Leading digit run of a postal code ("1000 ", "1000 Brussels", "1000.0").
pub(crate) fn extract_postcode(value: &str) -> Option<i64> {
    POSTCODE_PATTERN
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Extract postal codes as `Int64`; failures and 0 become null.
pub(crate) fn to_postcode(series: &Series) -> Result<Series> {
    let values: Vec<Option<i64>> = series_as_strings(series)?
        .into_iter()
        .map(|v| v.as_deref().and_then(extract_postcode).filter(|&code| code > 0))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Convert a boolean-like column to 1/0 `Int64`. Missing and unrecognised
/// values become 0.
pub(crate) fn to_flag(series: &Series) -> Result<Series> {
    let values: Vec<i64> = match series.dtype() {
        DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| i64::from(v.unwrap_or(false)))
            .collect(),
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| i64::from(v.and_then(parse_boolean_like).unwrap_or(false)))
            .collect(),
        _ => series_as_f64(series)?
            .into_iter()
            .map(|v| i64::from(v.is_some_and(|x| x > 0.0)))
            .collect(),
    };
    Ok(Series::new(series.name().clone(), values))
}

/// Collapse a count to presence: missing or negative -1, positive 1, zero 0.
pub(crate) fn to_presence(series: &Series) -> Result<Series> {
    let values: Vec<i64> = series_as_f64(series)?
        .into_iter()
        .map(|v| match v {
            Some(x) if x > 0.0 => 1,
            Some(x) if x == 0.0 => 0,
            _ => NOT_RECORDED,
        })
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Convert to `Int64`, truncating fractions toward zero. Missing, NaN,
/// infinite and unparseable values become -1.
pub(crate) fn to_integer(series: &Series) -> Result<Series> {
    let values: Vec<i64> = series_as_f64(series)?
        .into_iter()
        .map(|v| v.map(|x| x.trunc() as i64).unwrap_or(NOT_RECORDED))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ints(series: &Series) -> Vec<Option<i64>> {
        series.i64().unwrap().into_iter().collect()
    }

    // ========================================================================
    // to_float() tests
    // ========================================================================

    #[test]
    fn test_to_float_from_strings() {
        let series = Series::new("price".into(), &[Some("€300,000"), Some("error"), None]);
        let result = to_float(&series).unwrap();
        assert_eq!(result.dtype(), &DataType::Float64);
        assert_eq!(
            result.f64().unwrap().into_iter().collect::<Vec<_>>(),
            vec![Some(300000.0), None, None]
        );
    }

    #[test]
    fn test_to_float_from_integers() {
        let series = Series::new("price".into(), &[250000i64, 199000]);
        let result = to_float(&series).unwrap();
        assert_eq!(result.f64().unwrap().get(1), Some(199000.0));
    }

    // ========================================================================
    // postcode tests
    // ========================================================================

    #[test]
    fn test_extract_postcode() {
        assert_eq!(extract_postcode("1000 "), Some(1000));
        assert_eq!(extract_postcode("  9000 Gent"), Some(9000));
        assert_eq!(extract_postcode("1050.0"), Some(1050));
        assert_eq!(extract_postcode("B-1000"), None);
        assert_eq!(extract_postcode(""), None);
    }

    #[test]
    fn test_to_postcode_rejects_zero() {
        let series = Series::new(
            "postCode".into(),
            &[Some("1000 "), Some("0"), Some("unknown"), None],
        );
        assert_eq!(
            ints(&to_postcode(&series).unwrap()),
            vec![Some(1000), None, None, None]
        );
    }

    #[test]
    fn test_to_postcode_from_integers() {
        let series = Series::new("postCode".into(), &[1000i64, 4000]);
        assert_eq!(
            ints(&to_postcode(&series).unwrap()),
            vec![Some(1000), Some(4000)]
        );
    }

    // ========================================================================
    // to_flag() tests
    // ========================================================================

    #[test]
    fn test_to_flag_from_strings() {
        let series = Series::new(
            "hasGarden".into(),
            &[Some("True"), Some("false"), Some("yes"), Some("maybe"), None],
        );
        assert_eq!(
            ints(&to_flag(&series).unwrap()),
            vec![Some(1), Some(0), Some(1), Some(0), Some(0)]
        );
    }

    #[test]
    fn test_to_flag_from_booleans() {
        let series = Series::new("hasLift".into(), &[Some(true), Some(false), None]);
        assert_eq!(
            ints(&to_flag(&series).unwrap()),
            vec![Some(1), Some(0), Some(0)]
        );
    }

    #[test]
    fn test_to_flag_from_numbers() {
        let series = Series::new("hasTerrace".into(), &[Some(1.0), Some(0.0), None]);
        assert_eq!(
            ints(&to_flag(&series).unwrap()),
            vec![Some(1), Some(0), Some(0)]
        );
    }

    // ========================================================================
    // to_presence() tests
    // ========================================================================

    #[test]
    fn test_to_presence() {
        let series = Series::new("garage".into(), &[Some(2.0), Some(0.0), None, Some(-1.0)]);
        assert_eq!(
            ints(&to_presence(&series).unwrap()),
            vec![Some(1), Some(0), Some(-1), Some(-1)]
        );
    }

    // ========================================================================
    // to_integer() tests
    // ========================================================================

    #[test]
    fn test_to_integer_truncates_and_fills() {
        let series = Series::new(
            "landSurface".into(),
            &[Some(120.7), Some(f64::NAN), Some(f64::INFINITY), None, Some(-0.5)],
        );
        assert_eq!(
            ints(&to_integer(&series).unwrap()),
            vec![Some(120), Some(-1), Some(-1), Some(-1), Some(0)]
        );
    }

    #[test]
    fn test_to_integer_from_strings() {
        let series = Series::new("roomCount".into(), &[Some("5"), Some("n/a"), Some("3.9")]);
        assert_eq!(
            ints(&to_integer(&series).unwrap()),
            vec![Some(5), Some(-1), Some(3)]
        );
    }
}
