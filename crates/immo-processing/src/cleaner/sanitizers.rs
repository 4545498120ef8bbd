//! Text sanitization functions for cleaning values.

use crate::error::Result;
use crate::utils::series_as_strings;
use polars::prelude::*;

/// Placeholder stored in categorical columns when the value is unknown.
pub const MISSING_VALUE: &str = "missing value";

/// Trim every value; blank strings become null. Optionally uppercase.
pub(crate) fn normalize_text(series: &Series, uppercase: bool) -> Result<Series> {
    let cleaned: Vec<Option<String>> = series_as_strings(series)?
        .into_iter()
        .map(|opt_val| {
            opt_val.and_then(|val| {
                let trimmed = val.trim();
                if trimmed.is_empty() {
                    None
                } else if uppercase {
                    Some(trimmed.to_uppercase())
                } else {
                    Some(trimmed.to_string())
                }
            })
        })
        .collect();

    Ok(Series::new(series.name().clone(), cleaned))
}

/// Trim every value and replace null or blank values with `fill`.
///
/// Returns the new series and the number of filled cells.
pub(crate) fn trim_and_fill(series: &Series, fill: &str) -> Result<(Series, usize)> {
    let mut filled = 0;
    let cleaned: Vec<String> = series_as_strings(series)?
        .into_iter()
        .map(|opt_val| match opt_val.as_deref().map(str::trim) {
            Some(val) if !val.is_empty() => val.to_string(),
            _ => {
                filled += 1;
                fill.to_string()
            }
        })
        .collect();

    Ok((Series::new(series.name().clone(), cleaned), filled))
}
