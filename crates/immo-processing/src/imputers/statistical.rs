//! Statistical imputation for room counts.
//!
//! Missing bedroom and bathroom counts are inferred from the living area:
//! small dwellings get one room, larger ones the rounded dataset mean.

use crate::error::Result;
use crate::utils::{column_as_f64, require_columns, rounded_mean};
use polars::prelude::*;

/// Value stored when a count cannot be inferred.
pub const NOT_RECORDED: i64 = -1;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Infer missing counts in `target` from the `area` column.
    ///
    /// - living area unknown → [`NOT_RECORDED`]
    /// - living area below `threshold` → 1
    /// - otherwise → rounded mean of the known counts, or [`NOT_RECORDED`]
    ///   when no count is known at all
    ///
    /// Known counts are kept as they are. The column becomes `Float64`; the
    /// integer cast happens later in the corrector.
    pub fn infer_room_counts(
        df: &mut DataFrame,
        target: &str,
        area: &str,
        threshold: f64,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        require_columns(df, &[target])?;
        let counts = column_as_f64(df, target)?;
        let areas = match df.column(area) {
            Ok(_) => column_as_f64(df, area)?,
            Err(_) => vec![None; df.height()],
        };

        let mean = rounded_mean(&counts);
        let missing = counts.iter().filter(|v| v.is_none()).count();

        let inferred: Vec<Option<f64>> = counts
            .iter()
            .zip(&areas)
            .map(|(count, area)| {
                Some(count.unwrap_or_else(|| infer_one(*area, threshold, mean) as f64))
            })
            .collect();

        df.replace(target, Series::new(target.into(), inferred))?;

        if missing > 0 {
            processing_steps.push(format!(
                "Inferred {} missing '{}' values from '{}' (threshold {} m², mean {})",
                missing,
                target,
                area,
                threshold,
                mean.map(|m| m.to_string())
                    .unwrap_or_else(|| "unavailable".to_string())
            ));
        }

        Ok(())
    }
}

fn infer_one(area: Option<f64>, threshold: f64, mean: Option<i64>) -> i64 {
    // a negative surface is a sentinel from an earlier run
    match area.filter(|a| *a >= 0.0) {
        None => NOT_RECORDED,
        Some(a) if a < threshold => 1,
        Some(_) => mean.unwrap_or(NOT_RECORDED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        column_as_f64(df, name).unwrap()
    }

    #[test]
    fn test_infer_one() {
        assert_eq!(infer_one(None, 40.0, Some(3)), NOT_RECORDED);
        assert_eq!(infer_one(Some(-1.0), 40.0, Some(3)), NOT_RECORDED);
        assert_eq!(infer_one(Some(35.0), 40.0, Some(3)), 1);
        assert_eq!(infer_one(Some(40.0), 40.0, Some(3)), 3);
        assert_eq!(infer_one(Some(120.0), 40.0, None), NOT_RECORDED);
    }

    #[test]
    fn test_small_dwelling_gets_one_bedroom() {
        let mut df = df![
            "bedroomCount" => [None, Some(2.0), Some(4.0)],
            "habitableSurface" => [Some(35.0), Some(90.0), Some(200.0)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        StatisticalImputer::infer_room_counts(
            &mut df,
            "bedroomCount",
            "habitableSurface",
            40.0,
            &mut steps,
        )
        .unwrap();

        assert_eq!(
            values(&df, "bedroomCount"),
            vec![Some(1.0), Some(2.0), Some(4.0)]
        );
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn test_large_dwelling_gets_mean() {
        let mut df = df![
            "bathroomCount" => [None, Some(1.0), Some(2.0), None],
            "habitableSurface" => [Some(150.0), Some(80.0), Some(160.0), None],
        ]
        .unwrap();
        let mut steps = Vec::new();

        StatisticalImputer::infer_room_counts(
            &mut df,
            "bathroomCount",
            "habitableSurface",
            100.0,
            &mut steps,
        )
        .unwrap();

        // mean of [1, 2] = 1.5 rounds to 2
        assert_eq!(
            values(&df, "bathroomCount"),
            vec![Some(2.0), Some(1.0), Some(2.0), Some(-1.0)]
        );
    }

    #[test]
    fn test_missing_area_column() {
        let mut df = df!["bedroomCount" => [None, Some(3.0)]].unwrap();
        let mut steps = Vec::new();

        StatisticalImputer::infer_room_counts(
            &mut df,
            "bedroomCount",
            "habitableSurface",
            40.0,
            &mut steps,
        )
        .unwrap();

        assert_eq!(values(&df, "bedroomCount"), vec![Some(-1.0), Some(3.0)]);
    }

    #[test]
    fn test_nothing_missing_logs_nothing() {
        let mut df = df!["bedroomCount" => [1.0, 3.0]].unwrap();
        let mut steps = Vec::new();
        StatisticalImputer::infer_room_counts(&mut df, "bedroomCount", "area", 40.0, &mut steps)
            .unwrap();
        assert!(steps.is_empty());
    }
}
