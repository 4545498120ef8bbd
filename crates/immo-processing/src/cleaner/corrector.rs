//! Column-level error correction.
//!
//! Runs after deduplication. Each step below is applied in order and only
//! touches the columns it names; columns that are absent are skipped.
//!
//! 1. Project listing policy
//! 2. Configured column drops
//! 3. Price to `Float64`, rows without a price removed
//! 4. Postal code extraction (drop or sentinel)
//! 5. Locality canonicalized per postal code
//! 6. Text and categorical gap filling
//! 7. Boolean-like flags to 1/0
//! 8. Count columns to presence flags
//! 9. Bedroom and bathroom inference from the living area
//! 10. Integer-domain columns to `Int64` with -1 for unknown

use super::converters::{to_flag, to_float, to_integer, to_postcode, to_presence};
use super::sanitizers::{MISSING_VALUE, normalize_text, trim_and_fill};
use crate::config::{CleaningConfig, PostcodePolicy, ProjectListingPolicy};
use crate::error::{Result, ResultExt};
use crate::imputers::{GroupModeImputer, NOT_RECORDED, StatisticalImputer};
use crate::utils::{column_as_strings, has_column, require_columns};
use polars::prelude::*;
use tracing::{debug, error, info, warn};

/// Listing types kept by [`ProjectListingPolicy::Drop`].
const RESIDENTIAL_TYPES: [&str; 2] = ["HOUSE", "APARTMENT"];

/// Applies type coercion, gap filling and row filtering to deduplicated
/// listings.
#[derive(Debug, Clone, Default)]
pub struct ErrorCorrector {
    config: CleaningConfig,
}

impl ErrorCorrector {
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    /// Correct the table, logging failures and returning an empty table instead.
    pub fn correct(&self, df: DataFrame) -> DataFrame {
        match self.try_correct(df) {
            Ok((result, _)) => result,
            Err(e) => {
                error!("Error correction failed: {}", e);
                DataFrame::empty()
            }
        }
    }

    /// Correct the table and return the list of actions taken.
    pub fn try_correct(&self, df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let mut steps = Vec::new();
        if df.height() == 0 {
            return Ok((df, steps));
        }

        let cols = &self.config.columns;
        require_columns(&df, &[&cols.price, &cols.postcode]).context("Error correction")?;

        let rows_before = df.height();
        info!("Correcting {} rows...", rows_before);

        let df = self.apply_project_policy(df, &mut steps)?;
        let df = self.drop_configured_columns(df, &mut steps);
        let df = self.correct_price(df, &mut steps)?;
        let mut df = self.correct_postcode(df, &mut steps)?;

        self.canonicalize_locality(&mut df, &mut steps)?;
        self.fill_text_columns(&mut df, &mut steps)?;
        self.convert_columns(&mut df, &self.config.flag_columns, to_flag, "0/1 flags")?;
        self.convert_columns(
            &mut df,
            &self.config.presence_columns,
            to_presence,
            "presence flags (-1/0/1)",
        )?;
        self.infer_room_counts(&mut df, &mut steps)?;
        let converted = self.convert_columns(
            &mut df,
            &self.config.integer_columns,
            to_integer,
            "integers (-1 when not recorded)",
        )?;

        if !converted.is_empty() {
            steps.push(format!(
                "Converted {} integer columns, unknown values set to {}",
                converted.len(),
                NOT_RECORDED
            ));
        }

        info!(
            "Error correction: {} rows -> {} rows, {} columns",
            rows_before,
            df.height(),
            df.width()
        );

        Ok((df, steps))
    }

    fn apply_project_policy(&self, df: DataFrame, steps: &mut Vec<String>) -> Result<DataFrame> {
        if self.config.project_listings == ProjectListingPolicy::Keep {
            return Ok(df);
        }

        let type_col = &self.config.columns.property_type;
        if !has_column(&df, type_col) {
            warn!("Column '{}' not found, project listings kept", type_col);
            return Ok(df);
        }

        let mask: BooleanChunked = column_as_strings(&df, type_col)?
            .iter()
            .map(|v| {
                v.as_deref()
                    .map(|t| RESIDENTIAL_TYPES.contains(&t.trim().to_uppercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();

        let before = df.height();
        let df = df.filter(&mask)?;
        let removed = before - df.height();
        if removed > 0 {
            steps.push(format!(
                "Removed {} listings that are neither HOUSE nor APARTMENT",
                removed
            ));
        }
        debug!("Project listing policy removed {} rows", removed);
        Ok(df)
    }

    fn drop_configured_columns(&self, df: DataFrame, steps: &mut Vec<String>) -> DataFrame {
        let present: Vec<PlSmallStr> = self
            .config
            .drop_columns
            .iter()
            .filter(|name| has_column(&df, name))
            .map(|name| name.as_str().into())
            .collect();

        if present.is_empty() {
            return df;
        }

        steps.push(format!("Dropped columns: {:?}", present));
        df.drop_many(present)
    }

    fn correct_price(&self, mut df: DataFrame, steps: &mut Vec<String>) -> Result<DataFrame> {
        let price_col = &self.config.columns.price;
        let price = to_float(df.column(price_col)?.as_materialized_series())?;
        let mask = price.is_not_null();
        df.replace(price_col, price)?;

        let before = df.height();
        let df = df.filter(&mask)?;
        let removed = before - df.height();
        if removed > 0 {
            steps.push(format!("Removed {} rows without a usable price", removed));
        }
        Ok(df)
    }

    fn correct_postcode(&self, mut df: DataFrame, steps: &mut Vec<String>) -> Result<DataFrame> {
        let postcode_col = &self.config.columns.postcode;
        let postcode = to_postcode(df.column(postcode_col)?.as_materialized_series())?;
        let invalid = postcode.null_count();

        match self.config.postcode_policy {
            PostcodePolicy::Drop => {
                let mask = postcode.is_not_null();
                df.replace(postcode_col, postcode)?;
                let df = df.filter(&mask)?;
                if invalid > 0 {
                    steps.push(format!(
                        "Removed {} rows without a valid postal code",
                        invalid
                    ));
                }
                Ok(df)
            }
            PostcodePolicy::Sentinel => {
                let filled: Vec<i64> = postcode
                    .i64()?
                    .into_iter()
                    .map(|code| code.unwrap_or(NOT_RECORDED))
                    .collect();
                df.replace(postcode_col, Series::new(postcode_col.as_str().into(), filled))?;
                if invalid > 0 {
                    steps.push(format!(
                        "Marked {} invalid postal codes as {}",
                        invalid, NOT_RECORDED
                    ));
                }
                Ok(df)
            }
        }
    }

    fn canonicalize_locality(&self, df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
        let cols = &self.config.columns;
        if !has_column(df, &cols.locality) {
            debug!("Column '{}' not found, skipping locality", cols.locality);
            return Ok(());
        }

        let locality = normalize_text(
            df.column(&cols.locality)?.as_materialized_series(),
            self.config.uppercase_locality,
        )?;
        df.replace(&cols.locality, locality)?;

        GroupModeImputer::new(&cols.postcode, &cols.locality)
            .ignore_key(NOT_RECORDED)
            .apply(df, steps)?;
        Ok(())
    }

    fn fill_text_columns(&self, df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
        let groups = [
            (&self.config.text_columns, ""),
            (&self.config.categorical_columns, MISSING_VALUE),
        ];

        for (columns, fill) in groups {
            for name in columns {
                if !has_column(df, name) {
                    continue;
                }
                let (series, filled) = trim_and_fill(df.column(name)?.as_materialized_series(), fill)?;
                df.replace(name, series)?;
                if filled > 0 {
                    steps.push(format!("Filled {} missing '{}' with {:?}", filled, name, fill));
                }
            }
        }
        Ok(())
    }

    fn infer_room_counts(&self, df: &mut DataFrame, steps: &mut Vec<String>) -> Result<()> {
        if !self.config.infer_room_counts {
            return Ok(());
        }

        let cols = &self.config.columns;
        for (target, threshold) in [
            (&cols.bedrooms, self.config.bedroom_area_threshold),
            (&cols.bathrooms, self.config.bathroom_area_threshold),
        ] {
            if has_column(df, target) {
                StatisticalImputer::infer_room_counts(
                    df,
                    target,
                    &cols.living_area,
                    threshold,
                    steps,
                )?;
            }
        }
        Ok(())
    }

    /// Apply `convert` to every present column in `columns`.
    fn convert_columns(
        &self,
        df: &mut DataFrame,
        columns: &[String],
        convert: fn(&Series) -> Result<Series>,
        label: &str,
    ) -> Result<Vec<String>> {
        let mut converted = Vec::new();
        for name in columns {
            if !has_column(df, name) {
                continue;
            }
            let series = convert(df.column(name)?.as_materialized_series())?;
            df.replace(name, series)?;
            converted.push(name.clone());
        }
        if !converted.is_empty() {
            debug!("Converted {:?} to {}", converted, label);
        }
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::column_as_f64;
    use pretty_assertions::assert_eq;

    fn ints(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        column_as_strings(df, name).unwrap()
    }

    fn raw_listings() -> DataFrame {
        df![
            "type" => ["HOUSE", "APARTMENT", "APARTMENT_GROUP", "HOUSE", "HOUSE"],
            "price" => [Some("300000"), Some("€195,000"), Some("450000"), None, Some("210000")],
            "postCode" => [Some("1000 "), Some("1000"), Some("9000"), Some("9000"), Some("x")],
            "locality" => [Some("Bruxelles"), Some("  BRUSSELS"), Some("Gent"), Some("Gent"), None],
            "street" => [Some("Rue A"), None, Some("Kerkstraat"), None, None],
            "hasGarden" => [Some("True"), None, Some("False"), None, None],
            "garage" => [Some(2.0), Some(0.0), None, None, None],
            "bedroomCount" => [Some(3.0), None, Some(2.0), None, None],
            "bathroomCount" => [Some(1.0), None, None, None, None],
            "habitableSurface" => [Some(150.0), Some(35.0), Some(120.5), None, None],
            "kitchenType" => [Some("INSTALLED"), None, Some(" SEMI_EQUIPPED "), None, None],
            "monthlyCost" => [Some(100.0), None, None, None, None],
        ]
        .unwrap()
    }

    #[test]
    fn test_price_and_postcode_rows() {
        let (df, steps) = ErrorCorrector::default().try_correct(raw_listings()).unwrap();

        // row 3 has no price, row 4 has no postal code digits
        assert_eq!(df.height(), 3);
        assert_eq!(df.column("price").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("price").unwrap().null_count(), 0);
        assert_eq!(
            column_as_f64(&df, "price").unwrap(),
            vec![Some(300000.0), Some(195000.0), Some(450000.0)]
        );
        assert_eq!(ints(&df, "postCode"), vec![Some(1000), Some(1000), Some(9000)]);
        assert!(steps.iter().any(|s| s.contains("price")));
        assert!(steps.iter().any(|s| s.contains("postal code")));
    }

    #[test]
    fn test_postcode_sentinel_policy() {
        let config = CleaningConfig::builder()
            .postcode_policy(PostcodePolicy::Sentinel)
            .build()
            .unwrap();
        let df = ErrorCorrector::new(config).correct(raw_listings());
        assert_eq!(df.height(), 4);
        assert_eq!(ints(&df, "postCode")[3], Some(-1));
    }

    #[test]
    fn test_sentinel_postcodes_keep_their_locality() {
        let config = CleaningConfig::builder()
            .postcode_policy(PostcodePolicy::Sentinel)
            .build()
            .unwrap();
        let df = df![
            "price" => [200000.0, 210000.0, 220000.0],
            "postCode" => ["abc", "xyz", "n/a"],
            "locality" => ["Gent", "Antwerpen", "Liege"],
        ]
        .unwrap();

        let df = ErrorCorrector::new(config).correct(df);
        assert_eq!(ints(&df, "postCode"), vec![Some(-1), Some(-1), Some(-1)]);
        assert_eq!(
            strings(&df, "locality"),
            vec![
                Some("GENT".to_string()),
                Some("ANTWERPEN".to_string()),
                Some("LIEGE".to_string()),
            ]
        );
    }

    #[test]
    fn test_project_policy_drop() {
        let config = CleaningConfig::builder()
            .project_listings(ProjectListingPolicy::Drop)
            .build()
            .unwrap();
        let df = ErrorCorrector::new(config).correct(raw_listings());
        assert_eq!(df.height(), 2);
        assert!(
            strings(&df, "type")
                .iter()
                .all(|t| matches!(t.as_deref(), Some("HOUSE") | Some("APARTMENT")))
        );
    }

    #[test]
    fn test_locality_canonicalized_per_postcode() {
        let df = ErrorCorrector::default().correct(raw_listings());
        let localities = strings(&df, "locality");
        // "BRUXELLES" and "BRUSSELS" tie under 1000
        assert_eq!(localities[0], localities[1]);
        assert_eq!(localities[0].as_deref(), Some("BRUSSELS"));
        assert_eq!(localities[2].as_deref(), Some("GENT"));
    }

    #[test]
    fn test_text_and_categorical_fill() {
        let df = ErrorCorrector::default().correct(raw_listings());
        assert_eq!(
            strings(&df, "street"),
            vec![
                Some("Rue A".to_string()),
                Some(String::new()),
                Some("Kerkstraat".to_string())
            ]
        );
        assert_eq!(
            strings(&df, "kitchenType"),
            vec![
                Some("INSTALLED".to_string()),
                Some("missing value".to_string()),
                Some("SEMI_EQUIPPED".to_string())
            ]
        );
    }

    #[test]
    fn test_flags_presence_and_rooms() {
        let df = ErrorCorrector::default().correct(raw_listings());
        assert_eq!(ints(&df, "hasGarden"), vec![Some(1), Some(0), Some(0)]);
        assert_eq!(ints(&df, "garage"), vec![Some(1), Some(0), Some(-1)]);
        // 35 m² studio gets one bedroom
        assert_eq!(ints(&df, "bedroomCount"), vec![Some(3), Some(1), Some(2)]);
        // 35 m² < 100 → 1; 120.5 m² → mean of known [1] = 1
        assert_eq!(ints(&df, "bathroomCount"), vec![Some(1), Some(1), Some(1)]);
        assert_eq!(ints(&df, "habitableSurface"), vec![Some(150), Some(35), Some(120)]);
    }

    #[test]
    fn test_room_inference_disabled() {
        let config = CleaningConfig::builder()
            .infer_room_counts(false)
            .build()
            .unwrap();
        let df = ErrorCorrector::new(config).correct(raw_listings());
        assert_eq!(ints(&df, "bedroomCount"), vec![Some(3), Some(-1), Some(2)]);
    }

    #[test]
    fn test_configured_columns_dropped() {
        let (df, steps) = ErrorCorrector::default().try_correct(raw_listings()).unwrap();
        assert!(!has_column(&df, "monthlyCost"));
        assert!(steps.iter().any(|s| s.contains("monthlyCost")));
    }

    #[test]
    fn test_missing_price_column_is_empty() {
        let df = df!["postCode" => [1000i64]].unwrap();
        assert_eq!(ErrorCorrector::default().correct(df.clone()).height(), 0);
        assert!(
            ErrorCorrector::default()
                .try_correct(df)
                .unwrap_err()
                .is_schema_error()
        );
    }

    #[test]
    fn test_correction_is_idempotent() {
        let corrector = ErrorCorrector::default();
        let once = corrector.correct(raw_listings());
        let twice = corrector.correct(once.clone());
        assert!(once.equals_missing(&twice));
    }
}
