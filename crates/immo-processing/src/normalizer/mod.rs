//! Categorical normalization.
//!
//! Maps categorical text columns to ordinal codes using fixed
//! [`CodeTable`]s. Each table adds a `<source>Normalize` `Int64` column next
//! to the untouched source column. Optionally derives a `region` column from
//! the postal code, and can turn `-1` sentinels back into nulls for
//! statistical use.

mod region;
mod tables;

pub use region::{REGION_COLUMN, Region};
pub use tables::{
    BUILDING_CONDITION, CodeTable, EPC_SCORE, FLOOD_ZONE_TYPE, HEATING_TYPE, KITCHEN_TYPE,
    NORMALIZED_SUFFIX, NormalizationTables,
};

use crate::config::CleaningConfig;
use crate::error::Result;
use crate::imputers::NOT_RECORDED;
use crate::utils::{column_as_f64, column_as_strings, has_column};
use polars::prelude::*;
use tracing::{debug, error, info, warn};

/// Adds ordinal code columns to a corrected table.
#[derive(Debug, Clone)]
pub struct Normalizer {
    tables: NormalizationTables,
    region_from: Option<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizationTables::default())
    }
}

impl Normalizer {
    pub fn new(tables: NormalizationTables) -> Self {
        Self {
            tables,
            region_from: None,
        }
    }

    /// Normalizer configured from the cleaning options.
    pub fn from_config(config: &CleaningConfig, tables: NormalizationTables) -> Self {
        let normalizer = Self::new(tables);
        if config.add_region {
            normalizer.with_region(&config.columns.postcode)
        } else {
            normalizer
        }
    }

    /// Also derive a `region` column from the given postal code column.
    pub fn with_region(mut self, postcode_column: impl Into<String>) -> Self {
        self.region_from = Some(postcode_column.into());
        self
    }

    /// Normalize, logging failures and returning an empty table instead.
    pub fn normalize(&self, df: DataFrame) -> DataFrame {
        match self.try_normalize(df) {
            Ok((result, _)) => result,
            Err(e) => {
                error!("Normalization failed: {}", e);
                DataFrame::empty()
            }
        }
    }

    /// Normalize and return the list of actions taken.
    pub fn try_normalize(&self, mut df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let mut steps = Vec::new();
        if df.height() == 0 {
            return Ok((df, steps));
        }

        for table in self.tables.iter() {
            if !has_column(&df, table.source) {
                warn!("Column '{}' not found, skipping its code table", table.source);
                continue;
            }

            let values = column_as_strings(&df, table.source)?;
            let codes: Vec<i64> = values.iter().map(|v| table.code(v.as_deref())).collect();
            let unmapped = values
                .iter()
                .flatten()
                .filter(|v| !v.trim().is_empty() && !is_known(table, v))
                .count();

            let target = table.target();
            df.with_column(Series::new(target.as_str().into(), codes))?;
            steps.push(format!("Normalized '{}' into '{}'", table.source, target));
            if unmapped > 0 {
                debug!(
                    "{} values of '{}' are not in its code table, coded as {}",
                    unmapped, table.source, NOT_RECORDED
                );
            }
        }

        if let Some(postcode_column) = &self.region_from {
            self.add_region(&mut df, postcode_column, &mut steps)?;
        }

        info!(
            "Normalization: {} code columns added",
            steps.iter().filter(|s| s.starts_with("Normalized")).count()
        );
        Ok((df, steps))
    }

    fn add_region(
        &self,
        df: &mut DataFrame,
        postcode_column: &str,
        steps: &mut Vec<String>,
    ) -> Result<()> {
        if !has_column(df, postcode_column) {
            warn!("Column '{}' not found, no region added", postcode_column);
            return Ok(());
        }

        let regions: Vec<&str> = column_as_f64(df, postcode_column)?
            .into_iter()
            .map(|code| {
                code.map(|c| Region::from_postcode(c as i64))
                    .unwrap_or(Region::Unknown)
                    .as_str()
            })
            .collect();

        df.with_column(Series::new(REGION_COLUMN.into(), regions))?;
        steps.push(format!("Derived '{}' from '{}'", REGION_COLUMN, postcode_column));
        Ok(())
    }

    /// Replace `-1` sentinels with nulls in every numeric column.
    ///
    /// Integer columns become `Int64`, float columns `Float64`. Returns the
    /// table and the number of cells restored.
    pub fn restore_missing(mut df: DataFrame) -> Result<(DataFrame, usize)> {
        let mut restored = 0;
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        for name in &names {
            let series = df.column(name)?.as_materialized_series().clone();
            let dtype = series.dtype().clone();

            let replaced = if dtype.is_integer() {
                let values: Vec<Option<i64>> = series
                    .cast(&DataType::Int64)?
                    .i64()?
                    .into_iter()
                    .map(|v| v.filter(|x| *x != NOT_RECORDED))
                    .collect();
                Series::new(name.as_str().into(), values)
            } else if dtype.is_float() {
                let values: Vec<Option<f64>> = series
                    .cast(&DataType::Float64)?
                    .f64()?
                    .into_iter()
                    .map(|v| v.filter(|x| *x != NOT_RECORDED as f64))
                    .collect();
                Series::new(name.as_str().into(), values)
            } else {
                continue;
            };

            let count = replaced.null_count() - series.null_count();
            if count > 0 {
                restored += count;
                df.replace(name, replaced)?;
            }
        }

        debug!("Restored {} sentinel values to null", restored);
        Ok((df, restored))
    }
}

/// Text present as a key of the table (after trimming).
fn is_known(table: &CodeTable, value: &str) -> bool {
    let value = value.trim();
    table.entries.iter().any(|(text, _)| *text == value)
}
