//! Duplicate listing consolidation.
//!
//! The same property is often scraped several times, from different agencies
//! or with slightly different completeness. Rows sharing the same type, price,
//! location and bedroom count are collapsed into one record: the row with the
//! highest price is kept and its gaps are filled from the other rows.

use crate::config::ColumnNames;
use crate::error::{Result, ResultExt};
use crate::utils::{column_as_f64, column_as_strings, has_column, require_columns};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, error, info};

/// Name of the provenance column holding the group size.
pub const MERGED_COUNT_COLUMN: &str = "Merged_from_n_entries";

type GroupKey = (Option<String>, Option<String>, String, Option<String>);

/// Collapses listings of the same physical property.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    columns: ColumnNames,
}

impl Deduplicator {
    pub fn new(columns: ColumnNames) -> Self {
        Self { columns }
    }

    /// Deduplicate, logging failures and returning an empty table instead.
    pub fn deduplicate(&self, df: &DataFrame) -> DataFrame {
        match self.try_deduplicate(df) {
            Ok(result) => result,
            Err(e) => {
                error!("Deduplication failed: {}", e);
                DataFrame::empty()
            }
        }
    }

    /// Deduplicate, reporting why the table could not be processed.
    pub fn try_deduplicate(&self, df: &DataFrame) -> Result<DataFrame> {
        if df.height() == 0 {
            return Ok(df.clone());
        }

        let cols = &self.columns;
        require_columns(
            df,
            &[&cols.property_type, &cols.price, &cols.postcode, &cols.bedrooms],
        )
        .context("Deduplication")?;

        let groups = self.group_rows(df)?;
        let prices = column_as_f64(df, &cols.price)?;

        let representatives: Vec<usize> = groups
            .iter()
            .map(|rows| pick_representative(rows, &prices))
            .collect();

        let mut columns: Vec<Column> = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let nulls = series.is_null();

            let indices: Vec<IdxSize> = groups
                .iter()
                .zip(&representatives)
                .map(|(rows, &rep)| {
                    let source = if nulls.get(rep).unwrap_or(true) {
                        rows.iter()
                            .copied()
                            .find(|&row| !nulls.get(row).unwrap_or(true))
                            .unwrap_or(rep)
                    } else {
                        rep
                    };
                    source as IdxSize
                })
                .collect();

            let idx = IdxCa::from_vec("idx".into(), indices);
            columns.push(series.take(&idx)?.into_column());
        }

        let mut result = DataFrame::new(columns)?;

        if has_column(df, &cols.url) {
            let urls = column_as_strings(df, &cols.url)?;
            let joined: Vec<String> = groups.iter().map(|rows| join_urls(rows, &urls)).collect();
            result.with_column(Series::new(cols.url.as_str().into(), joined))?;
        }

        let counts = merged_counts(df, &groups)?;
        result.with_column(Series::new(MERGED_COUNT_COLUMN.into(), counts))?;

        info!(
            "Deduplication: {} rows -> {} properties ({} duplicates merged)",
            df.height(),
            result.height(),
            df.height() - result.height()
        );

        Ok(result)
    }

    /// Row indices per group, groups ordered by first appearance.
    fn group_rows(&self, df: &DataFrame) -> Result<Vec<Vec<usize>>> {
        let cols = &self.columns;
        let types = column_as_strings(df, &cols.property_type)?;
        let prices = column_as_strings(df, &cols.price)?;
        let bedrooms = column_as_strings(df, &cols.bedrooms)?;
        let locations = self.location_keys(df)?;

        let mut index: HashMap<GroupKey, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for (row, location) in locations.into_iter().enumerate() {
            let key = (
                types[row].clone(),
                prices[row].clone(),
                location,
                bedrooms[row].clone(),
            );
            match index.get(&key) {
                Some(&group) => groups[group].push(row),
                None => {
                    index.insert(key, groups.len());
                    groups.push(vec![row]);
                }
            }
        }

        debug!("{} rows form {} groups", df.height(), groups.len());
        Ok(groups)
    }

    /// Street, number, postal code and city joined by a single space.
    fn location_keys(&self, df: &DataFrame) -> Result<Vec<String>> {
        let cols = &self.columns;
        let mut parts: Vec<Vec<Option<String>>> = Vec::with_capacity(4);
        for name in [&cols.street, &cols.number, &cols.postcode, &cols.locality] {
            if has_column(df, name) {
                parts.push(column_as_strings(df, name)?);
            }
        }

        Ok((0..df.height())
            .map(|row| {
                parts
                    .iter()
                    .map(|part| part[row].as_deref().map(str::trim).unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect())
    }
}

/// Highest parsed price wins; the first row wins ties and unparseable groups.
fn pick_representative(rows: &[usize], prices: &[Option<f64>]) -> usize {
    let mut best = rows[0];
    let mut best_price = prices[best];
    for &row in &rows[1..] {
        if let Some(price) = prices[row]
            && best_price.is_none_or(|current| price > current)
        {
            best = row;
            best_price = Some(price);
        }
    }
    best
}

fn join_urls(rows: &[usize], urls: &[Option<String>]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for &row in rows {
        if let Some(url) = urls[row].as_deref().map(str::trim)
            && !url.is_empty()
            && !seen.contains(&url)
        {
            seen.push(url);
        }
    }
    seen.join(";")
}

/// Group sizes. A table that was already deduplicated carries its own counts,
/// which are summed so the total still matches the raw row count.
fn merged_counts(df: &DataFrame, groups: &[Vec<usize>]) -> Result<Vec<i64>> {
    if !has_column(df, MERGED_COUNT_COLUMN) {
        return Ok(groups.iter().map(|rows| rows.len() as i64).collect());
    }

    let previous = column_as_f64(df, MERGED_COUNT_COLUMN)?;
    Ok(groups
        .iter()
        .map(|rows| {
            rows.iter()
                .map(|&row| previous[row].map(|v| v.max(1.0) as i64).unwrap_or(1))
                .sum()
        })
        .collect())
}
