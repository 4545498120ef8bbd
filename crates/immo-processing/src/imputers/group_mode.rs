//! Mode-by-group imputation.

use crate::error::Result;
use crate::utils::{column_as_strings, deterministic_mode, require_columns};
use polars::prelude::*;
use std::collections::HashMap;

/// Replaces every value of a target column by the most frequent value among
/// the rows sharing the same key.
///
/// Used to canonicalize free-text place names against the postal code:
/// "Bruxelles", "BRUSSEL" and "Brussels" under 1000 all become the value that
/// occurs most often for 1000. Ties resolve to the lexicographically smallest
/// value. Groups without a single known value are left as they are, and so
/// are rows whose key is null or one of the ignored placeholder keys.
#[derive(Debug, Clone)]
pub struct GroupModeImputer {
    key: String,
    target: String,
    ignored_keys: Vec<String>,
}

impl GroupModeImputer {
    pub fn new(key: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            target: target.into(),
            ignored_keys: Vec::new(),
        }
    }

    /// Treat `key` as "no key": such rows neither vote nor get rewritten.
    pub fn ignore_key(mut self, key: impl ToString) -> Self {
        self.ignored_keys.push(key.to_string());
        self
    }

    fn is_grouped(&self, key: &Option<String>) -> bool {
        key.as_ref().is_some_and(|k| !self.ignored_keys.contains(k))
    }

    /// Mode of the target column for each key value.
    pub fn group_modes(&self, df: &DataFrame) -> Result<HashMap<Option<String>, String>> {
        require_columns(df, &[&self.key, &self.target])?;
        let keys = column_as_strings(df, &self.key)?;
        let values = column_as_strings(df, &self.target)?;

        let mut grouped: HashMap<Option<String>, Vec<&str>> = HashMap::new();
        for (key, value) in keys.iter().zip(&values) {
            if !self.is_grouped(key) {
                continue;
            }
            if let Some(value) = value.as_deref() {
                grouped.entry(key.clone()).or_default().push(value);
            }
        }

        Ok(grouped
            .into_iter()
            .filter_map(|(key, values)| deterministic_mode(values).map(|mode| (key, mode)))
            .collect())
    }

    /// Apply the per-group mode in place. Returns the number of changed cells.
    pub fn apply(&self, df: &mut DataFrame, processing_steps: &mut Vec<String>) -> Result<usize> {
        let modes = self.group_modes(df)?;
        let keys = column_as_strings(df, &self.key)?;
        let values = column_as_strings(df, &self.target)?;

        let mut changed = 0;
        let canonical: Vec<Option<String>> = keys
            .iter()
            .zip(values)
            .map(|(key, value)| match modes.get(key) {
                Some(mode) => {
                    if value.as_deref() != Some(mode.as_str()) {
                        changed += 1;
                    }
                    Some(mode.clone())
                }
                None => value,
            })
            .collect();

        df.replace(&self.target, Series::new(self.target.as_str().into(), canonical))?;

        if changed > 0 {
            processing_steps.push(format!(
                "Canonicalized {} '{}' values to the most frequent value per '{}' ({} groups)",
                changed,
                self.target,
                self.key,
                modes.len()
            ));
        }

        Ok(changed)
    }
}
