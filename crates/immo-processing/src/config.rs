//! Configuration types for the listings cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern.
//! Every policy the scraped dataset left ambiguous (project listings,
//! unparseable postal codes, room inference, dropped columns) is a field here
//! rather than a hardcoded rule.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to do with listings that are neither a house nor an apartment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProjectListingPolicy {
    /// Keep every listing type
    #[default]
    Keep,
    /// Keep only HOUSE and APARTMENT listings
    Drop,
}

/// What to do with rows whose postal code has no leading digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PostcodePolicy {
    /// Drop the row
    #[default]
    Drop,
    /// Keep the row and store -1
    Sentinel,
}

/// Names of the columns the pipeline reasons about.
///
/// Defaults follow the scraped listings export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub property_type: String,
    pub price: String,
    pub street: String,
    pub number: String,
    pub postcode: String,
    pub locality: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub living_area: String,
    pub url: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            property_type: "type".to_string(),
            price: "price".to_string(),
            street: "street".to_string(),
            number: "number".to_string(),
            postcode: "postCode".to_string(),
            locality: "locality".to_string(),
            bedrooms: "bedroomCount".to_string(),
            bathrooms: "bathroomCount".to_string(),
            living_area: "habitableSurface".to_string(),
            url: "url".to_string(),
        }
    }
}

impl ColumnNames {
    /// Map a column name of the default export onto the configured one.
    /// Names that are not key columns come back unchanged.
    pub fn rename(&self, default_name: &str) -> String {
        let defaults = Self::default();
        [
            (defaults.property_type, &self.property_type),
            (defaults.price, &self.price),
            (defaults.street, &self.street),
            (defaults.number, &self.number),
            (defaults.postcode, &self.postcode),
            (defaults.locality, &self.locality),
            (defaults.bedrooms, &self.bedrooms),
            (defaults.bathrooms, &self.bathrooms),
            (defaults.living_area, &self.living_area),
            (defaults.url, &self.url),
        ]
        .into_iter()
        .find(|(default, _)| default == default_name)
        .map(|(_, configured)| configured.clone())
        .unwrap_or_else(|| default_name.to_string())
    }

    fn rename_all(&self, names: &[String]) -> Vec<String> {
        names.iter().map(|name| self.rename(name)).collect()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Columns removed by the corrector when present.
pub fn default_drop_columns() -> Vec<String> {
    strings(&[
        "monthlyCost",
        "accessibleDisabledPeople",
        "hasBalcony",
        "Unnamed: 0",
        "id",
        "streetFacadeWidth",
    ])
}

/// Free-text columns: trimmed, null becomes "".
pub fn default_text_columns() -> Vec<String> {
    strings(&["street", "number", "url"])
}

/// Closed-vocabulary columns: trimmed, null becomes "missing value".
pub fn default_categorical_columns() -> Vec<String> {
    strings(&[
        "gardenOrientation",
        "terraceOrientation",
        "kitchenType",
        "floodZoneType",
        "heatingType",
        "buildingCondition",
        "epcScore",
        "subtype",
        "province",
        "locality",
        "type",
    ])
}

/// Boolean-like amenity columns: missing becomes 0.
pub fn default_flag_columns() -> Vec<String> {
    strings(&[
        "hasAirConditioning",
        "hasSwimmingPool",
        "hasDressingRoom",
        "hasFireplace",
        "hasThermicPanels",
        "hasArmoredDoor",
        "hasHeatPump",
        "hasPhotovoltaicPanels",
        "hasOffice",
        "hasAttic",
        "hasDiningRoom",
        "hasVisiophone",
        "hasGarden",
        "hasLift",
        "hasBasement",
        "hasLivingRoom",
        "hasTerrace",
        "renovationObligation",
    ])
}

/// Count columns collapsed to a presence flag (missing -1, zero 0, positive 1).
pub fn default_presence_columns() -> Vec<String> {
    strings(&["garage", "parkingCountIndoor", "parkingCountOutdoor"])
}

/// Integer-domain columns: unparseable or missing becomes -1.
pub fn default_integer_columns() -> Vec<String> {
    strings(&[
        "bedroomCount",
        "bathroomCount",
        "roomCount",
        "toiletCount",
        "floorCount",
        "facedeCount",
        "buildingConstructionYear",
        "gardenSurface",
        "diningRoomSurface",
        "kitchenSurface",
        "terraceSurface",
        "livingRoomSurface",
        "landSurface",
        "habitableSurface",
        "epcScoreValue",
        "mobiscore",
    ])
}

/// Configuration for the cleaning pipeline.
///
/// Use [`CleaningConfig::builder()`] to create a new configuration with the
/// fluent API, or deserialize it from JSON with [`CleaningConfig::from_json_file`].
///
/// # Example
///
/// ```rust,ignore
/// use immo_processing::config::{CleaningConfig, PostcodePolicy};
///
/// let config = CleaningConfig::builder()
///     .input_path("data/properties.csv")
///     .output_path("data/cleaned_properties.csv")
///     .postcode_policy(PostcodePolicy::Drop)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Raw listings file. Format is picked from the extension.
    /// Default: "data/properties.csv"
    pub input_path: PathBuf,

    /// Destination CSV. Parent directories are created on demand.
    /// Default: "data/cleaned_properties.csv"
    pub output_path: PathBuf,

    /// Optional JSON report path.
    /// Default: None
    pub report_path: Option<PathBuf>,

    /// Column names used by deduplication and correction.
    pub columns: ColumnNames,

    /// Columns dropped by the corrector when present.
    pub drop_columns: Vec<String>,

    /// Free-text columns filled with "".
    pub text_columns: Vec<String>,

    /// Categorical columns filled with "missing value".
    pub categorical_columns: Vec<String>,

    /// Boolean-like columns coerced to 0/1, missing 0.
    pub flag_columns: Vec<String>,

    /// Count columns collapsed to -1/0/1.
    pub presence_columns: Vec<String>,

    /// Integer-domain columns, missing -1.
    pub integer_columns: Vec<String>,

    /// Project listing retention.
    /// Default: Keep
    pub project_listings: ProjectListingPolicy,

    /// Postal code extraction failure handling.
    /// Default: Drop
    pub postcode_policy: PostcodePolicy,

    /// Infer missing bedroom/bathroom counts from the living area.
    /// Default: true
    pub infer_room_counts: bool,

    /// Living area (m²) under which a missing bedroom count becomes 1.
    /// Default: 40.0
    pub bedroom_area_threshold: f64,

    /// Living area (m²) under which a missing bathroom count becomes 1.
    /// Default: 100.0
    pub bathroom_area_threshold: f64,

    /// Uppercase locality names before computing the per-postcode mode.
    /// Default: true
    pub uppercase_locality: bool,

    /// Add a `region` column derived from the postal code.
    /// Default: false
    pub add_region: bool,

    /// Turn -1 sentinels back into nulls before export.
    /// Default: false
    pub restore_missing: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/properties.csv"),
            output_path: PathBuf::from("data/cleaned_properties.csv"),
            report_path: None,
            columns: ColumnNames::default(),
            drop_columns: default_drop_columns(),
            text_columns: default_text_columns(),
            categorical_columns: default_categorical_columns(),
            flag_columns: default_flag_columns(),
            presence_columns: default_presence_columns(),
            integer_columns: default_integer_columns(),
            project_listings: ProjectListingPolicy::default(),
            postcode_policy: PostcodePolicy::default(),
            infer_room_counts: true,
            bedroom_area_threshold: 40.0,
            bathroom_area_threshold: 100.0,
            uppercase_locality: true,
            add_region: false,
            restore_missing: false,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Read a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        let mut config: Self = serde_json::from_value(value.clone())?;

        // Default fill lists follow renamed key columns unless given explicitly.
        if value.get("text_columns").is_none() {
            config.text_columns = config.columns.rename_all(&config.text_columns);
        }
        if value.get("categorical_columns").is_none() {
            config.categorical_columns = config.columns.rename_all(&config.categorical_columns);
        }

        config
            .validate()
            .map_err(|e| crate::error::CleaningError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("bedroom_area_threshold", self.bedroom_area_threshold),
            ("bathroom_area_threshold", self.bathroom_area_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigValidationError::InvalidThreshold {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyOutputPath);
        }

        for required in [&self.columns.price, &self.columns.postcode] {
            if self.drop_columns.contains(required) {
                return Err(ConfigValidationError::DroppedRequiredColumn(
                    required.clone(),
                ));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid area threshold for '{field}': {value} (must be a positive number)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Output path must not be empty")]
    EmptyOutputPath,

    #[error("Column '{0}' is required and cannot be in drop_columns")]
    DroppedRequiredColumn(String),
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    report_path: Option<PathBuf>,
    columns: Option<ColumnNames>,
    drop_columns: Option<Vec<String>>,
    text_columns: Option<Vec<String>>,
    categorical_columns: Option<Vec<String>>,
    flag_columns: Option<Vec<String>>,
    presence_columns: Option<Vec<String>>,
    integer_columns: Option<Vec<String>>,
    project_listings: Option<ProjectListingPolicy>,
    postcode_policy: Option<PostcodePolicy>,
    infer_room_counts: Option<bool>,
    bedroom_area_threshold: Option<f64>,
    bathroom_area_threshold: Option<f64>,
    uppercase_locality: Option<bool>,
    add_region: Option<bool>,
    restore_missing: Option<bool>,
}

impl CleaningConfigBuilder {
    /// Start from an existing configuration, e.g. one read from JSON.
    pub fn from_config(config: CleaningConfig) -> Self {
        Self {
            input_path: Some(config.input_path),
            output_path: Some(config.output_path),
            report_path: config.report_path,
            columns: Some(config.columns),
            drop_columns: Some(config.drop_columns),
            text_columns: Some(config.text_columns),
            categorical_columns: Some(config.categorical_columns),
            flag_columns: Some(config.flag_columns),
            presence_columns: Some(config.presence_columns),
            integer_columns: Some(config.integer_columns),
            project_listings: Some(config.project_listings),
            postcode_policy: Some(config.postcode_policy),
            infer_room_counts: Some(config.infer_room_counts),
            bedroom_area_threshold: Some(config.bedroom_area_threshold),
            bathroom_area_threshold: Some(config.bathroom_area_threshold),
            uppercase_locality: Some(config.uppercase_locality),
            add_region: Some(config.add_region),
            restore_missing: Some(config.restore_missing),
        }
    }

    /// Set the raw input file.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the destination CSV file.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Write a JSON report next to the export.
    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    /// Override the column names.
    pub fn columns(mut self, columns: ColumnNames) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Set the columns dropped by the corrector.
    pub fn drop_columns(mut self, columns: Vec<String>) -> Self {
        self.drop_columns = Some(columns);
        self
    }

    /// Set the free-text columns.
    pub fn text_columns(mut self, columns: Vec<String>) -> Self {
        self.text_columns = Some(columns);
        self
    }

    /// Set the categorical columns.
    pub fn categorical_columns(mut self, columns: Vec<String>) -> Self {
        self.categorical_columns = Some(columns);
        self
    }

    /// Set the boolean-like columns.
    pub fn flag_columns(mut self, columns: Vec<String>) -> Self {
        self.flag_columns = Some(columns);
        self
    }

    /// Set the count columns collapsed to a presence flag.
    pub fn presence_columns(mut self, columns: Vec<String>) -> Self {
        self.presence_columns = Some(columns);
        self
    }

    /// Set the integer-domain columns.
    pub fn integer_columns(mut self, columns: Vec<String>) -> Self {
        self.integer_columns = Some(columns);
        self
    }

    /// Set the project listing policy.
    pub fn project_listings(mut self, policy: ProjectListingPolicy) -> Self {
        self.project_listings = Some(policy);
        self
    }

    /// Set the postal code policy.
    pub fn postcode_policy(mut self, policy: PostcodePolicy) -> Self {
        self.postcode_policy = Some(policy);
        self
    }

    /// Enable or disable room count inference.
    pub fn infer_room_counts(mut self, enable: bool) -> Self {
        self.infer_room_counts = Some(enable);
        self
    }

    /// Set the bedroom inference area threshold (m²).
    pub fn bedroom_area_threshold(mut self, threshold: f64) -> Self {
        self.bedroom_area_threshold = Some(threshold);
        self
    }

    /// Set the bathroom inference area threshold (m²).
    pub fn bathroom_area_threshold(mut self, threshold: f64) -> Self {
        self.bathroom_area_threshold = Some(threshold);
        self
    }

    /// Enable or disable locality uppercasing.
    pub fn uppercase_locality(mut self, enable: bool) -> Self {
        self.uppercase_locality = Some(enable);
        self
    }

    /// Enable or disable the derived `region` column.
    pub fn add_region(mut self, enable: bool) -> Self {
        self.add_region = Some(enable);
        self
    }

    /// Enable or disable sentinel re-expansion before export.
    pub fn restore_missing(mut self, enable: bool) -> Self {
        self.restore_missing = Some(enable);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let defaults = CleaningConfig::default();
        let columns = self.columns.unwrap_or(defaults.columns);
        let config = CleaningConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            output_path: self.output_path.unwrap_or(defaults.output_path),
            report_path: self.report_path,
            drop_columns: self.drop_columns.unwrap_or(defaults.drop_columns),
            text_columns: self
                .text_columns
                .unwrap_or_else(|| columns.rename_all(&defaults.text_columns)),
            categorical_columns: self
                .categorical_columns
                .unwrap_or_else(|| columns.rename_all(&defaults.categorical_columns)),
            columns,
            flag_columns: self.flag_columns.unwrap_or(defaults.flag_columns),
            presence_columns: self.presence_columns.unwrap_or(defaults.presence_columns),
            integer_columns: self.integer_columns.unwrap_or(defaults.integer_columns),
            project_listings: self.project_listings.unwrap_or_default(),
            postcode_policy: self.postcode_policy.unwrap_or_default(),
            infer_room_counts: self.infer_room_counts.unwrap_or(true),
            bedroom_area_threshold: self.bedroom_area_threshold.unwrap_or(40.0),
            bathroom_area_threshold: self.bathroom_area_threshold.unwrap_or(100.0),
            uppercase_locality: self.uppercase_locality.unwrap_or(true),
            add_region: self.add_region.unwrap_or(false),
            restore_missing: self.restore_missing.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CleaningConfig::default();
        assert_eq!(config.columns.price, "price");
        assert_eq!(config.columns.postcode, "postCode");
        assert_eq!(config.postcode_policy, PostcodePolicy::Drop);
        assert_eq!(config.project_listings, ProjectListingPolicy::Keep);
        assert!(config.infer_room_counts);
        assert!(config.drop_columns.contains(&"streetFacadeWidth".to_string()));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CleaningConfig::builder()
            .output_path("out/clean.csv")
            .project_listings(ProjectListingPolicy::Drop)
            .postcode_policy(PostcodePolicy::Sentinel)
            .infer_room_counts(false)
            .add_region(true)
            .build()
            .unwrap();

        assert_eq!(config.output_path, PathBuf::from("out/clean.csv"));
        assert_eq!(config.project_listings, ProjectListingPolicy::Drop);
        assert_eq!(config.postcode_policy, PostcodePolicy::Sentinel);
        assert!(!config.infer_room_counts);
        assert!(config.add_region);
    }

    #[test]
    fn test_validation_invalid_threshold() {
        let result = CleaningConfig::builder()
            .bedroom_area_threshold(-5.0)
            .build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_validation_rejects_dropping_price() {
        let result = CleaningConfig::builder()
            .drop_columns(vec!["price".to_string()])
            .build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DroppedRequiredColumn(col) if col == "price"
        ));
    }

    #[test]
    fn test_from_config_round_trip() {
        let original = CleaningConfig::builder().add_region(true).build().unwrap();
        let rebuilt = CleaningConfigBuilder::from_config(original.clone())
            .restore_missing(true)
            .build()
            .unwrap();
        assert!(rebuilt.add_region);
        assert!(rebuilt.restore_missing);
        assert_eq!(rebuilt.flag_columns, original.flag_columns);
    }

    #[test]
    fn test_renamed_key_columns_follow_into_fill_lists() {
        let columns = ColumnNames {
            street: "rue".to_string(),
            locality: "city".to_string(),
            property_type: "kind".to_string(),
            ..ColumnNames::default()
        };
        assert_eq!(columns.rename("locality"), "city");
        assert_eq!(columns.rename("epcScore"), "epcScore");

        let config = CleaningConfig::builder().columns(columns.clone()).build().unwrap();
        assert_eq!(config.text_columns, vec!["rue", "number", "url"]);
        assert!(config.categorical_columns.contains(&"city".to_string()));
        assert!(config.categorical_columns.contains(&"kind".to_string()));
        assert!(!config.categorical_columns.contains(&"locality".to_string()));

        let explicit = CleaningConfig::builder()
            .columns(columns)
            .text_columns(vec!["street".to_string()])
            .build()
            .unwrap();
        assert_eq!(explicit.text_columns, vec!["street"]);
    }

    #[test]
    fn test_json_file_renames_default_fill_lists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cleaning.json");
        std::fs::write(
            &path,
            r#"{
                "columns": { "street": "rue", "locality": "city" },
                "categorical_columns": ["locality"]
            }"#,
        )
        .unwrap();

        let config = CleaningConfig::from_json_file(&path).unwrap();
        assert_eq!(config.text_columns, vec!["rue", "number", "url"]);
        assert_eq!(config.categorical_columns, vec!["locality"]);
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{
            "output_path": "custom/out.csv",
            "postcode_policy": "Sentinel",
            "project_listings": "Drop",
            "columns": { "locality": "city" }
        }"#;

        let config: CleaningConfig =
            serde_json::from_str(json).expect("Should deserialize partial JSON");

        assert_eq!(config.output_path, PathBuf::from("custom/out.csv"));
        assert_eq!(config.postcode_policy, PostcodePolicy::Sentinel);
        assert_eq!(config.project_listings, ProjectListingPolicy::Drop);
        assert_eq!(config.columns.locality, "city");
        assert_eq!(config.columns.price, "price");
        assert_eq!(config.bedroom_area_threshold, 40.0);
    }
}
