//! Belgian region derived from the postal code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column added by the normalizer when regions are enabled.
pub const REGION_COLUMN: &str = "region";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Brussels,
    Wallonia,
    Flanders,
    Unknown,
}

impl Region {
    /// Region for a postal code.
    ///
    /// 1000-1299 Brussels, 1300-1499 and 4000-7999 Wallonia, 1500-3999 and
    /// 8000-9999 Flanders. Anything else, including the -1 sentinel, is
    /// `Unknown`.
    pub fn from_postcode(postcode: i64) -> Self {
        match postcode {
            1000..=1299 => Self::Brussels,
            1300..=1499 | 4000..=7999 => Self::Wallonia,
            1500..=3999 | 8000..=9999 => Self::Flanders,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brussels => "Brussels",
            Self::Wallonia => "Wallonia",
            Self::Flanders => "Flanders",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
