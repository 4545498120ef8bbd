//! Fixed ordinal code tables.
//!
//! Codes never depend on the data: the same text always yields the same code
//! across runs. Every table carries an explicit `"missing value" → -1` entry,
//! and text absent from a table also maps to -1.

use crate::cleaner::MISSING_VALUE;
use crate::imputers::NOT_RECORDED;

/// Suffix appended to a source column name to form its code column.
pub const NORMALIZED_SUFFIX: &str = "Normalize";

/// Immutable text → code mapping for one categorical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeTable {
    /// Column holding the text values.
    pub source: &'static str,
    pub entries: &'static [(&'static str, i64)],
}

impl CodeTable {
    /// Code for a value. Values are trimmed; null, blank and unmapped text
    /// give -1.
    pub fn code(&self, value: Option<&str>) -> i64 {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return NOT_RECORDED;
        };
        self.entries
            .iter()
            .find(|(text, _)| *text == value)
            .map(|(_, code)| *code)
            .unwrap_or(NOT_RECORDED)
    }

    /// Name of the generated code column, e.g. `epcScoreNormalize`.
    pub fn target(&self) -> String {
        format!("{}{}", self.source, NORMALIZED_SUFFIX)
    }
}

/// Building condition, from good to worst.
pub const BUILDING_CONDITION: CodeTable = CodeTable {
    source: "buildingCondition",
    entries: &[
        (MISSING_VALUE, -1),
        ("GOOD", 1),
        ("AS_NEW", 2),
        ("TO_RENOVATE", 3),
        ("TO_BE_DONE_UP", 4),
        ("JUST_RENOVATED", 5),
        ("TO_RESTORE", 6),
    ],
};

/// EPC grade. Ranges such as `G_C` take the worse bound.
pub const EPC_SCORE: CodeTable = CodeTable {
    source: "epcScore",
    entries: &[
        (MISSING_VALUE, -1),
        ("A++", 1),
        ("A+", 2),
        ("A", 3),
        ("B", 4),
        ("C", 5),
        ("D", 6),
        ("E", 7),
        ("F", 8),
        ("G", 9),
        ("G_C", 9),
        ("F_D", 8),
        ("C_A", 5),
        ("F_C", 8),
        ("E_C", 7),
        ("C_B", 5),
        ("E_D", 7),
        ("G_F", 9),
        ("D_C", 6),
        ("G_E", 9),
        ("X", 0),
    ],
};

pub const HEATING_TYPE: CodeTable = CodeTable {
    source: "heatingType",
    entries: &[
        (MISSING_VALUE, -1),
        ("GAS", 1),
        ("FUELOIL", 2),
        ("ELECTRIC", 3),
        ("PELLET", 4),
        ("WOOD", 5),
        ("SOLAR", 6),
        ("CARBON", 7),
    ],
};

pub const FLOOD_ZONE_TYPE: CodeTable = CodeTable {
    source: "floodZoneType",
    entries: &[
        (MISSING_VALUE, -1),
        ("NON_FLOOD_ZONE", 1),
        ("POSSIBLE_FLOOD_ZONE", 2),
        ("RECOGNIZED_FLOOD_ZONE", 3),
        ("RECOGNIZED_N_CIRCUMSCRIBED_FLOOD_ZONE", 4),
        ("CIRCUMSCRIBED_WATERSIDE_ZONE", 5),
        ("CIRCUMSCRIBED_FLOOD_ZONE", 6),
        ("POSSIBLE_N_CIRCUMSCRIBED_FLOOD_ZONE", 7),
        ("POSSIBLE_N_CIRCUMSCRIBED_WATERSIDE_ZONE", 8),
        ("RECOGNIZED_N_CIRCUMSCRIBED_WATERSIDE_FLOOD_ZONE", 9),
    ],
};

/// Kitchen equipment. `USA_` variants share the plain variant's code.
pub const KITCHEN_TYPE: CodeTable = CodeTable {
    source: "kitchenType",
    entries: &[
        (MISSING_VALUE, -1),
        ("NOT_INSTALLED", 0),
        ("SEMI_EQUIPPED", 1),
        ("INSTALLED", 2),
        ("HYPER_EQUIPPED", 3),
        ("USA_UNINSTALLED", 0),
        ("USA_SEMI_EQUIPPED", 1),
        ("USA_INSTALLED", 2),
        ("USA_HYPER_EQUIPPED", 3),
    ],
};

/// The set of code tables applied by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationTables {
    tables: Vec<CodeTable>,
}

impl Default for NormalizationTables {
    fn default() -> Self {
        Self::new(vec![
            BUILDING_CONDITION,
            EPC_SCORE,
            HEATING_TYPE,
            FLOOD_ZONE_TYPE,
            KITCHEN_TYPE,
        ])
    }
}

impl NormalizationTables {
    pub fn new(tables: Vec<CodeTable>) -> Self {
        Self { tables }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodeTable> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
