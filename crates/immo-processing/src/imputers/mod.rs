//! Imputation module for handling missing values.
//!
//! This module provides:
//! - Group mode imputation (canonical value per key)
//! - Statistical room-count inference from the living area

mod group_mode;
mod statistical;

pub use group_mode::GroupModeImputer;
pub use statistical::{NOT_RECORDED, StatisticalImputer};
