//! Portion estimation module
//!
//! Reference tables, the estimator, and form input parsing.

pub mod estimator;
pub mod input;
pub mod tables;

pub use estimator::{estimate, estimate_kibble_grams, estimate_raw_food_grams, PortionEstimate};
pub use input::{parse_inputs, parse_positive};
pub use tables::{
    AgeBand, GramRange, KibbleRow, LifeStage, PortionTables, RawFoodBracket, TableError,
    ADULT_AGE_WEEKS, CUP_TO_GRAMS, WEEKS_PER_MONTH,
};
