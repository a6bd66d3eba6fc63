//! Calculator form
//!
//! Holds the weight and age exactly as typed, restores them from a
//! [`ValueStore`] on start-up, saves every change, and produces a report only
//! when both inputs are usable.

use serde::Serialize;

use crate::db::DbResult;
use crate::portions::{parse_inputs, AgeBand, LifeStage, PortionEstimate, PortionTables};
use crate::store::ValueStore;

/// Store key for the weight input (lbs)
pub const WEIGHT_KEY: &str = "weight";
/// Store key for the age input (weeks)
pub const AGE_WEEKS_KEY: &str = "age_weeks";

/// Weight text used when nothing has been saved yet
pub const DEFAULT_WEIGHT: &str = "10";
/// Age text used when nothing has been saved yet
pub const DEFAULT_AGE_WEEKS: &str = "9";

/// Meals the daily amount is split into
pub const MEALS_PER_DAY: u32 = 3;

/// Portions ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortionReport {
    pub weight_lbs: f64,
    pub age_weeks: f64,
    pub life_stage: LifeStage,
    pub age_band: AgeBand,
    pub raw_food_grams: f64,
    pub kibble_grams: f64,
    pub daily_blend_grams: f64,
    pub meals_per_day: u32,
    pub raw_food_per_meal_grams: f64,
    pub kibble_per_meal_grams: f64,
    pub blend_per_meal_grams: f64,
    pub summary: Vec<String>,
}

impl PortionReport {
    pub fn from_estimate(estimate: &PortionEstimate) -> Self {
        let meals = f64::from(MEALS_PER_DAY);
        let daily_blend = estimate.daily_blend_grams();
        let raw_per_meal = estimate.raw_food_grams / meals;
        let kibble_per_meal = estimate.kibble_grams / meals;

        let summary = vec![
            format!("Raw food daily: {:.0} g", estimate.raw_food_grams),
            format!("Kibble daily: {:.0} g", estimate.kibble_grams),
            format!(
                "Raw food per serving ({}/day): {:.0} g",
                MEALS_PER_DAY, raw_per_meal
            ),
            format!(
                "Kibble per serving ({}/day): {:.0} g",
                MEALS_PER_DAY, kibble_per_meal
            ),
        ];

        Self {
            weight_lbs: estimate.weight_lbs,
            age_weeks: estimate.age_weeks,
            life_stage: estimate.life_stage,
            age_band: estimate.age_band,
            raw_food_grams: estimate.raw_food_grams,
            kibble_grams: estimate.kibble_grams,
            daily_blend_grams: daily_blend,
            meals_per_day: MEALS_PER_DAY,
            raw_food_per_meal_grams: raw_per_meal,
            kibble_per_meal_grams: kibble_per_meal,
            blend_per_meal_grams: daily_blend / meals,
            summary,
        }
    }
}

fn is_usable(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Compute a report for numeric inputs without touching any store
///
/// Returns `None` unless both values are finite and greater than zero.
pub fn estimate_portions(
    tables: &PortionTables,
    weight_lbs: f64,
    age_weeks: f64,
) -> Option<PortionReport> {
    if !is_usable(weight_lbs) || !is_usable(age_weeks) {
        return None;
    }
    Some(PortionReport::from_estimate(
        &tables.estimate(weight_lbs, age_weeks),
    ))
}

/// Serializable view of the form
#[derive(Debug, Clone, Serialize)]
pub struct FormState {
    pub weight: String,
    pub age_weeks: String,
    /// Absent when either input is empty or not a positive number
    pub result: Option<PortionReport>,
}

/// The calculator form bound to a store and a table set
pub struct CalculatorForm<'t, S: ValueStore> {
    store: S,
    tables: &'t PortionTables,
    weight: String,
    age_weeks: String,
}

impl<'t, S: ValueStore> CalculatorForm<'t, S> {
    /// Read both inputs once, falling back to the defaults
    pub fn restore(store: S, tables: &'t PortionTables) -> Self {
        let weight = restore_value(&store, WEIGHT_KEY, DEFAULT_WEIGHT);
        let age_weeks = restore_value(&store, AGE_WEEKS_KEY, DEFAULT_AGE_WEEKS);

        Self {
            store,
            tables,
            weight,
            age_weeks,
        }
    }

    /// Update whichever inputs are given and save them in one write
    ///
    /// On a store error nothing is saved and the form keeps its old values.
    pub fn set_inputs(&mut self, weight: Option<&str>, age_weeks: Option<&str>) -> DbResult<()> {
        let mut entries = Vec::with_capacity(2);
        if let Some(text) = weight {
            entries.push((WEIGHT_KEY, text));
        }
        if let Some(text) = age_weeks {
            entries.push((AGE_WEEKS_KEY, text));
        }
        if entries.is_empty() {
            return Ok(());
        }

        self.store.set_many(&entries)?;

        if let Some(text) = weight {
            self.weight = text.to_string();
        }
        if let Some(text) = age_weeks {
            self.age_weeks = text.to_string();
        }
        Ok(())
    }

    /// Current report, `None` unless both inputs parse
    pub fn report(&self) -> Option<PortionReport> {
        let (weight_lbs, age_weeks) = parse_inputs(&self.weight, &self.age_weeks)?;
        estimate_portions(self.tables, weight_lbs, age_weeks)
    }

    pub fn state(&self) -> FormState {
        FormState {
            weight: self.weight.clone(),
            age_weeks: self.age_weeks.clone(),
            result: self.report(),
        }
    }
}

fn restore_value<S: ValueStore>(store: &S, key: &str, default: &str) -> String {
    match store.get(key) {
        Ok(Some(value)) => value,
        Ok(None) => default.to_string(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to restore saved value, using default");
            default.to_string()
        }
    }
}

// ============================================================================
// Tool helpers
// ============================================================================

/// Restore the form and return its state
pub fn get_saved_inputs<S: ValueStore>(store: S, tables: &PortionTables) -> FormState {
    CalculatorForm::restore(store, tables).state()
}

/// Apply whichever inputs were supplied, save them, and return the new state
pub fn update_inputs<S: ValueStore>(
    store: S,
    tables: &PortionTables,
    weight: Option<&str>,
    age_weeks: Option<&str>,
) -> Result<FormState, String> {
    let mut form = CalculatorForm::restore(store, tables);

    form.set_inputs(weight, age_weeks)
        .map_err(|e| format!("Failed to save inputs: {}", e))?;

    let state = form.state();
    tracing::debug!(
        weight = %state.weight,
        age_weeks = %state.age_weeks,
        has_result = state.result.is_some(),
        "Calculator inputs updated"
    );
    Ok(state)
}
