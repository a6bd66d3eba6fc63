//! Portion estimation
//!
//! Turns a weight (lbs) and age (weeks) into daily raw-food and kibble grams.
//! Invalid or out-of-range input yields 0 grams rather than an error.

use serde::Serialize;

use super::tables::{AgeBand, LifeStage, PortionTables};

/// Both daily portions for one dog, with the table selections that produced them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortionEstimate {
    pub weight_lbs: f64,
    pub age_weeks: f64,
    pub life_stage: LifeStage,
    pub age_band: AgeBand,
    pub raw_food_grams: f64,
    pub kibble_grams: f64,
}

impl PortionEstimate {
    /// Even blend of raw food and kibble, in grams per day
    pub fn daily_blend_grams(&self) -> f64 {
        (self.raw_food_grams + self.kibble_grams) / 2.0
    }

    /// True when either table produced a usable portion
    pub fn has_portion(&self) -> bool {
        self.raw_food_grams > 0.0 || self.kibble_grams > 0.0
    }
}

fn usable(weight_lbs: f64, age_weeks: f64) -> bool {
    weight_lbs.is_finite() && age_weeks.is_finite() && weight_lbs > 0.0 && age_weeks > 0.0
}

impl PortionTables {
    /// Raw food grams per day from the bracket containing `weight_lbs`
    pub fn raw_food_grams(&self, weight_lbs: f64, age_weeks: f64) -> f64 {
        if !usable(weight_lbs, age_weeks) {
            return 0.0;
        }

        let stage = LifeStage::from_age_weeks(age_weeks);

        // First match wins where two brackets share an edge
        let Some(bracket) = self.raw_food.iter().find(|b| b.contains(weight_lbs)) else {
            return 0.0;
        };

        let t = bracket.position(weight_lbs);
        bracket.range_for(stage).at(t).max(0.0)
    }

    /// Kibble grams per day, interpolated between the knots around `weight_lbs`
    pub fn kibble_grams(&self, weight_lbs: f64, age_weeks: f64) -> f64 {
        if !usable(weight_lbs, age_weeks) {
            return 0.0;
        }

        let band = AgeBand::from_age_weeks(age_weeks);

        let lower = self.kibble.iter().rev().find(|r| r.weight <= weight_lbs);
        let upper = self.kibble.iter().find(|r| r.weight >= weight_lbs);

        let (Some(lower), Some(upper)) = (lower, upper) else {
            return 0.0;
        };

        let cups = if lower.weight == upper.weight {
            lower.cups_for(band)
        } else {
            let t = (weight_lbs - lower.weight) / (upper.weight - lower.weight);
            let from = lower.cups_for(band);
            let to = upper.cups_for(band);
            from + t * (to - from)
        };

        (cups * self.cup_to_grams).max(0.0)
    }

    /// Evaluate both tables for one dog
    pub fn estimate(&self, weight_lbs: f64, age_weeks: f64) -> PortionEstimate {
        PortionEstimate {
            weight_lbs,
            age_weeks,
            life_stage: LifeStage::from_age_weeks(age_weeks),
            age_band: AgeBand::from_age_weeks(age_weeks),
            raw_food_grams: self.raw_food_grams(weight_lbs, age_weeks),
            kibble_grams: self.kibble_grams(weight_lbs, age_weeks),
        }
    }
}

/// Raw food grams per day using the canonical tables
pub fn estimate_raw_food_grams(weight_lbs: f64, age_weeks: f64) -> f64 {
    PortionTables::standard().raw_food_grams(weight_lbs, age_weeks)
}

/// Kibble grams per day using the canonical tables
pub fn estimate_kibble_grams(weight_lbs: f64, age_weeks: f64) -> f64 {
    PortionTables::standard().kibble_grams(weight_lbs, age_weeks)
}

/// Both portions using the canonical tables
pub fn estimate(weight_lbs: f64, age_weeks: f64) -> PortionEstimate {
    PortionTables::standard().estimate(weight_lbs, age_weeks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portions::{KibbleRow, RawFoodBracket};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_small_puppy_scenario() {
        assert!(close(estimate_raw_food_grams(10.0, 9.0), 182.0));
        assert!(close(estimate_kibble_grams(10.0, 9.0), 168.0));
    }

    #[test]
    fn test_adult_scenario() {
        assert!(close(estimate_raw_food_grams(60.0, 200.0), 650.0));
        assert!(close(estimate_kibble_grams(60.0, 200.0), 364.0));
    }

    #[test]
    fn test_out_of_range_weight_is_zero() {
        for age in [1.0, 9.0, 44.0, 200.0] {
            assert_eq!(estimate_raw_food_grams(130.0, age), 0.0);
            assert_eq!(estimate_kibble_grams(130.0, age), 0.0);
            assert_eq!(estimate_raw_food_grams(-1.0, age), 0.0);
            assert_eq!(estimate_kibble_grams(-1.0, age), 0.0);
        }
    }

    #[test]
    fn test_invalid_input_is_zero() {
        assert_eq!(estimate_raw_food_grams(0.0, 9.0), 0.0);
        assert_eq!(estimate_raw_food_grams(10.0, 0.0), 0.0);
        assert_eq!(estimate_raw_food_grams(f64::NAN, 9.0), 0.0);
        assert_eq!(estimate_kibble_grams(10.0, f64::INFINITY), 0.0);
        assert_eq!(estimate_kibble_grams(10.0, -3.0), 0.0);
    }

    #[test]
    fn test_light_dog_below_first_knot_has_no_kibble() {
        assert_eq!(estimate_kibble_grams(2.0, 9.0), 0.0);
        assert!(estimate_raw_food_grams(2.0, 9.0) > 0.0);
    }

    #[test]
    fn test_non_negative_across_table() {
        let mut weight = 0.0;
        while weight <= 125.0 {
            for age in [0.0, 1.0, 9.0, 20.0, 43.999, 44.0, 60.0, 200.0] {
                assert!(estimate_raw_food_grams(weight, age) >= 0.0);
                assert!(estimate_kibble_grams(weight, age) >= 0.0);
            }
            weight += 0.5;
        }
    }

    #[test]
    fn test_raw_bracket_boundaries_are_continuous() {
        let tables = PortionTables::standard();
        for pair in tables.raw_food.windows(2) {
            let (below, above) = (&pair[0], &pair[1]);
            let edge = below.max_weight;
            for stage in [LifeStage::Puppy, LifeStage::Adult] {
                let from_below = below.range_for(stage).at(below.position(edge));
                let from_above = above.range_for(stage).at(above.position(edge));
                assert!(close(from_below, from_above), "jump at {} lbs ({})", edge, stage);
            }
        }
    }

    #[test]
    fn test_kibble_knots_are_continuous() {
        let tables = PortionTables::standard();
        for row in &tables.kibble {
            for age in [9.0, 20.0, 40.0, 200.0] {
                let at = tables.kibble_grams(row.weight, age);
                let just_below = tables.kibble_grams(row.weight - 1e-7, age);
                let just_above = tables.kibble_grams(row.weight + 1e-7, age);
                if row.weight > 3.0 {
                    assert!((at - just_below).abs() < 1e-3);
                }
                if row.weight < 125.0 {
                    assert!((at - just_above).abs() < 1e-3);
                }
            }
        }
    }

    #[test]
    fn test_life_stage_switch_for_raw_food() {
        // 60 lbs sits inside [50, 75]: puppy 908..1362, adult 550..800
        assert!(close(estimate_raw_food_grams(60.0, 43.999), 908.0 + 0.4 * 454.0));
        assert!(close(estimate_raw_food_grams(60.0, 44.0), 650.0));
    }

    #[test]
    fn test_age_band_switch_for_kibble() {
        let weeks_at = |months: f64| months * crate::portions::tables::WEEKS_PER_MONTH;
        // 20 lbs row: 2.75 / 1.33 / 1.33 / 1.33 cups
        assert!(close(estimate_kibble_grams(20.0, weeks_at(3.9)), 2.75 * 112.0));
        assert!(close(estimate_kibble_grams(20.0, weeks_at(4.1)), 1.33 * 112.0));
        // 40 lbs row: 4.33 / 3 / 2.66 / 2.5 cups
        assert!(close(estimate_kibble_grams(40.0, weeks_at(7.9)), 3.0 * 112.0));
        assert!(close(estimate_kibble_grams(40.0, weeks_at(8.1)), 2.66 * 112.0));
        assert!(close(estimate_kibble_grams(40.0, weeks_at(11.9)), 2.66 * 112.0));
        assert!(close(estimate_kibble_grams(40.0, weeks_at(12.1)), 2.5 * 112.0));
    }

    #[test]
    fn test_kibble_interpolates_between_knots() {
        // Halfway between 20 (1.33) and 30 (2.0) adult cups
        let expected = (1.33 + 2.0) / 2.0 * 112.0;
        assert!(close(estimate_kibble_grams(25.0, 200.0), expected));
    }

    #[test]
    fn test_missing_band_interpolates_toward_zero() {
        // 2-4 band: 40 lbs has 4.33 cups, 60 lbs has none
        let expected = 4.33 / 2.0 * 112.0;
        assert!(close(estimate_kibble_grams(50.0, 9.0), expected));
        assert_eq!(estimate_kibble_grams(125.0, 9.0), 0.0);
    }

    #[test]
    fn test_shared_edge_uses_lower_bracket() {
        let tables = PortionTables {
            cup_to_grams: 100.0,
            raw_food: vec![
                RawFoodBracket::new(0.0, 10.0, (0.0, 100.0), (0.0, 100.0)),
                RawFoodBracket::new(10.0, 20.0, (500.0, 600.0), (500.0, 600.0)),
            ],
            kibble: PortionTables::canonical().kibble,
        };
        assert!(close(tables.raw_food_grams(10.0, 9.0), 100.0));
    }

    #[test]
    fn test_zero_width_bracket_uses_min() {
        let tables = PortionTables {
            cup_to_grams: 100.0,
            raw_food: vec![
                RawFoodBracket::new(0.0, 0.5, (10.0, 10.0), (10.0, 10.0)),
                RawFoodBracket::new(0.5, 0.5, (42.0, 99.0), (42.0, 99.0)),
            ],
            kibble: PortionTables::canonical().kibble,
        };
        assert!(close(tables.raw_food_grams(0.5, 9.0), 10.0));

        let only = PortionTables {
            raw_food: vec![RawFoodBracket::new(0.5, 0.5, (42.0, 99.0), (42.0, 99.0))],
            ..tables
        };
        assert!(close(only.raw_food_grams(0.5, 9.0), 42.0));
    }

    #[test]
    fn test_single_row_kibble_table() {
        let tables = PortionTables {
            cup_to_grams: 100.0,
            raw_food: PortionTables::canonical().raw_food,
            kibble: vec![KibbleRow::new(10.0, &[(AgeBand::Adult, 2.0)])],
        };
        assert!(close(tables.kibble_grams(10.0, 200.0), 200.0));
        assert_eq!(tables.kibble_grams(10.0, 9.0), 0.0);
        assert_eq!(tables.kibble_grams(11.0, 200.0), 0.0);
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let first = estimate(33.3, 27.0);
        let second = estimate(33.3, 27.0);
        assert_eq!(first, second);
        assert_eq!(first.life_stage, LifeStage::Puppy);
        assert_eq!(first.age_band, AgeBand::FourToEight);
    }

    #[test]
    fn test_daily_blend() {
        let est = estimate(10.0, 9.0);
        assert!(close(est.daily_blend_grams(), (182.0 + 168.0) / 2.0));
        assert!(est.has_portion());
        assert!(!estimate(130.0, 9.0).has_portion());
    }
}
