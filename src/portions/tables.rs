//! Portion reference tables
//!
//! Raw-food brackets and kibble knots, plus the cup-to-grams factor. The
//! canonical tables are built once per process; a JSON file can replace them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grams per cup of kibble for the canonical tables
pub const CUP_TO_GRAMS: f64 = 112.0;

/// Age in weeks at which a dog switches to the adult raw-food range
pub const ADULT_AGE_WEEKS: f64 = 44.0;

/// Average weeks per month, used to place an age in a kibble band
pub const WEEKS_PER_MONTH: f64 = 4.345;

/// Tolerance when comparing bracket edges and boundary values
const EDGE_EPSILON: f64 = 1e-9;

/// Errors raised when a table set fails validation or cannot be loaded
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Raw food table is empty")]
    EmptyRawTable,

    #[error("Kibble table is empty")]
    EmptyKibbleTable,

    #[error("Raw food table must start at 0 lbs, first bracket starts at {0}")]
    RawTableStart(f64),

    #[error("Bracket {index}: min weight {min} exceeds max weight {max}")]
    InvertedBracket { index: usize, min: f64, max: f64 },

    #[error("Bracket {index}: starts at {start} lbs, previous ends at {previous_end} lbs")]
    BracketDiscontiguous {
        index: usize,
        start: f64,
        previous_end: f64,
    },

    #[error("Bracket {index}: {stage} range [{min}, {max}] is invalid")]
    InvalidGramRange {
        index: usize,
        stage: LifeStage,
        min: f64,
        max: f64,
    },

    #[error("Kibble row {index}: weight {weight} is not above previous weight {previous}")]
    UnsortedKibbleRow {
        index: usize,
        weight: f64,
        previous: f64,
    },

    #[error("Kibble row {index}: {band} cup value {cups} is invalid")]
    InvalidCups { index: usize, band: AgeBand, cups: f64 },

    #[error("Invalid weight value {0}")]
    InvalidWeight(f64),

    #[error("Cup-to-grams factor must be positive, got {0}")]
    InvalidCupToGrams(f64),

    #[error("Failed to read tables file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse tables: {0}")]
    Json(#[from] serde_json::Error),
}

/// Life stage used to pick a raw-food gram range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeStage {
    Puppy,
    Adult,
}

impl LifeStage {
    /// Puppy below 44 weeks, adult from 44 weeks on
    pub fn from_age_weeks(age_weeks: f64) -> Self {
        if age_weeks >= ADULT_AGE_WEEKS {
            LifeStage::Adult
        } else {
            LifeStage::Puppy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifeStage::Puppy => "puppy",
            LifeStage::Adult => "adult",
        }
    }
}

impl fmt::Display for LifeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse age category (in months) used to pick a kibble cup allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "2-4")]
    TwoToFour,
    #[serde(rename = "4-8")]
    FourToEight,
    #[serde(rename = "8-12")]
    EightToTwelve,
    #[serde(rename = "adult")]
    Adult,
}

impl AgeBand {
    pub fn from_months(months: f64) -> Self {
        if months < 4.0 {
            AgeBand::TwoToFour
        } else if months < 8.0 {
            AgeBand::FourToEight
        } else if months < 12.0 {
            AgeBand::EightToTwelve
        } else {
            AgeBand::Adult
        }
    }

    pub fn from_age_weeks(age_weeks: f64) -> Self {
        Self::from_months(age_weeks / WEEKS_PER_MONTH)
    }

    /// Table key for this band
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBand::TwoToFour => "2-4",
            AgeBand::FourToEight => "4-8",
            AgeBand::EightToTwelve => "8-12",
            AgeBand::Adult => "adult",
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily gram allowance, serialized as `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GramRange(pub f64, pub f64);

impl GramRange {
    pub fn min(&self) -> f64 {
        self.0
    }

    pub fn max(&self) -> f64 {
        self.1
    }

    /// Value at fractional position `t` between min and max
    pub fn at(&self, t: f64) -> f64 {
        self.0 + t * (self.1 - self.0)
    }
}

/// One weight range of the raw-food table (bounds inclusive, in pounds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFoodBracket {
    pub min_weight: f64,
    pub max_weight: f64,
    pub puppy: GramRange,
    pub adult: GramRange,
}

impl RawFoodBracket {
    pub fn new(min_weight: f64, max_weight: f64, puppy: (f64, f64), adult: (f64, f64)) -> Self {
        Self {
            min_weight,
            max_weight,
            puppy: GramRange(puppy.0, puppy.1),
            adult: GramRange(adult.0, adult.1),
        }
    }

    pub fn contains(&self, weight: f64) -> bool {
        weight >= self.min_weight && weight <= self.max_weight
    }

    pub fn range_for(&self, stage: LifeStage) -> GramRange {
        match stage {
            LifeStage::Puppy => self.puppy,
            LifeStage::Adult => self.adult,
        }
    }

    /// Fractional position of `weight` in this bracket; 0 for a zero-width bracket
    pub fn position(&self, weight: f64) -> f64 {
        let span = self.max_weight - self.min_weight;
        if span == 0.0 {
            0.0
        } else {
            (weight - self.min_weight) / span
        }
    }
}

/// One knot of the kibble table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KibbleRow {
    pub weight: f64,
    #[serde(default)]
    pub cups: BTreeMap<AgeBand, f64>,
}

impl KibbleRow {
    pub fn new(weight: f64, cups: &[(AgeBand, f64)]) -> Self {
        Self {
            weight,
            cups: cups.iter().copied().collect(),
        }
    }

    /// Cups for a band; a band the row does not define counts as zero
    pub fn cups_for(&self, band: AgeBand) -> f64 {
        self.cups.get(&band).copied().unwrap_or(0.0)
    }
}

/// Complete set of reference data used by the estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortionTables {
    pub cup_to_grams: f64,
    pub raw_food: Vec<RawFoodBracket>,
    pub kibble: Vec<KibbleRow>,
}

impl PortionTables {
    /// Shared canonical tables, built on first use
    pub fn standard() -> &'static PortionTables {
        static STANDARD: OnceLock<PortionTables> = OnceLock::new();
        STANDARD.get_or_init(PortionTables::canonical)
    }

    /// Build a fresh copy of the canonical tables
    pub fn canonical() -> Self {
        use AgeBand::*;

        let raw_food = vec![
            RawFoodBracket::new(0.0, 5.0, (36.0, 91.0), (50.0, 60.0)),
            RawFoodBracket::new(5.0, 10.0, (91.0, 182.0), (60.0, 100.0)),
            RawFoodBracket::new(10.0, 25.0, (182.0, 454.0), (100.0, 275.0)),
            RawFoodBracket::new(25.0, 50.0, (454.0, 908.0), (275.0, 550.0)),
            RawFoodBracket::new(50.0, 75.0, (908.0, 1362.0), (550.0, 800.0)),
            RawFoodBracket::new(75.0, 100.0, (1362.0, 1816.0), (800.0, 1000.0)),
            RawFoodBracket::new(100.0, 125.0, (1816.0, 2270.0), (1000.0, 1200.0)),
        ];

        let kibble = vec![
            KibbleRow::new(
                3.0,
                &[(TwoToFour, 0.33), (FourToEight, 0.33), (EightToTwelve, 0.33), (Adult, 0.33)],
            ),
            KibbleRow::new(
                5.0,
                &[(TwoToFour, 1.0), (FourToEight, 0.5), (EightToTwelve, 0.5), (Adult, 0.33)],
            ),
            KibbleRow::new(
                10.0,
                &[(TwoToFour, 1.5), (FourToEight, 0.75), (EightToTwelve, 0.75), (Adult, 0.66)],
            ),
            KibbleRow::new(
                20.0,
                &[(TwoToFour, 2.75), (FourToEight, 1.33), (EightToTwelve, 1.33), (Adult, 1.33)],
            ),
            KibbleRow::new(
                30.0,
                &[(TwoToFour, 3.33), (FourToEight, 2.25), (EightToTwelve, 2.25), (Adult, 2.0)],
            ),
            KibbleRow::new(
                40.0,
                &[(TwoToFour, 4.33), (FourToEight, 3.0), (EightToTwelve, 2.66), (Adult, 2.5)],
            ),
            KibbleRow::new(60.0, &[(FourToEight, 3.75), (EightToTwelve, 3.0), (Adult, 3.25)]),
            KibbleRow::new(80.0, &[(FourToEight, 5.33), (EightToTwelve, 4.25), (Adult, 4.0)]),
            KibbleRow::new(100.0, &[(FourToEight, 6.25), (EightToTwelve, 5.0), (Adult, 4.75)]),
            KibbleRow::new(125.0, &[(Adult, 6.0)]),
        ];

        Self {
            cup_to_grams: CUP_TO_GRAMS,
            raw_food,
            kibble,
        }
    }

    /// Parse and validate tables from JSON
    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        let tables: PortionTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Read, parse and validate tables from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let tables = Self::from_json_str(&contents)?;
        tracing::info!(
            path = %path.as_ref().display(),
            brackets = tables.raw_food.len(),
            knots = tables.kibble.len(),
            "Loaded portion tables"
        );
        Ok(tables)
    }

    /// Check the structural invariants of both tables
    ///
    /// A value jump where two raw brackets meet is reported as a warning only:
    /// the lower bracket wins at the shared weight, so the result stays defined.
    pub fn validate(&self) -> Result<(), TableError> {
        if !self.cup_to_grams.is_finite() || self.cup_to_grams <= 0.0 {
            return Err(TableError::InvalidCupToGrams(self.cup_to_grams));
        }

        let first = self.raw_food.first().ok_or(TableError::EmptyRawTable)?;
        if first.min_weight != 0.0 {
            return Err(TableError::RawTableStart(first.min_weight));
        }

        for (index, bracket) in self.raw_food.iter().enumerate() {
            for w in [bracket.min_weight, bracket.max_weight] {
                if !w.is_finite() {
                    return Err(TableError::InvalidWeight(w));
                }
            }
            if bracket.min_weight > bracket.max_weight {
                return Err(TableError::InvertedBracket {
                    index,
                    min: bracket.min_weight,
                    max: bracket.max_weight,
                });
            }
            for stage in [LifeStage::Puppy, LifeStage::Adult] {
                let range = bracket.range_for(stage);
                let valid = range.min().is_finite()
                    && range.max().is_finite()
                    && range.min() >= 0.0
                    && range.min() <= range.max();
                if !valid {
                    return Err(TableError::InvalidGramRange {
                        index,
                        stage,
                        min: range.min(),
                        max: range.max(),
                    });
                }
            }

            if index > 0 {
                let previous = &self.raw_food[index - 1];
                if (bracket.min_weight - previous.max_weight).abs() > EDGE_EPSILON {
                    return Err(TableError::BracketDiscontiguous {
                        index,
                        start: bracket.min_weight,
                        previous_end: previous.max_weight,
                    });
                }
                for stage in [LifeStage::Puppy, LifeStage::Adult] {
                    let below = previous.range_for(stage).max();
                    let above = bracket.range_for(stage).min();
                    if (below - above).abs() > EDGE_EPSILON {
                        tracing::warn!(
                            weight = bracket.min_weight,
                            %stage,
                            below,
                            above,
                            "Raw food brackets disagree at shared boundary"
                        );
                    }
                }
            }
        }

        if self.kibble.is_empty() {
            return Err(TableError::EmptyKibbleTable);
        }

        for (index, row) in self.kibble.iter().enumerate() {
            if !row.weight.is_finite() || row.weight < 0.0 {
                return Err(TableError::InvalidWeight(row.weight));
            }
            if index > 0 {
                let previous = self.kibble[index - 1].weight;
                if row.weight <= previous {
                    return Err(TableError::UnsortedKibbleRow {
                        index,
                        weight: row.weight,
                        previous,
                    });
                }
            }
            for (band, cups) in &row.cups {
                if !cups.is_finite() || *cups < 0.0 {
                    return Err(TableError::InvalidCups {
                        index,
                        band: *band,
                        cups: *cups,
                    });
                }
            }
        }

        Ok(())
    }

    /// Heaviest weight covered by the raw-food table
    pub fn max_raw_weight(&self) -> f64 {
        self.raw_food.last().map(|b| b.max_weight).unwrap_or(0.0)
    }

    /// Lightest and heaviest kibble knots
    pub fn kibble_weight_range(&self) -> Option<(f64, f64)> {
        match (self.kibble.first(), self.kibble.last()) {
            (Some(first), Some(last)) => Some((first.weight, last.weight)),
            _ => None,
        }
    }
}
