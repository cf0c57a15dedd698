use serde::{Deserialize, Serialize};

use crate::chart::Gender;

/// Deduction that depends on the person's gender.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GenderedMagnitude {
    pub male: f64,
    pub female: f64,
}

impl GenderedMagnitude {
    pub const fn new(male: f64, female: f64) -> Self {
        Self { male, female }
    }

    /// Same deduction for both genders.
    pub const fn fixed(value: f64) -> Self {
        Self {
            male: value,
            female: value,
        }
    }

    pub fn for_gender(&self, gender: Gender) -> f64 {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
        }
    }
}

/// Chung deductions, one per compared branch pair.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClashMagnitudes {
    pub day_month: f64,
    pub day_year: f64,
    pub year_month: f64,
}

/// Goegang deductions, one per pillar.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PillarMagnitudes {
    pub day: f64,
    pub month: f64,
    pub year: f64,
}

/// Deductions for each sal category.
///
/// Omitted keys keep their defaults. Example YAML:
/// ```yaml
/// penalties:
///   samhyeong: { male: 8, female: 9.5 }
///   chung: { day_month: 10, day_year: 8, year_month: 6 }
///   pa: 8
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct PenaltyConfig {
    pub samhyeong: GenderedMagnitude,
    pub wonjin: GenderedMagnitude,
    pub hyeong: GenderedMagnitude,
    pub chung: ClashMagnitudes,
    pub pa: f64,
    pub hae: f64,
    pub baekho: GenderedMagnitude,
    pub goegang: PillarMagnitudes,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            samhyeong: GenderedMagnitude::new(8.0, 9.5),
            wonjin: GenderedMagnitude::new(7.0, 8.2),
            hyeong: GenderedMagnitude::fixed(6.0),
            chung: ClashMagnitudes {
                day_month: 10.0,
                day_year: 8.0,
                year_month: 6.0,
            },
            pa: 8.0,
            hae: 8.0,
            baekho: GenderedMagnitude::new(0.0, 10.0),
            goegang: PillarMagnitudes {
                day: 10.0,
                month: 6.0,
                year: 4.0,
            },
        }
    }
}
