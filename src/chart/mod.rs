use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of heavenly stems. Stem codes run 1..=10.
pub const STEM_COUNT: usize = 10;
/// Number of earthly branches. Branch codes run 1..=12.
pub const BRANCH_COUNT: usize = 12;

const STEM_NAMES: [(&str, &str); STEM_COUNT] = [
    ("갑", "Gap"),
    ("을", "Eul"),
    ("병", "Byeong"),
    ("정", "Jeong"),
    ("무", "Mu"),
    ("기", "Gi"),
    ("경", "Gyeong"),
    ("신", "Sin"),
    ("임", "Im"),
    ("계", "Gye"),
];

const BRANCH_NAMES: [(&str, &str); BRANCH_COUNT] = [
    ("자", "Ja"),
    ("축", "Chuk"),
    ("인", "In"),
    ("묘", "Myo"),
    ("진", "Jin"),
    ("사", "Sa"),
    ("오", "O"),
    ("미", "Mi"),
    ("신", "Sin"),
    ("유", "Yu"),
    ("술", "Sul"),
    ("해", "Hae"),
];

/// One slot of a chart token.
///
/// The discriminant is the index into the raw six-value token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    YearStem = 0,
    YearBranch = 1,
    MonthStem = 2,
    MonthBranch = 3,
    DayStem = 4,
    DayBranch = 5,
}

impl Position {
    pub fn label(self) -> &'static str {
        match self {
            Position::YearStem => "year stem",
            Position::YearBranch => "year branch",
            Position::MonthStem => "month stem",
            Position::MonthBranch => "month branch",
            Position::DayStem => "day stem",
            Position::DayBranch => "day branch",
        }
    }
}

/// Six-integer encoding of one person's birth chart:
/// `[yearStem, yearBranch, monthStem, monthBranch, dayStem, dayBranch]`.
///
/// Values are kept raw. Range clamping only happens on the way into a
/// predictor (see [`ChartToken::clamped`]); the rule engine sees exactly what
/// the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartToken([i64; 6]);

impl ChartToken {
    pub fn new(values: [i64; 6]) -> Self {
        Self(values)
    }

    pub fn get(&self, position: Position) -> i64 {
        self.0[position as usize]
    }

    pub fn values(&self) -> [i64; 6] {
        self.0
    }

    pub fn year_stem(&self) -> i64 {
        self.get(Position::YearStem)
    }

    pub fn year_branch(&self) -> i64 {
        self.get(Position::YearBranch)
    }

    pub fn month_stem(&self) -> i64 {
        self.get(Position::MonthStem)
    }

    pub fn month_branch(&self) -> i64 {
        self.get(Position::MonthBranch)
    }

    pub fn day_stem(&self) -> i64 {
        self.get(Position::DayStem)
    }

    pub fn day_branch(&self) -> i64 {
        self.get(Position::DayBranch)
    }

    /// True when every stem is in 1..=10 and every branch in 1..=12.
    pub fn is_in_range(&self) -> bool {
        self.0.iter().enumerate().all(|(i, v)| {
            let max = if i % 2 == 0 { STEM_COUNT } else { BRANCH_COUNT };
            (1..=max as i64).contains(v)
        })
    }

    /// Copy with each value clamped into its stem/branch range.
    pub fn clamped(&self) -> Self {
        let mut values = self.0;
        for (i, v) in values.iter_mut().enumerate() {
            let max = if i % 2 == 0 { STEM_COUNT } else { BRANCH_COUNT };
            *v = (*v).clamp(1, max as i64);
        }
        Self(values)
    }

    /// Pillar names for display, e.g. `갑자 병인 정묘`. Out-of-range codes show as `?`.
    pub fn pillars(&self) -> String {
        [
            (self.year_stem(), self.year_branch()),
            (self.month_stem(), self.month_branch()),
            (self.day_stem(), self.day_branch()),
        ]
        .iter()
        .map(|&(s, b)| {
            format!(
                "{}{}",
                stem_name(s).map(|(h, _)| h).unwrap_or("?"),
                branch_name(b).map(|(h, _)| h).unwrap_or("?")
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
    }
}

impl From<[i64; 6]> for ChartToken {
    fn from(values: [i64; 6]) -> Self {
        Self(values)
    }
}

impl fmt::Display for ChartToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(f, "[{}, {}, {}, {}, {}, {}]", v[0], v[1], v[2], v[3], v[4], v[5])
    }
}

/// Hangul and romanized name of a stem code.
pub fn stem_name(code: i64) -> Option<(&'static str, &'static str)> {
    code.checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| STEM_NAMES.get(i).copied())
}

/// Hangul and romanized name of a branch code.
pub fn branch_name(code: i64) -> Option<(&'static str, &'static str)> {
    code.checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| BRANCH_NAMES.get(i).copied())
}

/// Gender only picks between two penalty magnitudes. `1` is male, every other
/// value is female.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    pub fn is_male(self) -> bool {
        self == Gender::Male
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}
