use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::{GenderedMagnitude, PenaltyConfig};
use super::tables;
use crate::chart::{ChartToken, Gender, Position};

use Position::{DayBranch, DayStem, MonthBranch, MonthStem, YearBranch, YearStem};

const DAY_PILLAR: &[(Position, Position)] = &[(DayStem, DayBranch)];
const MONTH_PILLAR: &[(Position, Position)] = &[(MonthStem, MonthBranch)];
const YEAR_PILLAR: &[(Position, Position)] = &[(YearStem, YearBranch)];

/// The eight sal categories. The discriminant is the penalty vector slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalCategory {
    Samhyeong = 0,
    Wonjin = 1,
    Hyeong = 2,
    Chung = 3,
    Pa = 4,
    Hae = 5,
    Baekho = 6,
    Goegang = 7,
}

impl SalCategory {
    pub const ALL: [SalCategory; 8] = [
        SalCategory::Samhyeong,
        SalCategory::Wonjin,
        SalCategory::Hyeong,
        SalCategory::Chung,
        SalCategory::Pa,
        SalCategory::Hae,
        SalCategory::Baekho,
        SalCategory::Goegang,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            SalCategory::Samhyeong => "Samhyeong",
            SalCategory::Wonjin => "Wonjin",
            SalCategory::Hyeong => "Hyeong",
            SalCategory::Chung => "Chung",
            SalCategory::Pa => "Pa",
            SalCategory::Hae => "Hae",
            SalCategory::Baekho => "Baekho",
            SalCategory::Goegang => "Goegang",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SalCategory::Samhyeong => "triple clash",
            SalCategory::Wonjin => "mutual resentment",
            SalCategory::Hyeong => "punishment",
            SalCategory::Chung => "clash",
            SalCategory::Pa => "destruction",
            SalCategory::Hae => "harm",
            SalCategory::Baekho => "white tiger",
            SalCategory::Goegang => "bad combination",
        }
    }
}

impl fmt::Display for SalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.description())
    }
}

/// Trigger condition evaluated against one person's raw token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    /// `anchor` holds `value` and `partner` holds one of `partners`.
    AnchorWith {
        anchor: Position,
        value: i64,
        partner: Position,
        partners: &'static [i64],
    },
    /// At least one of `pairs` is listed in `table`. Fires once.
    AnyPairIn {
        pairs: &'static [(Position, Position)],
        table: &'static [(i64, i64)],
    },
    /// Both positions hold the given values.
    ValuesAre {
        first: (Position, i64),
        second: (Position, i64),
    },
    /// Both positions hold the same value and it is in `set`.
    RepeatedIn {
        first: Position,
        second: Position,
        set: &'static [i64],
    },
    /// The two positions differ by exactly `distance`.
    Distance {
        first: Position,
        second: Position,
        distance: i64,
    },
}

impl Condition {
    pub fn matches(&self, token: &ChartToken) -> bool {
        match *self {
            Condition::AnchorWith {
                anchor,
                value,
                partner,
                partners,
            } => token.get(anchor) == value && partners.contains(&token.get(partner)),
            Condition::AnyPairIn { pairs, table } => pairs
                .iter()
                .any(|&(a, b)| tables::contains(table, token.get(a), token.get(b))),
            Condition::ValuesAre { first, second } => {
                token.get(first.0) == first.1 && token.get(second.0) == second.1
            }
            Condition::RepeatedIn { first, second, set } => {
                let v = token.get(first);
                v == token.get(second) && set.contains(&v)
            }
            Condition::Distance {
                first,
                second,
                distance,
            } => token.get(first).abs_diff(token.get(second)) == distance.unsigned_abs(),
        }
    }
}

/// Who a rule is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    FemaleOnly,
}

impl Audience {
    fn includes(self, gender: Gender) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::FemaleOnly => gender == Gender::Female,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub category: SalCategory,
    pub name: &'static str,
    pub condition: Condition,
    pub magnitude: GenderedMagnitude,
    pub audience: Audience,
}

impl Rule {
    fn new(
        category: SalCategory,
        name: &'static str,
        condition: Condition,
        magnitude: GenderedMagnitude,
    ) -> Self {
        Self {
            category,
            name,
            condition,
            magnitude,
            audience: Audience::Everyone,
        }
    }

    fn female_only(mut self) -> Self {
        self.audience = Audience::FemaleOnly;
        self
    }

    /// Deduction for this person, or `None` if the rule does not fire.
    pub fn evaluate(&self, token: &ChartToken, gender: Gender) -> Option<f64> {
        if self.audience.includes(gender) && self.condition.matches(token) {
            Some(self.magnitude.for_gender(gender))
        } else {
            None
        }
    }
}

/// Ordered list of sal rules. Rules are independent; every match deducts.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The eight standard categories with the given deductions.
    pub fn standard(penalties: &PenaltyConfig) -> Self {
        let mut rules = Vec::new();

        for &(anchor_value, partners) in tables::SAMHYEONG {
            for partner in [YearBranch, MonthBranch] {
                rules.push(Rule::new(
                    SalCategory::Samhyeong,
                    if partner == YearBranch {
                        "day branch completes triple with year branch"
                    } else {
                        "day branch completes triple with month branch"
                    },
                    Condition::AnchorWith {
                        anchor: DayBranch,
                        value: anchor_value,
                        partner,
                        partners,
                    },
                    penalties.samhyeong,
                ));
            }
        }

        rules.push(Rule::new(
            SalCategory::Wonjin,
            "day branch resents year or month branch",
            Condition::AnyPairIn {
                pairs: &[(DayBranch, YearBranch), (DayBranch, MonthBranch)],
                table: tables::RESENTMENT,
            },
            penalties.wonjin,
        ));
        rules.push(Rule::new(
            SalCategory::Wonjin,
            "year and month branches form gwimun",
            Condition::AnyPairIn {
                pairs: &[(YearBranch, MonthBranch)],
                table: tables::GWIMUN,
            },
            penalties.wonjin,
        ));

        let hyeong = penalties.hyeong;
        for (name, first, second) in [
            (
                "year stem 1 with month branch 4",
                (YearStem, 1),
                (MonthBranch, 4),
            ),
            ("year stem 1 with day branch 4", (YearStem, 1), (DayBranch, 4)),
            (
                "month branch 1 with day branch 4",
                (MonthBranch, 1),
                (DayBranch, 4),
            ),
        ] {
            rules.push(Rule::new(
                SalCategory::Hyeong,
                name,
                Condition::ValuesAre { first, second },
                hyeong,
            ));
        }
        for (name, first, second) in [
            ("self punishment in year and month", YearBranch, MonthBranch),
            ("self punishment in year and day", YearBranch, DayBranch),
            ("self punishment in month and day", MonthBranch, DayBranch),
        ] {
            rules.push(Rule::new(
                SalCategory::Hyeong,
                name,
                Condition::RepeatedIn {
                    first,
                    second,
                    set: tables::SELF_PUNISHING,
                },
                hyeong,
            ));
        }

        for (name, first, second, magnitude) in [
            (
                "day branch clashes with month branch",
                DayBranch,
                MonthBranch,
                penalties.chung.day_month,
            ),
            (
                "day branch clashes with year branch",
                DayBranch,
                YearBranch,
                penalties.chung.day_year,
            ),
            (
                "year branch clashes with month branch",
                YearBranch,
                MonthBranch,
                penalties.chung.year_month,
            ),
        ] {
            rules.push(Rule::new(
                SalCategory::Chung,
                name,
                Condition::Distance {
                    first,
                    second,
                    distance: 6,
                },
                GenderedMagnitude::fixed(magnitude),
            ));
        }

        rules.push(Rule::new(
            SalCategory::Pa,
            "day branch destroys month or year branch",
            Condition::AnyPairIn {
                pairs: &[(DayBranch, MonthBranch), (DayBranch, YearBranch)],
                table: tables::DESTRUCTION,
            },
            GenderedMagnitude::fixed(penalties.pa),
        ));
        rules.push(Rule::new(
            SalCategory::Hae,
            "day branch harms month or year branch",
            Condition::AnyPairIn {
                pairs: &[(DayBranch, MonthBranch), (DayBranch, YearBranch)],
                table: tables::HARM,
            },
            GenderedMagnitude::fixed(penalties.hae),
        ));

        rules.push(Rule::new(
            SalCategory::Baekho,
            "day pillar is a white tiger pillar",
            Condition::AnyPairIn {
                pairs: DAY_PILLAR,
                table: tables::BAEKHO,
            },
            penalties.baekho,
        ));

        for (name, pairs, magnitude) in [
            ("day pillar is goegang", DAY_PILLAR, penalties.goegang.day),
            ("month pillar is goegang", MONTH_PILLAR, penalties.goegang.month),
            ("year pillar is goegang", YEAR_PILLAR, penalties.goegang.year),
        ] {
            rules.push(
                Rule::new(
                    SalCategory::Goegang,
                    name,
                    Condition::AnyPairIn {
                        pairs,
                        table: tables::GOEGANG,
                    },
                    GenderedMagnitude::fixed(magnitude),
                )
                .female_only(),
            );
        }

        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Every rule that fires for this person, with its deduction.
    pub fn evaluate<'a>(
        &'a self,
        token: &'a ChartToken,
        gender: Gender,
    ) -> impl Iterator<Item = (&'a Rule, f64)> + 'a {
        self.rules
            .iter()
            .filter_map(move |rule| rule.evaluate(token, gender).map(|amount| (rule, amount)))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard(&PenaltyConfig::default())
    }
}
