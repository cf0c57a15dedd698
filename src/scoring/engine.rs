use serde::Serialize;
use std::fmt;

use super::rules::{RuleSet, SalCategory};
use crate::chart::{ChartToken, Gender};
use crate::predictor::PredictorRegistry;

/// Each raw prediction is rescaled onto a 0..50 sub-score.
pub const SUB_SCORE_SCALE: f64 = 50.0;
/// Upper bound of the base score.
pub const MAX_SCORE: f64 = 100.0;

/// Per-person deductions, one slot per sal category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PenaltyVector([f64; 8]);

impl PenaltyVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, category: SalCategory, amount: f64) {
        self.0[category.index()] += amount;
    }

    pub fn get(&self, category: SalCategory) -> f64 {
        self.0[category.index()]
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn as_array(&self) -> [f64; 8] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (SalCategory, f64)> + '_ {
        SalCategory::ALL.iter().map(move |&c| (c, self.get(c)))
    }
}

/// Which side of the pairing a penalty belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Person {
    A,
    B,
}

impl Person {
    pub fn index(self) -> usize {
        match self {
            Person::A => 0,
            Person::B => 1,
        }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Person::A => write!(f, "person0"),
            Person::B => write!(f, "person1"),
        }
    }
}

/// One triggered rule, kept for audit output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiredRule {
    pub person: Person,
    pub category: SalCategory,
    pub rule: &'static str,
    pub amount: f64,
}

/// Both charts and genders of a pairing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairingRequest {
    pub token0: ChartToken,
    pub token1: ChartToken,
    pub gender0: Gender,
    pub gender1: Gender,
}

impl PairingRequest {
    pub fn new(token0: ChartToken, gender0: Gender, token1: ChartToken, gender1: Gender) -> Self {
        Self {
            token0,
            token1,
            gender0,
            gender1,
        }
    }

    fn people(&self) -> [(Person, &ChartToken, Gender); 2] {
        [
            (Person::A, &self.token0, self.gender0),
            (Person::B, &self.token1, self.gender1),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairingResult {
    pub base_score: f64,
    pub final_score: f64,
    pub sal: [PenaltyVector; 2],
    pub fired: Vec<FiredRule>,
}

impl PairingResult {
    pub fn sal0(&self) -> &PenaltyVector {
        &self.sal[0]
    }

    pub fn sal1(&self) -> &PenaltyVector {
        &self.sal[1]
    }

    pub fn total_deduction(&self) -> f64 {
        self.base_score - self.final_score
    }
}

/// Rescale two raw predictions and cap the sum into `[0, 100]`.
pub fn combine_base_score(stem_prediction: f64, branch_prediction: f64) -> f64 {
    let score = stem_prediction * SUB_SCORE_SCALE + branch_prediction * SUB_SCORE_SCALE;
    score.clamp(0.0, MAX_SCORE)
}

/// Run every rule for both people, deducting from `base_score`.
pub fn apply_penalties(
    rules: &RuleSet,
    request: &PairingRequest,
    base_score: f64,
) -> PairingResult {
    let mut score = base_score;
    let mut sal = [PenaltyVector::new(), PenaltyVector::new()];
    let mut fired = Vec::new();

    for (person, token, gender) in request.people() {
        for (rule, amount) in rules.evaluate(token, gender) {
            score -= amount;
            sal[person.index()].add(rule.category, amount);
            if amount > 0.0 {
                tracing::debug!(
                    %person,
                    category = rule.category.name(),
                    rule = rule.name,
                    amount,
                    "sal fired"
                );
                fired.push(FiredRule {
                    person,
                    category: rule.category,
                    rule: rule.name,
                    amount,
                });
            }
        }
    }

    PairingResult {
        base_score,
        final_score: score,
        sal,
        fired,
    }
}

/// Scores a pairing: learned base score, then sal deductions.
pub struct CompatibilityEngine<'a> {
    predictors: &'a PredictorRegistry,
    rules: RuleSet,
}

impl<'a> CompatibilityEngine<'a> {
    pub fn new(predictors: &'a PredictorRegistry, rules: RuleSet) -> Self {
        Self { predictors, rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Day-stem and day-branch affinity, rescaled and capped.
    pub fn base_score(&self, token0: &ChartToken, token1: &ChartToken) -> f64 {
        let (a, b) = (token0.clamped(), token1.clamped());
        let stem = self.predictors.stem().predict(a.day_stem(), b.day_stem());
        let branch = self.predictors.branch().predict(a.day_branch(), b.day_branch());
        let base = combine_base_score(stem, branch);
        tracing::debug!(stem, branch, base, "base score");
        base
    }

    pub fn score(&self, request: &PairingRequest) -> PairingResult {
        let base = self.base_score(&request.token0, &request.token1);
        apply_penalties(&self.rules, request, base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::test_support::constant;
    use crate::predictor::{AffinityPredictor, PredictorKind};
    use crate::scoring::PenaltyConfig;

    fn registry(stem: f64, branch: f64) -> PredictorRegistry {
        PredictorRegistry::with_predictors(
            constant(PredictorKind::Stem, stem),
            constant(PredictorKind::Branch, branch),
        )
    }

    fn request(t0: [i64; 6], g0: i64, t1: [i64; 6], g1: i64) -> PairingRequest {
        PairingRequest::new(
            ChartToken::new(t0),
            Gender::from_code(g0),
            ChartToken::new(t1),
            Gender::from_code(g1),
        )
    }

    const QUIET: [i64; 6] = [1, 3, 4, 6, 7, 2];

    #[test]
    fn test_combine_base_score() {
        assert!((combine_base_score(0.8, 0.6) - 70.0).abs() < 1e-9);
        assert_eq!(combine_base_score(0.5, 0.5), 50.0);
    }

    #[test]
    fn test_base_score_is_capped() {
        assert_eq!(combine_base_score(1.5, 1.2), 100.0);
        assert_eq!(combine_base_score(50.0, 50.0), 100.0);
        assert_eq!(combine_base_score(-2.0, 0.1), 0.0);
    }

    #[test]
    fn test_no_penalties_keeps_base() {
        let registry = registry(0.9, 0.7);
        let engine = CompatibilityEngine::new(&registry, RuleSet::default());
        let result = engine.score(&request(QUIET, 1, QUIET, 0));
        assert!((result.base_score - 80.0).abs() < 1e-9);
        assert_eq!(result.final_score, result.base_score);
        assert_eq!(result.sal0().total(), 0.0);
        assert_eq!(result.sal1().total(), 0.0);
        assert!(result.fired.is_empty());
    }

    #[test]
    fn test_missing_predictors_use_fallback() {
        let registry = PredictorRegistry::with_predictors(
            AffinityPredictor::unavailable(PredictorKind::Stem),
            AffinityPredictor::unavailable(PredictorKind::Branch),
        );
        let engine = CompatibilityEngine::new(&registry, RuleSet::default());
        let result = engine.score(&request(QUIET, 1, QUIET, 1));
        assert_eq!(result.base_score, 50.0);
    }

    #[test]
    fn test_one_missing_predictor() {
        let registry = PredictorRegistry::with_predictors(
            constant(PredictorKind::Stem, 1.0),
            AffinityPredictor::unavailable(PredictorKind::Branch),
        );
        let engine = CompatibilityEngine::new(&registry, RuleSet::default());
        assert_eq!(
            engine.base_score(&ChartToken::new(QUIET), &ChartToken::new(QUIET)),
            75.0
        );
    }

    #[test]
    fn test_penalties_land_in_the_right_vector() {
        let registry = registry(1.0, 1.0);
        let engine = CompatibilityEngine::new(&registry, RuleSet::default());
        // person1: day branch 7 clashes with month branch 1
        let result = engine.score(&request(QUIET, 1, [2, 2, 2, 1, 2, 7], 1));
        assert_eq!(result.sal0().total(), 0.0);
        assert_eq!(result.sal1().get(SalCategory::Chung), 10.0);
        assert_eq!(result.final_score, 100.0 - result.sal1().total());
    }

    #[test]
    fn test_exact_vectors_for_seeded_tokens() {
        let registry = registry(0.9, 0.9);
        let engine = CompatibilityEngine::new(&registry, RuleSet::default());
        // person0 (male): 인 day with 사 year and 신 month
        //   samhyeong 8 + 8; chung |3 - 9| = 6 -> 10; hae (3, 6) -> 8
        // person1 (female): 경진 day, 경술 year
        //   goegang day 10 + year 4; chung |5 - 11| = 6 -> 8
        //   wonjin gwimun (11, 6) -> 8.2; pa/hae none
        let t0 = [2, 6, 2, 9, 2, 3];
        let t1 = [7, 11, 2, 6, 7, 5];
        let result = engine.score(&request(t0, 1, t1, 0));

        let sal0 = result.sal0();
        assert_eq!(sal0.get(SalCategory::Samhyeong), 16.0);
        assert_eq!(sal0.get(SalCategory::Chung), 10.0);
        assert_eq!(sal0.get(SalCategory::Hae), 8.0);
        assert_eq!(sal0.total(), 34.0);

        let sal1 = result.sal1();
        assert_eq!(sal1.get(SalCategory::Goegang), 14.0);
        assert_eq!(sal1.get(SalCategory::Chung), 8.0);
        assert!((sal1.get(SalCategory::Wonjin) - 8.2).abs() < 1e-9);
        assert_eq!(sal1.get(SalCategory::Pa), 0.0);
        assert!((sal1.total() - 30.2).abs() < 1e-9);

        assert!((result.final_score - (90.0 - 34.0 - 30.2)).abs() < 1e-9);
        assert!((result.total_deduction() - 64.2).abs() < 1e-9);
    }

    #[test]
    fn test_goegang_skipped_for_men() {
        let registry = registry(0.5, 0.5);
        let engine = CompatibilityEngine::new(&registry, RuleSet::default());
        let t = [7, 11, 9, 11, 7, 5];
        let male = engine.score(&request(t, 1, QUIET, 1));
        let female = engine.score(&request(t, 0, QUIET, 1));
        assert_eq!(male.sal0().get(SalCategory::Goegang), 0.0);
        assert_eq!(female.sal0().get(SalCategory::Goegang), 20.0);
    }

    #[test]
    fn test_final_never_exceeds_base() {
        let registry = registry(1.0, 1.0);
        let engine = CompatibilityEngine::new(&registry, RuleSet::default());
        for a3 in 1..=12 {
            for a1 in 1..=12 {
                for g in [0, 1] {
                    let t = [7, a1, 9, (a1 + 5) % 12 + 1, 1, a3];
                    let result = engine.score(&request(t, g, t, 1 - g));
                    assert!(result.final_score <= result.base_score);
                    for v in result.sal.iter() {
                        assert!(v.iter().all(|(_, x)| x >= 0.0));
                    }
                }
            }
        }
    }

    #[test]
    fn test_score_can_go_below_zero() {
        let registry = registry(0.0, 0.0);
        let engine = CompatibilityEngine::new(&registry, RuleSet::default());
        let result = engine.score(&request([2, 6, 2, 9, 2, 3], 1, QUIET, 1));
        assert_eq!(result.base_score, 0.0);
        assert!(result.final_score < 0.0);
    }

    #[test]
    fn test_idempotent() {
        let registry = registry(0.7, 0.3);
        let engine = CompatibilityEngine::new(&registry, RuleSet::default());
        let req = request([2, 6, 2, 9, 2, 3], 0, [7, 11, 2, 6, 7, 5], 0);
        assert_eq!(engine.score(&req), engine.score(&req));
    }

    #[test]
    fn test_zero_magnitude_rule_is_not_recorded() {
        let registry = registry(0.5, 0.5);
        let engine =
            CompatibilityEngine::new(&registry, RuleSet::standard(&PenaltyConfig::default()));
        // 갑진 day pillar for a man: baekho fires with 0
        let result = engine.score(&request([2, 1, 2, 1, 1, 5], 1, QUIET, 1));
        assert!(result
            .fired
            .iter()
            .all(|f| f.category != SalCategory::Baekho));
    }
}
