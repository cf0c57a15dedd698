pub mod config;
pub mod engine;
pub mod rules;
pub mod tables;
pub mod validation;

pub use config::*;
pub use engine::{
    apply_penalties, combine_base_score, CompatibilityEngine, FiredRule, PairingRequest,
    PairingResult, PenaltyVector, Person,
};
pub use rules::{Audience, Condition, Rule, RuleSet, SalCategory};
pub use validation::{validate_models, validate_penalties};
