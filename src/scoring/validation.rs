use super::config::PenaltyConfig;
use crate::config::ModelsConfig;

/// Validate penalty deductions at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_penalties(config: &PenaltyConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let entries = [
        ("penalties.samhyeong.male", config.samhyeong.male),
        ("penalties.samhyeong.female", config.samhyeong.female),
        ("penalties.wonjin.male", config.wonjin.male),
        ("penalties.wonjin.female", config.wonjin.female),
        ("penalties.hyeong.male", config.hyeong.male),
        ("penalties.hyeong.female", config.hyeong.female),
        ("penalties.chung.day_month", config.chung.day_month),
        ("penalties.chung.day_year", config.chung.day_year),
        ("penalties.chung.year_month", config.chung.year_month),
        ("penalties.pa", config.pa),
        ("penalties.hae", config.hae),
        ("penalties.baekho.male", config.baekho.male),
        ("penalties.baekho.female", config.baekho.female),
        ("penalties.goegang.day", config.goegang.day),
        ("penalties.goegang.month", config.goegang.month),
        ("penalties.goegang.year", config.goegang.year),
    ];

    for (key, value) in entries {
        if !value.is_finite() {
            errors.push(format!("{}: must be a finite number", key));
        } else if value < 0.0 {
            errors.push(format!("{}: must be non-negative, got {}", key, value));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate model settings. Paths are not checked here; a missing model
/// file only degrades its predictor.
pub fn validate_models(config: &ModelsConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let fallback = config.fallback_prediction;
    if !fallback.is_finite() || !(0.0..=1.0).contains(&fallback) {
        errors.push(format!(
            "models.fallback_prediction: must be between 0 and 1, got {}",
            fallback
        ));
    }

    for (key, path) in [("models.stem", &config.stem), ("models.branch", &config.branch)] {
        if let Some(path) = path {
            if path.as_os_str().is_empty() {
                errors.push(format!("{}: path is empty", key));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
