//! JSON request coercion and response payloads.
//!
//! Failures are reported as a normal payload (`success: false`), never as a
//! process error, so the caller can always parse exactly one JSON line.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::chart::{ChartToken, Gender};
use crate::error::InputError;
use crate::scoring::{CompatibilityEngine, PairingRequest, PairingResult};

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Parse a request document.
///
/// Tokens are read from `token0`/`token1`, or `person0`/`person1`. Genders
/// default to 0 (female) when absent.
pub fn parse_request(input: &str) -> Result<PairingRequest, InputError> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| InputError::Json(e.to_string()))?;
    request_from_value(&value)
}

pub fn request_from_value(value: &Value) -> Result<PairingRequest, InputError> {
    let object = value.as_object().ok_or(InputError::NotAnObject)?;

    let token0 = read_token(object, "token0", "person0")?;
    let token1 = read_token(object, "token1", "person1")?;
    let gender0 = read_gender(object, "gender0")?;
    let gender1 = read_gender(object, "gender1")?;

    Ok(PairingRequest::new(token0, gender0, token1, gender1))
}

fn read_token(
    object: &Map<String, Value>,
    field: &'static str,
    alias: &'static str,
) -> Result<ChartToken, InputError> {
    let (field, value) = match (object.get(field), object.get(alias)) {
        (Some(v), _) if !v.is_null() => (field, v),
        (_, Some(v)) if !v.is_null() => (alias, v),
        _ => return Err(InputError::MissingToken { field }),
    };

    let items = value
        .as_array()
        .ok_or(InputError::TokenNotArray { field })?;
    if items.len() != 6 {
        return Err(InputError::TokenLength {
            field,
            len: items.len(),
        });
    }

    let mut values = [0i64; 6];
    for (index, (slot, item)) in values.iter_mut().zip(items).enumerate() {
        *slot = coerce_int(item).ok_or_else(|| InputError::NonNumeric {
            field,
            index,
            value: item.to_string(),
        })?;
    }
    Ok(ChartToken::new(values))
}

fn read_gender(object: &Map<String, Value>, field: &'static str) -> Result<Gender, InputError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(Gender::Female),
        Some(value) => coerce_int(value)
            .map(Gender::from_code)
            .ok_or_else(|| InputError::NonNumericGender {
                field,
                value: value.to_string(),
            }),
    }
}

/// Integer coercion: integers as-is, finite floats truncated toward zero,
/// numeric strings parsed the same way. Everything else is rejected.
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

/// The single JSON document written back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_score: Option<f64>,
    pub sal0: Vec<f64>,
    pub sal1: Vec<f64>,
}

impl PairingResponse {
    pub fn success(result: &PairingResult) -> Self {
        Self {
            success: true,
            error: None,
            score: round1(result.final_score),
            base_score: Some(round1(result.base_score)),
            sal0: result.sal0().as_array().iter().map(|v| round1(*v)).collect(),
            sal1: result.sal1().as_array().iter().map(|v| round1(*v)).collect(),
        }
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            score: 0.0,
            base_score: None,
            sal0: Vec::new(),
            sal1: Vec::new(),
        }
    }

    /// Failure payload for a configuration that could not be loaded.
    pub fn config_error(errors: &[String]) -> Self {
        Self::failure(format!("config error: {}", errors.join("; ")))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Parse, score and package one request.
pub fn handle(engine: &CompatibilityEngine<'_>, input: &str) -> PairingResponse {
    match parse_request(input) {
        Ok(request) => PairingResponse::success(&engine.score(&request)),
        Err(e) => {
            tracing::warn!(error = %e, "rejected request");
            PairingResponse::failure(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::{AffinityPredictor, PredictorKind, PredictorRegistry};
    use crate::scoring::RuleSet;
    use serde_json::json;

    fn fallback_registry() -> PredictorRegistry {
        PredictorRegistry::with_predictors(
            AffinityPredictor::unavailable(PredictorKind::Stem),
            AffinityPredictor::unavailable(PredictorKind::Branch),
        )
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(25.84), 25.8);
        assert_eq!(round1(25.85000001), 25.9);
        assert_eq!(round1(-3.04), -3.0);
    }

    #[test]
    fn test_parse_basic_request() {
        let req = parse_request(
            r#"{"token0":[1,3,4,6,7,2],"token1":[2,6,2,9,2,3],"gender0":1,"gender1":0}"#,
        )
        .unwrap();
        assert_eq!(req.token0.values(), [1, 3, 4, 6, 7, 2]);
        assert_eq!(req.token1.day_branch(), 3);
        assert_eq!(req.gender0, Gender::Male);
        assert_eq!(req.gender1, Gender::Female);
    }

    #[test]
    fn test_person_aliases_and_default_gender() {
        let req =
            parse_request(r#"{"person0":[1,1,1,1,1,1],"person1":[2,2,2,2,2,2]}"#).unwrap();
        assert_eq!(req.token1.values(), [2; 6]);
        assert_eq!(req.gender0, Gender::Female);
        assert_eq!(req.gender1, Gender::Female);
    }

    #[test]
    fn test_coerces_strings_and_floats() {
        let req = parse_request(
            r#"{"token0":["1"," 3 ",4.9,6,7,"2.0"],"token1":[1,1,1,1,1,1],"gender0":"1"}"#,
        )
        .unwrap();
        assert_eq!(req.token0.values(), [1, 3, 4, 6, 7, 2]);
        assert_eq!(req.gender0, Gender::Male);
    }

    #[test]
    fn test_out_of_range_values_are_accepted() {
        let req = parse_request(r#"{"token0":[0,13,1,1,1,1],"token1":[1,1,1,1,1,1]}"#).unwrap();
        assert_eq!(req.token0.year_branch(), 13);
    }

    #[test]
    fn test_missing_token() {
        let err = parse_request(r#"{"token0":[1,1,1,1,1,1]}"#).unwrap_err();
        assert_eq!(err, InputError::MissingToken { field: "token1" });

        let err = parse_request(r#"{"token0":null,"token1":[1,1,1,1,1,1]}"#).unwrap_err();
        assert_eq!(err, InputError::MissingToken { field: "token0" });
    }

    #[test]
    fn test_short_token() {
        let err = parse_request(r#"{"token0":[1,1,1],"token1":[1,1,1,1,1,1]}"#).unwrap_err();
        assert_eq!(
            err,
            InputError::TokenLength {
                field: "token0",
                len: 3
            }
        );
    }

    #[test]
    fn test_non_numeric_value() {
        let err =
            parse_request(r#"{"token0":[1,1,"x",1,1,1],"token1":[1,1,1,1,1,1]}"#).unwrap_err();
        assert!(matches!(
            err,
            InputError::NonNumeric {
                field: "token0",
                index: 2,
                ..
            }
        ));

        let err = parse_request(r#"{"token0":[1,1,1,1,1,1],"token1":[1,1,1,1,1,true]}"#)
            .unwrap_err();
        assert!(matches!(err, InputError::NonNumeric { index: 5, .. }));
    }

    #[test]
    fn test_non_numeric_gender() {
        let err = parse_request(
            r#"{"token0":[1,1,1,1,1,1],"token1":[1,1,1,1,1,1],"gender1":"male"}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            InputError::NonNumericGender {
                field: "gender1",
                ..
            }
        ));
    }

    #[test]
    fn test_not_json_or_not_object() {
        assert!(matches!(parse_request("{"), Err(InputError::Json(_))));
        assert_eq!(parse_request("[1,2]").unwrap_err(), InputError::NotAnObject);
        assert_eq!(
            parse_request(r#"{"token0":"123456","token1":[1,1,1,1,1,1]}"#).unwrap_err(),
            InputError::TokenNotArray { field: "token0" }
        );
    }

    #[test]
    fn test_success_payload_shape() {
        let registry = fallback_registry();
        let engine = CompatibilityEngine::new(&registry, RuleSet::default());
        let response = handle(
            &engine,
            r#"{"token0":[2,6,2,9,2,3],"token1":[1,3,4,6,7,2],"gender0":1,"gender1":0}"#,
        );

        assert!(response.success);
        assert_eq!(response.base_score, Some(50.0));
        assert_eq!(response.score, 16.0);
        assert_eq!(response.sal0, vec![16.0, 0.0, 0.0, 10.0, 0.0, 8.0, 0.0, 0.0]);
        assert_eq!(response.sal1, vec![0.0; 8]);

        let value: Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["baseScore"], json!(50.0));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_failure_payload_shape() {
        let registry = fallback_registry();
        let engine = CompatibilityEngine::new(&registry, RuleSet::default());
        let response = handle(&engine, r#"{"token0":[1,2,3]}"#);

        assert!(!response.success);
        let value: Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
        assert_eq!(value["score"], json!(0.0));
        assert_eq!(value["sal0"], json!([]));
        assert_eq!(value["sal1"], json!([]));
        assert!(value["error"].as_str().unwrap().contains("token0"));
        assert!(value.get("baseScore").is_none());
    }

    #[test]
    fn test_extreme_values_still_produce_a_payload() {
        let registry = fallback_registry();
        let engine = CompatibilityEngine::new(&registry, RuleSet::default());

        let response = handle(
            &engine,
            r#"{"token0":[1,1,1,-1,1,9223372036854775807],"token1":[1,1,1,1,1,1]}"#,
        );
        assert!(response.success);
        assert_eq!(response.base_score, Some(50.0));
        assert_eq!(response.sal0, vec![0.0; 8]);

        let input = json!({
            "token0": [i64::MIN, i64::MIN, 1, i64::MAX, 1, i64::MIN],
            "token1": [1, 1, 1, 1, 1, 1],
            "gender0": 1,
        });
        let response = handle(&engine, &input.to_string());
        assert!(response.success);
        assert_eq!(response.sal0, vec![0.0; 8]);
    }

    #[test]
    fn test_config_error_payload_lists_every_error() {
        let errors = vec![
            "penalties.pa: must be non-negative, got -1".to_string(),
            "models.fallback_prediction: must be between 0 and 1, got 2".to_string(),
        ];
        let response = PairingResponse::config_error(&errors);
        assert!(!response.success);

        let value: Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
        let message = value["error"].as_str().unwrap();
        assert!(message.starts_with("config error: "));
        assert!(message.contains("penalties.pa"));
        assert!(message.contains("models.fallback_prediction"));
        assert_eq!(value["sal0"], json!([]));
    }

    #[test]
    fn test_handle_is_idempotent() {
        let registry = fallback_registry();
        let engine = CompatibilityEngine::new(&registry, RuleSet::default());
        let input = r#"{"token0":[7,11,2,6,7,5],"token1":[2,6,2,9,2,3],"gender0":0,"gender1":1}"#;
        assert_eq!(handle(&engine, input), handle(&engine, input));
    }
}
