//! Reusable field validators and the payload rule runner.
//!
//! Create/update handlers validate the raw JSON payload before
//! deserializing it into a typed request, so every failing field is
//! reported in one response.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::core::error::{FieldIssue, ValidationError};

/// Validator: field is required (present and not null).
pub fn required() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_null() {
            Err(format!("'{field}' is required"))
        } else {
            Ok(())
        }
    }
}

/// Validator: number must be strictly positive.
///
/// Non-numbers pass; type mismatches are caught by deserialization.
pub fn positive() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if let Some(num) = value.as_f64() {
            if num <= 0.0 {
                return Err(format!("'{field}' must be positive (got {num})"));
            }
        }
        Ok(())
    }
}

/// Validator: number must not be negative.
pub fn non_negative() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if let Some(num) = value.as_f64() {
            if num < 0.0 {
                return Err(format!("'{field}' must not be negative (got {num})"));
            }
        }
        Ok(())
    }
}

/// Validator: string length must be within range.
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            let len = s.chars().count();
            if len < min {
                return Err(format!("'{field}' must be at least {min} characters"));
            }
            if len > max {
                return Err(format!("'{field}' must not exceed {max} characters"));
            }
        }
        Ok(())
    }
}

/// Validator: value must be in the allowed list.
pub fn in_list(
    allowed: Vec<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            if !allowed.iter().any(|a| a == s) {
                return Err(format!("'{field}' must be one of {allowed:?} (got '{s}')"));
            }
        }
        Ok(())
    }
}

/// Validator: date string must match the given chrono format.
pub fn date_format(
    format: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            if chrono::NaiveDate::parse_from_str(s, format).is_err() {
                return Err(format!("'{field}' must match the {format} date format"));
            }
        }
        Ok(())
    }
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{2,5}-\d{2,}$").expect("hardcoded pattern compiles"))
}

/// Validator: document numbers look like `INV-0042` (prefix dash digits).
pub fn document_number() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            if !number_pattern().is_match(s) {
                return Err(format!(
                    "'{field}' must look like 'INV-0042' (uppercase prefix, dash, digits)"
                ));
            }
        }
        Ok(())
    }
}

/// A set of (field, validator) checks run against a JSON payload.
#[derive(Default)]
pub struct RuleSet {
    checks: Vec<(
        &'static str,
        Box<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>,
    )>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(
        mut self,
        field: &'static str,
        validator: impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.checks.push((field, Box::new(validator)));
        self
    }

    /// Run every check, collecting all failures.
    pub fn check(&self, payload: &Value) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        for (field, validator) in &self.checks {
            let value = payload.get(*field).cloned().unwrap_or(Value::Null);
            if let Err(message) = validator(field, &value) {
                issues.push(FieldIssue {
                    field: (*field).to_string(),
                    message,
                });
            }
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Fields(issues))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_rejects_null_and_missing() {
        let v = required();
        assert!(v("name", &json!(null)).is_err());
        assert!(v("name", &json!("ok")).is_ok());
        assert!(v("count", &json!(0)).is_ok());
    }

    #[test]
    fn positive_rejects_zero_and_negative() {
        let v = positive();
        assert!(v("amount", &json!(10.0)).is_ok());
        assert!(v("amount", &json!(0)).is_err());
        assert!(v("amount", &json!(-3.5)).is_err());
        // Non-numbers pass through to deserialization.
        assert!(v("amount", &json!("abc")).is_ok());
    }

    #[test]
    fn non_negative_allows_zero() {
        let v = non_negative();
        assert!(v("balance", &json!(0)).is_ok());
        assert!(v("balance", &json!(-0.01)).is_err());
    }

    #[test]
    fn string_length_bounds() {
        let v = string_length(3, 10);
        assert!(v("code", &json!("abc")).is_ok());
        assert!(v("code", &json!("ab")).is_err());
        assert!(v("code", &json!("abcdefghijk")).is_err());
    }

    #[test]
    fn in_list_matches_exactly() {
        let v = in_list(vec!["cash".to_string(), "card".to_string()]);
        assert!(v("method", &json!("cash")).is_ok());
        assert!(v("method", &json!("wire")).is_err());
    }

    #[test]
    fn date_format_checks_shape() {
        let v = date_format("%Y-%m-%d");
        assert!(v("due_date", &json!("2026-03-01")).is_ok());
        assert!(v("due_date", &json!("01/03/2026")).is_err());
    }

    #[test]
    fn document_number_shape() {
        let v = document_number();
        assert!(v("number", &json!("INV-0042")).is_ok());
        assert!(v("number", &json!("CHQ-12")).is_ok());
        assert!(v("number", &json!("inv-0042")).is_err());
        assert!(v("number", &json!("INVOICE42")).is_err());
    }

    #[test]
    fn rule_set_collects_every_failure() {
        let rules = RuleSet::new()
            .rule("number", required())
            .rule("number", document_number())
            .rule("amount", positive());

        let err = rules
            .check(&json!({ "amount": -1.0 }))
            .expect_err("two fields should fail");
        match err {
            ValidationError::Fields(issues) => {
                assert_eq!(issues.len(), 2);
                assert!(issues.iter().any(|i| i.field == "number"));
                assert!(issues.iter().any(|i| i.field == "amount"));
            }
            other => panic!("expected Fields, got {other:?}"),
        }

        assert!(
            rules
                .check(&json!({ "number": "INV-0001", "amount": 5.0 }))
                .is_ok()
        );
    }
}
