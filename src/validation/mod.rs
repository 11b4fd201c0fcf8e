//! Declarative request validation.
//!
//! A [`RuleSet`] is an ordered list of [`FieldRules`], each naming a field in
//! the path parameters or the JSON body together with the rules it must pass.
//! Evaluation runs every rule of every field and collects one
//! [`FieldViolation`] per failed rule; [`gate`] turns a non-empty list into a
//! 400 response.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ApiError;

/// Where a validated field is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Params,
    Body,
}

/// The predicate half of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Integer literal: a JSON integer or `[+-]?(0|[1-9][0-9]*)` text, any length
    Int,
    /// Present, not null and not an empty string
    NotEmpty,
    /// JSON number or a decimal string such as `"-12.5"`
    Numeric,
    /// Numeric and strictly greater than zero
    Positive,
    /// JSON boolean, `0`/`1`, or `"true"`/`"false"`/`"0"`/`"1"`
    Boolean,
    /// Text form at most this many characters long. Absent values pass.
    MaxLength(usize),
}

impl RuleKind {
    pub fn check(self, value: Option<&Value>) -> bool {
        match self {
            RuleKind::Int => value.map_or(false, is_int),
            RuleKind::NotEmpty => value.and_then(coerce_text).map_or(false, |s| !s.is_empty()),
            RuleKind::Numeric => value.map_or(false, is_numeric),
            RuleKind::Positive => value.and_then(coerce_number).map_or(false, |n| n > 0.0),
            RuleKind::Boolean => value.and_then(coerce_bool).is_some(),
            RuleKind::MaxLength(max) => value
                .and_then(coerce_text)
                .map_or(true, |s| s.chars().count() <= max),
        }
    }
}

/// One predicate paired with the message reported when it fails
#[derive(Debug, Clone)]
pub struct Rule {
    pub kind: RuleKind,
    pub message: &'static str,
}

/// The rules declared for one field, evaluated in declaration order
#[derive(Debug, Clone)]
pub struct FieldRules {
    pub field: &'static str,
    pub location: Location,
    pub rules: Vec<Rule>,
}

impl FieldRules {
    pub fn param(field: &'static str) -> Self {
        Self { field, location: Location::Params, rules: Vec::new() }
    }

    pub fn body(field: &'static str) -> Self {
        Self { field, location: Location::Body, rules: Vec::new() }
    }

    pub fn rule(mut self, kind: RuleKind, message: &'static str) -> Self {
        self.rules.push(Rule { kind, message });
        self
    }

    pub fn is_int(self, message: &'static str) -> Self {
        self.rule(RuleKind::Int, message)
    }

    pub fn not_empty(self, message: &'static str) -> Self {
        self.rule(RuleKind::NotEmpty, message)
    }

    pub fn is_numeric(self, message: &'static str) -> Self {
        self.rule(RuleKind::Numeric, message)
    }

    pub fn positive(self, message: &'static str) -> Self {
        self.rule(RuleKind::Positive, message)
    }

    pub fn is_boolean(self, message: &'static str) -> Self {
        self.rule(RuleKind::Boolean, message)
    }

    pub fn max_length(self, max: usize, message: &'static str) -> Self {
        self.rule(RuleKind::MaxLength(max), message)
    }

    pub fn max_length_limit(&self) -> Option<usize> {
        self.rules.iter().find_map(|r| match r.kind {
            RuleKind::MaxLength(max) => Some(max),
            _ => None,
        })
    }

    pub fn has(&self, kind: RuleKind) -> bool {
        self.rules.iter().any(|r| r.kind == kind)
    }
}

/// A single failed rule, as reported to the client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub location: Location,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, location: Location, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            location,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: Vec<FieldRules>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, rules: FieldRules) -> Self {
        self.fields.push(rules);
        self
    }

    pub fn fields(&self) -> &[FieldRules] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn reads_params(&self) -> bool {
        self.fields.iter().any(|f| f.location == Location::Params)
    }

    pub fn reads_body(&self) -> bool {
        self.fields.iter().any(|f| f.location == Location::Body)
    }

    /// Run every rule and collect the failures in declaration order
    pub fn evaluate(&self, params: &HashMap<String, String>, body: &Value) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        for field in &self.fields {
            let param_value;
            let value = match field.location {
                Location::Params => {
                    param_value = params.get(field.field).map(|s| Value::String(s.clone()));
                    param_value.as_ref()
                }
                Location::Body => body.get(field.field),
            };

            for rule in &field.rules {
                if !rule.kind.check(value) {
                    violations.push(FieldViolation::new(field.field, field.location, rule.message));
                }
            }
        }

        violations
    }
}

/// Halt with a 400 when any rule failed, otherwise let the request through
pub fn gate(violations: Vec<FieldViolation>) -> Result<(), ApiError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(violations))
    }
}

fn is_int(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => is_int_str(s),
        _ => false,
    }
}

// [+-]?(0|[1-9][0-9]*); no leading zeros, no length cap
fn is_int_str(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    match digits.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    }
}

/// Finite numeric value. Strings too long for `f64` yield `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if is_numeric_str(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Text form of a scalar. Null, arrays and objects have none.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => is_numeric_str(s),
        _ => false,
    }
}

// [+-]?digits[.digits], also ".5"; rejects exponents, "NaN" and "inf"
fn is_numeric_str(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    match frac_part {
        Some(frac) => all_digits(int_part) && !frac.is_empty() && all_digits(frac),
        None => !int_part.is_empty() && all_digits(int_part),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn int_rule_accepts_signed_integers_only() {
        assert!(RuleKind::Int.check(Some(&json!("42"))));
        assert!(RuleKind::Int.check(Some(&json!("-7"))));
        assert!(RuleKind::Int.check(Some(&json!("+5"))));
        assert!(RuleKind::Int.check(Some(&json!("0"))));
        assert!(RuleKind::Int.check(Some(&json!(3))));
        assert!(!RuleKind::Int.check(Some(&json!("abc"))));
        assert!(!RuleKind::Int.check(Some(&json!("1.5"))));
        assert!(!RuleKind::Int.check(Some(&json!(""))));
        assert!(!RuleKind::Int.check(Some(&json!("-"))));
        assert!(!RuleKind::Int.check(None));
    }

    #[test]
    fn int_rule_rejects_leading_zeros_but_not_long_literals() {
        assert!(!RuleKind::Int.check(Some(&json!("007"))));
        assert!(!RuleKind::Int.check(Some(&json!("-01"))));
        assert!(RuleKind::Int.check(Some(&json!("123456789012345678901234567890"))));
    }

    #[test]
    fn numeric_rule() {
        for ok in [json!(300), json!(0.5), json!("300"), json!("-1.25"), json!(".5")] {
            assert!(RuleKind::Numeric.check(Some(&ok)), "{ok} should be numeric");
        }
        for bad in [json!("1e5"), json!("NaN"), json!("inf"), json!("12a"), json!(""), json!("."), json!(true), Value::Null] {
            assert!(!RuleKind::Numeric.check(Some(&bad)), "{bad} should not be numeric");
        }
        assert!(!RuleKind::Numeric.check(None));
    }

    #[test]
    fn positive_rule() {
        assert!(RuleKind::Positive.check(Some(&json!(0.01))));
        assert!(RuleKind::Positive.check(Some(&json!("10"))));
        assert!(!RuleKind::Positive.check(Some(&json!(0))));
        assert!(!RuleKind::Positive.check(Some(&json!(-5))));
        assert!(!RuleKind::Positive.check(None));
    }

    #[test]
    fn out_of_range_numeric_strings_are_not_positive() {
        let huge = Value::String(format!("1{}", "0".repeat(400)));
        assert!(RuleKind::Numeric.check(Some(&huge)));
        assert!(!RuleKind::Positive.check(Some(&huge)));
        assert_eq!(coerce_number(&huge), None);
    }

    #[test]
    fn max_length_counts_characters() {
        let rule = RuleKind::MaxLength(3);
        assert!(rule.check(Some(&json!("abc"))));
        assert!(rule.check(Some(&json!("äöü"))));
        assert!(!rule.check(Some(&json!("abcd"))));
        assert!(rule.check(None));
    }

    #[test]
    fn boolean_rule() {
        for ok in [json!(true), json!(false), json!("true"), json!("0"), json!(1)] {
            assert!(RuleKind::Boolean.check(Some(&ok)));
        }
        for bad in [json!("yes"), json!(2), json!(null), json!("")] {
            assert!(!RuleKind::Boolean.check(Some(&bad)));
        }
    }

    #[test]
    fn not_empty_rule() {
        assert!(RuleKind::NotEmpty.check(Some(&json!("Monitor"))));
        assert!(RuleKind::NotEmpty.check(Some(&json!(12))));
        assert!(!RuleKind::NotEmpty.check(Some(&json!(""))));
        assert!(!RuleKind::NotEmpty.check(Some(&Value::Null)));
        assert!(!RuleKind::NotEmpty.check(None));
    }

    #[test]
    fn a_field_collects_every_failed_rule() {
        let rules = RuleSet::new().field(
            FieldRules::body("price")
                .is_numeric("not numeric")
                .not_empty("empty")
                .positive("not positive"),
        );

        let violations = rules.evaluate(&HashMap::new(), &json!({}));
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(messages, vec!["not numeric", "empty", "not positive"]);
        assert!(violations.iter().all(|v| v.field == "price" && v.location == Location::Body));

        let violations = rules.evaluate(&HashMap::new(), &json!({ "price": -3 }));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "not positive");
    }

    #[test]
    fn param_rules_read_path_params() {
        let rules = RuleSet::new().field(FieldRules::param("id").is_int("Invalid ID"));
        assert!(rules.evaluate(&params(&[("id", "12")]), &Value::Null).is_empty());

        let violations = rules.evaluate(&params(&[("id", "twelve")]), &Value::Null);
        assert_eq!(violations, vec![FieldViolation::new("id", Location::Params, "Invalid ID")]);
    }

    #[test]
    fn reads_flags_follow_locations() {
        let rules = RuleSet::new().field(FieldRules::param("id").is_int("x"));
        assert!(rules.reads_params());
        assert!(!rules.reads_body());
        assert!(RuleSet::new().is_empty());
    }

    #[test]
    fn gate_passes_clean_requests_and_halts_on_violations() {
        assert!(gate(Vec::new()).is_ok());

        let err = gate(vec![FieldViolation::new("name", Location::Body, "empty")]).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
