//! The string-rule validation engine.
//!
//! Field constraints are expressed as comma-joined rule specs such as
//! `required,min=2,max=256` or `required,oneof='red' 'light blue'`. The
//! engine evaluates the clauses of a spec in order and reports the first
//! violation, so a single evaluation yields at most one error.
//!
//! `oneof` values are single-quoted and space-joined; commas and spaces are
//! legal inside the quotes, a single quote is not.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{
    FieldError, BOOLEAN_ERROR_CODE, CHOICE_ERROR_CODE, EMAIL_ERROR_CODE, MAX_LENGTH_ERROR_CODE,
    MIN_LENGTH_ERROR_CODE, REQUIRED_ERROR_CODE, URL_ERROR_CODE,
};

/// Clause asserting a non-empty value.
pub const REQUIRED_RULE: &str = "required";
/// Clause asserting a syntactically valid email address.
pub const EMAIL_RULE: &str = "email";
/// Clause asserting a syntactically valid http(s) URL.
pub const URL_RULE: &str = "url";
/// Clause asserting a recognized boolean token.
pub const BOOLEAN_RULE: &str = "boolean";

struct RuleEngine {
    email: Regex,
    url: Regex,
}

fn engine() -> &'static RuleEngine {
    static ENGINE: OnceLock<RuleEngine> = OnceLock::new();
    ENGINE.get_or_init(|| RuleEngine {
        email: Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
            .unwrap_or_else(|e| unreachable!("email pattern is valid: {e}")),
        url: Regex::new(r"^https?://[^\s/$.?#].[^\s]*$")
            .unwrap_or_else(|e| unreachable!("url pattern is valid: {e}")),
    })
}

/// Builds a rule spec from a required flag and additional clauses.
pub fn build_rules(required: bool, rules: &[String]) -> String {
    let mut clauses: Vec<String> = Vec::with_capacity(rules.len() + 1);
    if required {
        clauses.push(REQUIRED_RULE.to_string());
    }
    clauses.extend(rules.iter().cloned());
    clauses.join(",")
}

/// The `min=<n>` clause.
pub fn min_rule(length: u32) -> String {
    format!("min={length}")
}

/// The `max=<n>` clause.
pub fn max_rule(length: u32) -> String {
    format!("max={length}")
}

/// The `oneof=...` clause for a set of permitted values, each single-quoted.
pub fn choices_rule(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|value| format!("'{value}'")).collect();
    format!("oneof={}", quoted.join(" "))
}

/// Parses a boolean token. Recognizes `1/t/T/true/TRUE/True/on/ON/On` as
/// true and `0/f/F/false/FALSE/False/off/OFF/Off` as false.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" | "on" | "ON" | "On" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" | "off" | "OFF" | "Off" => Some(false),
        _ => None,
    }
}

/// Evaluates `spec` against `value`, returning the first violation or an
/// empty vector when every clause holds.
pub fn validate_value(value: &str, spec: &str) -> Vec<FieldError> {
    for clause in split_clauses(spec) {
        if let Some(error) = check_clause(value, &clause) {
            return vec![error];
        }
    }
    Vec::new()
}

/// Splits a spec on commas outside single quotes.
fn split_clauses(spec: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in spec.chars() {
        match c {
            '\'' => {
                quoted = !quoted;
                current.push(c);
            }
            ',' if !quoted => {
                if !current.trim().is_empty() {
                    clauses.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        clauses.push(current.trim().to_string());
    }
    clauses
}

fn check_clause(value: &str, clause: &str) -> Option<FieldError> {
    let (name, param) = match clause.split_once('=') {
        Some((name, param)) => (name, Some(param)),
        None => (clause, None),
    };
    match (name, param) {
        (REQUIRED_RULE, None) => {
            (value.is_empty()).then(|| FieldError::coded(REQUIRED_ERROR_CODE, vec![]))
        }
        (EMAIL_RULE, None) => {
            (!engine().email.is_match(value)).then(|| FieldError::coded(EMAIL_ERROR_CODE, vec![]))
        }
        (URL_RULE, None) => {
            (!engine().url.is_match(value)).then(|| FieldError::coded(URL_ERROR_CODE, vec![]))
        }
        (BOOLEAN_RULE, None) => {
            (parse_bool(value).is_none()).then(|| FieldError::coded(BOOLEAN_ERROR_CODE, vec![]))
        }
        ("min", Some(raw)) => check_length(value, raw, MIN_LENGTH_ERROR_CODE),
        ("max", Some(raw)) => check_length(value, raw, MAX_LENGTH_ERROR_CODE),
        ("oneof", Some(raw)) => {
            let allowed = parse_quoted_values(raw);
            (!allowed.iter().any(|choice| choice == value))
                .then(|| FieldError::coded(CHOICE_ERROR_CODE, vec![]))
        }
        _ => {
            tracing::warn!(clause, "skipping unrecognized rule clause");
            None
        }
    }
}

fn check_length(value: &str, raw: &str, code: &'static str) -> Option<FieldError> {
    let Ok(bound) = raw.parse::<usize>() else {
        tracing::warn!(raw, code, "skipping rule clause with non-numeric bound");
        return None;
    };
    let length = value.chars().count();
    let violated = match code {
        MIN_LENGTH_ERROR_CODE => length < bound,
        _ => length > bound,
    };
    violated.then(|| FieldError::coded(code, vec![raw.to_string()]))
}

/// Extracts the single-quoted values of a `oneof` parameter.
fn parse_quoted_values(raw: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in raw.chars() {
        match c {
            '\'' => {
                if quoted {
                    values.push(std::mem::take(&mut current));
                }
                quoted = !quoted;
            }
            _ if quoted => current.push(c),
            _ => {}
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_violation() {
        let errors = validate_value("", "required");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), REQUIRED_ERROR_CODE);
    }

    #[test]
    fn test_required_satisfied() {
        assert!(validate_value("x", "required").is_empty());
    }

    #[test]
    fn test_first_violation_only() {
        // Both min and email are violated; only the min error is reported.
        let errors = validate_value("ab", "required,min=5,email");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), MIN_LENGTH_ERROR_CODE);
    }

    #[test]
    fn test_email_rule() {
        assert!(validate_value("user@example.com", "email").is_empty());
        let errors = validate_value("invalid email", "email");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), EMAIL_ERROR_CODE);
    }

    #[test]
    fn test_url_rule() {
        assert!(validate_value("https://example.com/path", "url").is_empty());
        assert_eq!(validate_value("example.com", "url")[0].code(), URL_ERROR_CODE);
    }

    #[test]
    fn test_boolean_rule() {
        assert!(validate_value("on", "boolean").is_empty());
        assert!(validate_value("False", "boolean").is_empty());
        assert_eq!(
            validate_value("yes", "boolean")[0].code(),
            BOOLEAN_ERROR_CODE
        );
    }

    #[test]
    fn test_min_max_carry_bound_param() {
        let errors = validate_value("abcdef", "max=3");
        assert_eq!(errors[0].code(), MAX_LENGTH_ERROR_CODE);
        assert_eq!(
            errors[0].translate("en"),
            "Ensure this value has at most 3 characters"
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        assert!(validate_value("\u{e9}\u{e9}\u{e9}", "max=3").is_empty());
    }

    #[test]
    fn test_oneof_with_spaces_and_commas_in_values() {
        let spec = choices_rule(&["light blue".to_string(), "a,b".to_string()]);
        assert!(validate_value("light blue", &spec).is_empty());
        assert!(validate_value("a,b", &spec).is_empty());
        assert_eq!(validate_value("red", &spec)[0].code(), CHOICE_ERROR_CODE);
    }

    #[test]
    fn test_build_rules() {
        assert_eq!(
            build_rules(true, &[min_rule(2), max_rule(10)]),
            "required,min=2,max=10"
        );
        assert_eq!(build_rules(false, &[EMAIL_RULE.to_string()]), "email");
        assert_eq!(build_rules(false, &[]), "");
    }

    #[test]
    fn test_empty_spec_always_passes() {
        assert!(validate_value("anything", "").is_empty());
    }

    #[test]
    fn test_parse_bool_lexicon() {
        for token in ["1", "t", "T", "true", "TRUE", "True", "on", "ON", "On"] {
            assert_eq!(parse_bool(token), Some(true), "{token}");
        }
        for token in ["0", "f", "F", "false", "FALSE", "False", "off", "OFF", "Off"] {
            assert_eq!(parse_bool(token), Some(false), "{token}");
        }
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_bool(""), None);
    }
}
