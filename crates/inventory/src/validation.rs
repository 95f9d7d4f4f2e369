//! Input coercion and field validation.
//!
//! Requests arrive as loosely-typed JSON objects. Every field goes through an
//! explicit coercion step (string-typed numbers are parsed, blank strings are
//! treated as absent) before being range-checked. Violations are collected,
//! never short-circuited, so a caller can report every problem at once.

use serde_json::{Map, Value};

use x3pl_core::{DomainError, DomainResult};

/// Accumulated constraint violations for one request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Builds the validated value, or fails with every collected violation.
    ///
    /// `build` only runs when nothing was violated, so it may unwrap the
    /// `Option`s returned by the field helpers.
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> DomainResult<T> {
        if !self.0.is_empty() {
            return Err(DomainError::Validation(self.0));
        }
        build().ok_or_else(|| DomainError::validation(["request could not be validated"]))
    }
}

/// Borrowed view of a request object; non-objects behave like `{}`.
#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> Input<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self {
            fields: value.as_object(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields?.get(field).filter(|v| !v.is_null())
    }

    /// A required non-blank string, trimmed.
    pub fn required_string(&self, field: &str, violations: &mut Violations) -> Option<String> {
        let value = self.get(field).and_then(coerce_string);
        if value.is_none() {
            violations.push(format!("{field} is required and must be a non-empty string"));
        }
        value
    }

    /// An optional string that must be non-blank when supplied.
    pub fn optional_string(&self, field: &str, violations: &mut Violations) -> Option<String> {
        let raw = self.get(field)?;
        let value = coerce_string(raw);
        if value.is_none() {
            violations.push(format!("{field} must be a non-empty string if provided"));
        }
        value
    }

    /// An optional free-text note; anything blank or non-string becomes `None`.
    pub fn optional_note(&self, field: &str) -> Option<String> {
        self.get(field).and_then(coerce_string)
    }

    /// A required integer `>= min`. String input such as `"5"` is accepted.
    pub fn required_integer(
        &self,
        field: &str,
        min: i64,
        message: &str,
        violations: &mut Violations,
    ) -> Option<i64> {
        let value = self.get(field).and_then(coerce_integer).filter(|n| *n >= min);
        if value.is_none() {
            violations.push(message.to_string());
        }
        value
    }
}

/// Trimmed string content, or `None` for non-strings and blank strings.
pub fn coerce_string(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Integer content of a JSON number or numeric string.
///
/// Fractional numbers and anything unparsable yield `None`.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Lenient integer parse for query-string parameters.
pub fn parse_query_integer(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}
