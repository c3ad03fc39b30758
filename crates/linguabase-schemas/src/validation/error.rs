//! Validation error types for the Linguabase documents
//!
//! Copyright (c) 2025 Linguabase Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The constraint family a violation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// A required field is absent (or `null`)
    Required,
    /// The JSON type of a value is wrong
    Type,
    /// A string is not one of the allowed values
    Enumeration,
    /// A string must contain at least one character
    NonEmpty,
    /// A list has too few or too many elements
    Cardinality,
    /// A string does not match a required format (UUID, date-time)
    Format,
    /// A value that must be unique appears twice
    Unique,
    /// A field is present on a closed schema that does not declare it
    UnknownField,
    /// Sibling values disagree with each other
    Consistency,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::Required => "required",
            Rule::Type => "type",
            Rule::Enumeration => "enumeration",
            Rule::NonEmpty => "non_empty",
            Rule::Cardinality => "cardinality",
            Rule::Format => "format",
            Rule::Unique => "unique",
            Rule::UnknownField => "unknown_field",
            Rule::Consistency => "consistency",
        };
        f.write_str(name)
    }
}

/// A validation violation with detailed context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The validation rule that was violated
    pub rule: Rule,
    /// What was expected
    pub expected: String,
    /// What was actually found
    pub actual: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rule '{}' violated: expected {}, but found {}",
            self.rule, self.expected, self.actual
        )
    }
}

/// A single field-level failure, addressed by its JSON path
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{path}: {message}")]
pub struct ValidationError {
    /// JSON path where the error occurred, e.g. `$.prompts[0].id`
    pub path: String,
    /// Human-readable error message
    pub message: String,
    /// The violated constraint
    pub violation: Violation,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new<P, M>(path: P, message: M, violation: Violation) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Self {
            path: path.into(),
            message: message.into(),
            violation,
        }
    }

    /// Create a violation for a specific rule
    pub fn create_violation<E, A>(rule: Rule, expected: E, actual: A) -> Violation
    where
        E: Into<String>,
        A: Into<String>,
    {
        Violation {
            rule,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// The rule this error violates
    pub fn rule(&self) -> Rule {
        self.violation.rule
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// Every violation found while validating one document
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub struct ValidationErrors {
    /// List of validation errors, in document order
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "no validation errors"),
            [single] => write!(f, "{}", single),
            errors => {
                write!(f, "{} validation errors:", errors.len())?;
                for error in errors {
                    write!(f, "\n  - {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl ValidationErrors {
    /// Create a new validation errors collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Move all errors of `other` into this collection
    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over the collected errors
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// True if any error sits exactly at `path`
    pub fn has_path(&self, path: &str) -> bool {
        self.errors.iter().any(|e| e.path == path)
    }

    /// True if any error violates `rule`
    pub fn has_rule(&self, rule: Rule) -> bool {
        self.errors.iter().any(|e| e.rule() == rule)
    }

    /// Ok with `value` if no errors were collected, Err otherwise
    pub fn into_result<T>(self, value: T) -> ValidationResult<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(path: &str, rule: Rule) -> ValidationError {
        ValidationError::new(
            path,
            "something is off",
            ValidationError::create_violation(rule, "a thing", "another thing"),
        )
    }

    #[test]
    fn test_single_error_display() {
        let errors = ValidationErrors::from(sample("$.greeting", Rule::Required));
        assert_eq!(errors.to_string(), "$.greeting: something is off");
    }

    #[test]
    fn test_multiple_errors_display_lists_every_path() {
        let errors = ValidationErrors::from(vec![
            sample("$[0].id", Rule::Format),
            sample("$[1].language", Rule::Enumeration),
        ]);
        let text = errors.to_string();
        assert!(text.starts_with("2 validation errors:"));
        assert!(text.contains("$[0].id"));
        assert!(text.contains("$[1].language"));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ValidationErrors::new().into_result(7), Ok(7));
        let failed = ValidationErrors::from(sample("$", Rule::Type)).into_result(7);
        assert!(failed.is_err());
    }

    #[test]
    fn test_lookup_helpers() {
        let errors = ValidationErrors::from(sample("$.extra", Rule::UnknownField));
        assert!(errors.has_path("$.extra"));
        assert!(errors.has_rule(Rule::UnknownField));
        assert!(!errors.has_rule(Rule::Required));
    }

    #[test]
    fn test_violation_serializes_rule_in_snake_case() {
        let violation = ValidationError::create_violation(Rule::UnknownField, "no field", "extra");
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["rule"], "unknown_field");
    }
}
