//! Base validation trait and common utilities
//!
//! Copyright (c) 2025 Linguabase Team
//! Licensed under the Apache-2.0 license

use crate::documents::DocumentKind;
use crate::validation::error::{Rule, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a schema treats fields it does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Undeclared fields are ignored
    Open,
    /// Undeclared fields are violations
    Closed,
}

/// Path-tracking context threaded through a validation walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    /// Current JSON path
    pub path: String,
}

impl ValidationContext {
    /// Context positioned at the document root (`$`)
    pub fn root() -> Self {
        Self {
            path: "$".to_string(),
        }
    }

    /// Create a child context with updated path
    pub fn child<P: AsRef<str>>(&self, path_segment: P) -> Self {
        Self {
            path: format!("{}.{}", self.path, path_segment.as_ref()),
        }
    }

    /// Create a child context for array index
    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
        }
    }

    /// Build an error located at this context
    pub fn error<M, E, A>(&self, message: M, rule: Rule, expected: E, actual: A) -> ValidationError
    where
        M: Into<String>,
        E: Into<String>,
        A: Into<String>,
    {
        ValidationError::new(
            self.path.clone(),
            message,
            ValidationError::create_violation(rule, expected, actual),
        )
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::root()
    }
}

/// Base trait for validators that turn raw JSON into a typed value
pub trait SchemaValidator {
    /// The typed value produced by a successful validation
    type Output;

    /// Whether undeclared fields are tolerated
    fn strictness(&self) -> Strictness {
        Strictness::Open
    }

    /// Validate starting at the given context
    fn validate_with_context(
        &self,
        input: &Value,
        context: &ValidationContext,
    ) -> ValidationResult<Self::Output>;

    /// Validate a complete value from the root
    fn validate(&self, input: &Value) -> ValidationResult<Self::Output> {
        self.validate_with_context(input, &ValidationContext::root())
    }
}

/// A validator for one of the four stored document types
pub trait DocumentSchema: SchemaValidator + Default {
    /// The document type this schema governs
    const KIND: DocumentKind;

    /// Number of top-level entries, as shown in validation reports
    fn entry_count(document: &Self::Output) -> usize;
}

/// Describe the JSON type of a value for violation messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
