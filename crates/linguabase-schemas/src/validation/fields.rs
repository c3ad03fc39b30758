//! Field readers that validate and extract typed values in one pass
//!
//! Every reader records its violations into a shared [`ValidationErrors`]
//! and returns `None` for the offending value, so a single walk reports
//! all problems of a document instead of stopping at the first one.
//!
//! Copyright (c) 2025 Linguabase Team
//! Licensed under the Apache-2.0 license

use crate::documents::Timestamp;
use crate::validation::base::{json_type_name, Strictness, ValidationContext};
use crate::validation::error::{Rule, ValidationErrors};
use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

/// A closed set of string values accepted for a field
pub trait SchemaEnum: Sized + Copy {
    /// Wire values, in declaration order
    const ALLOWED: &'static [&'static str];

    /// Parse a wire value
    fn from_wire(value: &str) -> Option<Self>;
}

/// Require `value` to be a string
pub fn expect_string(
    value: &Value,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        other => {
            errors.add(ctx.error(
                format!("expected a string, found {}", json_type_name(other)),
                Rule::Type,
                "string",
                json_type_name(other),
            ));
            None
        }
    }
}

/// Require `value` to be a string with at least one character
pub fn expect_non_empty_string(
    value: &Value,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let s = expect_string(value, ctx, errors)?;
    if s.is_empty() {
        errors.add(ctx.error(
            "string must not be empty",
            Rule::NonEmpty,
            "at least 1 character",
            "empty string",
        ));
        return None;
    }
    Some(s)
}

/// Require `value` to be a boolean
pub fn expect_bool(
    value: &Value,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        other => {
            errors.add(ctx.error(
                format!("expected a boolean, found {}", json_type_name(other)),
                Rule::Type,
                "boolean",
                json_type_name(other),
            ));
            None
        }
    }
}

/// Require `value` to be one of the wire values of `E`
pub fn expect_enum<E: SchemaEnum>(
    value: &Value,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) -> Option<E> {
    let s = expect_string(value, ctx, errors)?;
    match E::from_wire(&s) {
        Some(parsed) => Some(parsed),
        None => {
            errors.add(ctx.error(
                format!("invalid value '{}'", s),
                Rule::Enumeration,
                format!("one of: {}", E::ALLOWED.join(", ")),
                s,
            ));
            None
        }
    }
}

/// Require `value` to be a hyphenated UUID string
pub fn expect_uuid(
    value: &Value,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) -> Option<Uuid> {
    let s = expect_string(value, ctx, errors)?;
    match Uuid::parse_str(&s) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(ctx.error(
                format!("'{}' is not a valid UUID", s),
                Rule::Format,
                "UUID",
                s,
            ));
            None
        }
    }
}

/// Require `value` to be a date-time string
pub fn expect_timestamp(
    value: &Value,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) -> Option<Timestamp> {
    let s = expect_string(value, ctx, errors)?;
    match Timestamp::parse(&s) {
        Some(ts) => Some(ts),
        None => {
            errors.add(ctx.error(
                format!("'{}' is not a valid date-time", s),
                Rule::Format,
                "ISO 8601 date-time",
                s,
            ));
            None
        }
    }
}

/// Require `value` to be a JSON object
pub fn expect_object<'v>(
    value: &'v Value,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) -> Option<&'v Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => {
            errors.add(ctx.error(
                format!("expected an object, found {}", json_type_name(other)),
                Rule::Type,
                "object",
                json_type_name(other),
            ));
            None
        }
    }
}

/// Require `value` to be an array whose length lies in `min..=max`, and
/// read every element with `item`
pub fn expect_list<T, F>(
    value: &Value,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
    min: usize,
    max: Option<usize>,
    mut item: F,
) -> Option<Vec<T>>
where
    F: FnMut(&Value, &ValidationContext, &mut ValidationErrors) -> Option<T>,
{
    let elements = match value {
        Value::Array(elements) => elements,
        other => {
            errors.add(ctx.error(
                format!("expected an array, found {}", json_type_name(other)),
                Rule::Type,
                "array",
                json_type_name(other),
            ));
            return None;
        }
    };

    let too_short = elements.len() < min;
    let too_long = max.is_some_and(|max| elements.len() > max);
    if too_short || too_long {
        let expected = match max {
            Some(max) => format!("between {} and {} elements", min, max),
            None => format!("at least {} element(s)", min),
        };
        errors.add(ctx.error(
            format!("list has {} element(s), expected {}", elements.len(), expected),
            Rule::Cardinality,
            expected,
            format!("{} element(s)", elements.len()),
        ));
    }

    let mut out = Vec::with_capacity(elements.len());
    let mut complete = !(too_short || too_long);
    for (index, element) in elements.iter().enumerate() {
        match item(element, &ctx.child_index(index), errors) {
            Some(parsed) => out.push(parsed),
            None => complete = false,
        }
    }
    complete.then_some(out)
}

/// Reads the declared fields of one JSON object
///
/// Every accessor marks its field as declared; [`ObjectReader::finish`]
/// then rejects the rest when the schema is [`Strictness::Closed`].
pub struct ObjectReader<'v, 'e> {
    map: &'v Map<String, Value>,
    ctx: ValidationContext,
    errors: &'e mut ValidationErrors,
    declared: HashSet<&'static str>,
}

impl<'v, 'e> ObjectReader<'v, 'e> {
    /// Start reading `value`, which must be an object
    pub fn new(
        value: &'v Value,
        ctx: &ValidationContext,
        errors: &'e mut ValidationErrors,
    ) -> Option<Self> {
        let map = expect_object(value, ctx, errors)?;
        Some(Self {
            map,
            ctx: ctx.clone(),
            errors,
            declared: HashSet::new(),
        })
    }

    /// Context of the object itself
    pub fn context(&self) -> &ValidationContext {
        &self.ctx
    }

    /// Raw value of an optional field; `null` counts as absent
    pub fn optional(&mut self, name: &'static str) -> Option<&'v Value> {
        self.declared.insert(name);
        self.map.get(name).filter(|v| !v.is_null())
    }

    /// Raw value of a required field, recording a violation when absent
    pub fn required(&mut self, name: &'static str) -> Option<(&'v Value, ValidationContext)> {
        let field_ctx = self.ctx.child(name);
        match self.optional(name) {
            Some(value) => Some((value, field_ctx)),
            None => {
                self.errors.add(field_ctx.error(
                    format!("required field '{}' is missing", name),
                    Rule::Required,
                    format!("field '{}' to be present", name),
                    "field is missing",
                ));
                None
            }
        }
    }

    /// Apply `read` to a required field
    pub fn with<T, F>(&mut self, name: &'static str, read: F) -> Option<T>
    where
        F: FnOnce(&Value, &ValidationContext, &mut ValidationErrors) -> Option<T>,
    {
        let (value, ctx) = self.required(name)?;
        read(value, &ctx, self.errors)
    }

    /// Apply `read` to an optional field
    pub fn with_optional<T, F>(&mut self, name: &'static str, read: F) -> Option<T>
    where
        F: FnOnce(&Value, &ValidationContext, &mut ValidationErrors) -> Option<T>,
    {
        let value = self.optional(name)?;
        let ctx = self.ctx.child(name);
        read(value, &ctx, self.errors)
    }

    /// Required string (may be empty)
    pub fn string(&mut self, name: &'static str) -> Option<String> {
        self.with(name, expect_string)
    }

    /// Required non-empty string
    pub fn non_empty_string(&mut self, name: &'static str) -> Option<String> {
        self.with(name, expect_non_empty_string)
    }

    /// Optional string
    pub fn optional_string(&mut self, name: &'static str) -> Option<String> {
        self.with_optional(name, expect_string)
    }

    /// Required boolean
    pub fn boolean(&mut self, name: &'static str) -> Option<bool> {
        self.with(name, expect_bool)
    }

    /// Optional boolean
    pub fn optional_boolean(&mut self, name: &'static str) -> Option<bool> {
        self.with_optional(name, expect_bool)
    }

    /// Required enumeration value
    pub fn enumeration<E: SchemaEnum>(&mut self, name: &'static str) -> Option<E> {
        self.with(name, expect_enum::<E>)
    }

    /// Required UUID
    pub fn uuid(&mut self, name: &'static str) -> Option<Uuid> {
        self.with(name, expect_uuid)
    }

    /// Required date-time
    pub fn timestamp(&mut self, name: &'static str) -> Option<Timestamp> {
        self.with(name, expect_timestamp)
    }

    /// Required list of strings with cardinality bounds
    pub fn string_list(
        &mut self,
        name: &'static str,
        min: usize,
        max: Option<usize>,
    ) -> Option<Vec<String>> {
        self.with(name, |value, ctx, errors| {
            expect_list(value, ctx, errors, min, max, expect_string)
        })
    }

    /// Record a violation against a field of this object
    pub fn reject(
        &mut self,
        name: &str,
        message: impl Into<String>,
        rule: Rule,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) {
        let error = self.ctx.child(name).error(message, rule, expected, actual);
        self.errors.add(error);
    }

    /// Finish reading, rejecting undeclared fields on closed schemas
    pub fn finish(self, strictness: Strictness) {
        if strictness == Strictness::Open {
            return;
        }
        for key in self.map.keys() {
            if !self.declared.contains(key.as_str()) {
                self.errors.add(self.ctx.child(key).error(
                    format!("unexpected field '{}'", key),
                    Rule::UnknownField,
                    "no undeclared fields",
                    key.clone(),
                ));
            }
        }
    }
}
