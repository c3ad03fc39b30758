//! Prompt Library: the LLM prompt templates used by the practice screens
//!
//! Templates mark their placeholders with the library's
//! `parameter_delimiter`. Whether `parameters` lists exactly the placeholders
//! a template uses is an authoring convention and is not checked here.
//!
//! Copyright (c) 2025 Linguabase Team
//! Licensed under the Apache-2.0 license

use super::{DocumentKind, Timestamp};
use crate::validation::base::{
    json_type_name, DocumentSchema, SchemaValidator, Strictness, ValidationContext,
};
use crate::validation::error::{Rule, ValidationErrors, ValidationResult};
use crate::validation::fields::{expect_list, ObjectReader};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// One prompt template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptItem {
    pub id: String,
    pub description: String,
    pub template: String,
    pub parameters: Vec<String>,
    pub structured_response: bool,
    /// Free-form description of the JSON reply, meaningful only when
    /// `structured_response` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_structure: Option<Map<String, Value>>,
    pub last_edited: Timestamp,
}

/// The Prompt Library document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptLibrary {
    pub description: String,
    pub last_updated: Timestamp,
    pub parameter_delimiter: String,
    pub prompts: Vec<PromptItem>,
}

impl PromptLibrary {
    /// Find a prompt by id
    pub fn find(&self, id: &str) -> Option<&PromptItem> {
        self.prompts.iter().find(|prompt| prompt.id == id)
    }
}

/// Validator for the Prompt Library document
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptLibraryValidator;

impl PromptLibraryValidator {
    fn read_item(
        value: &Value,
        ctx: &ValidationContext,
        errors: &mut ValidationErrors,
    ) -> Option<PromptItem> {
        let mut reader = ObjectReader::new(value, ctx, errors)?;
        let id = reader.string("id");
        let description = reader.string("description");
        let template = reader.string("template");
        let parameters = reader.string_list("parameters", 0, None);
        let structured_response = reader.boolean("structured_response");
        let expected_structure = match reader.optional("expected_structure") {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map.clone())),
            Some(other) => Err(json_type_name(other)),
        };
        if let Err(found) = expected_structure {
            reader.reject(
                "expected_structure",
                format!("expected an object, found {}", found),
                Rule::Type,
                "object",
                found,
            );
        }
        let last_edited = reader.timestamp("last_edited");
        reader.finish(Strictness::Open);

        Some(PromptItem {
            id: id?,
            description: description?,
            template: template?,
            parameters: parameters?,
            structured_response: structured_response?,
            expected_structure: expected_structure.ok()?,
            last_edited: last_edited?,
        })
    }
}

impl SchemaValidator for PromptLibraryValidator {
    type Output = PromptLibrary;

    fn validate_with_context(
        &self,
        input: &Value,
        context: &ValidationContext,
    ) -> ValidationResult<Self::Output> {
        let mut errors = ValidationErrors::new();
        let library = Self::read_library(input, context, &mut errors);
        match library {
            Some(library) => errors.into_result(library),
            None => Err(errors),
        }
    }
}

impl PromptLibraryValidator {
    fn read_library(
        input: &Value,
        context: &ValidationContext,
        errors: &mut ValidationErrors,
    ) -> Option<PromptLibrary> {
        let mut reader = ObjectReader::new(input, context, errors)?;
        let description = reader.string("description");
        let last_updated = reader.timestamp("last_updated");
        let parameter_delimiter = reader.string("parameter_delimiter");
        let prompts = reader.with("prompts", |value, ctx, errors| {
            let items = expect_list(value, ctx, errors, 0, None, Self::read_item)?;
            {
                let mut seen = HashSet::new();
                for (index, item) in items.iter().enumerate() {
                    if !seen.insert(item.id.as_str()) {
                        errors.add(ctx.child_index(index).child("id").error(
                            format!("duplicate prompt id '{}'", item.id),
                            Rule::Unique,
                            "an id not used by an earlier prompt",
                            item.id.clone(),
                        ));
                    }
                }
            }
            Some(items)
        });
        reader.finish(Strictness::Open);

        Some(PromptLibrary {
            description: description?,
            last_updated: last_updated?,
            parameter_delimiter: parameter_delimiter?,
            prompts: prompts?,
        })
    }
}

impl DocumentSchema for PromptLibraryValidator {
    const KIND: DocumentKind = DocumentKind::PromptLibrary;

    fn entry_count(document: &Self::Output) -> usize {
        document.prompts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn library() -> Value {
        json!({
            "description": "Prompts for the practice screens",
            "last_updated": "2025-03-01T12:00:00",
            "parameter_delimiter": "$$",
            "prompts": [{
                "id": "translate",
                "description": "Check a translation",
                "template": "Translate $$text$$ into $$language$$",
                "parameters": ["text", "language"],
                "structured_response": true,
                "expected_structure": {"correct": "boolean"},
                "last_edited": "2025-03-01T12:00:00"
            }]
        })
    }

    #[test]
    fn test_valid_library() {
        let parsed = PromptLibraryValidator.validate(&library()).unwrap();
        assert_eq!(parsed.prompts.len(), 1);
        assert!(parsed.find("translate").unwrap().expected_structure.is_some());
    }

    #[test]
    fn test_null_expected_structure_equals_absent() {
        let mut value = library();
        value["prompts"][0]["expected_structure"] = Value::Null;
        let parsed = PromptLibraryValidator.validate(&value).unwrap();
        assert_eq!(parsed.prompts[0].expected_structure, None);
    }

    #[test]
    fn test_expected_structure_must_be_an_object() {
        let mut value = library();
        value["prompts"][0]["expected_structure"] = json!("boolean");
        let errors = PromptLibraryValidator.validate(&value).unwrap_err();
        assert!(errors.has_path("$.prompts[0].expected_structure"));
    }

    #[test]
    fn test_placeholders_are_not_cross_checked() {
        let mut value = library();
        value["prompts"][0]["parameters"] = json!(["unrelated"]);
        assert!(PromptLibraryValidator.validate(&value).is_ok());
    }

    #[test]
    fn test_duplicate_prompt_ids() {
        let mut value = library();
        let copy = value["prompts"][0].clone();
        value["prompts"].as_array_mut().unwrap().push(copy);
        let errors = PromptLibraryValidator.validate(&value).unwrap_err();
        assert!(errors.has_path("$.prompts[1].id"));
        assert!(errors.has_rule(Rule::Unique));
    }

    #[test]
    fn test_missing_top_level_fields() {
        let errors = PromptLibraryValidator.validate(&json!({"prompts": []})).unwrap_err();
        assert!(errors.has_path("$.description"));
        assert!(errors.has_path("$.last_updated"));
        assert!(errors.has_path("$.parameter_delimiter"));
    }
}
