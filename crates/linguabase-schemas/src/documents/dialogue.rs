//! Dialogue Phrase Set used by dialogue practice
//!
//! Copyright (c) 2025 Linguabase Team
//! Licensed under the Apache-2.0 license

use super::DocumentKind;
use crate::validation::base::{DocumentSchema, SchemaValidator, Strictness, ValidationContext};
use crate::validation::error::{ValidationErrors, ValidationResult};
use crate::validation::fields::ObjectReader;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opening, closing and in-between phrases of a practice dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialoguePhrases {
    pub greeting: String,
    pub farewell: String,
    pub middle_phrases: Vec<String>,
}

/// Validator for the Dialogue Phrase Set; the only closed schema
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguePhrasesValidator;

impl SchemaValidator for DialoguePhrasesValidator {
    type Output = DialoguePhrases;

    fn strictness(&self) -> Strictness {
        Strictness::Closed
    }

    fn validate_with_context(
        &self,
        input: &Value,
        context: &ValidationContext,
    ) -> ValidationResult<Self::Output> {
        let mut errors = ValidationErrors::new();
        let phrases = ObjectReader::new(input, context, &mut errors).and_then(|mut reader| {
            let greeting = reader.string("greeting");
            let farewell = reader.string("farewell");
            let middle_phrases = reader.string_list("middle_phrases", 1, None);
            reader.finish(self.strictness());
            Some(DialoguePhrases {
                greeting: greeting?,
                farewell: farewell?,
                middle_phrases: middle_phrases?,
            })
        });
        match phrases {
            Some(phrases) => errors.into_result(phrases),
            None => Err(errors),
        }
    }
}

impl DocumentSchema for DialoguePhrasesValidator {
    const KIND: DocumentKind = DocumentKind::DialoguePhrases;

    fn entry_count(document: &Self::Output) -> usize {
        document.middle_phrases.len()
    }
}
