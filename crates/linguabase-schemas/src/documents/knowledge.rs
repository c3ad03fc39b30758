//! Knowledge Base: the list of phrases and words a learner has collected
//!
//! Copyright (c) 2025 Linguabase Team
//! Licensed under the Apache-2.0 license

use super::{DocumentKind, Language, Timestamp};
use crate::validation::base::{DocumentSchema, SchemaValidator, Strictness, ValidationContext};
use crate::validation::error::{Rule, ValidationErrors, ValidationResult};
use crate::validation::fields::{expect_list, ObjectReader};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

schema_enum! {
    /// Whether a record holds a phrase or a single word
    pub enum KnowledgeKind {
        Phrase => "phrase",
        Word => "word",
    }
}

/// One entry of the Knowledge Base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub id: Uuid,
    pub timestamp: Timestamp,
    pub language: Language,
    pub kind: KnowledgeKind,
    pub source_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic_transcription: Option<String>,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syllable_breakdown: Option<String>,
}

/// The whole Knowledge Base, in file order
pub type KnowledgeBase = Vec<KnowledgeRecord>;

/// Validator for the Knowledge Base document
#[derive(Debug, Default, Clone, Copy)]
pub struct KnowledgeBaseValidator;

impl KnowledgeBaseValidator {
    fn read_record(
        value: &Value,
        ctx: &ValidationContext,
        errors: &mut ValidationErrors,
    ) -> Option<KnowledgeRecord> {
        let mut reader = ObjectReader::new(value, ctx, errors)?;
        let id = reader.uuid("id");
        let timestamp = reader.timestamp("timestamp");
        let language = reader.enumeration::<Language>("language");
        let kind = reader.enumeration::<KnowledgeKind>("kind");
        let source_text = reader.non_empty_string("source_text");
        let phonetic_transcription = reader.optional_string("phonetic_transcription");
        let translation = reader.non_empty_string("translation");
        let syllable_breakdown = reader.optional_string("syllable_breakdown");
        reader.finish(Strictness::Open);

        Some(KnowledgeRecord {
            id: id?,
            timestamp: timestamp?,
            language: language?,
            kind: kind?,
            source_text: source_text?,
            phonetic_transcription,
            translation: translation?,
            syllable_breakdown,
        })
    }
}

impl SchemaValidator for KnowledgeBaseValidator {
    type Output = KnowledgeBase;

    fn validate_with_context(
        &self,
        input: &Value,
        context: &ValidationContext,
    ) -> ValidationResult<Self::Output> {
        let mut errors = ValidationErrors::new();
        let records = expect_list(input, context, &mut errors, 0, None, Self::read_record);

        // Ids are checked on the raw values so a duplicate is reported even
        // when a sibling record is otherwise malformed.
        if let Value::Array(raw) = input {
            let mut seen = HashSet::new();
            for (index, record) in raw.iter().enumerate() {
                let Some(id) = record.get("id").and_then(Value::as_str) else {
                    continue;
                };
                let Ok(id) = Uuid::parse_str(id) else {
                    continue;
                };
                if !seen.insert(id) {
                    errors.add(context.child_index(index).child("id").error(
                        format!("duplicate record id '{}'", id),
                        Rule::Unique,
                        "an id not used by an earlier record",
                        id.to_string(),
                    ));
                }
            }
        }

        match records {
            Some(records) => errors.into_result(records),
            None => Err(errors),
        }
    }
}

impl DocumentSchema for KnowledgeBaseValidator {
    const KIND: DocumentKind = DocumentKind::KnowledgeBase;

    fn entry_count(document: &Self::Output) -> usize {
        document.len()
    }
}
