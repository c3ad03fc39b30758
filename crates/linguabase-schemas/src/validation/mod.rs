//! Validation engine for the Linguabase documents
//!
//! Validators walk a parsed `serde_json::Value` once, collecting every
//! violation with its JSON path, and produce the typed document only when
//! nothing was found. Each schema chooses its own [`Strictness`]:
//!
//! - **Open**: undeclared fields are ignored
//! - **Closed**: undeclared fields are violations
//!
//! Copyright (c) 2025 Linguabase Team
//! Licensed under the Apache-2.0 license

pub mod base;
pub mod error;
pub mod fields;

// Re-export commonly used types
pub use base::{json_type_name, DocumentSchema, SchemaValidator, Strictness, ValidationContext};
pub use error::{Rule, ValidationError, ValidationErrors, ValidationResult, Violation};
pub use fields::{ObjectReader, SchemaEnum};

use crate::documents::{
    DialoguePhrasesValidator, DocumentKind, ExerciseValidator, KnowledgeBaseValidator,
    PracticeHistoryValidator, PromptLibraryValidator,
};
use serde_json::Value;

/// Validate a document of the given type and return its entry count
///
/// Useful when the caller only has a raw value and a type name, e.g. when
/// checking a file given on the command line.
///
/// # Examples
///
/// ```rust
/// use linguabase_schemas::validation::validate_document;
/// use linguabase_schemas::DocumentKind;
/// use serde_json::json;
///
/// let phrases = json!({
///     "greeting": "Hallo!",
///     "farewell": "Tschüss!",
///     "middle_phrases": ["Wie geht's?"]
/// });
///
/// assert_eq!(validate_document(DocumentKind::DialoguePhrases, &phrases).unwrap(), 1);
/// ```
pub fn validate_document(kind: DocumentKind, value: &Value) -> ValidationResult<usize> {
    fn count<D: DocumentSchema>(value: &Value) -> ValidationResult<usize> {
        D::default().validate(value).map(|doc| D::entry_count(&doc))
    }

    match kind {
        DocumentKind::KnowledgeBase => count::<KnowledgeBaseValidator>(value),
        DocumentKind::PromptLibrary => count::<PromptLibraryValidator>(value),
        DocumentKind::PracticeHistory => count::<PracticeHistoryValidator>(value),
        DocumentKind::DialoguePhrases => count::<DialoguePhrasesValidator>(value),
    }
}

/// Batch validation for exercises, e.g. a list about to be imported
///
/// Errors are addressed by batch index (`$[3].language`). With `fail_fast`
/// the walk stops after the first invalid exercise.
pub fn validate_exercises_batch(exercises: &[Value], fail_fast: bool) -> ValidationResult<()> {
    let validator = ExerciseValidator;
    let mut errors = ValidationErrors::new();
    let context = ValidationContext::root();

    for (i, exercise) in exercises.iter().enumerate() {
        if let Err(found) = validator.validate_with_context(exercise, &context.child_index(i)) {
            errors.extend(found);
            if fail_fast {
                break;
            }
        }
    }

    errors.into_result(())
}
