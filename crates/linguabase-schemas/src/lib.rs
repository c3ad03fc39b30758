//! Linguabase Schemas - typed documents and their validators
//!
//! This crate describes the four JSON documents of a Linguabase data
//! directory and validates raw JSON against them:
//! - **Knowledge Base**: the phrases and words a learner collected
//! - **Prompt Library**: LLM prompt templates for the practice screens
//! - **Practice History**: the append-only log of finished exercises
//! - **Dialogue Phrase Set**: phrases for dialogue practice (closed schema)
//!
//! It performs no I/O; loading and persisting live in `linguabase-core`.
//!
//! ## Quick Start
//!
//! ```rust
//! use linguabase_schemas::{KnowledgeBaseValidator, SchemaValidator};
//! use serde_json::json;
//!
//! let base = json!([{
//!     "id": "6f1c2a4e-8f0e-4c55-9f7d-3b2f1a0c9e11",
//!     "timestamp": "2025-02-10T09:30:00",
//!     "language": "german",
//!     "kind": "phrase",
//!     "source_text": "Hallo",
//!     "translation": "Olá"
//! }]);
//!
//! match KnowledgeBaseValidator.validate(&base) {
//!     Ok(records) => println!("{} records", records.len()),
//!     Err(e) => println!("Validation error: {}", e),
//! }
//! ```
//!
//! ## Violations
//!
//! Every violation names its JSON path (`$[1].language`,
//! `$.prompts[0].last_edited`) and the [`Rule`] it broke. A validator
//! reports all of them in one pass.
//!
//! Copyright (c) 2025 Linguabase Team
//! Licensed under the Apache-2.0 license

pub mod documents;
pub mod validation;

// Re-export commonly used types for convenience
pub use documents::{
    Correctness, DialoguePhrases, DialoguePhrasesValidator, DialogueResult, DocumentKind,
    Exercise, ExerciseOutcome, ExerciseValidator, KnowledgeBase, KnowledgeBaseValidator,
    KnowledgeKind, KnowledgeRecord, Language, ListeningResult, NumberPronunciationResult,
    PlaybackSpeed, PracticeHistory, PracticeHistoryValidator, PracticeKind, PromptItem,
    PromptLibrary, PromptLibraryValidator, PronunciationResult, RecordField, Timestamp,
    TranslationResult,
};
pub use validation::{
    validate_document, validate_exercises_batch, DocumentSchema, Rule, SchemaValidator,
    Strictness, ValidationContext, ValidationError, ValidationErrors, ValidationResult,
};
