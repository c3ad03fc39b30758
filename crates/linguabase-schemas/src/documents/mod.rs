//! Typed models of the four stored documents and their validators
//!
//! Copyright (c) 2025 Linguabase Team
//! Licensed under the Apache-2.0 license

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a string enumeration together with its schema wire values.
///
/// The invoking crate needs `serde` as a dependency.
///
/// ```rust
/// linguabase_schemas::schema_enum! {
///     pub enum Register {
///         Formal => "formal",
///         Casual => "casual",
///     }
/// }
///
/// assert_eq!(Register::Casual.as_str(), "casual");
/// ```
#[macro_export]
macro_rules! schema_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant),+
        }

        impl $crate::validation::SchemaEnum for $name {
            const ALLOWED: &'static [&'static str] = &[$($wire),+];

            fn from_wire(value: &str) -> Option<Self> {
                match value {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl $name {
            /// Wire representation of this value
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod dialogue;
pub mod history;
pub mod knowledge;
pub mod prompts;

pub use dialogue::{DialoguePhrases, DialoguePhrasesValidator};
pub use history::{
    Correctness, Exercise, ExerciseOutcome, ExerciseValidator, ListeningResult,
    NumberPronunciationResult, PlaybackSpeed, PracticeHistory, PracticeHistoryValidator,
    PracticeKind, PronunciationResult, RecordField, TranslationResult, DialogueResult,
};
pub use knowledge::{KnowledgeBase, KnowledgeBaseValidator, KnowledgeKind, KnowledgeRecord};
pub use prompts::{PromptItem, PromptLibrary, PromptLibraryValidator};

schema_enum! {
    /// Language a record or exercise belongs to
    pub enum Language {
        German => "german",
        English => "english",
    }
}

/// The four document types managed by the store
///
/// Serializes as its logical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    KnowledgeBase,
    #[serde(rename = "prompts")]
    PromptLibrary,
    PracticeHistory,
    DialoguePhrases,
}

impl DocumentKind {
    /// Every document type, in report order
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::KnowledgeBase,
        DocumentKind::PromptLibrary,
        DocumentKind::PracticeHistory,
        DocumentKind::DialoguePhrases,
    ];

    /// Stable logical name used in routes, reports and logs
    pub fn logical_name(&self) -> &'static str {
        match self {
            DocumentKind::KnowledgeBase => "knowledge_base",
            DocumentKind::PromptLibrary => "prompts",
            DocumentKind::PracticeHistory => "practice_history",
            DocumentKind::DialoguePhrases => "dialogue_phrases",
        }
    }

    /// Default file name of the backing location
    pub fn default_file_name(&self) -> &'static str {
        match self {
            DocumentKind::KnowledgeBase => "knowledge_base.json",
            DocumentKind::PromptLibrary => "prompts.json",
            DocumentKind::PracticeHistory => "practice_history.json",
            DocumentKind::DialoguePhrases => "dialogue_phrases.json",
        }
    }

    /// Whether the store offers a write operation for this type
    pub fn is_mutable(&self) -> bool {
        matches!(self, DocumentKind::PromptLibrary | DocumentKind::PracticeHistory)
    }

    /// Whether an absent backing location means "empty" rather than an error
    pub fn is_optional(&self) -> bool {
        matches!(self, DocumentKind::PracticeHistory)
    }

    /// Look a type up by its logical name
    pub fn from_logical_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.logical_name() == name)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.logical_name())
    }
}

/// A validated date-time that keeps its original text
///
/// Offsets are honoured; naive values are read as UTC.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Accept RFC 3339, naive ISO 8601 (`T` or space separated) and plain dates
    pub fn parse(raw: &str) -> Option<Self> {
        parse_datetime(raw).map(|_| Self(raw.to_string()))
    }

    /// The current instant, millisecond precision
    pub fn now() -> Self {
        Self(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Original text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The instant this timestamp denotes
    pub fn to_utc(&self) -> DateTime<Utc> {
        // parse() is the only constructor besides now(), both yield parseable text
        parse_datetime(&self.0).unwrap_or_default()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
