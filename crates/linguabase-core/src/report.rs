//! Validation report across every stored document
//!
//! Each document is loaded on its own; one broken document never keeps
//! the others from being checked.

use crate::error::{Error, ErrorKind};
use crate::store::DocumentStore;
use linguabase_schemas::{
    DialoguePhrasesValidator, DocumentKind, DocumentSchema, KnowledgeBaseValidator,
    PracticeHistoryValidator, PromptLibraryValidator, ValidationErrors,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Outcome for a single document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportEntry {
    /// Loaded and valid; `count` is its number of top-level entries
    Ok { count: usize },
    /// Could not be loaded
    Invalid {
        kind: ErrorKind,
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        violations: Option<ValidationErrors>,
    },
    /// Absent, which is allowed for optional documents
    MissingButOptional,
}

impl ReportEntry {
    pub fn is_invalid(&self) -> bool {
        matches!(self, ReportEntry::Invalid { .. })
    }

    fn from_error(error: &Error) -> Self {
        ReportEntry::Invalid {
            kind: error.kind(),
            error: error.detail(),
            violations: error.violations().cloned(),
        }
    }
}

/// Per-document outcomes, ordered like [`DocumentKind::ALL`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    pub entries: BTreeMap<DocumentKind, ReportEntry>,
}

impl ValidationReport {
    /// True when no document is invalid
    pub fn is_healthy(&self) -> bool {
        !self.entries.values().any(ReportEntry::is_invalid)
    }

    pub fn get(&self, kind: DocumentKind) -> Option<&ReportEntry> {
        self.entries.get(&kind)
    }

    /// Number of invalid documents
    pub fn invalid_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_invalid()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DocumentKind, &ReportEntry)> {
        self.entries.iter()
    }
}

/// Check every document of `store`
pub async fn build_report(store: &DocumentStore) -> ValidationReport {
    let mut entries = BTreeMap::new();
    for kind in DocumentKind::ALL {
        let entry = match kind {
            DocumentKind::KnowledgeBase => check::<KnowledgeBaseValidator>(store).await,
            DocumentKind::PromptLibrary => check::<PromptLibraryValidator>(store).await,
            DocumentKind::PracticeHistory => check::<PracticeHistoryValidator>(store).await,
            DocumentKind::DialoguePhrases => check::<DialoguePhrasesValidator>(store).await,
        };
        entries.insert(kind, entry);
    }
    ValidationReport { entries }
}

async fn check<D: DocumentSchema>(store: &DocumentStore) -> ReportEntry {
    match store.load::<D>().await {
        Ok(document) => {
            let count = D::entry_count(&document);
            debug!(document = %D::KIND, count, "document valid");
            ReportEntry::Ok { count }
        }
        Err(e) if D::KIND.is_optional() && e.is_not_found(D::KIND) => {
            debug!(document = %D::KIND, "optional document missing");
            ReportEntry::MissingButOptional
        }
        Err(e) => {
            warn!(document = %D::KIND, kind = %e.kind(), "document invalid: {}", e);
            ReportEntry::from_error(&e)
        }
    }
}
