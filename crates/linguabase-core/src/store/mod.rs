//! Document store: validated access to the JSON documents of a data directory
//!
//! Every read is validated against the document's schema, and every write
//! is validated before anything touches the disk. The store is built once
//! from a [`StoreConfig`] and shared (usually behind an `Arc`) by whoever
//! needs documents.
//!
//! Writers are serialised by an async mutex so that concurrent
//! [`DocumentStore::append_exercise`] calls in one process cannot lose an
//! entry. Readers take no lock; the atomic rename guarantees they never see
//! a half-written file.

mod atomic;

use crate::error::{Error, Result};
use linguabase_schemas::{
    DialoguePhrases, DialoguePhrasesValidator, DocumentKind, DocumentSchema, ExerciseValidator,
    KnowledgeBase, KnowledgeBaseValidator, PracticeHistory, PracticeHistoryValidator,
    PromptLibrary, PromptLibraryValidator, SchemaValidator,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Where the store finds its documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the document files
    pub data_dir: PathBuf,
    pub knowledge_base_file: String,
    pub prompts_file: String,
    pub practice_history_file: String,
    pub dialogue_phrases_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("data")
    }
}

impl StoreConfig {
    /// Default file names inside `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            knowledge_base_file: DocumentKind::KnowledgeBase.default_file_name().to_string(),
            prompts_file: DocumentKind::PromptLibrary.default_file_name().to_string(),
            practice_history_file: DocumentKind::PracticeHistory.default_file_name().to_string(),
            dialogue_phrases_file: DocumentKind::DialoguePhrases.default_file_name().to_string(),
        }
    }

    /// File name configured for `kind`
    pub fn file_name(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::KnowledgeBase => &self.knowledge_base_file,
            DocumentKind::PromptLibrary => &self.prompts_file,
            DocumentKind::PracticeHistory => &self.practice_history_file,
            DocumentKind::DialoguePhrases => &self.dialogue_phrases_file,
        }
    }
}

/// Validated reader and writer of the four documents
#[derive(Debug)]
pub struct DocumentStore {
    config: StoreConfig,
    write_lock: Mutex<()>,
}

impl DocumentStore {
    /// Create a store over the configured data directory
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store with default file names inside `data_dir`
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::new(data_dir))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Backing file of `kind`; for logs and diagnostics only
    pub fn document_path(&self, kind: DocumentKind) -> PathBuf {
        self.config.data_dir.join(self.config.file_name(kind))
    }

    /// Load and validate the document governed by `D`
    pub async fn load<D: DocumentSchema>(&self) -> Result<D::Output> {
        let kind = D::KIND;
        let raw = self.read_raw(kind).await?;
        let document = D::default()
            .validate(&raw)
            .map_err(|errors| Error::schema(kind, errors))?;
        debug!(document = %kind, entries = D::entry_count(&document), "document loaded");
        Ok(document)
    }

    pub async fn load_knowledge_base(&self) -> Result<KnowledgeBase> {
        self.load::<KnowledgeBaseValidator>().await
    }

    pub async fn load_prompt_library(&self) -> Result<PromptLibrary> {
        self.load::<PromptLibraryValidator>().await
    }

    /// Load the history; an absent file is reported as NotFound
    pub async fn load_practice_history(&self) -> Result<PracticeHistory> {
        self.load::<PracticeHistoryValidator>().await
    }

    pub async fn load_dialogue_phrases(&self) -> Result<DialoguePhrases> {
        self.load::<DialoguePhrasesValidator>().await
    }

    /// Load the history, reading an absent file as an empty history
    pub async fn load_practice_history_or_empty(&self) -> Result<PracticeHistory> {
        match self.load_practice_history().await {
            Err(e) if e.is_not_found(DocumentKind::PracticeHistory) => {
                debug!("practice history absent, using an empty one");
                Ok(PracticeHistory::empty())
            }
            other => other,
        }
    }

    /// Validate `value` as a Prompt Library and replace the stored one
    ///
    /// Returns the library exactly as persisted. Nothing is written when
    /// validation fails.
    pub async fn save_prompt_library<T>(&self, value: &T) -> Result<PromptLibrary>
    where
        T: Serialize + ?Sized,
    {
        let kind = DocumentKind::PromptLibrary;
        let raw = to_raw(value)?;
        let library = PromptLibraryValidator
            .validate(&raw)
            .map_err(|errors| Error::schema(kind, errors))?;

        let _guard = self.write_lock.lock().await;
        self.persist(kind, &library).await?;
        info!(prompts = library.prompts.len(), "prompt library saved");
        Ok(library)
    }

    /// Validate `exercise` and append it to the Practice History
    ///
    /// An absent history starts out empty. Existing entries are kept in
    /// order and the new one goes last. An `exercise_id` already recorded
    /// is a SchemaViolation and nothing is written. Returns the updated
    /// history.
    pub async fn append_exercise<T>(&self, exercise: &T) -> Result<PracticeHistory>
    where
        T: Serialize + ?Sized,
    {
        let kind = DocumentKind::PracticeHistory;
        let raw = to_raw(exercise)?;

        let _guard = self.write_lock.lock().await;
        let mut history = self.load_practice_history_or_empty().await?;
        let exercise = ExerciseValidator
            .validate(&raw)
            .map_err(|errors| Error::schema(kind, errors))?;
        let exercise_id = exercise.exercise_id;
        history
            .try_push(exercise)
            .map_err(|errors| Error::schema(kind, errors))?;

        self.persist(kind, &history).await?;
        info!(%exercise_id, total = history.len(), "exercise appended");
        Ok(history)
    }

    async fn read_raw(&self, kind: DocumentKind) -> Result<Value> {
        let path = self.document_path(kind);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(document = %kind, path = %path.display(), "document file missing");
                return Err(Error::NotFound { document: kind });
            }
            Err(e) => {
                return Err(Error::internal(format!(
                    "failed to read document '{}': {}",
                    kind, e
                )))
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| Error::Malformed {
            document: kind,
            source,
        })
    }

    async fn persist<T: Serialize>(&self, kind: DocumentKind, document: &T) -> Result<()> {
        let path = self.document_path(kind);
        let mut content = serde_json::to_vec_pretty(document)
            .map_err(|e| Error::internal(format!("failed to serialize '{}': {}", kind, e)))?;
        content.push(b'\n');
        atomic::write_atomic(&path, &content)
            .await
            .map_err(|source| Error::PersistenceFailure {
                document: kind,
                source,
            })?;
        debug!(document = %kind, path = %path.display(), bytes = content.len(), "document persisted");
        Ok(())
    }
}

fn to_raw<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::internal(format!("unserializable value: {}", e)))
}

/// True if the data directory exists and is a directory
pub async fn data_dir_exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}
