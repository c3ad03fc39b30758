//! Linguabase Core - document store, validation report and service proxy
//!
//! This crate owns every side effect of a Linguabase backend: reading and
//! writing the JSON documents of a data directory, and calling the external
//! speech and chat services.
//!
//! # Main Components
//!
//! - **Document Store**: validated load of the four documents, full
//!   replacement of the Prompt Library, append-only Practice History
//! - **Validation Report**: per-document outcome across the data directory
//! - **Service Proxy**: TTS, STT and chat forwarding with uniform failures
//! - **Error Handling**: one taxonomy, see [`ErrorKind`]
//!
//! # Example
//!
//! ```no_run
//! use linguabase_core::{build_report, DocumentStore, Result};
//!
//! async fn example() -> Result<()> {
//!     let store = DocumentStore::open("./data");
//!     let phrases = store.load_dialogue_phrases().await?;
//!     println!("{}", phrases.greeting);
//!
//!     let report = build_report(&store).await;
//!     assert!(report.is_healthy());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod proxy;
pub mod report;
pub mod store;

// Re-export main types for convenience
pub use error::{Error, ErrorKind, Result};
pub use proxy::{
    AudioRequest, AudioUpload, ChatMessage, ChatRequest, ChatRole, ProxyConfig, Service,
    ServiceEndpoint, ServiceProxy,
};
pub use report::{build_report, ReportEntry, ValidationReport};
pub use store::{DocumentStore, StoreConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
