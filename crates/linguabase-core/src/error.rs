//! Error types for the Linguabase core library
//!
//! Every failure of the document store and the service proxy is classified
//! into one [`ErrorKind`]. Display text is safe to show to API clients: it
//! names documents by their logical name and never includes file paths.

use crate::proxy::Service;
use linguabase_schemas::{DocumentKind, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for Linguabase operations
#[derive(Error, Debug)]
pub enum Error {
    /// The backing file of a document does not exist
    #[error("document '{document}' not found")]
    NotFound { document: DocumentKind },

    /// The backing file exists but is not well-formed JSON
    #[error("document '{document}' is not valid JSON: {source}")]
    Malformed {
        document: DocumentKind,
        #[source]
        source: serde_json::Error,
    },

    /// Parsed content or an incoming value breaks the document schema
    #[error("{}", schema_violation_message(.document, .errors))]
    SchemaViolation {
        /// `None` for values that are not stored documents, e.g. proxy requests
        document: Option<DocumentKind>,
        errors: ValidationErrors,
    },

    /// Writing the backing file did not complete
    #[error("failed to persist document '{document}': {source}")]
    PersistenceFailure {
        document: DocumentKind,
        #[source]
        source: std::io::Error,
    },

    /// An external service refused or dropped the connection
    #[error("{service} service is unavailable: {message}")]
    ServiceUnavailable { service: Service, message: String },

    /// An external service did not answer in time
    #[error("{service} service timeout: no response within the configured bound")]
    Timeout { service: Service },

    /// An external service answered with a non-success status or an unreadable body
    #[error("{service} service returned HTTP {status}: {body}")]
    UpstreamError {
        service: Service,
        status: u16,
        body: String,
    },

    /// Anything not otherwise classified
    #[error("internal error: {message}")]
    Internal { message: String },
}

fn schema_violation_message(document: &Option<DocumentKind>, errors: &ValidationErrors) -> String {
    match document {
        Some(document) => format!("document '{}' failed validation: {}", document, errors),
        None => format!("request failed validation: {}", errors),
    }
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Serializable classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Malformed,
    SchemaViolation,
    PersistenceFailure,
    ServiceUnavailable,
    Timeout,
    UpstreamError,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Malformed => "malformed",
            ErrorKind::SchemaViolation => "schema_violation",
            ErrorKind::PersistenceFailure => "persistence_failure",
            ErrorKind::ServiceUnavailable => "service_unavailable",
            ErrorKind::Timeout => "timeout",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Malformed { .. } => ErrorKind::Malformed,
            Error::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            Error::PersistenceFailure { .. } => ErrorKind::PersistenceFailure,
            Error::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::UpstreamError { .. } => ErrorKind::UpstreamError,
            Error::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Human-readable detail for clients
    pub fn detail(&self) -> String {
        self.to_string()
    }

    /// The document this error concerns, if any
    pub fn document(&self) -> Option<DocumentKind> {
        match self {
            Error::NotFound { document }
            | Error::Malformed { document, .. }
            | Error::PersistenceFailure { document, .. } => Some(*document),
            Error::SchemaViolation { document, .. } => *document,
            _ => None,
        }
    }

    /// Field-level violations of a schema error
    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            Error::SchemaViolation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Whether this is a NotFound for `document`
    pub fn is_not_found(&self, document: DocumentKind) -> bool {
        matches!(self, Error::NotFound { document: d } if *d == document)
    }

    pub(crate) fn schema(document: DocumentKind, errors: ValidationErrors) -> Self {
        Error::SchemaViolation {
            document: Some(document),
            errors,
        }
    }

    /// A rejected request value that is not a stored document
    pub fn invalid_request(errors: ValidationErrors) -> Self {
        Error::SchemaViolation {
            document: None,
            errors,
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }
}
