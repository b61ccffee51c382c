//! Error types for note extraction and catalog maintenance.

use thiserror::Error;

use crate::catalog::events::EventKind;

/// Failures raised while turning a document into negotiation notes.
///
/// Every variant carries the identifier of the document being parsed so the
/// caller can report which file failed.
#[derive(Error, Debug)]
pub enum NoteError {
    #[error("None of the provided passwords could open the note {note} (tested: {passwords:?})")]
    WrongPassword { note: String, passwords: Vec<String> },

    #[error("Can't open note {note}. The document returned no content")]
    EmptyDocument { note: String },

    #[error("Unknown document format for note {note}")]
    UnknownDocumentFormat { note: String },

    #[error("No note number found for the negotiation note '{note}'")]
    MissingNoteNumber { note: String },

    #[error("No holder found for the negotiation note '{note}'")]
    MissingHolder { note: String },

    #[error("No date found for the negotiation note '{note}'")]
    MissingDate { note: String },

    #[error("Error parsing note '{note}'. Couldn't get note buys and sells values")]
    MissingBuyOrSellSums { note: String },

    #[error("Can't find asset '{title}' in note '{note}'")]
    UnknownAsset { note: String, title: String },

    #[error("Failed to read note {note}: {message}")]
    Document { note: String, message: String },
}

/// Failures raised while refreshing or persisting the asset catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP error for {url}: {status}")]
    Http { url: String, status: u16 },

    #[error("Too many requests for {url}")]
    RateLimited { url: String },

    #[error("Request failed for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Unexpected response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("Fewer corporative events for {code} ({kind}): known {known}, fetched {fetched}")]
    FewerCorporateEvents {
        code: String,
        kind: EventKind,
        known: usize,
        fetched: usize,
    },

    #[error("Max retries reached for {item} after {attempts} attempts")]
    MaxRetriesReached {
        item: String,
        attempts: u32,
        #[source]
        source: Box<CatalogError>,
    },

    #[error("Invalid catalog snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Catalog I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Whether the upstream asked us to slow down.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Http { status, .. } => *status == 429,
            Self::Transport { message, .. } => {
                message.to_lowercase().contains("too many requests")
            }
            _ => false,
        }
    }

    /// Whether the failure is transient and the same item may be attempted again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { .. }
            | Self::RateLimited { .. }
            | Self::Transport { .. }
            | Self::InvalidResponse { .. }
            | Self::FewerCorporateEvents { .. } => true,
            Self::MaxRetriesReached { .. } | Self::Snapshot(_) | Self::Io(_) => false,
        }
    }
}
