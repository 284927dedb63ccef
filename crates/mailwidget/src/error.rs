//! Error types for widget operations

use crate::models::MailId;
use crate::view::{ComposeField, Mode};

/// Errors surfaced by [`MailWidget`](crate::MailWidget) operations
///
/// None of these are fatal: the widget stays usable after every one of them.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// Body fetch failed; the detail view falls back to the preview
    #[error("Failed to fetch body of {id}: {message}")]
    FetchBodyFailed { id: MailId, message: String },

    /// The host refused the message; the draft is kept
    #[error("Send rejected: {message}")]
    SendRejected { message: String },

    /// A compose field is missing or malformed; nothing was sent
    #[error("Invalid {field}: {reason}")]
    Validation {
        field: ComposeField,
        reason: &'static str,
    },

    #[error("Mail not found: {id}")]
    NotFound { id: MailId },

    #[error("{action} is not available in {mode} mode")]
    WrongMode { action: &'static str, mode: Mode },

    #[error("Unsupported page size: {size}")]
    InvalidPageSize { size: usize },

    #[error("No attachment slot at index {index}")]
    NoSuchSlot { index: usize },

    #[error("A send is already in progress")]
    SendInProgress,

    /// The host transport failed to accept a request
    #[error("Host error: {0:#}")]
    Host(anyhow::Error),

    #[error("Invalid feed payload: {0:#}")]
    InvalidFeed(anyhow::Error),

    #[error("Invalid configuration: {0:#}")]
    Config(anyhow::Error),
}

impl From<anyhow::Error> for WidgetError {
    fn from(e: anyhow::Error) -> Self {
        WidgetError::Host(e)
    }
}

pub type Result<T> = std::result::Result<T, WidgetError>;
