//! View state machine types

use serde::{Deserialize, Serialize};
use std::fmt;

use super::AttachmentSlots;
use crate::error::{Result, WidgetError};
use crate::models::{EmailAddress, MailId};

/// Which view is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    List,
    Detail,
    Compose,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::List => "list",
            Mode::Detail => "detail",
            Mode::Compose => "compose",
        })
    }
}

/// Identifies one compose session so late send responses can be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComposeSession(pub u64);

/// The active view and the data only that view needs
///
/// List parameters are not stored here: they belong to the widget and
/// survive trips into Detail and Compose.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    List,
    Detail(DetailState),
    Compose(ComposeDraft),
}

impl ViewState {
    pub fn mode(&self) -> Mode {
        match self {
            ViewState::List => Mode::List,
            ViewState::Detail(_) => Mode::Detail,
            ViewState::Compose(_) => Mode::Compose,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ViewState::List)
    }

    pub fn detail(&self) -> Option<&DetailState> {
        match self {
            ViewState::Detail(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn detail_mut(&mut self) -> Option<&mut DetailState> {
        match self {
            ViewState::Detail(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<&ComposeDraft> {
        match self {
            ViewState::Compose(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut ComposeDraft> {
        match self {
            ViewState::Compose(draft) => Some(draft),
            _ => None,
        }
    }

    /// Whether the detail view for `id` is showing
    pub fn is_viewing(&self, id: &MailId) -> bool {
        self.detail().is_some_and(|d| &d.selected == id)
    }
}

/// Reading a single message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailState {
    pub selected: MailId,
    /// A body fetch is outstanding and nothing better than a spinner is shown
    pub loading: bool,
}

/// Compose form fields, used in validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComposeField {
    To,
    Subject,
    Body,
}

impl fmt::Display for ComposeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComposeField::To => "recipient",
            ComposeField::Subject => "subject",
            ComposeField::Body => "message",
        })
    }
}

/// A message being drafted
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeDraft {
    pub session: ComposeSession,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: AttachmentSlots,
    /// A send request is with the host
    pub sending: bool,
    /// Last send failure, shown until the next attempt
    pub error: Option<String>,
}

impl ComposeDraft {
    pub fn new(session: ComposeSession) -> Self {
        Self {
            session,
            to: String::new(),
            subject: String::new(),
            body: String::new(),
            attachments: AttachmentSlots::new(),
            sending: false,
            error: None,
        }
    }

    pub fn set_field(&mut self, field: ComposeField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ComposeField::To => self.to = value,
            ComposeField::Subject => self.subject = value,
            ComposeField::Body => self.body = value,
        }
    }

    /// Check required fields, returning the parsed recipient
    pub fn validate(&self) -> Result<EmailAddress> {
        if self.to.trim().is_empty() {
            return Err(WidgetError::Validation {
                field: ComposeField::To,
                reason: "is required",
            });
        }
        let to = EmailAddress::parse(&self.to);
        if !to.is_well_formed() {
            return Err(WidgetError::Validation {
                field: ComposeField::To,
                reason: "is not a valid email address",
            });
        }
        if self.subject.trim().is_empty() {
            return Err(WidgetError::Validation {
                field: ComposeField::Subject,
                reason: "is required",
            });
        }
        if self.body.trim().is_empty() {
            return Err(WidgetError::Validation {
                field: ComposeField::Body,
                reason: "is required",
            });
        }
        Ok(to)
    }
}
