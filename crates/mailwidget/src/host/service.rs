//! Service requests and responses exchanged with the host

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::models::{FileHandle, MailId};
use crate::view::ComposeSession;

/// A request the widget sends to the host
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    GetFullMailBody {
        id: MailId,
    },
    DeleteMail {
        id: MailId,
    },
    /// The session must be echoed back in `MailWidget::on_send_result`
    SendMail {
        session: ComposeSession,
        mail: OutgoingMail,
    },
}

impl ServiceCall {
    /// Service name understood by the host
    pub fn name(&self) -> &'static str {
        match self {
            ServiceCall::GetFullMailBody { .. } => "getFullMailBody",
            ServiceCall::DeleteMail { .. } => "deleteMail",
            ServiceCall::SendMail { .. } => "sendMail",
        }
    }

    /// JSON payload for the service
    pub fn payload(&self) -> Result<Value> {
        match self {
            ServiceCall::GetFullMailBody { id } | ServiceCall::DeleteMail { id } => {
                Ok(json!({ "id": id }))
            }
            ServiceCall::SendMail { mail, .. } => {
                serde_json::to_value(mail).context("Failed to serialize outgoing mail")
            }
        }
    }
}

/// Message handed to the host for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<OutgoingAttachment>,
}

/// Attachment with base64 content, as the host's send service expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingAttachment {
    pub name: String,
    pub content_type: String,
    pub content: String,
}

impl From<&FileHandle> for OutgoingAttachment {
    fn from(file: &FileHandle) -> Self {
        Self {
            name: file.name.clone(),
            content_type: file.content_type.clone(),
            content: STANDARD.encode(&file.content),
        }
    }
}

impl OutgoingAttachment {
    pub fn decode_content(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.content)
            .with_context(|| format!("Invalid base64 content in attachment {}", self.name))
    }
}

/// Result of `getFullMailBody`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullBody {
    /// Body text; the host falls back to the preview when it has nothing else
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub plain_text: bool,
}

impl FullBody {
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            plain_text: false,
        }
    }

    pub fn plain(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            plain_text: true,
        }
    }

    /// Parse a host response; `null` means the host did not know the mail
    pub fn from_json(value: Value) -> Result<Option<Self>> {
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .context("Failed to parse full mail body response")
    }
}
