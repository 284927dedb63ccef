//! Mail record model as pushed by the host feed

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

/// Unique identifier for a mail record, stable across feed pushes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MailId(pub String);

impl MailId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MailId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MailId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for MailId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single message in the widget's collection
///
/// Records arrive wholesale from the host feed. Only three fields are ever
/// touched locally, always by id: `seen` (optimistically, when opened),
/// `full_body`/`plain_text` (when a body fetch completes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailRecord {
    pub id: MailId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sender: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    /// Plain text excerpt of the body
    #[serde(default)]
    pub preview: Option<String>,
    /// Message description header, used when there is no preview
    #[serde(default)]
    pub description: Option<String>,
    /// Full rendered body, only present once fetched
    #[serde(default)]
    pub full_body: Option<String>,
    /// Whether `full_body` was produced from a plain text part
    #[serde(default)]
    pub plain_text: bool,
    /// Epoch milliseconds on the wire
    #[serde(
        rename = "receivedDate",
        default,
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub seen: bool,
    /// Attachment file names
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<String>,
    /// Source folder on the mail server
    #[serde(default)]
    pub folder: Option<String>,
    /// Message size in bytes as reported by the server
    #[serde(default)]
    pub size: u64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl MailRecord {
    /// Create a new record builder
    pub fn builder(id: impl Into<MailId>) -> MailRecordBuilder {
        MailRecordBuilder::new(id.into())
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Preview text, falling back to the description
    pub fn preview_text(&self) -> Option<&str> {
        self.preview
            .as_deref()
            .filter(|p| !p.is_empty())
            .or(self.description.as_deref().filter(|d| !d.is_empty()))
    }

    /// Received timestamp in epoch millis, 0 when unknown
    pub fn received_millis(&self) -> i64 {
        self.received_at.map_or(0, |t| t.timestamp_millis())
    }

    /// Text shown in the detail view: full body, else preview, else description
    pub fn display_body(&self) -> &str {
        self.full_body
            .as_deref()
            .or_else(|| self.preview_text())
            .unwrap_or("")
    }

    /// Store a fetched body.
    ///
    /// Plain text is wrapped into a minimal HTML document with line breaks
    /// turned into `<br>`. HTML bodies have their `<br>` tags stripped since
    /// the markup already carries its own block structure.
    pub fn set_full_body(&mut self, body: &str, plain_text: bool) {
        let rendered = if plain_text {
            format!(
                "<html><body>{}</body></html>",
                body.replace("\r\n", "<br>").replace('\n', "<br>")
            )
        } else {
            br_tag_regex().replace_all(body, "").into_owned()
        };
        self.full_body = Some(rendered);
        self.plain_text = plain_text;
    }
}

fn br_tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid br tag regex"))
}

/// Builder for creating MailRecord instances
pub struct MailRecordBuilder {
    record: MailRecord,
}

impl MailRecordBuilder {
    fn new(id: MailId) -> Self {
        Self {
            record: MailRecord {
                id,
                sender: String::new(),
                subject: String::new(),
                preview: None,
                description: None,
                full_body: None,
                plain_text: false,
                received_at: None,
                seen: false,
                attachments: Vec::new(),
                folder: None,
                size: 0,
            },
        }
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.record.sender = sender.into();
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.record.subject = subject.into();
        self
    }

    pub fn preview(mut self, preview: impl Into<String>) -> Self {
        self.record.preview = Some(preview.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.record.description = Some(description.into());
        self
    }

    pub fn full_body(mut self, body: impl Into<String>) -> Self {
        self.record.full_body = Some(body.into());
        self
    }

    pub fn received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.record.received_at = Some(received_at);
        self
    }

    /// Set the received time from epoch milliseconds
    pub fn received_millis(mut self, millis: i64) -> Self {
        self.record.received_at = DateTime::from_timestamp_millis(millis);
        self
    }

    pub fn seen(mut self, seen: bool) -> Self {
        self.record.seen = seen;
        self
    }

    pub fn attachments(mut self, names: Vec<String>) -> Self {
        self.record.attachments = names;
        self
    }

    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.record.folder = Some(folder.into());
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.record.size = size;
        self
    }

    pub fn build(self) -> MailRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_feed_record() {
        let json = r#"{
            "id": "<abc@host>",
            "sender": "Alice <alice@example.com>",
            "subject": "Hello",
            "folder": "INBOX",
            "description": null,
            "num": 7,
            "receivedDate": 1700000000000,
            "size": 2048,
            "seen": false,
            "attachments": ["report.pdf"],
            "preview": "Hi there"
        }"#;

        let record: MailRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_str(), "<abc@host>");
        assert_eq!(record.received_millis(), 1_700_000_000_000);
        assert_eq!(record.attachment_count(), 1);
        assert_eq!(record.folder.as_deref(), Some("INBOX"));
        assert_eq!(record.size, 2048);
        assert!(record.full_body.is_none());
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let json = r#"{ "id": "1", "sender": null, "attachments": null }"#;
        let record: MailRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.sender, "");
        assert_eq!(record.attachment_count(), 0);
        assert_eq!(record.received_millis(), 0);
        assert!(!record.seen);
    }

    #[test]
    fn test_preview_falls_back_to_description() {
        let record = MailRecord::builder("1")
            .preview("")
            .description("Weekly report")
            .build();
        assert_eq!(record.preview_text(), Some("Weekly report"));
        assert_eq!(record.display_body(), "Weekly report");
    }

    #[test]
    fn test_display_body_prefers_full_body() {
        let record = MailRecord::builder("1")
            .preview("short")
            .full_body("<p>long</p>")
            .build();
        assert_eq!(record.display_body(), "<p>long</p>");
    }

    #[test]
    fn test_set_plain_text_body() {
        let mut record = MailRecord::builder("1").build();
        record.set_full_body("line one\r\nline two\nline three", true);
        assert_eq!(
            record.full_body.as_deref(),
            Some("<html><body>line one<br>line two<br>line three</body></html>")
        );
        assert!(record.plain_text);
    }

    #[test]
    fn test_set_html_body_strips_breaks() {
        let mut record = MailRecord::builder("1").build();
        record.set_full_body("<p>a<br>b<BR/>c<br />d</p><bro>", false);
        assert_eq!(record.full_body.as_deref(), Some("<p>abcd</p><bro>"));
        assert!(!record.plain_text);
    }

    #[test]
    fn test_set_html_body_strips_breaks_with_any_whitespace() {
        let mut record = MailRecord::builder("1").build();
        record.set_full_body("a<br\u{0B}>b<BR />c<br\t\n/>d", false);
        assert_eq!(record.full_body.as_deref(), Some("abcd"));
    }
}
