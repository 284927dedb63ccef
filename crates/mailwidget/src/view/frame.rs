//! Frames handed to the rendering layer
//!
//! A frame is a complete, already-derived snapshot of what the widget shows.
//! Renderers never look at widget internals.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Mode;
use crate::models::MailId;
use crate::query::{DerivedPage, Filter, SortDir, SortKey};

/// Height taken by the filter/search/pagination toolbar above the table
pub const LIST_TOOLBAR_HEIGHT: u32 = 24;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Frame {
    List(ListFrame),
    Detail(DetailFrame),
    Compose(ComposeFrame),
}

impl Frame {
    pub fn mode(&self) -> Mode {
        match self {
            Frame::List(_) => Mode::List,
            Frame::Detail(_) => Mode::Detail,
            Frame::Compose(_) => Mode::Compose,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListFrame {
    #[serde(flatten)]
    pub page: DerivedPage,
    pub search_query: String,
    pub filter: Filter,
    pub sort_by: SortKey,
    pub sort_dir: SortDir,
    pub page_sizes: Vec<usize>,
    /// Height available to the scrollable table
    pub viewport_height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailFrame {
    pub id: MailId,
    pub sender: String,
    pub subject: String,
    pub received_at: Option<DateTime<Utc>>,
    /// Waiting for the full body; `body` holds nothing useful yet
    pub loading: bool,
    /// Full body, or the preview/description fallback
    pub body: String,
    /// `body` is HTML produced from the full message
    pub is_full_body: bool,
    /// The record disappeared from the feed while being read
    pub missing: bool,
    pub viewport_height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeFrame {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// File name per slot, `None` for the empty entry slot
    pub attachments: Vec<Option<String>>,
    pub sending: bool,
    pub error: Option<String>,
}
