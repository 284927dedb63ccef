//! Mailwidget crate - Embeddable mail list widget
//!
//! This crate provides the view-state engine behind a mail list widget:
//! - Mail record model (MailRecord, EmailAddress, FileHandle)
//! - Derivation pipeline (filter, search, sort, paginate, badge counts)
//! - View state machine (List, Detail, Compose) with attachment slots
//! - Feed listener that replaces the collection on every host push
//! - Command dispatcher for delete, send and full-body fetches
//! - Debounced search input
//!
//! The widget never renders anything itself. Every visible change queues a
//! [`Frame`] that the embedding application turns into output, and every
//! side effect goes through the [`MailHost`] trait.

pub mod actions;
pub mod config;
pub mod error;
pub mod feed;
pub mod host;
pub mod models;
pub mod query;
pub mod search;
pub mod view;
pub mod widget;

pub use actions::{ActionHandler, BodyOutcome, DeleteOutcome};
pub use config::WidgetConfig;
pub use error::{Result, WidgetError};
pub use feed::{FeedListener, FeedStats, parse_feed, replace_collection};
pub use host::{
    FeedSubscription, FullBody, MailHost, OutgoingAttachment, OutgoingMail, RecordingHost,
    ServiceCall,
};
pub use models::{EmailAddress, FileHandle, MailId, MailRecord, MailRecordBuilder, content_type_for};
pub use query::{
    BadgeCounts, DerivedPage, Filter, ListParams, MailSummary, SortDir, SortKey, derive_page,
    filter_and_sort, total_pages,
};
pub use search::{Debouncer, TimerToken};
pub use view::{
    AttachmentSlots, ComposeDraft, ComposeField, ComposeFrame, ComposeSession, DetailFrame, Frame,
    ListFrame, Mode, ViewState,
};
pub use widget::{MailWidget, RowTarget};
