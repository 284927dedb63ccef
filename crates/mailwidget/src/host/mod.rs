//! Host capability interface
//!
//! The widget never talks to a concrete host. It depends on the [`MailHost`]
//! trait, which the embedding application implements on top of whatever
//! transport it has.

mod memory;
mod service;
mod traits;

pub use memory::RecordingHost;
pub use service::{FullBody, OutgoingAttachment, OutgoingMail, ServiceCall};
pub use traits::{FeedSubscription, MailHost};
