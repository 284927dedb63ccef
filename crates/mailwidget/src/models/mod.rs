//! Domain models for the mail widget

mod address;
mod file;
mod mail;

pub use address::EmailAddress;
pub use file::{FileHandle, content_type_for};
pub use mail::{MailId, MailRecord, MailRecordBuilder};
