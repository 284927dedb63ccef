//! View state machine: List, Detail and Compose
//!
//! Exactly one mode is active at a time. Detail and Compose carry their own
//! sub-state, which is dropped when the mode is left.

mod attachments;
mod frame;
mod state;

pub use attachments::AttachmentSlots;
pub use frame::{ComposeFrame, DetailFrame, Frame, LIST_TOOLBAR_HEIGHT, ListFrame};
pub use state::{ComposeDraft, ComposeField, ComposeSession, DetailState, Mode, ViewState};
