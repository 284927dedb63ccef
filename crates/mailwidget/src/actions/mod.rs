//! Command dispatcher
//!
//! Delete, send and full-body fetch, each issued through the host and
//! reconciled against the local collection by mail id.

mod handler;

pub use handler::{ActionHandler, BodyOutcome, DeleteOutcome};
