//! Feed listener
//!
//! The host pushes the complete mail collection; every push replaces the
//! widget's collection wholesale.

mod listener;

pub use listener::{FeedListener, FeedStats, parse_feed, replace_collection};
