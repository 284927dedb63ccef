//! Search input handling
//!
//! Keystrokes are collapsed by a [`Debouncer`] before the query reaches the
//! derivation pipeline.

mod debounce;

pub use debounce::{Debouncer, TimerToken};

/// Default delay between the last keystroke and applying the query
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 1000;
