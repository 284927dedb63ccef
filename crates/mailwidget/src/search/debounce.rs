//! Cancellable delayed apply
//!
//! The debouncer does not own a clock. It hands out a [`TimerToken`] per
//! restart; whoever owns the event loop arms a timer for that token and
//! reports it back through [`Debouncer::fire`]. Only the most recent token
//! yields a value, so superseded or cancelled timers that fire anyway are
//! harmless.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifies one armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    next_token: u64,
    pending: Option<(TimerToken, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_token: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending value and return the token for the new timer.
    ///
    /// Callers should [`cancel`](Self::cancel) first if they need the old
    /// token to disarm its timer.
    pub fn start(&mut self, value: T) -> TimerToken {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.pending = Some((token, value));
        token
    }

    /// A timer elapsed. Returns the value if `token` is the live one.
    pub fn fire(&mut self, token: TimerToken) -> Option<T> {
        match self.pending.take() {
            Some((live, value)) if live == token => Some(value),
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// Drop the pending value, returning the token whose timer should be disarmed
    pub fn cancel(&mut self) -> Option<TimerToken> {
        self.pending.take().map(|(token, _)| token)
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, value)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_last_token_applies() {
        let mut debounce = Debouncer::new(Duration::from_millis(1000));
        let tokens: Vec<TimerToken> = ["h", "he", "hel", "hello"]
            .into_iter()
            .map(|q| debounce.start(q.to_string()))
            .collect();

        let applied: Vec<String> = tokens.iter().filter_map(|t| debounce.fire(*t)).collect();
        assert_eq!(applied, vec!["hello".to_string()]);
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_stale_fire_keeps_pending() {
        let mut debounce = Debouncer::new(Duration::from_millis(10));
        let first = debounce.start(1);
        let second = debounce.start(2);

        assert_eq!(debounce.fire(first), None);
        assert_eq!(debounce.pending(), Some(&2));
        assert_eq!(debounce.fire(second), Some(2));
        assert_eq!(debounce.fire(second), None);
    }

    #[test]
    fn test_cancel() {
        let mut debounce = Debouncer::new(Duration::from_millis(10));
        let token = debounce.start("x");
        assert_eq!(debounce.cancel(), Some(token));
        assert_eq!(debounce.fire(token), None);
        assert_eq!(debounce.cancel(), None);
    }

    #[test]
    fn test_tokens_are_unique() {
        let mut debounce = Debouncer::new(Duration::ZERO);
        let a = debounce.start(());
        debounce.cancel();
        let b = debounce.start(());
        assert_ne!(a, b);
    }
}
