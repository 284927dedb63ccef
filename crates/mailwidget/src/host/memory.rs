//! In-memory host that records every request
//!
//! Used by tests and by embedders that want to drive the widget without a
//! real backend. Nothing is answered automatically: the caller feeds
//! responses back into the widget itself.

use anyhow::{Result, bail};
use std::cell::{Cell, RefCell};
use std::time::Duration;

use super::{FeedSubscription, MailHost, ServiceCall};
use crate::search::TimerToken;

pub struct RecordingHost {
    calls: RefCell<Vec<ServiceCall>>,
    prompts: RefCell<Vec<String>>,
    confirm_answer: Cell<bool>,
    fail_calls: Cell<bool>,
    armed_timers: RefCell<Vec<(TimerToken, Duration)>>,
    cancelled_timers: RefCell<Vec<TimerToken>>,
    active_subscription: Cell<Option<FeedSubscription>>,
    next_subscription: Cell<u64>,
    height: Cell<u32>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            prompts: RefCell::new(Vec::new()),
            confirm_answer: Cell::new(true),
            fail_calls: Cell::new(false),
            armed_timers: RefCell::new(Vec::new()),
            cancelled_timers: RefCell::new(Vec::new()),
            active_subscription: Cell::new(None),
            next_subscription: Cell::new(0),
            height: Cell::new(400),
        }
    }

    /// Answer given to every confirmation prompt
    pub fn set_confirm_answer(&self, answer: bool) {
        self.confirm_answer.set(answer);
    }

    /// Make `call_service` fail as if the transport were down
    pub fn set_fail_calls(&self, fail: bool) {
        self.fail_calls.set(fail);
    }

    pub fn set_height(&self, height: u32) {
        self.height.set(height);
    }

    /// Service calls issued so far
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.borrow().clone()
    }

    /// Service calls issued so far, by service name
    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(ServiceCall::name).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    /// Timers armed so far, in order
    pub fn armed_timers(&self) -> Vec<(TimerToken, Duration)> {
        self.armed_timers.borrow().clone()
    }

    pub fn last_timer(&self) -> Option<TimerToken> {
        self.armed_timers.borrow().last().map(|(token, _)| *token)
    }

    pub fn cancelled_timers(&self) -> Vec<TimerToken> {
        self.cancelled_timers.borrow().clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.active_subscription.get().is_some()
    }
}

impl MailHost for RecordingHost {
    fn subscribe_feed(&self) -> Result<FeedSubscription> {
        if self.active_subscription.get().is_some() {
            bail!("Feed already subscribed");
        }
        let id = self.next_subscription.get() + 1;
        self.next_subscription.set(id);
        let subscription = FeedSubscription(id);
        self.active_subscription.set(Some(subscription));
        Ok(subscription)
    }

    fn unsubscribe_feed(&self, subscription: FeedSubscription) -> Result<()> {
        if self.active_subscription.get() != Some(subscription) {
            bail!("Unknown feed subscription {}", subscription.0);
        }
        self.active_subscription.set(None);
        Ok(())
    }

    fn call_service(&self, call: ServiceCall) -> Result<()> {
        if self.fail_calls.get() {
            bail!("connection to host lost while calling {}", call.name());
        }
        self.calls.borrow_mut().push(call);
        Ok(())
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.confirm_answer.get()
    }

    fn schedule_timer(&self, token: TimerToken, delay: Duration) {
        self.armed_timers.borrow_mut().push((token, delay));
    }

    fn cancel_timer(&self, token: TimerToken) {
        self.cancelled_timers.borrow_mut().push(token);
    }

    fn height(&self) -> u32 {
        self.height.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MailId;

    #[test]
    fn test_subscription_lifecycle() {
        let host = RecordingHost::new();
        let sub = host.subscribe_feed().unwrap();
        assert!(host.is_subscribed());
        assert!(host.subscribe_feed().is_err());

        host.unsubscribe_feed(sub).unwrap();
        assert!(!host.is_subscribed());
        assert!(host.unsubscribe_feed(sub).is_err());
    }

    #[test]
    fn test_failing_calls_are_not_recorded() {
        let host = RecordingHost::new();
        host.set_fail_calls(true);
        let err = host
            .call_service(ServiceCall::DeleteMail { id: MailId::new("1") })
            .unwrap_err();
        assert!(err.to_string().contains("deleteMail"));
        assert!(host.calls().is_empty());
    }
}
