//! Host capability trait

use anyhow::Result;
use std::time::Duration;

use super::ServiceCall;
use crate::search::TimerToken;

/// Handle for an active feed subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedSubscription(pub u64);

/// Everything the widget needs from the page or application embedding it
///
/// The widget only issues requests through this trait. Results come back
/// later as calls on [`MailWidget`](crate::MailWidget): feed pushes via
/// `on_feed_push`, body fetches via `on_full_body`, send outcomes via
/// `on_send_result`, elapsed timers via `on_timer`.
pub trait MailHost {
    /// Start pushing the mail collection to the widget
    fn subscribe_feed(&self) -> Result<FeedSubscription>;

    /// Stop pushing the mail collection
    fn unsubscribe_feed(&self, subscription: FeedSubscription) -> Result<()>;

    /// Issue a service request; the response, if any, arrives asynchronously
    fn call_service(&self, call: ServiceCall) -> Result<()>;

    /// Ask the user a yes/no question
    fn confirm(&self, prompt: &str) -> bool;

    /// Arm a one-shot timer that reports `token` after `delay`
    fn schedule_timer(&self, token: TimerToken, delay: Duration);

    /// Disarm a timer; firing it anyway must be harmless
    fn cancel_timer(&self, token: TimerToken);

    /// Pixel height of the widget, used for the scrollable region only
    fn height(&self) -> u32;
}
