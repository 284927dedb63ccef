//! Feed subscription and collection replacement

use anyhow::{Context, Result};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;

use crate::host::{FeedSubscription, MailHost};
use crate::models::{MailId, MailRecord};

/// Statistics from applying one feed push
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FeedStats {
    /// Records in the collection after the push
    pub records: usize,
    /// Ids not present before the push
    pub added: usize,
    /// Ids present before but missing from the push
    pub removed: usize,
    /// Records dropped because their id already appeared earlier in the push
    pub duplicates: usize,
}

/// Parse a raw feed payload; `null` means an empty collection
pub fn parse_feed(payload: Value) -> Result<Vec<MailRecord>> {
    if payload.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(payload).context("Failed to parse mail feed payload")
}

/// Replace `current` with a pushed collection.
///
/// No merging: fields set locally (seen, fetched bodies) are whatever the
/// push says they are. Duplicate ids keep their first occurrence.
pub fn replace_collection(current: &mut Vec<MailRecord>, push: Option<Vec<MailRecord>>) -> FeedStats {
    let push = push.unwrap_or_default();
    let mut ids: HashSet<MailId> = HashSet::with_capacity(push.len());
    let mut records = Vec::with_capacity(push.len());
    let mut stats = FeedStats::default();

    for record in push {
        if ids.insert(record.id.clone()) {
            records.push(record);
        } else {
            stats.duplicates += 1;
        }
    }

    let previous: HashSet<&MailId> = current.iter().map(|r| &r.id).collect();
    stats.added = records.iter().filter(|r| !previous.contains(&r.id)).count();
    stats.removed = current.iter().filter(|r| !ids.contains(&r.id)).count();
    stats.records = records.len();

    *current = records;
    stats
}

/// Owns the widget's feed subscription
#[derive(Debug, Default)]
pub struct FeedListener {
    subscription: Option<FeedSubscription>,
    pushes: u64,
}

impl FeedListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the host feed. Subscribing twice is a no-op.
    pub fn subscribe(&mut self, host: &dyn MailHost) -> Result<()> {
        if self.subscription.is_some() {
            return Ok(());
        }
        let subscription = host.subscribe_feed().context("Failed to subscribe to mail feed")?;
        info!("Subscribed to mail feed ({})", subscription.0);
        self.subscription = Some(subscription);
        Ok(())
    }

    pub fn unsubscribe(&mut self, host: &dyn MailHost) -> Result<()> {
        if let Some(subscription) = self.subscription.take() {
            host.unsubscribe_feed(subscription)
                .context("Failed to unsubscribe from mail feed")?;
            info!("Unsubscribed from mail feed ({})", subscription.0);
        }
        Ok(())
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Count a push, returning its sequence number
    pub fn record_push(&mut self, stats: &FeedStats) -> u64 {
        self.pushes += 1;
        debug!(
            "Feed push #{}: {} records (+{} -{}, {} duplicates)",
            self.pushes, stats.records, stats.added, stats.removed, stats.duplicates
        );
        self.pushes
    }

    pub fn push_count(&self) -> u64 {
        self.pushes
    }
}
