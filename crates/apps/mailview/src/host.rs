//! Demo host backed by a local mailbox
//!
//! Answers the widget's service calls from an in-memory data set and
//! delivers every response through the event channel after a short delay,
//! so the widget sees the same asynchrony a real host would give it.

use anyhow::{Context, Result, bail};
use chrono::{Duration as ChronoDuration, Utc};
use log::{debug, info, warn};
use mailwidget::{
    ComposeSession, FeedSubscription, FullBody, MailHost, MailId, MailRecord, OutgoingMail,
    ServiceCall, TimerToken, parse_feed,
};
use serde::Deserialize;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Everything that reaches the event loop
#[derive(Debug)]
pub enum Event {
    /// A line typed on stdin
    Input(String),
    /// stdin reached EOF
    InputClosed,
    Feed(Value),
    FullBody { id: MailId, payload: Value },
    SendResult {
        session: ComposeSession,
        result: std::result::Result<(), String>,
    },
    Timer(TimerToken),
}

/// The data set the demo host serves
///
/// On disk this is either a bare array of mail records or an object with
/// `mails` and, optionally, `bodies` keyed by mail id.
#[derive(Debug, Default, Deserialize)]
pub struct Mailbox {
    #[serde(default)]
    pub mails: Vec<MailRecord>,
    #[serde(default)]
    pub bodies: HashMap<String, FullBody>,
}

impl Mailbox {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mailbox file {:?}", path))?;
        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse mailbox file {:?}", path))?;
        Self::from_json(value)
    }

    pub fn from_json(value: Value) -> Result<Self> {
        if value.is_array() {
            return Ok(Self {
                mails: parse_feed(value)?,
                bodies: HashMap::new(),
            });
        }
        serde_json::from_value(value).context("Mailbox must be an array or {mails, bodies}")
    }

    /// A small mailbox for trying the widget out
    pub fn sample() -> Self {
        let now = Utc::now();
        let ago = |minutes: i64| now - ChronoDuration::minutes(minutes);

        let mails = vec![
            MailRecord::builder("1")
                .sender("Alice Martin <alice@example.com>")
                .subject("Quarterly numbers")
                .preview("Here are the figures for Q3, spreadsheet attached.")
                .received_at(ago(12))
                .attachments(vec!["q3.xlsx".to_string()])
                .folder("INBOX")
                .size(48_210)
                .build(),
            MailRecord::builder("2")
                .sender("bob@example.com")
                .subject("Lunch on Friday?")
                .preview("The usual place at noon works for me.")
                .received_at(ago(95))
                .seen(true)
                .folder("INBOX")
                .size(2_114)
                .build(),
            MailRecord::builder("3")
                .sender("Build Bot <ci@example.org>")
                .subject("Nightly build failed")
                .description("3 tests failed on main")
                .received_at(ago(60 * 7))
                .folder("INBOX")
                .size(7_902)
                .build(),
            MailRecord::builder("4")
                .sender("carol@example.net")
                .subject("Photos from the trip")
                .preview("Only the good ones, I promise.")
                .received_at(ago(60 * 26))
                .seen(true)
                .attachments(vec!["beach.jpg".to_string(), "hike.jpg".to_string()])
                .folder("INBOX")
                .size(3_480_112)
                .build(),
            MailRecord::builder("5")
                .sender("dave@example.com")
                .subject("Re: contract draft")
                .preview("Two small changes in section 4.")
                .received_at(ago(60 * 50))
                .folder("INBOX")
                .size(5_330)
                .build(),
        ];

        let bodies = HashMap::from([
            (
                "1".to_string(),
                FullBody::html(
                    "<p>Hi team,</p><p>Here are the figures for Q3.<br>Revenue is up 4%.</p><p>Alice</p>",
                ),
            ),
            (
                "2".to_string(),
                FullBody::plain("The usual place at noon works for me.\n\nBob"),
            ),
            (
                "5".to_string(),
                FullBody::plain("Two small changes in section 4.\nSee the redline.\n\nDave"),
            ),
        ]);

        Self { mails, bodies }
    }

    fn feed(&self) -> Result<Value> {
        serde_json::to_value(&self.mails).context("Failed to serialize mail feed")
    }

    /// Flag a mail as read, as the server does once its body is fetched
    fn mark_seen(&mut self, id: &MailId) -> bool {
        match self.mails.iter_mut().find(|m| &m.id == id) {
            Some(mail) => {
                mail.seen = true;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: &MailId) -> bool {
        let before = self.mails.len();
        self.mails.retain(|m| &m.id != id);
        self.bodies.remove(id.as_str());
        self.mails.len() != before
    }
}

pub struct DemoHost {
    mailbox: RefCell<Mailbox>,
    events: UnboundedSender<Event>,
    subscription: Cell<Option<FeedSubscription>>,
    next_subscription: Cell<u64>,
    timers: RefCell<HashMap<TimerToken, JoinHandle<()>>>,
    /// Answer for the next confirmation prompt; resets to yes after use
    confirm_answer: Cell<bool>,
    latency: Duration,
    height: u32,
}

impl DemoHost {
    pub fn new(mailbox: Mailbox, events: UnboundedSender<Event>, latency: Duration, height: u32) -> Self {
        Self {
            mailbox: RefCell::new(mailbox),
            events,
            subscription: Cell::new(None),
            next_subscription: Cell::new(0),
            timers: RefCell::new(HashMap::new()),
            confirm_answer: Cell::new(true),
            latency,
            height,
        }
    }

    pub fn set_next_confirm(&self, answer: bool) {
        self.confirm_answer.set(answer);
    }

    /// Deliver an event to the loop after `delay`
    fn deliver(&self, event: Event, delay: Duration) -> JoinHandle<()> {
        let events = self.events.clone();
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if events.send(event).is_err() {
                debug!("Event loop closed; dropping host event");
            }
        })
    }

    fn push_feed(&self, delay: Duration) -> Result<()> {
        if self.subscription.get().is_none() {
            debug!("No feed subscriber; skipping push");
            return Ok(());
        }
        let feed = self.mailbox.borrow().feed()?;
        self.deliver(Event::Feed(feed), delay);
        Ok(())
    }

    /// Pretend to hand a message to a mail server
    fn deliver_mail(mail: &OutgoingMail) -> std::result::Result<(), String> {
        if mail.to.ends_with(".invalid") {
            return Err(format!("Recipient address rejected: {}", mail.to));
        }
        let mut bytes = 0;
        for attachment in &mail.attachments {
            bytes += attachment
                .decode_content()
                .map_err(|e| format!("{:#}", e))?
                .len();
        }
        info!(
            "Delivered \"{}\" to {} ({} attachments, {} bytes)",
            mail.subject,
            mail.to,
            mail.attachments.len(),
            bytes
        );
        Ok(())
    }
}

impl MailHost for DemoHost {
    fn subscribe_feed(&self) -> Result<FeedSubscription> {
        if self.subscription.get().is_some() {
            bail!("Feed already has a subscriber");
        }
        let id = self.next_subscription.get() + 1;
        self.next_subscription.set(id);
        let subscription = FeedSubscription(id);
        self.subscription.set(Some(subscription));
        self.push_feed(Duration::ZERO)?;
        Ok(subscription)
    }

    fn unsubscribe_feed(&self, subscription: FeedSubscription) -> Result<()> {
        if self.subscription.get() != Some(subscription) {
            bail!("Unknown feed subscription {}", subscription.0);
        }
        self.subscription.set(None);
        Ok(())
    }

    fn call_service(&self, call: ServiceCall) -> Result<()> {
        debug!("Service call {}: {}", call.name(), call.payload()?);
        match call {
            ServiceCall::GetFullMailBody { id } => {
                let body = {
                    let mut mailbox = self.mailbox.borrow_mut();
                    mailbox.mark_seen(&id);
                    mailbox.bodies.get(id.as_str()).cloned()
                };
                let payload = serde_json::to_value(body).context("Failed to serialize body")?;
                self.deliver(Event::FullBody { id, payload }, self.latency);
            }
            ServiceCall::DeleteMail { id } => {
                if !self.mailbox.borrow_mut().remove(&id) {
                    warn!("Delete for unknown mail {}", id);
                }
                self.push_feed(self.latency)?;
            }
            ServiceCall::SendMail { session, mail } => {
                let result = Self::deliver_mail(&mail);
                self.deliver(Event::SendResult { session, result }, self.latency);
            }
        }
        Ok(())
    }

    fn confirm(&self, prompt: &str) -> bool {
        let answer = self.confirm_answer.replace(true);
        println!("? {} {}", prompt, if answer { "yes" } else { "no" });
        answer
    }

    fn schedule_timer(&self, token: TimerToken, delay: Duration) {
        let handle = self.deliver(Event::Timer(token), delay);
        let mut timers = self.timers.borrow_mut();
        timers.retain(|_, h| !h.is_finished());
        timers.insert(token, handle);
    }

    fn cancel_timer(&self, token: TimerToken) {
        if let Some(handle) = self.timers.borrow_mut().remove(&token) {
            handle.abort();
        }
    }

    fn height(&self) -> u32 {
        self.height
    }
}
