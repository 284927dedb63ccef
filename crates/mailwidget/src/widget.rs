//! MailWidget: the component instance
//!
//! Owns the mail collection, the list parameters and the view state, and
//! exposes every user intent and host callback as a method. Each method runs
//! to completion and leaves the widget fully derived; if the change is
//! visible, a fresh [`Frame`] is queued for the rendering layer.

use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;

use crate::actions::{ActionHandler, BodyOutcome, DeleteOutcome};
use crate::config::WidgetConfig;
use crate::error::{Result, WidgetError};
use crate::feed::{FeedListener, FeedStats, parse_feed, replace_collection};
use crate::host::{FullBody, MailHost};
use crate::models::{FileHandle, MailId, MailRecord};
use crate::query::{DerivedPage, Filter, ListParams, SortDir, SortKey, derive_page, filter_and_sort, total_pages};
use crate::search::{Debouncer, TimerToken};
use crate::view::{
    ComposeDraft, ComposeField, ComposeFrame, ComposeSession, DetailFrame, DetailState, Frame,
    LIST_TOOLBAR_HEIGHT, ListFrame, Mode, ViewState,
};

/// Which part of a list row was clicked
///
/// The delete button sits inside the row; a click on it must only delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTarget {
    Row,
    DeleteButton,
}

pub struct MailWidget {
    host: Arc<dyn MailHost>,
    config: WidgetConfig,
    mails: Vec<MailRecord>,
    params: ListParams,
    view: ViewState,
    feed: FeedListener,
    actions: ActionHandler,
    search: Debouncer<String>,
    next_session: u64,
    pending_frame: Option<Frame>,
    mounted: bool,
}

impl MailWidget {
    /// Create the widget and subscribe to the host feed.
    ///
    /// Starts in List mode with an empty collection and queues the first frame.
    pub fn mount(host: Arc<dyn MailHost>, config: WidgetConfig) -> Result<Self> {
        config.validate().map_err(WidgetError::Config)?;

        let mut feed = FeedListener::new();
        feed.subscribe(host.as_ref())?;

        let mut widget = Self {
            actions: ActionHandler::new(host.clone()),
            search: Debouncer::new(config.search_debounce()),
            params: ListParams::with_page_size(config.page_size),
            host,
            config,
            mails: Vec::new(),
            view: ViewState::List,
            feed,
            next_session: 0,
            pending_frame: None,
            mounted: true,
        };
        widget.request_render();
        info!("Mail widget mounted");
        Ok(widget)
    }

    /// Unsubscribe from the feed and disarm the search timer.
    ///
    /// Events delivered after teardown are ignored.
    pub fn teardown(&mut self) -> Result<()> {
        if !self.mounted {
            return Ok(());
        }
        self.mounted = false;
        self.cancel_pending_search();
        self.pending_frame = None;
        self.feed.unsubscribe(self.host.as_ref())?;
        info!("Mail widget torn down");
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn mode(&self) -> Mode {
        self.view.mode()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn params(&self) -> &ListParams {
        &self.params
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn mails(&self) -> &[MailRecord] {
        &self.mails
    }

    pub fn mail(&self, id: &MailId) -> Option<&MailRecord> {
        self.mails.iter().find(|r| &r.id == id)
    }

    /// Typed search text that has not been applied yet
    pub fn pending_search(&self) -> Option<&str> {
        self.search.pending().map(String::as_str)
    }

    /// Run the derivation pipeline on the current state
    pub fn derived(&self) -> DerivedPage {
        derive_page(&self.mails, &self.params)
    }

    /// Build a frame for the current state
    pub fn frame(&self) -> Frame {
        match &self.view {
            ViewState::List => Frame::List(self.list_frame()),
            ViewState::Detail(detail) => Frame::Detail(self.detail_frame(detail)),
            ViewState::Compose(draft) => Frame::Compose(compose_frame(draft)),
        }
    }

    /// Take the frame queued by the last visible change, if any
    pub fn take_frame(&mut self) -> Option<Frame> {
        self.pending_frame.take()
    }

    // ========================================================================
    // Feed
    // ========================================================================

    /// Replace the collection with a feed push (`None` clears it).
    ///
    /// Only the List view re-renders; Detail and Compose keep what they show
    /// and find the collection up to date when they return to the list.
    pub fn on_feed_push(&mut self, push: Option<Vec<MailRecord>>) -> FeedStats {
        if !self.mounted {
            debug!("Ignoring feed push after teardown");
            return FeedStats::default();
        }
        let stats = replace_collection(&mut self.mails, push);
        self.feed.record_push(&stats);
        self.clamp_page();

        if self.view.is_list() {
            self.request_render();
        } else {
            debug!("Feed updated while in {} mode; render deferred", self.view.mode());
        }
        stats
    }

    /// Apply a raw JSON feed push. A payload that fails to parse leaves the
    /// collection untouched.
    pub fn on_feed_json(&mut self, payload: Value) -> Result<FeedStats> {
        match parse_feed(payload) {
            Ok(records) => Ok(self.on_feed_push(Some(records))),
            Err(e) => {
                warn!("Ignoring feed push: {:#}", e);
                Err(WidgetError::InvalidFeed(e))
            }
        }
    }

    // ========================================================================
    // List view
    // ========================================================================

    /// A keystroke in the search box. The query applies once typing pauses.
    pub fn search_input(&mut self, text: impl Into<String>) -> Result<()> {
        self.require_list("search")?;
        let text = text.into();
        self.cancel_pending_search();

        if text == self.params.search_query {
            return Ok(());
        }
        let token = self.search.start(text);
        self.host.schedule_timer(token, self.search.delay());
        Ok(())
    }

    /// A timer armed by the widget elapsed. Returns whether a search applied.
    pub fn on_timer(&mut self, token: TimerToken) -> bool {
        let Some(query) = self.search.fire(token) else {
            debug!("Ignoring stale timer {:?}", token);
            return false;
        };
        debug!("Applying search {:?}", query);
        self.params.search_query = query;
        self.params.page = 1;
        self.request_render();
        true
    }

    pub fn set_filter(&mut self, filter: Filter) -> Result<()> {
        self.require_list("filter")?;
        self.params.filter = filter;
        self.params.page = 1;
        self.request_render();
        Ok(())
    }

    /// Column header click: the active column flips direction, another column
    /// becomes active sorted descending.
    pub fn sort_by(&mut self, key: SortKey) -> Result<()> {
        self.require_list("sort")?;
        if self.params.sort_by == key {
            self.params.sort_dir = self.params.sort_dir.flipped();
        } else {
            self.params.sort_by = key;
            self.params.sort_dir = SortDir::Desc;
        }
        self.params.page = 1;
        self.request_render();
        Ok(())
    }

    pub fn toggle_sort_dir(&mut self) -> Result<()> {
        self.require_list("sort")?;
        self.params.sort_dir = self.params.sort_dir.flipped();
        self.params.page = 1;
        self.request_render();
        Ok(())
    }

    /// Change rows per page; the current page is clamped, not reset
    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        self.require_list("page size")?;
        if !self.config.allows_page_size(size) {
            return Err(WidgetError::InvalidPageSize { size });
        }
        self.params.page_size = size;
        self.clamp_page();
        self.request_render();
        Ok(())
    }

    /// Go back one page; returns whether the page changed
    pub fn prev_page(&mut self) -> Result<bool> {
        self.require_list("pagination")?;
        if self.params.page <= 1 {
            return Ok(false);
        }
        self.params.page -= 1;
        self.request_render();
        Ok(true)
    }

    /// Go forward one page; returns whether the page changed
    pub fn next_page(&mut self) -> Result<bool> {
        self.require_list("pagination")?;
        if self.params.page >= self.total_pages() {
            return Ok(false);
        }
        self.params.page += 1;
        self.request_render();
        Ok(true)
    }

    /// Dispatch a click on a list row.
    ///
    /// Returns the delete outcome when the delete button was the target.
    pub fn click_row(&mut self, id: &MailId, target: RowTarget) -> Result<Option<DeleteOutcome>> {
        match target {
            RowTarget::Row => self.open_mail(id).map(|()| None),
            RowTarget::DeleteButton => self.delete_mail(id).map(Some),
        }
    }

    /// Delete a mail after asking the user
    pub fn delete_mail(&mut self, id: &MailId) -> Result<DeleteOutcome> {
        self.require_list("delete")?;
        let outcome = self.actions.delete(&mut self.mails, id)?;
        if outcome == DeleteOutcome::Deleted {
            self.clamp_page();
            self.request_render();
        }
        Ok(outcome)
    }

    // ========================================================================
    // Detail view
    // ========================================================================

    /// Open a mail for reading.
    ///
    /// The mail is marked seen right away. Without a body, a fetch is issued
    /// and the view shows a loading state until it completes; if the fetch
    /// cannot even be issued the preview is shown instead.
    pub fn open_mail(&mut self, id: &MailId) -> Result<()> {
        self.require_list("open mail")?;
        let record = self
            .mails
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| WidgetError::NotFound { id: id.clone() })?;
        record.seen = true;
        let needs_body = record.full_body.is_none();

        let loading = needs_body
            && match self.actions.request_body(id) {
                Ok(_) => true,
                Err(e) => {
                    warn!("Showing preview for {}: {}", id, e);
                    false
                }
            };

        self.cancel_pending_search();
        self.view = ViewState::Detail(DetailState {
            selected: id.clone(),
            loading,
        });
        self.request_render();
        Ok(())
    }

    /// Leave the detail view; list parameters are kept
    pub fn close_mail(&mut self) -> Result<()> {
        self.require_mode(Mode::Detail, "close mail")?;
        self.view = ViewState::List;
        self.clamp_page();
        self.request_render();
        Ok(())
    }

    /// A body fetch completed.
    ///
    /// The body is stored on the record whatever the current view, so a later
    /// open shows it; only an open detail view of that mail re-renders.
    pub fn on_full_body(
        &mut self,
        id: &MailId,
        response: std::result::Result<Option<FullBody>, String>,
    ) -> BodyOutcome {
        let outcome = self.actions.apply_body(&mut self.mails, id, response);

        if let Some(detail) = self.view.detail_mut().filter(|d| &d.selected == id) {
            detail.loading = false;
            self.request_render();
        }
        outcome
    }

    /// Raw JSON variant of [`on_full_body`](Self::on_full_body)
    pub fn on_full_body_json(&mut self, id: &MailId, payload: Value) -> BodyOutcome {
        let response = FullBody::from_json(payload).map_err(|e| format!("{:#}", e));
        self.on_full_body(id, response)
    }

    // ========================================================================
    // Compose view
    // ========================================================================

    /// Start a new message with an empty draft and one empty attachment slot
    pub fn open_compose(&mut self) -> Result<()> {
        self.require_list("compose")?;
        self.cancel_pending_search();
        self.next_session += 1;
        self.view = ViewState::Compose(ComposeDraft::new(ComposeSession(self.next_session)));
        self.request_render();
        Ok(())
    }

    /// Discard the draft and return to the list
    pub fn cancel_compose(&mut self) -> Result<()> {
        let draft = self.require_draft("cancel compose")?;
        if draft.sending {
            info!("Draft discarded while its send is in flight");
        }
        self.view = ViewState::List;
        self.clamp_page();
        self.request_render();
        Ok(())
    }

    /// Update a text field of the draft. The form owns the input, so this
    /// does not queue a frame.
    pub fn set_compose_field(&mut self, field: ComposeField, value: impl Into<String>) -> Result<()> {
        self.require_draft("edit draft")?.set_field(field, value);
        Ok(())
    }

    /// A file was picked for an attachment slot
    pub fn attach_file(&mut self, slot: usize, file: FileHandle) -> Result<()> {
        self.require_draft("attach file")?.attachments.set(slot, file)?;
        self.request_render();
        Ok(())
    }

    /// Add a file to the trailing empty slot, returning the slot it landed in
    pub fn push_attachment(&mut self, file: FileHandle) -> Result<usize> {
        let slot = self.require_draft("attach file")?.attachments.push(file);
        self.request_render();
        Ok(slot)
    }

    /// An attachment slot's remove button was clicked (or its picker cleared)
    pub fn remove_attachment(&mut self, slot: usize) -> Result<()> {
        self.require_draft("remove attachment")?.attachments.remove(slot)?;
        self.request_render();
        Ok(())
    }

    /// Validate the draft and hand it to the host.
    ///
    /// The widget stays in Compose until the host answers through
    /// [`on_send_result`](Self::on_send_result).
    pub fn send(&mut self) -> Result<()> {
        let mode = self.view.mode();
        let ViewState::Compose(draft) = &mut self.view else {
            return Err(WidgetError::WrongMode { action: "send", mode });
        };
        if draft.sending {
            return Err(WidgetError::SendInProgress);
        }

        let result = self.actions.send(draft);
        match &result {
            Ok(()) => {
                draft.sending = true;
                draft.error = None;
            }
            Err(e) => draft.error = Some(e.to_string()),
        }
        self.request_render();
        result
    }

    /// The host answered a send request.
    ///
    /// Acceptance closes the draft. Rejection keeps it, with the failure
    /// shown, and is returned as [`WidgetError::SendRejected`]. Answers for a
    /// draft that was already discarded are ignored.
    pub fn on_send_result(
        &mut self,
        session: ComposeSession,
        result: std::result::Result<(), String>,
    ) -> Result<()> {
        let Some(draft) = self.view.draft_mut().filter(|d| d.session == session) else {
            match result {
                Ok(()) => debug!("Send for discarded draft {} accepted", session.0),
                Err(e) => warn!("Send for discarded draft {} rejected: {}", session.0, e),
            }
            return Ok(());
        };

        match result {
            Ok(()) => {
                info!("Mail sent to {}", draft.to.trim());
                self.view = ViewState::List;
                self.clamp_page();
                self.request_render();
                Ok(())
            }
            Err(message) => {
                warn!("Send rejected: {}", message);
                draft.sending = false;
                draft.error = Some(message.clone());
                self.request_render();
                Err(WidgetError::SendRejected { message })
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn require_mode(&self, mode: Mode, action: &'static str) -> Result<()> {
        if self.view.mode() != mode {
            return Err(WidgetError::WrongMode {
                action,
                mode: self.view.mode(),
            });
        }
        Ok(())
    }

    fn require_list(&self, action: &'static str) -> Result<()> {
        self.require_mode(Mode::List, action)
    }

    fn require_draft(&mut self, action: &'static str) -> Result<&mut ComposeDraft> {
        let mode = self.view.mode();
        self.view
            .draft_mut()
            .ok_or(WidgetError::WrongMode { action, mode })
    }

    fn total_pages(&self) -> usize {
        total_pages(
            filter_and_sort(&self.mails, &self.params).len(),
            self.params.page_size,
        )
    }

    /// Pull the stored page back inside the current result
    fn clamp_page(&mut self) {
        let total = self.total_pages();
        if self.params.page > total {
            debug!("Clamping page {} to {}", self.params.page, total);
            self.params.page = total;
        }
        self.params.page = self.params.page.max(1);
    }

    fn cancel_pending_search(&mut self) {
        if let Some(token) = self.search.cancel() {
            self.host.cancel_timer(token);
        }
    }

    fn request_render(&mut self) {
        self.pending_frame = Some(self.frame());
    }

    fn list_frame(&self) -> ListFrame {
        let page = self.derived();
        debug!(
            "Derived page {}/{} ({} of {} mails)",
            page.page,
            page.total_pages,
            page.rows.len(),
            page.filtered_count
        );
        ListFrame {
            page,
            search_query: self.params.search_query.clone(),
            filter: self.params.filter,
            sort_by: self.params.sort_by,
            sort_dir: self.params.sort_dir,
            page_sizes: self.config.page_sizes.clone(),
            viewport_height: self.host.height().saturating_sub(LIST_TOOLBAR_HEIGHT),
        }
    }

    fn detail_frame(&self, detail: &DetailState) -> DetailFrame {
        let record = self.mail(&detail.selected);
        let body = match record {
            Some(r) if !detail.loading || r.full_body.is_some() => r.display_body().to_string(),
            _ => String::new(),
        };
        DetailFrame {
            id: detail.selected.clone(),
            sender: record.map(|r| r.sender.clone()).unwrap_or_default(),
            subject: record.map(|r| r.subject.clone()).unwrap_or_default(),
            received_at: record.and_then(|r| r.received_at),
            loading: detail.loading,
            body,
            is_full_body: record.is_some_and(|r| r.full_body.is_some()),
            missing: record.is_none(),
            viewport_height: self.host.height(),
        }
    }
}

fn compose_frame(draft: &ComposeDraft) -> ComposeFrame {
    ComposeFrame {
        to: draft.to.clone(),
        subject: draft.subject.clone(),
        body: draft.body.clone(),
        attachments: draft
            .attachments
            .slots()
            .iter()
            .map(|slot| slot.as_ref().map(|f| f.name.clone()))
            .collect(),
        sending: draft.sending,
        error: draft.error.clone(),
    }
}

impl Drop for MailWidget {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            warn!("Teardown on drop failed: {}", e);
        }
    }
}
