//! Command dispatcher for host-side operations
//!
//! Translates delete / send / fetch-body intents into host service calls and
//! folds the responses back into the local collection.

use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Result, WidgetError};
use crate::host::{FullBody, MailHost, OutgoingAttachment, OutgoingMail, ServiceCall};
use crate::models::{MailId, MailRecord};
use crate::view::ComposeDraft;

/// What happened to a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Removed locally and reported to the host
    Deleted,
    /// The user said no; nothing changed
    Declined,
}

/// What happened to a body fetch response
#[derive(Debug)]
pub enum BodyOutcome {
    /// The record now has its full body
    Applied,
    /// The fetch failed; the record keeps showing its preview
    Failed(WidgetError),
    /// The record is gone; the response was ignored
    Dropped,
}

pub struct ActionHandler {
    host: Arc<dyn MailHost>,
    /// Mail ids with an outstanding `getFullMailBody` request
    bodies_in_flight: HashSet<MailId>,
}

impl ActionHandler {
    pub fn new(host: Arc<dyn MailHost>) -> Self {
        Self {
            host,
            bodies_in_flight: HashSet::new(),
        }
    }

    /// Delete a mail after the user confirms.
    ///
    /// The local removal stands even if the host call fails: the next feed
    /// push is authoritative either way.
    pub fn delete(&self, mails: &mut Vec<MailRecord>, id: &MailId) -> Result<DeleteOutcome> {
        let record = mails
            .iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| WidgetError::NotFound { id: id.clone() })?;

        let prompt = if record.subject.is_empty() {
            format!("Delete mail from {}?", record.sender)
        } else {
            format!("Delete \"{}\" from {}?", record.subject, record.sender)
        };
        if !self.host.confirm(&prompt) {
            debug!("Delete of {} declined", id);
            return Ok(DeleteOutcome::Declined);
        }

        mails.retain(|r| &r.id != id);
        info!("Deleting mail {}", id);
        if let Err(e) = self
            .host
            .call_service(ServiceCall::DeleteMail { id: id.clone() })
        {
            error!("Failed to delete mail {} on host: {:#}", id, e);
        }
        Ok(DeleteOutcome::Deleted)
    }

    /// Ask the host for a mail's full body.
    ///
    /// Returns `false` when a request for this id is already outstanding.
    pub fn request_body(&mut self, id: &MailId) -> Result<bool> {
        if self.bodies_in_flight.contains(id) {
            debug!("Body fetch for {} already in flight", id);
            return Ok(false);
        }
        self.host
            .call_service(ServiceCall::GetFullMailBody { id: id.clone() })?;
        self.bodies_in_flight.insert(id.clone());
        debug!("Requested full body for {}", id);
        Ok(true)
    }

    pub fn is_fetching(&self, id: &MailId) -> bool {
        self.bodies_in_flight.contains(id)
    }

    /// Fold a body fetch response into the collection by id.
    ///
    /// `Ok(None)` means the host answered but had no body for the mail.
    pub fn apply_body(
        &mut self,
        mails: &mut [MailRecord],
        id: &MailId,
        response: std::result::Result<Option<FullBody>, String>,
    ) -> BodyOutcome {
        self.bodies_in_flight.remove(id);

        let Some(record) = mails.iter_mut().find(|r| &r.id == id) else {
            debug!("Dropping body for {}: mail no longer present", id);
            return BodyOutcome::Dropped;
        };

        let failure = match response {
            Ok(Some(FullBody {
                body: Some(body),
                plain_text,
            })) => {
                record.set_full_body(&body, plain_text);
                debug!("Applied full body for {} ({} bytes)", id, body.len());
                return BodyOutcome::Applied;
            }
            Ok(_) => "host returned no body".to_string(),
            Err(message) => message,
        };

        let err = WidgetError::FetchBodyFailed {
            id: id.clone(),
            message: failure,
        };
        warn!("{}", err);
        BodyOutcome::Failed(err)
    }

    /// Validate a draft and hand it to the host.
    ///
    /// Nothing reaches the host unless every required field is valid.
    pub fn send(&self, draft: &ComposeDraft) -> Result<()> {
        let to = draft.validate()?;
        let mail = OutgoingMail {
            to: to.email.clone(),
            subject: draft.subject.trim().to_string(),
            body: draft.body.clone(),
            attachments: draft
                .attachments
                .files()
                .map(OutgoingAttachment::from)
                .collect(),
        };

        info!(
            "Sending mail to {} ({} attachments)",
            to.display(),
            mail.attachments.len()
        );
        self.host.call_service(ServiceCall::SendMail {
            session: draft.session,
            mail,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use crate::models::FileHandle;
    use crate::view::{ComposeField, ComposeSession};

    fn mails() -> Vec<MailRecord> {
        vec![
            MailRecord::builder("1").sender("a@x").subject("Hi").preview("hello").build(),
            MailRecord::builder("2").sender("b@x").subject("Yo").build(),
        ]
    }

    fn setup() -> (Arc<RecordingHost>, ActionHandler) {
        let host = Arc::new(RecordingHost::new());
        let handler = ActionHandler::new(host.clone());
        (host, handler)
    }

    #[test]
    fn test_delete_confirmed() {
        let (host, handler) = setup();
        let mut mails = mails();

        let outcome = handler.delete(&mut mails, &MailId::new("1")).unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(mails.len(), 1);
        assert_eq!(host.calls(), vec![ServiceCall::DeleteMail { id: MailId::new("1") }]);
        assert_eq!(host.prompts(), vec!["Delete \"Hi\" from a@x?".to_string()]);
    }

    #[test]
    fn test_delete_declined_is_noop() {
        let (host, handler) = setup();
        host.set_confirm_answer(false);
        let mut mails = mails();

        let outcome = handler.delete(&mut mails, &MailId::new("1")).unwrap();
        assert_eq!(outcome, DeleteOutcome::Declined);
        assert_eq!(mails, self::mails());
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_delete_unknown_id() {
        let (host, handler) = setup();
        let mut mails = mails();
        let err = handler.delete(&mut mails, &MailId::new("9")).unwrap_err();
        assert!(matches!(err, WidgetError::NotFound { .. }));
        assert!(host.prompts().is_empty());
    }

    #[test]
    fn test_delete_survives_host_failure() {
        let (host, handler) = setup();
        host.set_fail_calls(true);
        let mut mails = mails();

        let outcome = handler.delete(&mut mails, &MailId::new("2")).unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(mails.len(), 1);
    }

    #[test]
    fn test_body_request_deduplicated() {
        let (host, mut handler) = setup();
        let id = MailId::new("1");
        assert!(handler.request_body(&id).unwrap());
        assert!(!handler.request_body(&id).unwrap());
        assert_eq!(host.call_names(), vec!["getFullMailBody"]);

        let mut mails = mails();
        handler.apply_body(&mut mails, &id, Ok(Some(FullBody::html("<p>x</p>"))));
        assert!(!handler.is_fetching(&id));
        assert!(handler.request_body(&id).unwrap());
    }

    #[test]
    fn test_body_request_transport_failure() {
        let (host, mut handler) = setup();
        host.set_fail_calls(true);
        let id = MailId::new("1");
        assert!(matches!(handler.request_body(&id), Err(WidgetError::Host(_))));
        assert!(!handler.is_fetching(&id));
    }

    #[test]
    fn test_apply_body_outcomes() {
        let (_host, mut handler) = setup();
        let mut mails = mails();

        let applied = handler.apply_body(&mut mails, &MailId::new("1"), Ok(Some(FullBody::plain("a\nb"))));
        assert!(matches!(applied, BodyOutcome::Applied));
        assert_eq!(
            mails[0].full_body.as_deref(),
            Some("<html><body>a<br>b</body></html>")
        );

        let failed = handler.apply_body(&mut mails, &MailId::new("2"), Err("timeout".to_string()));
        assert!(matches!(failed, BodyOutcome::Failed(WidgetError::FetchBodyFailed { .. })));
        assert!(mails[1].full_body.is_none());

        let empty = handler.apply_body(&mut mails, &MailId::new("2"), Ok(None));
        assert!(matches!(empty, BodyOutcome::Failed(_)));

        let dropped = handler.apply_body(&mut mails, &MailId::new("gone"), Ok(Some(FullBody::html("x"))));
        assert!(matches!(dropped, BodyOutcome::Dropped));
    }

    #[test]
    fn test_send_collects_attachments() {
        let (host, handler) = setup();
        let mut draft = ComposeDraft::new(ComposeSession(5));
        draft.set_field(ComposeField::To, "Bob <bob@example.com>");
        draft.set_field(ComposeField::Subject, " Report ");
        draft.set_field(ComposeField::Body, "See attached");
        draft.attachments.push(FileHandle::new("q1.pdf", vec![1, 2, 3]));
        draft.attachments.push(FileHandle::new("q2.pdf", vec![4]));

        handler.send(&draft).unwrap();

        let calls = host.calls();
        let ServiceCall::SendMail { session, mail } = &calls[0] else {
            panic!("expected sendMail, got {:?}", calls);
        };
        assert_eq!(*session, ComposeSession(5));
        assert_eq!(mail.to, "bob@example.com");
        assert_eq!(mail.subject, "Report");
        let names: Vec<&str> = mail.attachments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["q1.pdf", "q2.pdf"]);
    }

    #[test]
    fn test_send_invalid_draft_never_reaches_host() {
        let (host, handler) = setup();
        let draft = ComposeDraft::new(ComposeSession(1));
        assert!(matches!(handler.send(&draft), Err(WidgetError::Validation { .. })));
        assert!(host.calls().is_empty());
    }
}
