//! Survey mail broadcast to an event's attendees

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use crate::database::store::{AttendeeStore, EventStore};
use crate::models::{messages, ActionOutcome};
use crate::services::auth::{require_editor, Session};
use crate::services::notification::{NotificationService, Notifier};
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::helpers::non_empty;
use crate::utils::logging::log_event_action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyKind {
    Pre,
    Post,
}

impl SurveyKind {
    pub fn label(&self) -> &'static str {
        match self {
            SurveyKind::Pre => "活動前問卷",
            SurveyKind::Post => "活動後問卷",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyForm {
    pub event_id: Uuid,
    pub subject: String,
    pub message: String,
    pub link: Option<String>,
    pub kind: SurveyKind,
}

#[derive(Clone)]
pub struct SurveyService<S, N> {
    store: S,
    notifications: NotificationService<N>,
}

impl<S, N> SurveyService<S, N>
where
    S: EventStore + AttendeeStore,
    N: Notifier,
{
    pub fn new(store: S, notifications: NotificationService<N>) -> Self {
        Self { store, notifications }
    }

    /// Mail the survey to every attendee and report how many went out
    pub async fn send_survey(&self, actor: Option<&Session>, form: SurveyForm) -> Result<ActionOutcome> {
        let actor = require_editor(actor)?;
        if !actor.role.can_access_admin() {
            return Err(EventDeskError::Forbidden("Admin access required".to_string()));
        }

        let subject = form.subject.trim();
        let message = form.message.trim();
        if subject.is_empty() || message.is_empty() {
            return Ok(ActionOutcome::fail(messages::SURVEY_MISSING_FIELDS));
        }

        let Some(event) = self.store.find_event(form.event_id).await?.filter(|e| e.is_live()) else {
            return Ok(ActionOutcome::fail(messages::STAFF_EVENT_NOT_FOUND));
        };

        let attendees = self.store.list_attendees(event.id).await?;
        if attendees.is_empty() {
            return Ok(ActionOutcome::fail(messages::SURVEY_NO_ATTENDEES));
        }

        let link = non_empty(form.link.as_deref());
        let mut sent = 0usize;
        let mut failed = 0usize;

        for attendee in &attendees {
            match self
                .notifications
                .send_survey(&event, attendee, form.kind, subject, message, link)
                .await
            {
                Ok(()) => sent += 1,
                Err(e) => {
                    warn!(event_id = %event.id, email = %attendee.email, error = %e, "Survey mail failed");
                    failed += 1;
                }
            }
        }

        info!(event_id = %event.id, sent, failed, kind = form.kind.label(), "Survey broadcast finished");
        log_event_action(event.id, "send_survey", Some(actor.email()), Some(form.kind.label()));

        let message = if failed == 0 {
            format!("成功發送 {} 封郵件", sent)
        } else {
            format!("發送完成：成功 {} 封，失敗 {} 封", sent, failed)
        };

        Ok(ActionOutcome::ok(message))
    }
}
