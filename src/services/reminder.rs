//! Creator reminder job
//!
//! Mails each event's creator once, shortly before the event starts. The
//! flag is set only after the mail went out, so a crash in between can
//! repeat a reminder but never lose one.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::config::settings::Settings;
use crate::database::store::{EventStore, UserStore};
use crate::services::notification::{NotificationService, Notifier};
use crate::utils::errors::Result;
use crate::utils::logging::log_collaborator_failure;

/// One reminded event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDelivery {
    pub event_id: Uuid,
    pub title: String,
    pub creator_email: String,
}

/// Outcome of one job run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderReport {
    pub sent: Vec<ReminderDelivery>,
    /// Events whose mail or sent flag failed; they stay eligible for the
    /// next run
    pub failed: Vec<Uuid>,
    /// Events skipped because the creator has no user row
    pub skipped: Vec<Uuid>,
}

impl ReminderReport {
    pub fn processed(&self) -> usize {
        self.sent.len()
    }
}

#[derive(Clone)]
pub struct ReminderService<S, N> {
    store: S,
    notifications: NotificationService<N>,
    lookahead: Duration,
}

impl<S, N> ReminderService<S, N>
where
    S: EventStore + UserStore,
    N: Notifier,
{
    pub fn new(store: S, notifications: NotificationService<N>, settings: &Settings) -> Self {
        Self {
            store,
            notifications,
            lookahead: Duration::hours(settings.reminder.lookahead_hours),
        }
    }

    /// Remind creators of live events starting in `(now, now + lookahead]`
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<ReminderReport> {
        let events = self.store.events_pending_reminder(now, now + self.lookahead).await?;
        debug!(count = events.len(), "Events pending creator reminder");

        let mut report = ReminderReport::default();

        for event in events {
            let creator = match event.creator_id {
                Some(creator_id) => self.store.find_user_by_id(creator_id).await?,
                None => None,
            };

            let Some(creator) = creator else {
                report.skipped.push(event.id);
                continue;
            };

            let attendee_count = self.store.count_attendees(event.id).await?;

            if let Err(e) = self
                .notifications
                .send_creator_reminder(&event, &creator, attendee_count)
                .await
            {
                log_collaborator_failure("mail", &e.to_string(), Some(&event.id.to_string()));
                report.failed.push(event.id);
                continue;
            }

            if let Err(e) = self.store.mark_reminder_sent(event.id).await {
                log_collaborator_failure("reminder flag", &e.to_string(), Some(&event.id.to_string()));
                report.failed.push(event.id);
                continue;
            }

            report.sent.push(ReminderDelivery {
                event_id: event.id,
                title: event.title.clone(),
                creator_email: creator.email.clone(),
            });
        }

        if report.failed.is_empty() {
            info!(processed = report.processed(), "Creator reminder run finished");
        } else {
            warn!(
                processed = report.processed(),
                failed = report.failed.len(),
                "Creator reminder run finished with failures"
            );
        }

        Ok(report)
    }
}
