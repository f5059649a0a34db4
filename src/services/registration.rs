//! Attendee registration and self-service check-in

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use crate::config::settings::{PhoneMatchMode, Settings};
use crate::database::store::{AttendeeStore, EventStore, UserStore};
use crate::models::{messages, ActionOutcome, Attendee, CreateAttendeeRequest, PhoneLookup};
use crate::services::auth::{require_admin_access, require_super_admin, Session};
use crate::services::events::registration_status;
use crate::services::notification::{NotificationService, Notifier};
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::helpers::phone_key;
use crate::utils::logging::{log_admin_action, log_collaborator_failure};

/// Public registration form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub event_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Registration and check-in service
#[derive(Clone)]
pub struct RegistrationService<S, N> {
    store: S,
    notifications: NotificationService<N>,
    phone_match: PhoneMatchMode,
}

impl<S, N> RegistrationService<S, N>
where
    S: EventStore + AttendeeStore + UserStore,
    N: Notifier,
{
    pub fn new(store: S, notifications: NotificationService<N>, settings: &Settings) -> Self {
        Self {
            store,
            notifications,
            phone_match: settings.checkin.phone_match,
        }
    }

    /// Register for an event. Storage failures are reported as a generic
    /// failure message.
    pub async fn register(&self, session: Option<&Session>, form: RegistrationForm) -> ActionOutcome {
        self.register_at(session, form, Utc::now()).await
    }

    pub async fn register_at(&self, session: Option<&Session>, form: RegistrationForm, now: DateTime<Utc>) -> ActionOutcome {
        match self.try_register(session, &form, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(event_id = %form.event_id, error = %e, "Registration failed");
                ActionOutcome::fail(messages::REGISTRATION_FAILED)
            }
        }
    }

    async fn try_register(&self, session: Option<&Session>, form: &RegistrationForm, now: DateTime<Utc>) -> Result<ActionOutcome> {
        let name = form.name.trim();
        let email = form.email.trim();
        let phone = form.phone.trim();
        let key = phone_key(phone);

        if form.event_id.trim().is_empty() || name.is_empty() || email.is_empty() || key.is_empty() {
            return Ok(ActionOutcome::fail(messages::MISSING_FIELDS));
        }

        let Ok(event_id) = Uuid::parse_str(form.event_id.trim()) else {
            return Ok(ActionOutcome::fail(messages::EVENT_NOT_FOUND));
        };

        let event = match self.store.find_event(event_id).await? {
            Some(event) if event.is_live() => event,
            _ => return Ok(ActionOutcome::fail(messages::EVENT_NOT_FOUND)),
        };

        if !registration_status(&event, now).is_open() {
            debug!(event_id = %event_id, "Registration attempted after close");
            return Ok(ActionOutcome::fail(messages::REGISTRATION_CLOSED));
        }

        if self.store.find_conflicting_attendee(event_id, email, &key).await?.is_some() {
            return Ok(ActionOutcome::fail(messages::DUPLICATE_REGISTRATION));
        }

        let request = CreateAttendeeRequest {
            event_id,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            phone_key: key,
        };

        let attendee = match self.store.insert_attendee(request).await {
            Ok(attendee) => attendee,
            Err(EventDeskError::Conflict(_)) => {
                warn!(event_id = %event_id, "Concurrent duplicate registration rejected");
                return Ok(ActionOutcome::fail(messages::DUPLICATE_REGISTRATION));
            }
            Err(e) => return Err(e),
        };

        info!(event_id = %event_id, attendee_id = %attendee.id, "Attendee registered");

        if let Err(e) = self.notifications.send_registration_confirmation(&event, &attendee).await {
            log_collaborator_failure("mail", &e.to_string(), Some(&attendee.id.to_string()));
        }

        self.backfill_phone(session, phone).await;

        Ok(ActionOutcome::ok(messages::REGISTERED))
    }

    /// Remember the phone on the signed-in user's profile
    async fn backfill_phone(&self, session: Option<&Session>, phone: &str) {
        let Some(session) = session.filter(|s| !s.is_viewer()) else {
            return;
        };

        match self.store.set_user_phone(session.email(), phone).await {
            Ok(true) => debug!(email = %session.email(), "User phone updated"),
            Ok(false) => debug!(email = %session.email(), "No user row for phone backfill"),
            Err(e) => log_collaborator_failure("phone_backfill", &e.to_string(), Some(session.email())),
        }
    }

    /// Self-service check-in by phone number
    pub async fn check_in(&self, event_id: &str, phone: &str) -> ActionOutcome {
        self.check_in_at(event_id, phone, Utc::now()).await
    }

    pub async fn check_in_at(&self, event_id: &str, phone: &str, now: DateTime<Utc>) -> ActionOutcome {
        match self.try_check_in(event_id, phone, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(event_id = %event_id, error = %e, "Check-in failed");
                ActionOutcome::fail(messages::SYSTEM_ERROR)
            }
        }
    }

    async fn try_check_in(&self, event_id: &str, phone: &str, now: DateTime<Utc>) -> Result<ActionOutcome> {
        let phone = phone.trim();
        let key = phone_key(phone);

        if event_id.trim().is_empty() || key.is_empty() {
            return Ok(ActionOutcome::fail(messages::ENTER_PHONE));
        }

        let Ok(event_id) = Uuid::parse_str(event_id.trim()) else {
            return Ok(ActionOutcome::fail(messages::CHECKIN_NOT_FOUND));
        };

        let lookup = match self.phone_match {
            PhoneMatchMode::Normalized => PhoneLookup::Key(key),
            PhoneMatchMode::Exact => PhoneLookup::Raw(phone.to_string()),
        };

        let Some(attendee) = self.store.find_attendee_by_phone(event_id, &lookup).await? else {
            return Ok(ActionOutcome::fail(messages::CHECKIN_NOT_FOUND));
        };

        if attendee.checked_in {
            return Ok(ActionOutcome::ok(messages::ALREADY_CHECKED_IN));
        }

        self.store.mark_checked_in(attendee.id, now).await?;
        info!(event_id = %event_id, attendee_id = %attendee.id, "Attendee checked in");

        Ok(ActionOutcome::ok(messages::CHECKED_IN))
    }

    /// Attendees of one event, newest registration first
    pub async fn list_attendees(&self, actor: Option<&Session>, event_id: Uuid) -> Result<Vec<Attendee>> {
        require_admin_access(actor)?;
        self.store.list_attendees(event_id).await
    }

    /// Remove a registration. Super admin only.
    pub async fn delete_attendee(&self, actor: Option<&Session>, attendee_id: Uuid) -> Result<()> {
        let actor = require_super_admin(actor, "delete attendees")?;

        if !self.store.delete_attendee(attendee_id).await? {
            return Err(EventDeskError::AttendeeNotFound { attendee_id });
        }

        log_admin_action(actor.email(), "delete_attendee", Some(&attendee_id.to_string()), None);
        Ok(())
    }
}
