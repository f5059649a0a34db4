//! Staff application workflow
//!
//! Volunteers apply per event, organizers approve or reject. Both steps
//! send mail; mail failures never undo the stored change.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::database::store::{EventStore, StaffStore, UserStore};
use crate::models::{messages, ActionOutcome, CreateStaffApplicationRequest, StaffApplication, StaffStatus};
use crate::services::auth::{require_admin_access, require_session, AuthService, Session};
use crate::services::notification::{NotificationService, Notifier};
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::helpers::non_empty;
use crate::utils::logging::{log_collaborator_failure, log_event_action};

/// Public staff application form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffApplicationForm {
    pub event_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct StaffService<S, N> {
    store: S,
    auth: AuthService<S>,
    notifications: NotificationService<N>,
}

impl<S, N> StaffService<S, N>
where
    S: EventStore + StaffStore + UserStore,
    N: Notifier,
{
    pub fn new(store: S, auth: AuthService<S>, notifications: NotificationService<N>) -> Self {
        Self { store, auth, notifications }
    }

    /// Submit an application. One per (event, email); the email is
    /// compared exactly as typed.
    pub async fn apply(&self, form: StaffApplicationForm) -> Result<ActionOutcome> {
        let name = form.name.trim();
        let email = form.email.trim();
        let phone = form.phone.trim();

        if form.event_id.trim().is_empty() || name.is_empty() || email.is_empty() || phone.is_empty() {
            return Ok(ActionOutcome::fail(messages::STAFF_MISSING_FIELDS));
        }

        let Ok(event_id) = Uuid::parse_str(form.event_id.trim()) else {
            return Ok(ActionOutcome::fail(messages::STAFF_EVENT_NOT_FOUND));
        };

        if self.store.find_application(event_id, email).await?.is_some() {
            return Ok(ActionOutcome::fail(messages::STAFF_DUPLICATE));
        }

        let event = match self.store.find_event(event_id).await? {
            Some(event) if event.is_live() => event,
            _ => return Ok(ActionOutcome::fail(messages::STAFF_EVENT_NOT_FOUND)),
        };

        let request = CreateStaffApplicationRequest {
            event_id,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            message: non_empty(form.message.as_deref()).map(str::to_string),
        };

        let application = match self.store.insert_application(request).await {
            Ok(application) => application,
            Err(EventDeskError::Conflict(_)) => return Ok(ActionOutcome::fail(messages::STAFF_DUPLICATE)),
            Err(e) => return Err(e),
        };

        info!(event_id = %event_id, application_id = %application.id, "Staff application submitted");

        let creator = match event.creator_id {
            Some(creator_id) => self.store.find_user_by_id(creator_id).await?,
            None => None,
        };

        match creator {
            Some(creator) => {
                if let Err(e) = self
                    .notifications
                    .send_staff_application_notice(&creator.email, &event, &application)
                    .await
                {
                    log_collaborator_failure("mail", &e.to_string(), Some(&application.id.to_string()));
                }
            }
            None => debug!(event_id = %event_id, "Event has no creator to notify"),
        }

        Ok(ActionOutcome::ok(messages::STAFF_SUBMITTED))
    }

    /// Approve or reject an application. Admins and the event's creator
    /// may; viewers may not.
    pub async fn update_status(
        &self,
        actor: Option<&Session>,
        application_id: Uuid,
        status: StaffStatus,
    ) -> Result<StaffApplication> {
        let actor = require_session(actor)?;

        if status == StaffStatus::Pending {
            return Err(EventDeskError::InvalidInput(
                "Status must be approved or rejected".to_string(),
            ));
        }

        let application = self
            .store
            .find_application_by_id(application_id)
            .await?
            .ok_or(EventDeskError::ApplicationNotFound { application_id })?;

        let event_id = application.event_id;
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id })?;

        if !actor.role.can_manage() && !self.auth.is_owner(&event, actor.email()).await? {
            warn!(email = %actor.email(), application_id = %application_id, "Staff review denied");
            return Err(EventDeskError::Forbidden(
                "Only admins or the event owner can review staff applications".to_string(),
            ));
        }

        let updated = self
            .store
            .update_application_status(application_id, status)
            .await?
            .ok_or(EventDeskError::ApplicationNotFound { application_id })?;

        log_event_action(event_id, "staff_review", Some(actor.email()), Some(status.as_str()));

        if let Err(e) = self.notifications.send_staff_status_result(&event, &updated, status).await {
            log_collaborator_failure("mail", &e.to_string(), Some(&application_id.to_string()));
        }

        Ok(updated)
    }

    /// Same as [`Self::update_status`] with the status as submitted by a form
    pub async fn update_status_str(
        &self,
        actor: Option<&Session>,
        application_id: Uuid,
        status: &str,
    ) -> Result<StaffApplication> {
        let status = status
            .parse::<StaffStatus>()
            .map_err(EventDeskError::InvalidInput)?;
        self.update_status(actor, application_id, status).await
    }

    /// Applications for one event, for the admin event page
    pub async fn list_applications(&self, actor: Option<&Session>, event_id: Uuid) -> Result<Vec<StaffApplication>> {
        require_admin_access(actor)?;
        self.store.list_applications(event_id).await
    }
}
