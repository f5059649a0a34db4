//! Event lifecycle service
//!
//! Creation, editing, soft deletion and time-boxed restoration of events,
//! plus the read models the admin list and the public event page use.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::config::settings::Settings;
use crate::database::store::{EventStore, UserStore};
use crate::models::{messages, ActionOutcome, CreateEventRequest, Event, EventDetails, EventLifecycle, ONLINE_LOCATION};
use crate::services::auth::{require_admin_access, require_editor, require_session, require_super_admin, AuthService, Session};
use crate::services::geocoder::{Coordinates, Geocoder};
use crate::services::slug::{ensure_unique_slug, generate_slug};
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::helpers::non_empty;
use crate::utils::logging::{log_collaborator_failure, log_event_action};

/// Registration stays open this long after an event starts
pub const REGISTRATION_GRACE_HOURS: i64 = 6;

/// Attempts at inserting an event before a slug collision is reported
const SLUG_INSERT_ATTEMPTS: usize = 3;

/// Event fields as submitted by the create and edit forms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventForm {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub image_url: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_online: bool,
    pub capacity: Option<i32>,
}

impl EventForm {
    /// Check the form and normalize it into storable details. A
    /// rejected form yields the message to show the user.
    pub fn validate(&self) -> std::result::Result<EventDetails, &'static str> {
        let title = self.title.trim();
        let Some(start_time) = self.start_time else {
            return Err(messages::MISSING_FIELDS);
        };
        if title.is_empty() {
            return Err(messages::MISSING_FIELDS);
        }

        if let Some(end_time) = self.end_time {
            if end_time < start_time {
                return Err(messages::END_BEFORE_START);
            }
        }

        if let Some(capacity) = self.capacity {
            if capacity <= 0 {
                return Err(messages::CAPACITY_NOT_POSITIVE);
            }
        }

        let coordinates = match (self.location_lat, self.location_lng) {
            (Some(lat), Some(lng)) => {
                let coordinates = Coordinates { lat, lng };
                if !coordinates.is_valid() {
                    return Err(messages::COORDINATES_OUT_OF_RANGE);
                }
                Some(coordinates)
            }
            (None, None) => None,
            _ => return Err(messages::COORDINATES_UNPAIRED),
        };

        let (location, coordinates) = if self.is_online {
            (Some(ONLINE_LOCATION.to_string()), None)
        } else {
            (non_empty(self.location.as_deref()).map(str::to_string), coordinates)
        };

        Ok(EventDetails {
            title: title.to_string(),
            description: non_empty(self.description.as_deref()).map(str::to_string),
            location,
            location_lat: coordinates.map(|c| c.lat),
            location_lng: coordinates.map(|c| c.lng),
            image_url: non_empty(self.image_url.as_deref()).map(str::to_string),
            start_time,
            end_time: self.end_time,
            is_online: self.is_online,
            capacity: self.capacity,
        })
    }
}

/// Result of an event form submission or a restore. Rejections carry
/// the message shown to the user; permission and lookup failures are
/// errors instead.
#[derive(Debug, Clone)]
pub enum EventOutcome {
    Saved(Event),
    Rejected(ActionOutcome),
}

impl EventOutcome {
    fn rejected(message: &str) -> Self {
        EventOutcome::Rejected(ActionOutcome::fail(message))
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, EventOutcome::Saved(_))
    }

    pub fn into_event(self) -> Option<Event> {
        match self {
            EventOutcome::Saved(event) => Some(event),
            EventOutcome::Rejected(_) => None,
        }
    }

    /// Message for the user, `success_message` when saved
    pub fn outcome(&self, success_message: &str) -> ActionOutcome {
        match self {
            EventOutcome::Saved(_) => ActionOutcome::ok(success_message),
            EventOutcome::Rejected(outcome) => outcome.clone(),
        }
    }
}

/// Where an event stands for registration at a given moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    /// Not started yet
    Upcoming,
    /// Started, still inside the grace period
    InProgress,
    Closed,
}

impl RegistrationStatus {
    pub fn is_open(&self) -> bool {
        !matches!(self, RegistrationStatus::Closed)
    }
}

/// Registration state of `event` at `now`. Closes strictly after
/// start + 6h; the end time plays no part.
pub fn registration_status(event: &Event, now: DateTime<Utc>) -> RegistrationStatus {
    if now > event.start_time + Duration::hours(REGISTRATION_GRACE_HOURS) {
        RegistrationStatus::Closed
    } else if event.start_time > now {
        RegistrationStatus::Upcoming
    } else {
        RegistrationStatus::InProgress
    }
}

/// Map link for the event page: coordinates when known, else an address search
pub fn map_link(event: &Event) -> Option<String> {
    if event.is_online {
        return None;
    }

    if let (Some(lat), Some(lng)) = (event.location_lat, event.location_lng) {
        return Some(format!("https://www.google.com/maps?q={},{}", lat, lng));
    }

    non_empty(event.location.as_deref()).map(|location| {
        format!(
            "https://www.google.com/maps/search/?api=1&query={}",
            urlencoding::encode(location)
        )
    })
}

/// Public check-in page encoded into the venue QR code
pub fn checkin_url(base_url: &str, event_id: Uuid) -> String {
    format!("{}/checkin/{}", base_url.trim_end_matches('/'), event_id)
}

/// Registered count against capacity. Capacity is informational, so the
/// count may exceed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityProgress {
    pub registered: i64,
    pub capacity: i32,
}

impl CapacityProgress {
    pub fn for_event(event: &Event, registered: i64) -> Option<Self> {
        event.capacity.filter(|c| *c > 0).map(|capacity| Self { registered, capacity })
    }

    /// Fill percentage for the progress bar, capped at 100
    pub fn percentage(&self) -> u32 {
        let percent = self.registered.saturating_mul(100) / i64::from(self.capacity);
        percent.clamp(0, 100) as u32
    }

    pub fn is_oversubscribed(&self) -> bool {
        self.registered > i64::from(self.capacity)
    }
}

/// Row of the admin event list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummary {
    pub event: Event,
    pub lifecycle: EventLifecycle,
    pub attendee_count: i64,
    pub capacity: Option<CapacityProgress>,
}

/// Everything the public event page shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPage {
    pub event: Event,
    pub registration: RegistrationStatus,
    pub map_link: Option<String>,
    pub capacity: Option<CapacityProgress>,
}

/// Event lifecycle service
#[derive(Clone)]
pub struct EventService<S> {
    store: S,
    auth: AuthService<S>,
    geocoder: Geocoder,
    utc_offset_minutes: i32,
    base_url: String,
}

impl<S: EventStore + UserStore> EventService<S> {
    pub fn new(store: S, auth: AuthService<S>, geocoder: Geocoder, settings: &Settings) -> Self {
        Self {
            store,
            auth,
            geocoder,
            utc_offset_minutes: settings.site.utc_offset_minutes,
            base_url: settings.site.base_url.clone(),
        }
    }

    pub fn checkin_url(&self, event_id: Uuid) -> String {
        checkin_url(&self.base_url, event_id)
    }

    /// Fill in coordinates for a physical location that has none.
    /// Geocoder failures leave the event without coordinates.
    async fn fill_coordinates(&self, details: &mut EventDetails) {
        if details.is_online || details.location_lat.is_some() {
            return;
        }
        let Some(location) = details.location.clone() else {
            return;
        };

        match self.geocoder.lookup(&location).await {
            Ok(Some(coordinates)) => {
                details.location_lat = Some(coordinates.lat);
                details.location_lng = Some(coordinates.lng);
            }
            Ok(None) => {}
            Err(e) => log_collaborator_failure("geocoder", &e.to_string(), Some(&location)),
        }
    }

    /// Create an event with a fresh slug, owned by the acting user
    pub async fn create_event(&self, actor: Option<&Session>, form: EventForm) -> Result<EventOutcome> {
        let actor = require_editor(actor)?;
        let mut details = match form.validate() {
            Ok(details) => details,
            Err(message) => return Ok(EventOutcome::rejected(message)),
        };
        self.fill_coordinates(&mut details).await;

        let creator_id = self.auth.user_id_for(actor.email()).await?;
        let base = generate_slug(details.start_time, &details.title, self.utc_offset_minutes);

        for attempt in 1..=SLUG_INSERT_ATTEMPTS {
            let store = &self.store;
            let slug = ensure_unique_slug(&base, |candidate| async move { store.slug_exists(&candidate).await }).await?;

            let request = CreateEventRequest {
                slug,
                creator_id,
                details: details.clone(),
            };

            match self.store.insert_event(request).await {
                Ok(event) => {
                    log_event_action(event.id, "create", Some(actor.email()), event.slug.as_deref());
                    return Ok(EventOutcome::Saved(event));
                }
                Err(EventDeskError::Conflict(reason)) => {
                    warn!(attempt, base = %base, reason = %reason, "Slug taken concurrently, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(EventDeskError::Conflict(format!("Could not assign a unique slug for {}", base)))
    }

    /// Edit an event. Any non-viewer session may edit a live event;
    /// ownership is only required for deletion. Deleted events are out of
    /// reach for everyone except the super admin.
    pub async fn update_event(&self, actor: Option<&Session>, event_id: Uuid, form: EventForm) -> Result<EventOutcome> {
        let actor = require_editor(actor)?;
        self.store
            .find_event(event_id)
            .await?
            .filter(|event| event.is_live() || actor.is_super_admin())
            .ok_or(EventDeskError::EventNotFound { event_id })?;

        let mut details = match form.validate() {
            Ok(details) => details,
            Err(message) => return Ok(EventOutcome::rejected(message)),
        };
        self.fill_coordinates(&mut details).await;

        let event = self
            .store
            .update_event(event_id, details)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id })?;

        log_event_action(event_id, "update", Some(actor.email()), None);
        Ok(EventOutcome::Saved(event))
    }

    /// Soft-delete an event. Only its creator or the super admin may.
    pub async fn delete_event(&self, actor: Option<&Session>, event_id: Uuid) -> Result<()> {
        self.delete_event_at(actor, event_id, Utc::now()).await
    }

    pub async fn delete_event_at(&self, actor: Option<&Session>, event_id: Uuid, now: DateTime<Utc>) -> Result<()> {
        let actor = require_session(actor)?;
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id })?;

        if !actor.is_super_admin() && !self.auth.is_owner(&event, actor.email()).await? {
            return Err(EventDeskError::Forbidden("You can only delete your own events".to_string()));
        }

        if !event.is_live() {
            debug!(event_id = %event_id, "Event already deleted");
            return Ok(());
        }

        self.store.set_event_deleted_at(event_id, Some(now)).await?;
        log_event_action(event_id, "delete", Some(actor.email()), None);
        Ok(())
    }

    /// Restore a soft-deleted event. Super admin only, within the window.
    pub async fn restore_event(&self, actor: Option<&Session>, event_id: Uuid) -> Result<EventOutcome> {
        self.restore_event_at(actor, event_id, Utc::now()).await
    }

    pub async fn restore_event_at(&self, actor: Option<&Session>, event_id: Uuid, now: DateTime<Utc>) -> Result<EventOutcome> {
        let actor = require_super_admin(actor, "restore events")?;
        let mut event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id })?;

        match event.lifecycle(now) {
            EventLifecycle::Active => return Ok(EventOutcome::rejected(messages::EVENT_NOT_DELETED)),
            EventLifecycle::Expired { .. } => return Ok(EventOutcome::rejected(messages::RESTORE_EXPIRED)),
            EventLifecycle::Deleted { .. } => {}
        }

        self.store.set_event_deleted_at(event_id, None).await?;
        event.deleted_at = None;

        log_event_action(event_id, "restore", Some(actor.email()), None);
        Ok(EventOutcome::Saved(event))
    }

    /// Admin event list, newest start first. Deleted events are listed
    /// for the super admin only.
    pub async fn list_events(&self, actor: Option<&Session>) -> Result<Vec<EventSummary>> {
        let actor = require_admin_access(actor)?;
        let now = Utc::now();

        let events = self.store.list_events(actor.is_super_admin()).await?;
        let mut summaries = Vec::with_capacity(events.len());

        for event in events {
            let attendee_count = self.store.count_attendees(event.id).await?;
            summaries.push(EventSummary {
                lifecycle: event.lifecycle(now),
                capacity: CapacityProgress::for_event(&event, attendee_count),
                attendee_count,
                event,
            });
        }

        Ok(summaries)
    }

    /// One event for the admin pages; deleted events are hidden from
    /// everyone except the super admin
    pub async fn get_event(&self, actor: Option<&Session>, event_id: Uuid) -> Result<Event> {
        let actor = require_admin_access(actor)?;
        self.store
            .find_event(event_id)
            .await?
            .filter(|event| event.is_live() || actor.is_super_admin())
            .ok_or(EventDeskError::EventNotFound { event_id })
    }

    /// Resolve a public path key, trying the slug before the id.
    /// Deleted events are never public.
    pub async fn find_public_event(&self, key: &str) -> Result<Option<Event>> {
        let mut event = self.store.find_event_by_slug(key).await?;

        if event.is_none() {
            if let Ok(id) = Uuid::parse_str(key) {
                event = self.store.find_event(id).await?;
            }
        }

        Ok(event.filter(Event::is_live))
    }

    /// Public event page model
    pub async fn event_page(&self, key: &str, now: DateTime<Utc>) -> Result<Option<EventPage>> {
        let Some(event) = self.find_public_event(key).await? else {
            return Ok(None);
        };

        let registered = self.store.count_attendees(event.id).await?;
        info!(event_id = %event.id, registered, "Event page viewed");

        Ok(Some(EventPage {
            registration: registration_status(&event, now),
            map_link: map_link(&event),
            capacity: CapacityProgress::for_event(&event, registered),
            event,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn form() -> EventForm {
        EventForm {
            title: "  記者會 ".to_string(),
            start_time: Some(Utc.with_ymd_and_hms(2026, 2, 18, 2, 0, 0).unwrap()),
            location: Some("台北市信義區市府路1號".to_string()),
            ..EventForm::default()
        }
    }

    fn event_from(details: EventDetails) -> Event {
        Event {
            id: Uuid::new_v4(),
            slug: None,
            title: details.title,
            description: details.description,
            location: details.location,
            location_lat: details.location_lat,
            location_lng: details.location_lng,
            image_url: details.image_url,
            start_time: details.start_time,
            end_time: details.end_time,
            is_online: details.is_online,
            capacity: details.capacity,
            deleted_at: None,
            creator_reminder_sent: false,
            creator_id: None,
            created_at: details.start_time,
            updated_at: details.start_time,
        }
    }

    #[test]
    fn test_validate_requires_title_and_start() {
        let mut missing_title = form();
        missing_title.title = "   ".to_string();
        assert!(missing_title.validate().is_err());

        let mut missing_start = form();
        missing_start.start_time = None;
        assert_eq!(missing_start.validate().unwrap_err(), messages::MISSING_FIELDS);

        assert_eq!(form().validate().unwrap().title, "記者會");
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut inverted = form();
        inverted.end_time = inverted.start_time.map(|t| t - Duration::minutes(1));
        assert!(inverted.validate().is_err());

        let mut capacity = form();
        capacity.capacity = Some(0);
        assert!(capacity.validate().is_err());

        let mut half_pair = form();
        half_pair.location_lat = Some(25.0);
        assert_eq!(half_pair.validate().unwrap_err(), messages::COORDINATES_UNPAIRED);
    }

    #[test]
    fn test_online_event_overrides_location() {
        let mut online = form();
        online.is_online = true;
        online.location_lat = Some(25.0);
        online.location_lng = Some(121.5);

        let details = online.validate().unwrap();
        assert_eq!(details.location.as_deref(), Some(ONLINE_LOCATION));
        assert_eq!(details.location_lat, None);
        assert_eq!(map_link(&event_from(details)), None);
    }

    #[test]
    fn test_registration_window_boundary() {
        let event = event_from(form().validate().unwrap());
        let closes = event.start_time + Duration::hours(REGISTRATION_GRACE_HOURS);

        assert_eq!(registration_status(&event, event.start_time - Duration::hours(1)), RegistrationStatus::Upcoming);
        assert!(registration_status(&event, closes - Duration::seconds(1)).is_open());
        assert!(registration_status(&event, closes).is_open());
        assert_eq!(registration_status(&event, closes + Duration::seconds(1)), RegistrationStatus::Closed);
    }

    #[test]
    fn test_map_link() {
        let mut with_coordinates = form();
        with_coordinates.location_lat = Some(25.04);
        with_coordinates.location_lng = Some(121.56);
        let event = event_from(with_coordinates.validate().unwrap());
        assert_eq!(map_link(&event).unwrap(), "https://www.google.com/maps?q=25.04,121.56");

        let event = event_from(form().validate().unwrap());
        let link = map_link(&event).unwrap();
        assert!(link.starts_with("https://www.google.com/maps/search/?api=1&query=%E5%8F%B0"));
    }

    #[test]
    fn test_capacity_progress() {
        let mut limited = form();
        limited.capacity = Some(40);
        let event = event_from(limited.validate().unwrap());

        let half = CapacityProgress::for_event(&event, 20).unwrap();
        assert_eq!(half.percentage(), 50);
        assert!(!half.is_oversubscribed());

        let over = CapacityProgress::for_event(&event, 45).unwrap();
        assert_eq!(over.percentage(), 100);
        assert!(over.is_oversubscribed());

        assert!(CapacityProgress::for_event(&event_from(form().validate().unwrap()), 3).is_none());
    }

    #[test]
    fn test_checkin_url() {
        let id = Uuid::nil();
        assert_eq!(
            checkin_url("https://events.example.com/", id),
            format!("https://events.example.com/checkin/{}", id)
        );
    }
}
