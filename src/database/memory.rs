//! In-process store
//!
//! Keeps every table in a map behind one `RwLock`, enforcing the same
//! uniqueness rules as the PostgreSQL schema. Used by tests and by local
//! runs without a database.

use std::collections::HashMap;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::database::store::{AttendeeStore, EventStore, StaffStore, UserStore};
use crate::models::{
    Attendee, CreateAttendeeRequest, CreateEventRequest, CreateStaffApplicationRequest,
    CreateUserRequest, Event, EventDetails, PhoneLookup, StaffApplication, StaffStatus, User,
};
use crate::utils::errors::{EventDeskError, Result};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    events: HashMap<Uuid, Event>,
    attendees: HashMap<Uuid, Attendee>,
    applications: HashMap<Uuid, StaffApplication>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user row directly, keeping the given role
    pub async fn seed_user(&self, email: &str, name: &str, role: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: Some(name.to_string()),
            image: None,
            phone: None,
            role: role.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.users.insert(user.id, user.clone());
        user
    }

    /// Overwrite a stored event, for tests that need specific timestamps
    pub async fn put_event(&self, event: Event) {
        self.tables.write().await.events.insert(event.id, event);
    }

    /// Overwrite a stored attendee
    pub async fn put_attendee(&self, attendee: Attendee) {
        self.tables.write().await.attendees.insert(attendee.id, attendee);
    }
}

fn newest_first<T, F>(rows: &mut [T], key: F)
where
    F: Fn(&T) -> DateTime<Utc>,
{
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn upsert_user(&self, request: CreateUserRequest) -> Result<User> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.users.values_mut().find(|u| u.email == request.email) {
            existing.name = request.name;
            existing.image = request.image;
            return Ok(existing.clone());
        }

        let user = User {
            id: Uuid::new_v4(),
            email: request.email,
            name: request.name,
            image: request.image,
            phone: None,
            role: "user".to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_user_role(&self, email: &str, role: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.values_mut().find(|u| u.email == email) {
            Some(user) => {
                user.role = role.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_user_phone(&self, email: &str, phone: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.values_mut().find(|u| u.email == email) {
            Some(user) => {
                user.phone = Some(phone.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }
}

impl EventStore for MemoryStore {
    async fn insert_event(&self, request: CreateEventRequest) -> Result<Event> {
        let mut tables = self.tables.write().await;
        if tables.events.values().any(|e| e.slug.as_deref() == Some(request.slug.as_str())) {
            return Err(EventDeskError::Conflict(format!("slug {} already exists", request.slug)));
        }

        let now = Utc::now();
        let details = request.details;
        let event = Event {
            id: Uuid::new_v4(),
            slug: Some(request.slug),
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
            creator_id: request.creator_id,
            created_at: now,
            updated_at: now,
        };
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: Uuid, details: EventDetails) -> Result<Option<Event>> {
        let mut tables = self.tables.write().await;
        let Some(event) = tables.events.get_mut(&id) else {
            return Ok(None);
        };

        event.title = details.title;
        event.description = details.description;
        event.location = details.location;
        event.location_lat = details.location_lat;
        event.location_lng = details.location_lng;
        event.image_url = details.image_url;
        event.start_time = details.start_time;
        event.end_time = details.end_time;
        event.is_online = details.is_online;
        event.capacity = details.capacity;
        event.updated_at = Utc::now();
        Ok(Some(event.clone()))
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        Ok(self.tables.read().await.events.get(&id).cloned())
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>> {
        let tables = self.tables.read().await;
        Ok(tables.events.values().find(|e| e.slug.as_deref() == Some(slug)).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.events.values().any(|e| e.slug.as_deref() == Some(slug)))
    }

    async fn set_event_deleted_at(&self, id: Uuid, deleted_at: Option<DateTime<Utc>>) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.events.get_mut(&id) {
            Some(event) => {
                event.deleted_at = deleted_at;
                event.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_events(&self, include_deleted: bool) -> Result<Vec<Event>> {
        let tables = self.tables.read().await;
        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| include_deleted || e.is_live())
            .cloned()
            .collect();
        newest_first(&mut events, |e| e.start_time);
        Ok(events)
    }

    async fn events_pending_reminder(&self, now: DateTime<Utc>, until: DateTime<Utc>) -> Result<Vec<Event>> {
        let tables = self.tables.read().await;
        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| {
                e.is_live()
                    && !e.creator_reminder_sent
                    && e.creator_id.is_some()
                    && e.start_time > now
                    && e.start_time <= until
            })
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start_time);
        Ok(events)
    }

    async fn mark_reminder_sent(&self, id: Uuid) -> Result<()> {
        if let Some(event) = self.tables.write().await.events.get_mut(&id) {
            event.creator_reminder_sent = true;
        }
        Ok(())
    }

    async fn count_attendees(&self, event_id: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables.attendees.values().filter(|a| a.event_id == event_id).count() as i64)
    }
}

impl AttendeeStore for MemoryStore {
    async fn find_conflicting_attendee(&self, event_id: Uuid, email: &str, phone_key: &str) -> Result<Option<Attendee>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attendees
            .values()
            .find(|a| a.event_id == event_id && (a.email == email || a.phone_key == phone_key))
            .cloned())
    }

    async fn insert_attendee(&self, request: CreateAttendeeRequest) -> Result<Attendee> {
        let mut tables = self.tables.write().await;
        let taken = tables.attendees.values().any(|a| {
            a.event_id == request.event_id && (a.email == request.email || a.phone_key == request.phone_key)
        });
        if taken {
            return Err(EventDeskError::Conflict("attendee already registered".to_string()));
        }

        let attendee = Attendee {
            id: Uuid::new_v4(),
            event_id: request.event_id,
            name: request.name,
            email: request.email,
            phone: request.phone,
            phone_key: request.phone_key,
            checked_in: false,
            check_in_time: None,
            created_at: Utc::now(),
        };
        tables.attendees.insert(attendee.id, attendee.clone());
        Ok(attendee)
    }

    async fn find_attendee(&self, id: Uuid) -> Result<Option<Attendee>> {
        Ok(self.tables.read().await.attendees.get(&id).cloned())
    }

    async fn find_attendee_by_phone(&self, event_id: Uuid, lookup: &PhoneLookup) -> Result<Option<Attendee>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attendees
            .values()
            .find(|a| {
                a.event_id == event_id
                    && match lookup {
                        PhoneLookup::Raw(phone) => &a.phone == phone,
                        PhoneLookup::Key(key) => &a.phone_key == key,
                    }
            })
            .cloned())
    }

    async fn mark_checked_in(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut tables = self.tables.write().await;
        let attendee = tables
            .attendees
            .get_mut(&id)
            .ok_or(EventDeskError::AttendeeNotFound { attendee_id: id })?;
        attendee.checked_in = true;
        attendee.check_in_time = Some(at);
        Ok(())
    }

    async fn list_attendees(&self, event_id: Uuid) -> Result<Vec<Attendee>> {
        let tables = self.tables.read().await;
        let mut attendees: Vec<Attendee> = tables
            .attendees
            .values()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect();
        newest_first(&mut attendees, |a| a.created_at);
        Ok(attendees)
    }

    async fn list_all_attendees(&self) -> Result<Vec<Attendee>> {
        let tables = self.tables.read().await;
        let mut attendees: Vec<Attendee> = tables.attendees.values().cloned().collect();
        newest_first(&mut attendees, |a| a.created_at);
        Ok(attendees)
    }

    async fn delete_attendee(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.write().await.attendees.remove(&id).is_some())
    }
}

impl StaffStore for MemoryStore {
    async fn find_application(&self, event_id: Uuid, email: &str) -> Result<Option<StaffApplication>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .values()
            .find(|a| a.event_id == event_id && a.email == email)
            .cloned())
    }

    async fn insert_application(&self, request: CreateStaffApplicationRequest) -> Result<StaffApplication> {
        let mut tables = self.tables.write().await;
        if tables
            .applications
            .values()
            .any(|a| a.event_id == request.event_id && a.email == request.email)
        {
            return Err(EventDeskError::Conflict("staff application already exists".to_string()));
        }

        let application = StaffApplication {
            id: Uuid::new_v4(),
            event_id: request.event_id,
            name: request.name,
            email: request.email,
            phone: request.phone,
            message: request.message,
            status: StaffStatus::Pending.to_string(),
            created_at: Utc::now(),
        };
        tables.applications.insert(application.id, application.clone());
        Ok(application)
    }

    async fn find_application_by_id(&self, id: Uuid) -> Result<Option<StaffApplication>> {
        Ok(self.tables.read().await.applications.get(&id).cloned())
    }

    async fn update_application_status(&self, id: Uuid, status: StaffStatus) -> Result<Option<StaffApplication>> {
        let mut tables = self.tables.write().await;
        Ok(tables.applications.get_mut(&id).map(|application| {
            application.status = status.to_string();
            application.clone()
        }))
    }

    async fn list_applications(&self, event_id: Uuid) -> Result<Vec<StaffApplication>> {
        let tables = self.tables.read().await;
        let mut applications: Vec<StaffApplication> = tables
            .applications
            .values()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect();
        newest_first(&mut applications, |a| a.created_at);
        Ok(applications)
    }

    async fn list_applications_by_email(&self, email: &str) -> Result<Vec<StaffApplication>> {
        let tables = self.tables.read().await;
        let mut applications: Vec<StaffApplication> = tables
            .applications
            .values()
            .filter(|a| a.email.eq_ignore_ascii_case(email))
            .cloned()
            .collect();
        newest_first(&mut applications, |a| a.created_at);
        Ok(applications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn attendee_request(event_id: Uuid, email: &str, phone: &str) -> CreateAttendeeRequest {
        CreateAttendeeRequest {
            event_id,
            name: "Test".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            phone_key: crate::utils::helpers::phone_key(phone),
        }
    }

    #[tokio::test]
    async fn test_insert_attendee_enforces_uniqueness() {
        let store = MemoryStore::new();
        let event_id = Uuid::new_v4();

        store.insert_attendee(attendee_request(event_id, "a@x.com", "111")).await.unwrap();

        let by_email = store.insert_attendee(attendee_request(event_id, "a@x.com", "222")).await;
        assert_matches!(by_email, Err(EventDeskError::Conflict(_)));

        let by_phone = store.insert_attendee(attendee_request(event_id, "b@x.com", "1-1-1")).await;
        assert_matches!(by_phone, Err(EventDeskError::Conflict(_)));

        let other_event = store.insert_attendee(attendee_request(Uuid::new_v4(), "a@x.com", "111")).await;
        assert!(other_event.is_ok());
    }

    #[tokio::test]
    async fn test_user_role_update_requires_existing_user() {
        let store = MemoryStore::new();
        assert!(!store.set_user_role("ghost@x.com", "admin").await.unwrap());

        store.seed_user("a@x.com", "A", "user").await;
        assert!(store.set_user_role("a@x.com", "admin").await.unwrap());
        assert_eq!(store.find_user_by_email("a@x.com").await.unwrap().unwrap().role, "admin");
    }
}
