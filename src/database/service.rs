//! Database service layer
//!
//! Bundles the PostgreSQL repositories and exposes them through the
//! storage traits the services are written against.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::database::{DatabasePool, UserRepository, EventRepository, AttendeeRepository, StaffRepository};
use crate::database::store::{AttendeeStore, EventStore, StaffStore, UserStore};
use crate::models::*;
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub events: EventRepository,
    pub attendees: AttendeeRepository,
    pub staff: StaffRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            attendees: AttendeeRepository::new(pool.clone()),
            staff: StaffRepository::new(pool),
        }
    }
}

impl UserStore for DatabaseService {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn upsert_user(&self, request: CreateUserRequest) -> Result<User> {
        self.users.upsert(request).await
    }

    async fn set_user_role(&self, email: &str, role: &str) -> Result<bool> {
        self.users.set_role(email, role).await
    }

    async fn set_user_phone(&self, email: &str, phone: &str) -> Result<bool> {
        self.users.set_phone(email, phone).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.users.list().await
    }
}

impl EventStore for DatabaseService {
    async fn insert_event(&self, request: CreateEventRequest) -> Result<Event> {
        self.events.create(request).await
    }

    async fn update_event(&self, id: Uuid, details: EventDetails) -> Result<Option<Event>> {
        self.events.update(id, details).await
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        self.events.find_by_id(id).await
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>> {
        self.events.find_by_slug(slug).await
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        self.events.slug_exists(slug).await
    }

    async fn set_event_deleted_at(&self, id: Uuid, deleted_at: Option<DateTime<Utc>>) -> Result<bool> {
        self.events.set_deleted_at(id, deleted_at).await
    }

    async fn list_events(&self, include_deleted: bool) -> Result<Vec<Event>> {
        self.events.list(include_deleted).await
    }

    async fn events_pending_reminder(&self, now: DateTime<Utc>, until: DateTime<Utc>) -> Result<Vec<Event>> {
        self.events.pending_reminder(now, until).await
    }

    async fn mark_reminder_sent(&self, id: Uuid) -> Result<()> {
        self.events.mark_reminder_sent(id).await
    }

    async fn count_attendees(&self, event_id: Uuid) -> Result<i64> {
        self.events.attendee_count(event_id).await
    }
}

impl AttendeeStore for DatabaseService {
    async fn find_conflicting_attendee(&self, event_id: Uuid, email: &str, phone_key: &str) -> Result<Option<Attendee>> {
        self.attendees.find_conflicting(event_id, email, phone_key).await
    }

    async fn insert_attendee(&self, request: CreateAttendeeRequest) -> Result<Attendee> {
        self.attendees.create(request).await
    }

    async fn find_attendee(&self, id: Uuid) -> Result<Option<Attendee>> {
        self.attendees.find_by_id(id).await
    }

    async fn find_attendee_by_phone(&self, event_id: Uuid, lookup: &PhoneLookup) -> Result<Option<Attendee>> {
        self.attendees.find_by_phone(event_id, lookup).await
    }

    async fn mark_checked_in(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        self.attendees.mark_checked_in(id, at).await
    }

    async fn list_attendees(&self, event_id: Uuid) -> Result<Vec<Attendee>> {
        self.attendees.list_for_event(event_id).await
    }

    async fn list_all_attendees(&self) -> Result<Vec<Attendee>> {
        self.attendees.list_all().await
    }

    async fn delete_attendee(&self, id: Uuid) -> Result<bool> {
        self.attendees.delete(id).await
    }
}

impl StaffStore for DatabaseService {
    async fn find_application(&self, event_id: Uuid, email: &str) -> Result<Option<StaffApplication>> {
        self.staff.find_for_event(event_id, email).await
    }

    async fn insert_application(&self, request: CreateStaffApplicationRequest) -> Result<StaffApplication> {
        self.staff.create(request).await
    }

    async fn find_application_by_id(&self, id: Uuid) -> Result<Option<StaffApplication>> {
        self.staff.find_by_id(id).await
    }

    async fn update_application_status(&self, id: Uuid, status: StaffStatus) -> Result<Option<StaffApplication>> {
        self.staff.update_status(id, status).await
    }

    async fn list_applications(&self, event_id: Uuid) -> Result<Vec<StaffApplication>> {
        self.staff.list_for_event(event_id).await
    }

    async fn list_applications_by_email(&self, email: &str) -> Result<Vec<StaffApplication>> {
        self.staff.list_for_email(email).await
    }
}
