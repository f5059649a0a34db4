//! Storage contracts
//!
//! The services only talk to storage through these traits. The PostgreSQL
//! repositories and the in-memory store both implement all of them.

use std::future::Future;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::{
    Attendee, CreateAttendeeRequest, CreateEventRequest, CreateStaffApplicationRequest,
    CreateUserRequest, Event, EventDetails, PhoneLookup, StaffApplication, StaffStatus, User,
};
use crate::utils::errors::Result;

pub trait UserStore: Send + Sync {
    fn find_user_by_email(&self, email: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    fn find_user_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Create the user, or refresh name and image when the email exists
    fn upsert_user(&self, request: CreateUserRequest) -> impl Future<Output = Result<User>> + Send;

    /// Returns false when no user has this email
    fn set_user_role(&self, email: &str, role: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Returns false when no user has this email
    fn set_user_phone(&self, email: &str, phone: &str) -> impl Future<Output = Result<bool>> + Send;

    fn list_users(&self) -> impl Future<Output = Result<Vec<User>>> + Send;
}

pub trait EventStore: Send + Sync {
    /// Fails with `Conflict` when the slug is taken
    fn insert_event(&self, request: CreateEventRequest) -> impl Future<Output = Result<Event>> + Send;

    fn update_event(&self, id: Uuid, details: EventDetails) -> impl Future<Output = Result<Option<Event>>> + Send;

    fn find_event(&self, id: Uuid) -> impl Future<Output = Result<Option<Event>>> + Send;

    fn find_event_by_slug(&self, slug: &str) -> impl Future<Output = Result<Option<Event>>> + Send;

    /// Checks every row, deleted or not
    fn slug_exists(&self, slug: &str) -> impl Future<Output = Result<bool>> + Send;

    fn set_event_deleted_at(
        &self,
        id: Uuid,
        deleted_at: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Newest start time first
    fn list_events(&self, include_deleted: bool) -> impl Future<Output = Result<Vec<Event>>> + Send;

    /// Live events with a creator starting in `(now, until]` whose
    /// reminder has not been sent
    fn events_pending_reminder(
        &self,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Event>>> + Send;

    fn mark_reminder_sent(&self, id: Uuid) -> impl Future<Output = Result<()>> + Send;

    fn count_attendees(&self, event_id: Uuid) -> impl Future<Output = Result<i64>> + Send;
}

pub trait AttendeeStore: Send + Sync {
    /// Any attendee of the event with this email OR this phone key
    fn find_conflicting_attendee(
        &self,
        event_id: Uuid,
        email: &str,
        phone_key: &str,
    ) -> impl Future<Output = Result<Option<Attendee>>> + Send;

    /// Fails with `Conflict` when the email or phone key is already
    /// registered for the event
    fn insert_attendee(&self, request: CreateAttendeeRequest) -> impl Future<Output = Result<Attendee>> + Send;

    fn find_attendee(&self, id: Uuid) -> impl Future<Output = Result<Option<Attendee>>> + Send;

    fn find_attendee_by_phone(
        &self,
        event_id: Uuid,
        lookup: &PhoneLookup,
    ) -> impl Future<Output = Result<Option<Attendee>>> + Send;

    fn mark_checked_in(&self, id: Uuid, at: DateTime<Utc>) -> impl Future<Output = Result<()>> + Send;

    /// Newest registration first
    fn list_attendees(&self, event_id: Uuid) -> impl Future<Output = Result<Vec<Attendee>>> + Send;

    /// Every attendee of every event, newest first
    fn list_all_attendees(&self) -> impl Future<Output = Result<Vec<Attendee>>> + Send;

    fn delete_attendee(&self, id: Uuid) -> impl Future<Output = Result<bool>> + Send;
}

pub trait StaffStore: Send + Sync {
    fn find_application(
        &self,
        event_id: Uuid,
        email: &str,
    ) -> impl Future<Output = Result<Option<StaffApplication>>> + Send;

    /// Fails with `Conflict` when (event, email) already applied
    fn insert_application(
        &self,
        request: CreateStaffApplicationRequest,
    ) -> impl Future<Output = Result<StaffApplication>> + Send;

    fn find_application_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<StaffApplication>>> + Send;

    fn update_application_status(
        &self,
        id: Uuid,
        status: StaffStatus,
    ) -> impl Future<Output = Result<Option<StaffApplication>>> + Send;

    fn list_applications(&self, event_id: Uuid) -> impl Future<Output = Result<Vec<StaffApplication>>> + Send;

    fn list_applications_by_email(&self, email: &str) -> impl Future<Output = Result<Vec<StaffApplication>>> + Send;
}

/// Everything the full service set needs
pub trait Store: UserStore + EventStore + AttendeeStore + StaffStore + Clone + 'static {}

impl<T> Store for T where T: UserStore + EventStore + AttendeeStore + StaffStore + Clone + 'static {}
