//! Test data helpers for building forms and identities

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use EventDesk::models::Event;
use EventDesk::services::{EventForm, Principal, RegistrationForm, StaffApplicationForm};

/// Fixed reference instant used by time-sensitive tests
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 2, 0, 0).unwrap()
}

/// An event starting `hours` after [`base_time`]
pub fn event_form(title: &str, hours: i64) -> EventForm {
    EventForm {
        title: title.to_string(),
        description: Some("Bring your own laptop".to_string()),
        location: Some("台北市信義區松高路1號".to_string()),
        start_time: Some(base_time() + Duration::hours(hours)),
        end_time: Some(base_time() + Duration::hours(hours + 2)),
        ..EventForm::default()
    }
}

pub fn online_event_form(title: &str, hours: i64) -> EventForm {
    EventForm {
        is_online: true,
        location: Some("https://meet.example.com/room".to_string()),
        ..event_form(title, hours)
    }
}

pub fn registration_form(event: &Event, name: &str, email: &str, phone: &str) -> RegistrationForm {
    RegistrationForm {
        event_id: event.id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
    }
}

pub fn staff_form(event_id: Uuid, name: &str, email: &str) -> StaffApplicationForm {
    StaffApplicationForm {
        event_id: event_id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        phone: "0912-345-678".to_string(),
        message: Some("I can help at the door".to_string()),
    }
}

pub fn principal(email: &str, name: &str) -> Principal {
    Principal {
        id: format!("oauth-{}", email),
        email: email.to_string(),
        name: Some(name.to_string()),
        image: Some(format!("https://avatars.example.com/{}.png", name.to_lowercase())),
    }
}
