//! iCalendar invite generation
//!
//! Renders the `invite.ics` attached to registration confirmations.

use chrono::{DateTime, Duration, Utc};
use crate::models::{Attendee, Event};
use crate::utils::errors::{EventDeskError, Result};

/// Duration assumed for events without an end time
pub const DEFAULT_EVENT_DURATION_HOURS: i64 = 2;

/// Longest content line in octets, excluding the CRLF
const MAX_LINE_OCTETS: usize = 75;

const ICS_TIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Organizer named in invites
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organizer {
    pub name: String,
    pub email: String,
}

/// Render a METHOD:REQUEST calendar with one VEVENT inviting `attendee`
pub fn build_invite(
    event: &Event,
    attendee: &Attendee,
    organizer: &Organizer,
    stamp: DateTime<Utc>,
) -> Result<String> {
    let end_time = event
        .end_time
        .unwrap_or(event.start_time + Duration::hours(DEFAULT_EVENT_DURATION_HOURS));

    if end_time < event.start_time {
        return Err(EventDeskError::InvalidInput(
            "Event end time precedes its start time".to_string(),
        ));
    }

    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//EventDesk//Event Registration//EN".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:REQUEST".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}-{}@eventdesk", event.id, attendee.id),
        format!("DTSTAMP:{}", stamp.format(ICS_TIME_FORMAT)),
        format!("DTSTART:{}", event.start_time.format(ICS_TIME_FORMAT)),
        format!("DTEND:{}", end_time.format(ICS_TIME_FORMAT)),
        format!("SUMMARY:{}", escape_text(&event.title)),
        format!("DESCRIPTION:{}", escape_text(event.description.as_deref().unwrap_or(""))),
        format!("LOCATION:{}", escape_text(event.location.as_deref().unwrap_or(""))),
        "STATUS:CONFIRMED".to_string(),
        "TRANSP:OPAQUE".to_string(),
        format!(
            "ORGANIZER;CN={}:mailto:{}",
            quote_param(&organizer.name),
            organizer.email
        ),
        format!(
            "ATTENDEE;CN={};ROLE=REQ-PARTICIPANT;PARTSTAT=NEEDS-ACTION;RSVP=TRUE:mailto:{}",
            quote_param(&attendee.name),
            attendee.email
        ),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    let mut ics = String::new();
    for line in &lines {
        ics.push_str(&fold_line(line));
        ics.push_str("\r\n");
    }
    Ok(ics)
}

/// Escape a TEXT property value
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Quote a parameter value; DQUOTE cannot appear inside one
fn quote_param(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "'"))
}

/// Fold a content line at 75 octets without splitting a UTF-8 character.
/// Continuation lines start with a single space.
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut current = 0;

    for c in line.chars() {
        if current + c.len_utf8() > MAX_LINE_OCTETS {
            folded.push_str("\r\n ");
            current = 1;
        }
        folded.push(c);
        current += c.len_utf8();
    }

    folded
}
