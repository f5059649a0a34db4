//! Participant directory
//!
//! Registrations are joined to people by lower-cased email only; there is
//! no foreign key between attendees and users.

use std::collections::HashMap;
use std::sync::OnceLock;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::database::store::{AttendeeStore, EventStore, StaffStore, UserStore};
use crate::models::{Attendee, Event, StaffApplication, User, ONLINE_LOCATION};
use crate::services::auth::{require_admin_access, Session};
use crate::utils::errors::Result;

/// Attend count from which a participant counts as returning
pub const RETURNING_ATTEND_COUNT: usize = 2;

const UNKNOWN_LOCATION: &str = "未知地點";

fn city_district_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("(.{2,3}[縣市])(.{2,3}[區鄉鎮市])").expect("static city/district pattern compiles"))
}

fn city_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(".{2,3}[縣市]").expect("static city pattern compiles"))
}

/// Coarse location bucket of an event: city and district when the
/// address has them, else the city, else the raw location
pub fn location_category(event: &Event) -> String {
    if event.is_online {
        return ONLINE_LOCATION.to_string();
    }

    let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) else {
        return UNKNOWN_LOCATION.to_string();
    };

    if let Some(captures) = city_district_pattern().captures(location) {
        return format!("{}{}", &captures[1], &captures[2]);
    }

    city_pattern()
        .find(location)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| location.to_string())
}

/// Most frequent entry; ties go to the one that reached the count first
fn favorite(locations: &[String]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut best: Option<(&str, usize)> = None;

    for location in locations {
        let count = counts.entry(location.as_str()).or_insert(0);
        *count += 1;
        if best.map_or(true, |(_, max)| *count > max) {
            best = Some((location.as_str(), *count));
        }
    }

    best.map(|(location, _)| location.to_string())
}

/// One person across all their registrations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub attend_count: usize,
    pub locations: Vec<String>,
    pub favorite_location: Option<String>,
    /// Latest event start among their registrations
    pub last_seen: DateTime<Utc>,
    pub events: Vec<String>,
    /// Avatar of the matching user account, if any
    pub image: Option<String>,
    pub has_account: bool,
}

impl Participant {
    pub fn is_returning(&self) -> bool {
        self.attend_count >= RETURNING_ATTEND_COUNT
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDirectory {
    pub participants: Vec<Participant>,
    pub total: usize,
    pub returning: usize,
    /// Returning share of all participants, rounded percent
    pub return_rate: u32,
}

/// Group registrations (newest first) by lower-cased email, most active first
pub fn aggregate(attendees: &[Attendee], events: &HashMap<Uuid, Event>, users: &[User]) -> Vec<Participant> {
    let accounts: HashMap<String, &User> = users.iter().map(|u| (u.email.to_lowercase(), u)).collect();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut participants: Vec<Participant> = Vec::new();

    for attendee in attendees {
        let Some(event) = events.get(&attendee.event_id) else {
            continue;
        };

        let email = attendee.email.to_lowercase();
        let category = location_category(event);

        match index.get(&email) {
            Some(&position) => {
                let participant = &mut participants[position];
                participant.attend_count += 1;
                participant.locations.push(category);
                participant.events.push(event.title.clone());
                if event.start_time > participant.last_seen {
                    participant.last_seen = event.start_time;
                }
            }
            None => {
                let account = accounts.get(&email);
                index.insert(email.clone(), participants.len());
                participants.push(Participant {
                    name: attendee.name.clone(),
                    phone: attendee.phone.clone(),
                    attend_count: 1,
                    locations: vec![category],
                    favorite_location: None,
                    last_seen: event.start_time,
                    events: vec![event.title.clone()],
                    image: account.and_then(|u| u.image.clone()),
                    has_account: account.is_some(),
                    email,
                });
            }
        }
    }

    for participant in &mut participants {
        participant.favorite_location = favorite(&participant.locations);
    }

    participants.sort_by(|a, b| b.attend_count.cmp(&a.attend_count));
    participants
}

/// Everything tied to one email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantHistory {
    pub email: String,
    pub registrations: Vec<(Attendee, Option<Event>)>,
    pub applications: Vec<StaffApplication>,
}

#[derive(Clone)]
pub struct ParticipantService<S> {
    store: S,
}

impl<S> ParticipantService<S>
where
    S: UserStore + EventStore + AttendeeStore + StaffStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn events_by_id(&self) -> Result<HashMap<Uuid, Event>> {
        Ok(self
            .store
            .list_events(true)
            .await?
            .into_iter()
            .map(|event| (event.id, event))
            .collect())
    }

    /// Directory of everyone who ever registered
    pub async fn directory(&self, actor: Option<&Session>, returning_only: bool) -> Result<ParticipantDirectory> {
        require_admin_access(actor)?;

        let attendees = self.store.list_all_attendees().await?;
        let events = self.events_by_id().await?;
        let users = self.store.list_users().await?;

        let mut participants = aggregate(&attendees, &events, &users);
        let total = participants.len();
        let returning = participants.iter().filter(|p| p.is_returning()).count();
        let return_rate = if total == 0 {
            0
        } else {
            ((returning as f64 / total as f64) * 100.0).round() as u32
        };

        if returning_only {
            participants.retain(Participant::is_returning);
        }

        Ok(ParticipantDirectory {
            participants,
            total,
            returning,
            return_rate,
        })
    }

    /// Registrations and staff applications of one person
    pub async fn history_for(&self, actor: Option<&Session>, email: &str) -> Result<ParticipantHistory> {
        require_admin_access(actor)?;

        let email = email.trim().to_lowercase();
        let events = self.events_by_id().await?;

        let registrations = self
            .store
            .list_all_attendees()
            .await?
            .into_iter()
            .filter(|a| a.email.to_lowercase() == email)
            .map(|a| {
                let event = events.get(&a.event_id).cloned();
                (a, event)
            })
            .collect();

        let applications = self.store.list_applications_by_email(&email).await?;

        Ok(ParticipantHistory {
            email,
            registrations,
            applications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn event(location: Option<&str>, is_online: bool, days: i64) -> Event {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 2, 0, 0).unwrap() + Duration::days(days);
        Event {
            id: Uuid::new_v4(),
            slug: None,
            title: format!("Event {}", days),
            description: None,
            location: location.map(str::to_string),
            location_lat: None,
            location_lng: None,
            image_url: None,
            start_time: start,
            end_time: None,
            is_online,
            capacity: None,
            deleted_at: None,
            creator_reminder_sent: false,
            creator_id: None,
            created_at: start,
            updated_at: start,
        }
    }

    fn attendee(event: &Event, email: &str) -> Attendee {
        Attendee {
            id: Uuid::new_v4(),
            event_id: event.id,
            name: "Amy".to_string(),
            email: email.to_string(),
            phone: "0912".to_string(),
            phone_key: "0912".to_string(),
            checked_in: false,
            check_in_time: None,
            created_at: event.start_time,
        }
    }

    #[test]
    fn test_location_category() {
        assert_eq!(location_category(&event(Some("台北市信義區松高路1號"), false, 0)), "台北市信義區");
        assert_eq!(location_category(&event(Some("新竹縣竹北市光明六路"), false, 0)), "新竹縣竹北市");
        assert_eq!(location_category(&event(Some("高雄市"), false, 0)), "高雄市");
        assert_eq!(location_category(&event(Some("Online Hall"), false, 0)), "Online Hall");
        assert_eq!(location_category(&event(None, false, 0)), UNKNOWN_LOCATION);
        assert_eq!(location_category(&event(Some("anything"), true, 0)), ONLINE_LOCATION);
    }

    #[test]
    fn test_aggregate_by_lowercased_email() {
        let taipei = event(Some("台北市信義區松高路1號"), false, 1);
        let online = event(None, true, 5);
        let taipei_again = event(Some("台北市信義區松仁路"), false, 3);
        let events: HashMap<Uuid, Event> = [&taipei, &online, &taipei_again]
            .into_iter()
            .map(|e| (e.id, e.clone()))
            .collect();

        let attendees = vec![
            attendee(&online, "Amy@X.com"),
            attendee(&taipei, "amy@x.com"),
            attendee(&taipei_again, "amy@x.com"),
            attendee(&taipei, "bob@x.com"),
        ];

        let participants = aggregate(&attendees, &events, &[]);
        assert_eq!(participants.len(), 2);

        let amy = &participants[0];
        assert_eq!(amy.email, "amy@x.com");
        assert_eq!(amy.attend_count, 3);
        assert_eq!(amy.favorite_location.as_deref(), Some("台北市信義區"));
        assert_eq!(amy.last_seen, online.start_time);
        assert!(amy.is_returning());
        assert!(!participants[1].is_returning());
    }

    #[test]
    fn test_aggregate_matches_accounts_case_insensitively() {
        let taipei = event(Some("台北市信義區松高路1號"), false, 1);
        let events: HashMap<Uuid, Event> = [(taipei.id, taipei.clone())].into_iter().collect();
        let account = User {
            id: Uuid::new_v4(),
            email: "Amy@X.com".to_string(),
            name: Some("Amy".to_string()),
            image: Some("https://example.com/amy.png".to_string()),
            phone: None,
            role: "user".to_string(),
            created_at: taipei.start_time,
        };

        let attendees = vec![attendee(&taipei, "amy@x.com"), attendee(&taipei, "bob@x.com")];
        let participants = aggregate(&attendees, &events, &[account]);

        let amy = participants.iter().find(|p| p.email == "amy@x.com").unwrap();
        assert!(amy.has_account);
        assert_eq!(amy.image.as_deref(), Some("https://example.com/amy.png"));

        let bob = participants.iter().find(|p| p.email == "bob@x.com").unwrap();
        assert!(!bob.has_account);
        assert_eq!(bob.image, None);
    }

    #[test]
    fn test_favorite_first_to_max_wins() {
        let locations = vec!["A".to_string(), "B".to_string(), "B".to_string(), "A".to_string()];
        assert_eq!(favorite(&locations).as_deref(), Some("B"));
        assert_eq!(favorite(&[]), None);
    }
}
