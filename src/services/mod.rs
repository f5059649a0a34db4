//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod calendar;
pub mod events;
pub mod export;
pub mod geocoder;
pub mod notification;
pub mod participants;
pub mod registration;
pub mod reminder;
pub mod slug;
pub mod staff;
pub mod storage;
pub mod survey;

// Re-export commonly used services
pub use auth::{resolve_role, AuthService, Principal, RoleConfig, Session};
pub use calendar::{build_invite, Organizer};
pub use events::{EventForm, EventOutcome, EventPage, EventService, EventSummary, CapacityProgress, RegistrationStatus};
pub use export::{CsvExport, ExportService};
pub use geocoder::{Coordinates, Geocoder};
pub use notification::{EmailAttachment, EmailMessage, HttpMailer, LogNotifier, MailerKind, NotificationService, Notifier};
pub use participants::{Participant, ParticipantDirectory, ParticipantHistory, ParticipantService};
pub use registration::{RegistrationForm, RegistrationService};
pub use reminder::{ReminderReport, ReminderService};
pub use slug::{ensure_unique_slug, generate_slug};
pub use staff::{StaffApplicationForm, StaffService};
pub use storage::{ImageUpload, LocalImageStorage};
pub use survey::{SurveyForm, SurveyKind, SurveyService};

use crate::config::settings::Settings;
use crate::database::store::Store;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory<S, N = MailerKind> {
    pub auth_service: AuthService<S>,
    pub event_service: EventService<S>,
    pub registration_service: RegistrationService<S, N>,
    pub staff_service: StaffService<S, N>,
    pub survey_service: SurveyService<S, N>,
    pub reminder_service: ReminderService<S, N>,
    pub export_service: ExportService<S>,
    pub participant_service: ParticipantService<S>,
    pub image_storage: LocalImageStorage,
}

impl<S: Store> ServiceFactory<S, MailerKind> {
    /// Create a new ServiceFactory with the mail transport picked from settings
    pub fn new(store: S, settings: &Settings) -> Result<Self> {
        let mailer = MailerKind::from_settings(&settings.mail)?;
        Self::with_notifier(store, mailer, settings)
    }
}

impl<S: Store, N: Notifier + Clone> ServiceFactory<S, N> {
    /// Create a new ServiceFactory around an explicit mail transport
    pub fn with_notifier(store: S, notifier: N, settings: &Settings) -> Result<Self> {
        let notifications = NotificationService::new(notifier, settings);
        let auth_service = AuthService::new(store.clone(), &settings.auth);
        let geocoder = Geocoder::new(&settings.geocoder)?;

        Ok(Self {
            event_service: EventService::new(store.clone(), auth_service.clone(), geocoder, settings),
            registration_service: RegistrationService::new(store.clone(), notifications.clone(), settings),
            staff_service: StaffService::new(store.clone(), auth_service.clone(), notifications.clone()),
            survey_service: SurveyService::new(store.clone(), notifications.clone()),
            reminder_service: ReminderService::new(store.clone(), notifications, settings),
            export_service: ExportService::new(store.clone(), settings.site.utc_offset_minutes),
            participant_service: ParticipantService::new(store),
            image_storage: LocalImageStorage::new(&settings.storage),
            auth_service,
        })
    }
}

/// Health status for all services
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub mail_configured: bool,
    pub geocoder_enabled: bool,
    pub reminder_enabled: bool,
}

impl ServiceHealthStatus {
    /// Integration status as configured
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            mail_configured: settings.mail.api_url.is_some(),
            geocoder_enabled: settings.geocoder.enabled,
            reminder_enabled: settings.reminder.enabled,
        }
    }

    /// Get list of degraded integrations
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.mail_configured {
            issues.push("Mail API not configured, mail is only logged".to_string());
        }
        if !self.geocoder_enabled {
            issues.push("Geocoder disabled, events are saved without coordinates".to_string());
        }
        if !self.reminder_enabled {
            issues.push("Creator reminders disabled".to_string());
        }

        issues
    }
}
