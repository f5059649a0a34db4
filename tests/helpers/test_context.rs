//! Test context for unified test setup
//!
//! Wires every service over a fresh [`MemoryStore`] and a
//! [`RecordingNotifier`], with the geocoder disabled and uploads going to a
//! temporary directory.

use tempfile::TempDir;

use EventDesk::config::settings::PhoneMatchMode;
use EventDesk::config::Settings;
use EventDesk::models::Event;
use EventDesk::services::{EventForm, ServiceFactory, Session};
use EventDesk::MemoryStore;

use super::recording_notifier::RecordingNotifier;
use super::test_data::principal;

pub const SUPER_ADMIN_EMAIL: &str = "root@eventdesk.test";
pub const GUEST_EMAIL: &str = "guest@eventdesk.test";
pub const GUEST_PASSCODE: &str = "2468";

/// Knobs for [`TestContext::new_with_config`]
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub phone_match: PhoneMatchMode,
    pub lookahead_hours: i64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            phone_match: PhoneMatchMode::Normalized,
            lookahead_hours: 48,
        }
    }
}

/// Unified test context that manages all test components
pub struct TestContext {
    pub store: MemoryStore,
    pub notifier: RecordingNotifier,
    pub services: ServiceFactory<MemoryStore, RecordingNotifier>,
    pub settings: Settings,
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self::new_with_config(TestConfig::default())
    }

    pub fn new_with_config(config: TestConfig) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let settings = Self::create_test_settings(&config, &temp_dir);

        let store = MemoryStore::new();
        let notifier = RecordingNotifier::new();
        let services = ServiceFactory::with_notifier(store.clone(), notifier.clone(), &settings)
            .expect("Failed to build services");

        Self {
            store,
            notifier,
            services,
            settings,
            temp_dir,
        }
    }

    fn create_test_settings(config: &TestConfig, temp_dir: &TempDir) -> Settings {
        let mut settings = Settings::default();
        settings.auth.super_admin_email = SUPER_ADMIN_EMAIL.to_string();
        settings.auth.guest_email = GUEST_EMAIL.to_string();
        settings.auth.guest_passcode = GUEST_PASSCODE.to_string();
        settings.site.base_url = "https://events.example.com".to_string();
        settings.geocoder.enabled = false;
        settings.storage.upload_dir = temp_dir.path().join("uploads").to_string_lossy().into_owned();
        settings.checkin.phone_match = config.phone_match;
        settings.reminder.lookahead_hours = config.lookahead_hours;
        settings
    }

    /// Sign in through OAuth as a plain user
    pub async fn user(&self, email: &str, name: &str) -> Session {
        self.services
            .auth_service
            .sign_in(principal(email, name))
            .await
            .expect("Failed to sign in")
    }

    /// Sign in and get promoted to admin
    pub async fn admin(&self, email: &str, name: &str) -> Session {
        self.user(email, name).await;
        assert!(self
            .services
            .auth_service
            .set_user_admin(email, true)
            .await
            .expect("Failed to promote user"));
        self.services
            .auth_service
            .session_for(principal(email, name))
            .await
            .expect("Failed to resolve session")
    }

    pub async fn super_admin(&self) -> Session {
        self.user(SUPER_ADMIN_EMAIL, "Root").await
    }

    /// Guest viewer signed in with the shared passcode
    pub async fn viewer(&self) -> Session {
        let principal = self
            .services
            .auth_service
            .passcode_login(GUEST_PASSCODE)
            .expect("Passcode rejected");
        self.services
            .auth_service
            .sign_in(principal)
            .await
            .expect("Failed to sign in guest")
    }

    pub async fn create_event(&self, actor: &Session, form: EventForm) -> Event {
        self.services
            .event_service
            .create_event(Some(actor), form)
            .await
            .expect("Failed to create event")
            .into_event()
            .expect("Event form rejected")
    }
}
