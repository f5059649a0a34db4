//! Registration and check-in integration tests

mod helpers;

use assert_matches::assert_matches;
use chrono::Duration;
use helpers::*;

use EventDesk::config::PhoneMatchMode;
use EventDesk::database::{AttendeeStore, EventStore, UserStore};
use EventDesk::models::messages;
use EventDesk::services::RegistrationForm;
use EventDesk::EventDeskError;

#[tokio::test]
async fn test_register_sends_confirmation_with_invite() {
    let ctx = TestContext::new();
    let admin = ctx.admin("amy@example.com", "Amy").await;
    let event = ctx.create_event(&admin, event_form("Meetup", 24)).await;

    let outcome = ctx
        .services
        .registration_service
        .register_at(None, registration_form(&event, " Cathy ", "cathy@example.com", "0912-345-678"), base_time())
        .await;
    assert!(outcome.success);
    assert_eq!(outcome.message, messages::REGISTERED);

    let attendees = ctx.services.registration_service.list_attendees(Some(&admin), event.id).await.unwrap();
    assert_eq!(attendees.len(), 1);
    assert_eq!(attendees[0].name, "Cathy");
    assert_eq!(attendees[0].phone, "0912-345-678");
    assert_eq!(attendees[0].phone_key, "0912345678");
    assert!(!attendees[0].checked_in);

    let mail = ctx.notifier.sent_to("cathy@example.com");
    assert_eq!(mail.len(), 1);
    assert_eq!(mail[0].subject, "Registration Confirmed: Meetup");
    assert_eq!(mail[0].attachments.len(), 1);
    assert_eq!(mail[0].attachments[0].filename, "invite.ics");
    assert!(mail[0].attachments[0].content.contains("METHOD:REQUEST"));
}

#[tokio::test]
async fn test_register_validation_order() {
    let ctx = TestContext::new();
    let admin = ctx.admin("amy@example.com", "Amy").await;
    let event = ctx.create_event(&admin, event_form("Meetup", 24)).await;
    let registrations = &ctx.services.registration_service;

    let missing = registration_form(&event, "Cathy", "", "0912");
    assert_eq!(registrations.register_at(None, missing, base_time()).await.message, messages::MISSING_FIELDS);

    let no_digits = registration_form(&event, "Cathy", "cathy@example.com", "n/a");
    assert_eq!(registrations.register_at(None, no_digits, base_time()).await.message, messages::MISSING_FIELDS);

    let bad_id = RegistrationForm {
        event_id: "not-a-uuid".to_string(),
        ..registration_form(&event, "Cathy", "cathy@example.com", "0912")
    };
    assert_eq!(registrations.register_at(None, bad_id, base_time()).await.message, messages::EVENT_NOT_FOUND);

    ctx.services
        .event_service
        .delete_event_at(Some(&admin), event.id, base_time())
        .await
        .unwrap();
    let deleted = registration_form(&event, "Cathy", "cathy@example.com", "0912");
    assert_eq!(registrations.register_at(None, deleted, base_time()).await.message, messages::EVENT_NOT_FOUND);

    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_registration_closes_six_hours_after_start() {
    let ctx = TestContext::new();
    let admin = ctx.admin("amy@example.com", "Amy").await;
    let event = ctx.create_event(&admin, event_form("Meetup", 0)).await;
    let registrations = &ctx.services.registration_service;

    let at_close = base_time() + Duration::hours(6);
    let outcome = registrations
        .register_at(None, registration_form(&event, "A", "a@example.com", "0911"), at_close)
        .await;
    assert!(outcome.success, "{}", outcome.message);

    let after_close = at_close + Duration::seconds(1);
    let outcome = registrations
        .register_at(None, registration_form(&event, "B", "b@example.com", "0922"), after_close)
        .await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, messages::REGISTRATION_CLOSED);
}

#[tokio::test]
async fn test_duplicate_by_email_or_phone() {
    let ctx = TestContext::new();
    let admin = ctx.admin("amy@example.com", "Amy").await;
    let event = ctx.create_event(&admin, event_form("Meetup", 24)).await;
    let other = ctx.create_event(&admin, event_form("Other meetup", 48)).await;
    let registrations = &ctx.services.registration_service;

    let first = registrations
        .register_at(None, registration_form(&event, "Cathy", "cathy@example.com", "0912-345-678"), base_time())
        .await;
    assert!(first.success);

    let same_email = registrations
        .register_at(None, registration_form(&event, "Cat", "cathy@example.com", "0999"), base_time())
        .await;
    assert_eq!(same_email.message, messages::DUPLICATE_REGISTRATION);

    let same_phone_other_format = registrations
        .register_at(None, registration_form(&event, "Dan", "dan@example.com", "0912 345 678"), base_time())
        .await;
    assert_eq!(same_phone_other_format.message, messages::DUPLICATE_REGISTRATION);

    let other_event = registrations
        .register_at(None, registration_form(&other, "Cathy", "cathy@example.com", "0912-345-678"), base_time())
        .await;
    assert!(other_event.success);

    assert_eq!(ctx.store.count_attendees(event.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_mail_failure_does_not_fail_registration() {
    let ctx = TestContext::new();
    let admin = ctx.admin("amy@example.com", "Amy").await;
    let event = ctx.create_event(&admin, event_form("Meetup", 24)).await;
    ctx.notifier.fail_all(true);

    let outcome = ctx
        .services
        .registration_service
        .register_at(None, registration_form(&event, "Cathy", "cathy@example.com", "0912"), base_time())
        .await;

    assert!(outcome.success);
    assert_eq!(ctx.store.count_attendees(event.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_signed_in_registration_backfills_phone() {
    let ctx = TestContext::new();
    let admin = ctx.admin("amy@example.com", "Amy").await;
    let event = ctx.create_event(&admin, event_form("Meetup", 24)).await;
    let cathy = ctx.user("cathy@example.com", "Cathy").await;
    let viewer = ctx.viewer().await;

    let outcome = ctx
        .services
        .registration_service
        .register_at(Some(&cathy), registration_form(&event, "Cathy", "cathy@example.com", "0912-345-678"), base_time())
        .await;
    assert!(outcome.success);

    let user = ctx.store.find_user_by_email("cathy@example.com").await.unwrap().unwrap();
    assert_eq!(user.phone.as_deref(), Some("0912-345-678"));

    let outcome = ctx
        .services
        .registration_service
        .register_at(Some(&viewer), registration_form(&event, "Guest", "guest-reg@example.com", "0977"), base_time())
        .await;
    assert!(outcome.success);
    assert!(ctx.store.find_user_by_email(GUEST_EMAIL).await.unwrap().is_none());
}

#[tokio::test]
async fn test_check_in_is_idempotent() {
    let ctx = TestContext::new();
    let admin = ctx.admin("amy@example.com", "Amy").await;
    let event = ctx.create_event(&admin, event_form("Meetup", 0)).await;
    let registrations = &ctx.services.registration_service;

    registrations
        .register_at(None, registration_form(&event, "Cathy", "cathy@example.com", "0912-345-678"), base_time())
        .await;

    let event_id = event.id.to_string();
    let first = registrations.check_in_at(&event_id, "0912345678", base_time()).await;
    assert!(first.success);
    assert_eq!(first.message, messages::CHECKED_IN);

    let again = registrations
        .check_in_at(&event_id, "0912-345-678", base_time() + Duration::hours(1))
        .await;
    assert!(again.success);
    assert_eq!(again.message, messages::ALREADY_CHECKED_IN);

    let attendees = registrations.list_attendees(Some(&admin), event.id).await.unwrap();
    assert!(attendees[0].checked_in);
    assert_eq!(attendees[0].check_in_time, Some(base_time()));
    assert_eq!(attendees[0].status_label(), "已報到");
}

#[tokio::test]
async fn test_check_in_rejections() {
    let ctx = TestContext::new();
    let admin = ctx.admin("amy@example.com", "Amy").await;
    let event = ctx.create_event(&admin, event_form("Meetup", 0)).await;
    let other = ctx.create_event(&admin, event_form("Other", 0)).await;
    let registrations = &ctx.services.registration_service;

    registrations
        .register_at(None, registration_form(&event, "Cathy", "cathy@example.com", "0912"), base_time())
        .await;

    let event_id = event.id.to_string();
    assert_eq!(registrations.check_in_at(&event_id, "  ", base_time()).await.message, messages::ENTER_PHONE);
    assert_eq!(registrations.check_in_at(&event_id, "0000", base_time()).await.message, messages::CHECKIN_NOT_FOUND);
    assert_eq!(registrations.check_in_at("bogus", "0912", base_time()).await.message, messages::CHECKIN_NOT_FOUND);
    assert_eq!(
        registrations.check_in_at(&other.id.to_string(), "0912", base_time()).await.message,
        messages::CHECKIN_NOT_FOUND
    );
}

#[tokio::test]
async fn test_exact_phone_match_mode() {
    let ctx = TestContext::new_with_config(TestConfig {
        phone_match: PhoneMatchMode::Exact,
        ..TestConfig::default()
    });
    let admin = ctx.admin("amy@example.com", "Amy").await;
    let event = ctx.create_event(&admin, event_form("Meetup", 0)).await;
    let registrations = &ctx.services.registration_service;

    registrations
        .register_at(None, registration_form(&event, "Cathy", "cathy@example.com", "0912-345-678"), base_time())
        .await;

    let event_id = event.id.to_string();
    assert_eq!(
        registrations.check_in_at(&event_id, "0912345678", base_time()).await.message,
        messages::CHECKIN_NOT_FOUND
    );
    assert_eq!(
        registrations.check_in_at(&event_id, " 0912-345-678 ", base_time()).await.message,
        messages::CHECKED_IN
    );
}

#[tokio::test]
async fn test_delete_attendee_is_super_admin_only() {
    let ctx = TestContext::new();
    let admin = ctx.admin("amy@example.com", "Amy").await;
    let root = ctx.super_admin().await;
    let event = ctx.create_event(&admin, event_form("Meetup", 24)).await;
    let registrations = &ctx.services.registration_service;

    registrations
        .register_at(None, registration_form(&event, "Cathy", "cathy@example.com", "0912"), base_time())
        .await;
    let attendee = registrations.list_attendees(Some(&admin), event.id).await.unwrap().remove(0);

    assert_matches!(
        registrations.delete_attendee(Some(&admin), attendee.id).await,
        Err(EventDeskError::Forbidden(_))
    );
    registrations.delete_attendee(Some(&root), attendee.id).await.unwrap();
    assert_matches!(
        registrations.delete_attendee(Some(&root), attendee.id).await,
        Err(EventDeskError::AttendeeNotFound { .. })
    );
    assert!(ctx.store.find_attendee(attendee.id).await.unwrap().is_none());
}
