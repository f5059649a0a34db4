//! Action outcome shown to the user

use serde::{Deserialize, Serialize};

/// Result of a user-facing action. Validation and policy failures are
/// reported here rather than as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

/// User-facing messages
pub mod messages {
    pub const MISSING_FIELDS: &str = "Missing required fields";
    pub const END_BEFORE_START: &str = "End time cannot be earlier than start time";
    pub const CAPACITY_NOT_POSITIVE: &str = "Capacity must be a positive number";
    pub const COORDINATES_OUT_OF_RANGE: &str = "Coordinates are out of range";
    pub const COORDINATES_UNPAIRED: &str = "Latitude and longitude must be given together";
    pub const EVENT_SAVED: &str = "Event saved";
    pub const EVENT_NOT_DELETED: &str = "Event is not deleted";
    pub const RESTORE_EXPIRED: &str = "Cannot restore: Event is older than 7 days";
    pub const EVENT_RESTORED: &str = "Event restored";
    pub const EVENT_NOT_FOUND: &str = "Event not found";
    pub const REGISTRATION_CLOSED: &str = "Registration for this event has closed";
    pub const DUPLICATE_REGISTRATION: &str =
        "This email or phone number is already registered for this event";
    pub const REGISTERED: &str = "Registration successful";
    pub const REGISTRATION_FAILED: &str = "Failed to register";

    pub const ENTER_PHONE: &str = "Please enter your phone number";
    pub const CHECKIN_NOT_FOUND: &str = "Registration not found with this number.";
    pub const ALREADY_CHECKED_IN: &str = "Already checked in!";
    pub const CHECKED_IN: &str = "Welcome!";
    pub const SYSTEM_ERROR: &str = "System error";

    pub const STAFF_MISSING_FIELDS: &str = "請填寫所有必填欄位";
    pub const STAFF_DUPLICATE: &str = "您已經申請過此活動的工作人員";
    pub const STAFF_EVENT_NOT_FOUND: &str = "活動不存在";
    pub const STAFF_SUBMITTED: &str = "申請已送出，請等待活動主辦人審核";

    pub const SURVEY_MISSING_FIELDS: &str = "請填寫所有必填欄位";
    pub const SURVEY_NO_ATTENDEES: &str = "此活動尚無報名者";
}
