//! Attendee list export as spreadsheet-friendly CSV

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use crate::database::store::{AttendeeStore, EventStore};
use crate::models::{Attendee, Event};
use crate::services::auth::{require_admin_access, Session};
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::helpers::format_local_timestamp;

/// Byte order mark so spreadsheet tools detect UTF-8
const UTF8_BOM: &str = "\u{feff}";

const HEADER: &str = "姓名,電子郵件,手機號碼,報名時間,狀態\n";

/// A rendered export, ready to be served as an attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvExport {
    /// Percent-encoded, for the `Content-Disposition` header
    pub filename: String,
    pub content: String,
}

impl CsvExport {
    pub const CONTENT_TYPE: &'static str = "text/csv; charset=utf-8";

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Export file name: the title with everything but ASCII alphanumerics
/// and CJK ideographs replaced by `_`
pub fn export_filename(title: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || ('\u{4e00}'..='\u{9fa5}').contains(&c) {
                c
            } else {
                '_'
            }
        })
        .collect();

    urlencoding::encode(&format!("{}_名單.csv", safe)).into_owned()
}

/// Render the CSV body. Every field is quoted.
pub fn render_attendees_csv(attendees: &[Attendee], utc_offset_minutes: i32) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for attendee in attendees {
        let registered_at = format_local_timestamp(attendee.created_at, utc_offset_minutes);
        writer.write_record([
            attendee.name.as_str(),
            attendee.email.as_str(),
            attendee.phone.as_str(),
            registered_at.as_str(),
            attendee.status_label(),
        ])?;
    }

    let rows = writer
        .into_inner()
        .map_err(|e| EventDeskError::Io(e.into_error()))?;
    let rows = String::from_utf8(rows)
        .map_err(|e| EventDeskError::InvalidInput(format!("CSV output is not UTF-8: {}", e)))?;

    Ok(format!("{}{}{}", UTF8_BOM, HEADER, rows))
}

#[derive(Clone)]
pub struct ExportService<S> {
    store: S,
    utc_offset_minutes: i32,
}

impl<S: EventStore + AttendeeStore> ExportService<S> {
    pub fn new(store: S, utc_offset_minutes: i32) -> Self {
        Self { store, utc_offset_minutes }
    }

    /// Attendee list of one event, newest registration first
    pub async fn export_attendees(&self, actor: Option<&Session>, event_id: Uuid) -> Result<CsvExport> {
        let actor = require_admin_access(actor)?;

        let event: Event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id })?;

        let attendees = self.store.list_attendees(event_id).await?;
        let content = render_attendees_csv(&attendees, self.utc_offset_minutes)?;

        info!(event_id = %event_id, rows = attendees.len(), actor = %actor.email(), "Attendee list exported");

        Ok(CsvExport {
            filename: export_filename(&event.title),
            content,
        })
    }
}
