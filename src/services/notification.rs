//! Notification service implementation
//!
//! Mail goes out through a [`Notifier`]. Without a configured mail API the
//! [`LogNotifier`] writes each message to the log and reports success, so
//! callers never depend on delivery. [`NotificationService`] builds the
//! individual messages and escapes every user-supplied value it puts into
//! HTML.

use std::future::Future;
use std::time::Duration;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::config::settings::{MailConfig, Settings};
use crate::models::{Attendee, Event, StaffApplication, StaffStatus, User};
use crate::services::calendar::{build_invite, Organizer};
use crate::services::survey::SurveyKind;
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::helpers::{escape_html, format_local_timestamp};
use crate::utils::logging::log_collaborator_failure;

/// File attached to an outgoing mail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: String,
}

/// Outgoing mail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<EmailAttachment>,
}

/// Mail transport
pub trait Notifier: Send + Sync {
    fn send(&self, message: EmailMessage) -> impl Future<Output = Result<()>> + Send;
}

/// Transport used when no mail API is configured
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            attachments = message.attachments.len(),
            "Mail transport not configured, message logged only"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct MailApiRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    attachments: &'a [EmailAttachment],
}

/// Transport posting JSON to an HTTP mail API with bearer auth
#[derive(Clone)]
pub struct HttpMailer {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    /// Create a new HttpMailer from mail settings
    pub fn new(config: &MailConfig) -> Result<Self> {
        let api_url = config
            .api_url
            .clone()
            .ok_or_else(|| EventDeskError::Config("Mail API URL is not set".to_string()))?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| EventDeskError::Config("Mail API key is not set".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("EventDesk/1.0")
            .build()?;

        Ok(Self {
            http_client,
            api_url,
            api_key,
            from: config.from_address.clone(),
        })
    }
}

impl Notifier for HttpMailer {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        debug!(to = %message.to, subject = %message.subject, "Posting mail to API");

        let request = MailApiRequest {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
            attachments: &message.attachments,
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EventDeskError::Mail(format!("Mail API returned {}: {}", status, body)));
        }

        info!(to = %message.to, subject = %message.subject, "Mail sent");
        Ok(())
    }
}

/// Transport picked from settings
#[derive(Clone)]
pub enum MailerKind {
    Log(LogNotifier),
    Http(HttpMailer),
}

impl MailerKind {
    pub fn from_settings(config: &MailConfig) -> Result<Self> {
        match config.api_url {
            Some(_) => Ok(MailerKind::Http(HttpMailer::new(config)?)),
            None => {
                warn!("No mail API configured, outgoing mail will only be logged");
                Ok(MailerKind::Log(LogNotifier))
            }
        }
    }
}

impl Notifier for MailerKind {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        match self {
            MailerKind::Log(notifier) => notifier.send(message).await,
            MailerKind::Http(notifier) => notifier.send(message).await,
        }
    }
}

/// Builds and sends every mail the application produces
#[derive(Clone)]
pub struct NotificationService<N> {
    notifier: N,
    base_url: String,
    utc_offset_minutes: i32,
    organizer: Organizer,
}

impl<N: Notifier> NotificationService<N> {
    pub fn new(notifier: N, settings: &Settings) -> Self {
        Self {
            notifier,
            base_url: settings.site.base_url.trim_end_matches('/').to_string(),
            utc_offset_minutes: settings.site.utc_offset_minutes,
            organizer: Organizer {
                name: settings.mail.organizer_name.clone(),
                email: settings.mail.organizer_email.clone(),
            },
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn admin_event_url(&self, event: &Event) -> String {
        format!("{}/admin/events/{}", self.base_url, event.id)
    }

    /// Registration confirmation with an `invite.ics` attachment. A failed
    /// invite is logged and the mail goes out without it.
    pub fn registration_confirmation(&self, event: &Event, attendee: &Attendee) -> EmailMessage {
        let attachments = match build_invite(event, attendee, &self.organizer, Utc::now()) {
            Ok(content) => vec![EmailAttachment {
                filename: "invite.ics".to_string(),
                content_type: "text/calendar; charset=utf-8; method=REQUEST".to_string(),
                content,
            }],
            Err(e) => {
                log_collaborator_failure("calendar", &e.to_string(), Some(&event.id.to_string()));
                Vec::new()
            }
        };

        let html = format!(
            "<p>Hi {name},</p>\
             <p>You have successfully registered for \"{title}\".</p>\
             <p>Time: {time}<br>Location: {location}</p>\
             <p>Please find the calendar invitation attached.</p>\
             <p>Best,<br>Event Team</p>",
            name = escape_html(&attendee.name),
            title = escape_html(&event.title),
            time = format_local_timestamp(event.start_time, self.utc_offset_minutes),
            location = escape_html(event.location.as_deref().unwrap_or("N/A")),
        );

        EmailMessage {
            to: attendee.email.clone(),
            subject: format!("Registration Confirmed: {}", event.title),
            html,
            attachments,
        }
    }

    /// Notice to the event creator about a new staff application
    pub fn staff_application_notice(
        &self,
        creator_email: &str,
        event: &Event,
        application: &StaffApplication,
    ) -> EmailMessage {
        let introduction = application
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .map(|m| format!("<p><strong>自我介紹：</strong>{}</p>", escape_html(m)))
            .unwrap_or_default();

        let html = format!(
            "<h2>新的工作人員申請</h2>\
             <p><strong>活動：</strong>{title}</p>\
             <p><strong>申請人：</strong>{name}</p>\
             <p><strong>Email：</strong>{email}</p>\
             <p><strong>電話：</strong>{phone}</p>\
             {introduction}\
             <p style=\"margin-top: 20px;\"><a href=\"{url}\">前往管理後台審核</a></p>",
            title = escape_html(&event.title),
            name = escape_html(&application.name),
            email = escape_html(&application.email),
            phone = escape_html(&application.phone),
            introduction = introduction,
            url = escape_html(&self.admin_event_url(event)),
        );

        EmailMessage {
            to: creator_email.to_string(),
            subject: format!("[工作人員申請] {} 申請加入「{}」", application.name, event.title),
            html,
            attachments: Vec::new(),
        }
    }

    /// Review result sent to the applicant
    pub fn staff_status_result(&self, event: &Event, application: &StaffApplication, status: StaffStatus) -> EmailMessage {
        let approved = status == StaffStatus::Approved;
        let status_text = if approved { "已通過" } else { "未通過" };
        let closing = if approved {
            "<p>恭喜您！請於活動當天提前到場報到。</p>"
        } else {
            "<p>感謝您的申請，期待下次有機會合作。</p>"
        };

        let html = format!(
            "<h2>工作人員申請審核結果</h2>\
             <p><strong>活動：</strong>{title}</p>\
             <p><strong>審核結果：</strong>{status_text}</p>\
             {closing}",
            title = escape_html(&event.title),
            status_text = status_text,
            closing = closing,
        );

        EmailMessage {
            to: application.email.clone(),
            subject: format!("[審核結果] 您的「{}」工作人員申請{}", event.title, status_text),
            html,
            attachments: Vec::new(),
        }
    }

    /// Pre-event reminder for the event creator
    pub fn creator_reminder(&self, event: &Event, creator_email: &str, creator_name: Option<&str>, attendee_count: i64) -> EmailMessage {
        let html = format!(
            "<h2>活動提醒</h2>\
             <p>{greeting} 您好，您建立的活動即將開始。</p>\
             <p><strong>活動：</strong>{title}</p>\
             <p><strong>時間：</strong>{time}</p>\
             <p><strong>地點：</strong>{location}</p>\
             <p><strong>目前報名人數：</strong>{count}</p>\
             <p style=\"margin-top: 20px;\"><a href=\"{url}\">前往管理後台</a></p>",
            greeting = escape_html(creator_name.unwrap_or(creator_email)),
            title = escape_html(&event.title),
            time = format_local_timestamp(event.start_time, self.utc_offset_minutes),
            location = escape_html(event.location.as_deref().unwrap_or("未設定")),
            count = attendee_count,
            url = escape_html(&self.admin_event_url(event)),
        );

        EmailMessage {
            to: creator_email.to_string(),
            subject: format!("[活動提醒] 您的活動「{}」即將開始", event.title),
            html,
            attachments: Vec::new(),
        }
    }

    /// Survey invitation for one attendee
    pub fn survey(
        &self,
        event: &Event,
        attendee: &Attendee,
        kind: SurveyKind,
        subject: &str,
        message: &str,
        link: Option<&str>,
    ) -> EmailMessage {
        let button = link
            .map(|url| format!("<p><a href=\"{}\">填寫問卷</a></p>", escape_html(url)))
            .unwrap_or_default();

        let html = format!(
            "<div style=\"font-family: sans-serif; max-width: 600px; margin: 0 auto;\">\
             <h2>{label}</h2>\
             <p>親愛的 {name}，您好！</p>\
             <p>感謝您報名參加「<strong>{title}</strong>」</p>\
             <p style=\"white-space: pre-wrap;\">{message}</p>\
             {button}\
             <p style=\"font-size: 12px;\">此郵件由活動報名系統自動發送</p>\
             </div>",
            label = kind.label(),
            name = escape_html(&attendee.name),
            title = escape_html(&event.title),
            message = escape_html(message),
            button = button,
        );

        EmailMessage {
            to: attendee.email.clone(),
            subject: format!("[{}] {}", kind.label(), subject),
            html,
            attachments: Vec::new(),
        }
    }

    pub async fn send_registration_confirmation(&self, event: &Event, attendee: &Attendee) -> Result<()> {
        self.notifier.send(self.registration_confirmation(event, attendee)).await
    }

    pub async fn send_staff_application_notice(
        &self,
        creator_email: &str,
        event: &Event,
        application: &StaffApplication,
    ) -> Result<()> {
        self.notifier
            .send(self.staff_application_notice(creator_email, event, application))
            .await
    }

    pub async fn send_staff_status_result(
        &self,
        event: &Event,
        application: &StaffApplication,
        status: StaffStatus,
    ) -> Result<()> {
        self.notifier.send(self.staff_status_result(event, application, status)).await
    }

    pub async fn send_creator_reminder(&self, event: &Event, creator: &User, attendee_count: i64) -> Result<()> {
        self.notifier
            .send(self.creator_reminder(event, &creator.email, creator.name.as_deref(), attendee_count))
            .await
    }

    pub async fn send_survey(
        &self,
        event: &Event,
        attendee: &Attendee,
        kind: SurveyKind,
        subject: &str,
        message: &str,
        link: Option<&str>,
    ) -> Result<()> {
        self.notifier
            .send(self.survey(event, attendee, kind, subject, message, link))
            .await
    }
}
