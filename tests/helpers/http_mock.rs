//! Mock HTTP collaborators
//!
//! Wiremock servers standing in for the mail API and the geocoder.

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use EventDesk::config::{GeocoderConfig, MailConfig, Settings};

pub const MAIL_API_KEY: &str = "test-mail-key";

/// Mock mail API accepting `POST /emails`
pub struct MailApiMock {
    pub server: MockServer,
}

impl MailApiMock {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Mail settings pointing at this server
    pub fn mail_config(&self) -> MailConfig {
        let mut config = Settings::default().mail;
        config.api_url = Some(format!("{}/emails", self.server.uri()));
        config.api_key = Some(MAIL_API_KEY.to_string());
        config.from_address = "EventDesk <noreply@eventdesk.test>".to_string();
        config
    }

    pub async fn mock_accept(&self) {
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", format!("Bearer {}", MAIL_API_KEY).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_123" })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_reject(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(status).set_body_string("quota exceeded"))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every request received so far
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).unwrap_or(Value::Null))
            .collect()
    }
}

/// Mock geocoder answering `GET /search`
pub struct GeocoderMock {
    pub server: MockServer,
}

impl GeocoderMock {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn geocoder_config(&self) -> GeocoderConfig {
        let mut config = Settings::default().geocoder;
        config.enabled = true;
        config.base_url = format!("{}/", self.server.uri());
        config
    }

    pub async fn mock_result(&self, address: &str, lat: &str, lon: &str) {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("format", "json"))
            .and(query_param("q", address))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "lat": lat, "lon": lon, "display_name": address }
            ])))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_empty(&self) {
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}
