//! Event image uploads
//!
//! Uploads are written to a local directory and served from a public URL
//! prefix.

use std::path::PathBuf;
use chrono::Utc;
use tracing::info;
use crate::config::settings::StorageConfig;
use crate::services::auth::{require_editor, Session};
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::helpers::sanitize_filename;

/// An uploaded file as received from the form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Reject anything that is not an image or is larger than `max_bytes`
    pub fn validate(&self, max_bytes: usize) -> Result<()> {
        if !self.content_type.starts_with("image/") {
            return Err(EventDeskError::InvalidInput("File must be an image".to_string()));
        }

        if self.bytes.len() > max_bytes {
            return Err(EventDeskError::InvalidInput(format!(
                "File too large (max {}MB)",
                max_bytes / (1024 * 1024)
            )));
        }

        Ok(())
    }
}

/// Filesystem-backed image storage
#[derive(Debug, Clone)]
pub struct LocalImageStorage {
    upload_dir: PathBuf,
    public_prefix: String,
    max_bytes: usize,
}

impl LocalImageStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            upload_dir: PathBuf::from(&config.upload_dir),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
            max_bytes: config.max_bytes,
        }
    }

    /// Store an image and return its public URL
    pub async fn store(&self, actor: Option<&Session>, upload: ImageUpload) -> Result<String> {
        let actor = require_editor(actor)?;
        upload.validate(self.max_bytes)?;

        tokio::fs::create_dir_all(&self.upload_dir).await.map_err(|e| {
            EventDeskError::Storage(format!("Cannot create {}: {}", self.upload_dir.display(), e))
        })?;

        let filename = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_filename(&upload.filename)
        );
        let path = self.upload_dir.join(&filename);

        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| EventDeskError::Storage(format!("Cannot write {}: {}", path.display(), e)))?;

        info!(
            file = %filename,
            bytes = upload.bytes.len(),
            actor = %actor.email(),
            "Image uploaded"
        );

        Ok(format!("{}/{}", self.public_prefix, filename))
    }
}
