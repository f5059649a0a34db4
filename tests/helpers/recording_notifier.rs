//! Recording mail transport
//!
//! Captures every message instead of delivering it. Individual
//! recipients can be made to fail to exercise the error paths.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use EventDesk::services::{EmailMessage, Notifier};
use EventDesk::{EventDeskError, Result};

#[derive(Default)]
struct Mailbox {
    sent: Vec<EmailMessage>,
    failing: HashSet<String>,
    fail_all: bool,
}

/// Mail transport for tests
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    mailbox: Arc<Mutex<Mailbox>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `email` fail
    pub fn fail_for(&self, email: &str) {
        self.mailbox.lock().unwrap().failing.insert(email.to_string());
    }

    /// Make every send fail
    pub fn fail_all(&self, fail: bool) {
        self.mailbox.lock().unwrap().fail_all = fail;
    }

    /// Messages delivered so far
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.mailbox.lock().unwrap().sent.clone()
    }

    pub fn sent_to(&self, email: &str) -> Vec<EmailMessage> {
        self.sent().into_iter().filter(|m| m.to == email).collect()
    }

    pub fn clear(&self) {
        self.mailbox.lock().unwrap().sent.clear();
    }
}

impl Notifier for RecordingNotifier {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        let mut mailbox = self.mailbox.lock().unwrap();
        if mailbox.fail_all || mailbox.failing.contains(&message.to) {
            return Err(EventDeskError::Mail(format!("delivery to {} refused", message.to)));
        }
        mailbox.sent.push(message);
        Ok(())
    }
}
