//! Test helpers module
//!
//! Shared setup for the integration tests: an in-memory test context,
//! a mail transport that records what it was asked to send, mock HTTP
//! collaborators and builders for test data.

#![allow(dead_code)]

pub mod http_mock;
pub mod recording_notifier;
pub mod test_context;
pub mod test_data;

pub use http_mock::*;
pub use recording_notifier::*;
pub use test_context::*;
pub use test_data::*;
