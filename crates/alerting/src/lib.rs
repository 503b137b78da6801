//! Alerting System
//!
//! Provides risk band mapping, the alert threshold, and SMS delivery.

mod band;
mod manager;
mod sms;

pub use band::RiskBand;
pub use manager::{AlertConfig, AlertManager};
pub use sms::{SmsConfig, SmsGateway, MOCK_ACCOUNT_SID};

use thiserror::Error;

/// Alert delivery errors
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("SMS gateway misconfigured: {0}")]
    Config(String),
    #[error("SMS request failed: {0}")]
    Transport(String),
    #[error("SMS provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}
