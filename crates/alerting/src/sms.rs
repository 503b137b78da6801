//! SMS Delivery
//!
//! Twilio REST gateway, or a log-only gateway when no real account is
//! configured.

use crate::AlertError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Placeholder account SID that selects the log-only gateway
pub const MOCK_ACCOUNT_SID: &str = "AC_MOCK_SID";

/// SMS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    /// Twilio account SID
    pub account_sid: Option<String>,
    /// Twilio auth token
    pub auth_token: Option<String>,
    /// Sender number
    pub from_number: String,
    /// API base URL
    pub api_base: String,
    /// Request timeout (seconds)
    pub timeout_seconds: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            from_number: "+1234567890".to_string(),
            api_base: "https://api.twilio.com".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Outbound SMS channel
pub enum SmsGateway {
    /// Twilio Messages API
    Twilio {
        client: reqwest::Client,
        messages_url: String,
        account_sid: String,
        auth_token: String,
        from_number: String,
    },
    /// Log the message instead of sending it
    Log,
}

impl SmsGateway {
    /// Build the gateway; a missing or placeholder SID selects [`SmsGateway::Log`]
    pub fn from_config(config: &SmsConfig) -> Result<Self, AlertError> {
        let account_sid = match config.account_sid.as_deref() {
            None | Some("") | Some(MOCK_ACCOUNT_SID) => {
                info!("No SMS account configured, alerts will be logged only");
                return Ok(SmsGateway::Log);
            }
            Some(sid) => sid.to_string(),
        };
        let auth_token = config
            .auth_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AlertError::Config("auth_token is required with account_sid".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AlertError::Config(e.to_string()))?;

        let messages_url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            config.api_base.trim_end_matches('/'),
            account_sid
        );
        info!("SMS gateway configured for account {}", account_sid);

        Ok(SmsGateway::Twilio {
            client,
            messages_url,
            account_sid,
            auth_token,
            from_number: config.from_number.clone(),
        })
    }

    /// Whether messages are only logged
    pub fn is_mock(&self) -> bool {
        matches!(self, SmsGateway::Log)
    }

    /// Send a text message
    pub async fn send(&self, to: &str, body: &str) -> Result<(), AlertError> {
        match self {
            SmsGateway::Log => {
                info!("[mock sms] to={} body={}", to, body);
                Ok(())
            }
            SmsGateway::Twilio {
                client,
                messages_url,
                account_sid,
                auth_token,
                from_number,
            } => {
                let params = [("To", to), ("From", from_number.as_str()), ("Body", body)];
                let response = client
                    .post(messages_url)
                    .basic_auth(account_sid, Some(auth_token))
                    .form(&params)
                    .send()
                    .await
                    .map_err(|e| AlertError::Transport(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(AlertError::Rejected {
                        status: status.as_u16(),
                        body,
                    });
                }

                debug!("SMS accepted by provider for {}", to);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_log_only() {
        let gateway = SmsGateway::from_config(&SmsConfig::default()).unwrap();
        assert!(gateway.is_mock());
    }

    #[test]
    fn test_placeholder_sid_is_log_only() {
        let config = SmsConfig {
            account_sid: Some(MOCK_ACCOUNT_SID.to_string()),
            auth_token: Some("MOCK_TOKEN".to_string()),
            ..Default::default()
        };
        assert!(SmsGateway::from_config(&config).unwrap().is_mock());
    }

    #[test]
    fn test_real_sid_requires_token() {
        let config = SmsConfig {
            account_sid: Some("AC123".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            SmsGateway::from_config(&config),
            Err(AlertError::Config(_))
        ));
    }

    #[test]
    fn test_messages_url() {
        let config = SmsConfig {
            account_sid: Some("AC123".to_string()),
            auth_token: Some("secret".to_string()),
            api_base: "https://sms.example.test/".to_string(),
            ..Default::default()
        };
        match SmsGateway::from_config(&config).unwrap() {
            SmsGateway::Twilio { messages_url, .. } => assert_eq!(
                messages_url,
                "https://sms.example.test/2010-04-01/Accounts/AC123/Messages.json"
            ),
            SmsGateway::Log => panic!("expected Twilio gateway"),
        }
    }

    #[tokio::test]
    async fn test_log_gateway_sends() {
        assert!(SmsGateway::Log.send("+15551234567", "hello").await.is_ok());
    }
}
