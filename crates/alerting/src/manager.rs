//! Alert Manager Implementation

use crate::sms::SmsGateway;
use crate::AlertError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Probability above which an alert is sent (default: 0.5, exclusive)
    pub threshold: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

/// Decides when to alert and delivers the message
pub struct AlertManager {
    /// Configuration
    config: AlertConfig,
    /// Delivery channel
    gateway: SmsGateway,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig, gateway: SmsGateway) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self { config, gateway }
    }

    /// Check if a probability warrants an alert
    pub fn should_fire(&self, probability: f64) -> bool {
        probability > self.config.threshold
    }

    /// Build the alert text
    pub fn compose_message(model_name: &str, probability: f64) -> String {
        format!(
            "WARNING: High {} Risk ({:.1}%). Consult doctor.",
            model_name,
            probability * 100.0
        )
    }

    /// Send an alert if the probability crosses the threshold and a recipient exists
    ///
    /// Returns whether a message was dispatched.
    pub async fn notify(
        &self,
        recipient: Option<&str>,
        model_name: &str,
        probability: f64,
    ) -> Result<bool, AlertError> {
        if !self.should_fire(probability) {
            debug!(
                "Alert suppressed: probability {} <= threshold {}",
                probability, self.config.threshold
            );
            return Ok(false);
        }

        let Some(recipient) = recipient.map(str::trim).filter(|r| !r.is_empty()) else {
            debug!("Alert suppressed: no recipient phone number");
            return Ok(false);
        };

        let message = Self::compose_message(model_name, probability);
        self.gateway.send(recipient, &message).await?;
        info!("Alert sent for {} risk {:.3}", model_name, probability);
        Ok(true)
    }

    /// Get the active threshold
    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertConfig::default(), SmsGateway::Log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_exclusive() {
        let manager = AlertManager::default();
        assert!(!manager.should_fire(0.5));
        assert!(manager.should_fire(0.51));
        assert!(!manager.should_fire(0.1));
    }

    #[test]
    fn test_message_format() {
        assert_eq!(
            AlertManager::compose_message("Acute Heart Attack", 0.734),
            "WARNING: High Acute Heart Attack Risk (73.4%). Consult doctor."
        );
    }

    #[tokio::test]
    async fn test_notify_requires_recipient() {
        let manager = AlertManager::default();
        assert!(!manager.notify(None, "Acute Heart Attack", 0.9).await.unwrap());
        assert!(!manager.notify(Some("  "), "Acute Heart Attack", 0.9).await.unwrap());
    }

    #[tokio::test]
    async fn test_notify_below_threshold() {
        let manager = AlertManager::default();
        let sent = manager
            .notify(Some("+15551234567"), "Acute Heart Attack", 0.3)
            .await
            .unwrap();
        assert!(!sent);
    }

    #[tokio::test]
    async fn test_notify_above_threshold() {
        let manager = AlertManager::new(AlertConfig { threshold: 0.7 }, SmsGateway::Log);
        assert!(!manager.notify(Some("+15551234567"), "Acute Heart Attack", 0.6).await.unwrap());
        assert!(manager.notify(Some("+15551234567"), "Acute Heart Attack", 0.75).await.unwrap());
    }
}
