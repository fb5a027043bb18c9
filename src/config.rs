// Booking configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub const DEFAULT_ADVANCE_AMOUNT: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Fixed upfront amount collected to secure a booking.
    pub advance_amount: i64,
    pub currency: String,
    // Placeholder latencies for the mocked booking service
    pub booking_latency_ms: u64,
    pub payment_latency_ms: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            advance_amount: DEFAULT_ADVANCE_AMOUNT,
            currency: "INR".to_string(),
            booking_latency_ms: 1500,
            payment_latency_ms: 2000,
        }
    }
}

impl BookingConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: BookingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.advance_amount < 0 {
            return Err(ConfigError::Invalid(format!(
                "advance_amount must not be negative, got {}",
                self.advance_amount
            )));
        }
        if self.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("currency must not be empty".to_string()));
        }
        Ok(())
    }

    /// Same settings with no simulated latency, for tests and tooling.
    pub fn instant(self) -> Self {
        Self {
            booking_latency_ms: 0,
            payment_latency_ms: 0,
            ..self
        }
    }

    pub fn booking_latency(&self) -> Duration {
        Duration::from_millis(self.booking_latency_ms)
    }

    pub fn payment_latency(&self) -> Duration {
        Duration::from_millis(self.payment_latency_ms)
    }
}
