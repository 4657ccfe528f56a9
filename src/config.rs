//! Activation gate configuration.

use crate::GateError;

/// Default length of the no-cost trial window, in days.
pub const DEFAULT_TRIAL_LENGTH_DAYS: i64 = 7;

/// Default number of days before expiry at which a renewal notice is shown.
pub const DEFAULT_RENEWAL_WARNING_DAYS: i64 = 7;

/// Upper bound for both day windows (about a century).
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Configuration for the activation gate.
///
/// This struct contains all product-specific settings needed to verify
/// license keys and run the trial clock.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Application name (e.g., "stockroom"), used in log output.
    pub app_name: &'static str,

    /// Shared HMAC secret used to sign and verify license keys.
    /// SECURITY: This ships inside the application binary, so anyone who
    /// extracts it can mint keys. It must be hard-coded, not read from the
    /// environment, so that users cannot substitute their own secret.
    pub secret: &'static str,

    /// Length of the trial window in days.
    pub trial_length_days: i64,

    /// Show a renewal notice when a signed license expires within this many days.
    pub renewal_warning_days: i64,

    /// Namespace for the settings document that holds activation state.
    /// Each product should use a unique namespace to avoid collisions.
    pub store_namespace: &'static str,
}

impl GateConfig {
    /// Create a configuration with the default trial and renewal windows.
    pub fn new(
        app_name: &'static str,
        secret: &'static str,
        store_namespace: &'static str,
    ) -> Self {
        Self {
            app_name,
            secret,
            trial_length_days: DEFAULT_TRIAL_LENGTH_DAYS,
            renewal_warning_days: DEFAULT_RENEWAL_WARNING_DAYS,
            store_namespace,
        }
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.secret.is_empty() {
            return Err(GateError::ConfigError(
                "secret cannot be empty".to_string(),
            ));
        }
        if self.store_namespace.is_empty() {
            return Err(GateError::ConfigError(
                "store_namespace cannot be empty".to_string(),
            ));
        }
        check_window("trial_length_days", self.trial_length_days)?;
        check_window("renewal_warning_days", self.renewal_warning_days)?;
        Ok(())
    }

    /// The secret as raw key bytes.
    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

fn check_window(name: &str, days: i64) -> Result<(), GateError> {
    if !(0..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(GateError::ConfigError(format!(
            "{} must be between 0 and {}, got {}",
            name, MAX_WINDOW_DAYS, days
        )));
    }
    Ok(())
}
