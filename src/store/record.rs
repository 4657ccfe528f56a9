//! Activation record and its mapping onto the settings document.
//!
//! The settings document is a flat JSON object shared with the rest of the
//! application. Only two keys belong to activation:
//! - `license_key`: the last successfully activated key (or trial marker)
//! - `installation_date`: `YYYY-MM-DD` of the first successful activation

use crate::protocol::models::{format_date, parse_date};
use crate::GateError;
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Settings key holding the activated license key.
pub const LICENSE_KEY_FIELD: &str = "license_key";

/// Settings key holding the first activation date.
pub const INSTALLATION_DATE_FIELD: &str = "installation_date";

/// Durable activation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationRecord {
    /// Current license key or trial marker.
    pub license_key: Option<String>,

    /// Date this installation was first activated. Written once.
    pub installation_date: Option<NaiveDate>,
}

impl ActivationRecord {
    /// Record the installation date if none is set yet.
    ///
    /// Returns `true` if the stamp was written. An existing stamp is never
    /// replaced, so re-entering the trial key cannot restart the trial.
    pub fn stamp_installation(&mut self, today: NaiveDate) -> bool {
        if self.installation_date.is_some() {
            return false;
        }
        self.installation_date = Some(today);
        true
    }

    /// Read the activation fields out of a settings document.
    ///
    /// Missing or `null` fields are absent. A field of the wrong type, or an
    /// installation date that is not `YYYY-MM-DD`, is reported as corrupt
    /// rather than treated as absent: an unreadable stamp must not unlock a
    /// fresh trial.
    pub fn from_document(doc: &Map<String, Value>) -> Result<Self, GateError> {
        let license_key = match doc.get(LICENSE_KEY_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(GateError::StoreCorrupt(format!(
                    "{} must be a string, found {}",
                    LICENSE_KEY_FIELD, other
                )))
            }
        };

        let installation_date = match doc.get(INSTALLATION_DATE_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(parse_date(s).ok_or_else(|| {
                GateError::StoreCorrupt(format!(
                    "{} is not a YYYY-MM-DD date: {:?}",
                    INSTALLATION_DATE_FIELD, s
                ))
            })?),
            Some(other) => {
                return Err(GateError::StoreCorrupt(format!(
                    "{} must be a string, found {}",
                    INSTALLATION_DATE_FIELD, other
                )))
            }
        };

        Ok(Self {
            license_key,
            installation_date,
        })
    }

    /// Write the activation fields into a settings document.
    ///
    /// Unrelated keys are left untouched. Absent fields are not written, and
    /// an existing installation date is never removed.
    pub fn write_into(&self, doc: &mut Map<String, Value>) {
        if let Some(key) = &self.license_key {
            doc.insert(LICENSE_KEY_FIELD.to_string(), Value::String(key.clone()));
        }
        if let Some(date) = self.installation_date {
            doc.insert(
                INSTALLATION_DATE_FIELD.to_string(),
                Value::String(format_date(date)),
            );
        }
    }
}
