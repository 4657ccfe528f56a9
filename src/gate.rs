//! Activation Gate - the startup state machine.
//!
//! ```text
//! Unchecked --check--> Unlocked
//!     |
//!     +-------------> NeedsKey --begin_prompt--> Prompting --submit--> Unlocked
//!                        ^                          |  ^
//!                        |                          |  +-- rejected key
//!                        +---- trial used up -------+
//!                                                   +--quit--> Quit
//! ```
//!
//! The gate owns no UI. Hosts either drive the transitions themselves or
//! hand a [`Prompter`] to [`ActivationGate::run`].

use crate::clock::{Clock, SystemClock};
use crate::config::GateConfig;
use crate::crypto::digest::key_fingerprint;
use crate::crypto::pipeline::verify_license_key;
use crate::policy::renewal::renewal_due;
use crate::policy::trial::{trial_end_date, trial_status, TrialStatus};
use crate::protocol::models::{LicensePayload, LicenseSource};
use crate::store::record::ActivationRecord;
use crate::store::ActivationStore;
use crate::{GateError, LicenseError};
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Non-blocking notice to show alongside an unlocked application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The trial is about to end.
    TrialEndingSoon {
        /// Whole days left (0 on the last day).
        days_remaining: i64,
        /// Last day of the trial.
        ends_on: NaiveDate,
    },
    /// The signed license is close to its expiry date.
    RenewalDue {
        /// Expiry date of the license.
        expires_on: NaiveDate,
        /// Whole days left (0 on the expiry day).
        days_remaining: i64,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::TrialEndingSoon {
                days_remaining: 0,
                ends_on,
            } => write!(f, "Your trial ends today ({}).", ends_on),
            Notice::TrialEndingSoon {
                days_remaining,
                ends_on,
            } => write!(
                f,
                "Your trial ends in {} day(s), on {}.",
                days_remaining, ends_on
            ),
            Notice::RenewalDue {
                expires_on,
                days_remaining: 0,
            } => write!(
                f,
                "Your license expires today ({}). Please renew.",
                expires_on
            ),
            Notice::RenewalDue {
                expires_on,
                days_remaining,
            } => write!(
                f,
                "Your license expires in {} day(s), on {}. Please renew.",
                days_remaining, expires_on
            ),
        }
    }
}

/// What is currently granting access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseKind {
    /// The time-boxed trial.
    Trial {
        /// First activation date of this installation.
        installed_on: NaiveDate,
        /// Last day of the trial.
        ends_on: NaiveDate,
        /// Whole days left.
        days_remaining: i64,
    },
    /// A verified signed license.
    Licensed {
        /// The verified payload.
        payload: LicensePayload,
        /// Parsed expiry date.
        expires_on: NaiveDate,
        /// Whole days left.
        days_remaining: i64,
    },
}

/// Read-only description of the active license, for the license-info panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseInfo {
    /// Trial or signed license details.
    pub kind: LicenseKind,
    /// Warning to surface without blocking, if any.
    pub notice: Option<Notice>,
}

impl LicenseInfo {
    /// Whether access comes from the trial.
    pub fn is_trial(&self) -> bool {
        matches!(self.kind, LicenseKind::Trial { .. })
    }
}

impl fmt::Display for LicenseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LicenseKind::Trial {
                installed_on,
                ends_on,
                days_remaining,
            } => write!(
                f,
                "Trial version\nInstalled: {}\nTrial ends: {}\nDays remaining: {}",
                installed_on, ends_on, days_remaining
            ),
            LicenseKind::Licensed {
                payload,
                expires_on,
                days_remaining,
            } => write!(
                f,
                "Licensed to: {}\nExpires: {}\nDays remaining: {}",
                payload.identifier, expires_on, days_remaining
            ),
        }
    }
}

/// Gate states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Nothing has been checked yet.
    Unchecked,
    /// Access is not granted; a key must be entered.
    NeedsKey {
        /// Why. `None` means nothing was ever activated.
        reason: Option<LicenseError>,
    },
    /// Waiting for the user to submit a key or quit.
    Prompting {
        /// Why the previous attempt (or stored state) was refused.
        rejected: Option<LicenseError>,
    },
    /// Access granted for the rest of the process lifetime.
    Unlocked(LicenseInfo),
    /// The user gave up. Terminal.
    Quit,
}

impl GateState {
    /// Short state name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            GateState::Unchecked => "unchecked",
            GateState::NeedsKey { .. } => "needs-key",
            GateState::Prompting { .. } => "prompting",
            GateState::Unlocked(_) => "unlocked",
            GateState::Quit => "quit",
        }
    }
}

/// User response to a key prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// Try this key string.
    Submit(String),
    /// Give up and exit.
    Quit,
}

/// UI surface the gate drives from [`ActivationGate::run`].
pub trait Prompter {
    /// Show a blocking prompt with Activate/Quit actions.
    ///
    /// `reason` explains why a key is needed, or why the last one was refused.
    fn prompt(&mut self, reason: Option<&LicenseError>) -> PromptResponse;

    /// Show a non-blocking warning banner.
    fn notify(&mut self, notice: &Notice);
}

/// Final result of the interactive loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The application may start.
    Unlocked(LicenseInfo),
    /// The user quit; the host should exit with status 0.
    Quit,
}

/// Startup activation gate.
///
/// Create one per process, run it to completion before starting the rest
/// of the application, then keep it around for [`license_info`](Self::license_info).
pub struct ActivationGate<S: ActivationStore> {
    config: GateConfig,
    clock: Arc<dyn Clock>,
    store: S,
    state: GateState,
}

impl<S: ActivationStore> ActivationGate<S> {
    /// Create a gate using the system clock.
    ///
    /// # Errors
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn new(config: GateConfig, store: S) -> Result<Self, GateError> {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Create a gate with a custom source of "today".
    pub fn with_clock(
        config: GateConfig,
        store: S,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GateError> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            store,
            state: GateState::Unchecked,
        })
    }

    /// Current state.
    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Get the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// `Unchecked -> {Unlocked, NeedsKey}`: evaluate persisted state.
    pub fn check(&mut self) -> Result<&GateState, GateError> {
        self.expect_state("check", |s| matches!(s, GateState::Unchecked))?;
        self.refresh()
    }

    /// `NeedsKey -> Prompting`: the host is about to collect a key.
    pub fn begin_prompt(&mut self) -> Result<&GateState, GateError> {
        let GateState::NeedsKey { reason } = &self.state else {
            return Err(self.invalid("begin prompt"));
        };
        let rejected = reason.clone();
        self.state = GateState::Prompting { rejected };
        Ok(&self.state)
    }

    /// `Prompting -> {Unlocked, NeedsKey, Prompting}`: try a candidate key.
    ///
    /// A rejected signed key leaves the gate in `Prompting` with the reason.
    /// The trial marker always gets persisted; if its window has already
    /// elapsed the gate falls back to `NeedsKey` with `TrialExpired`.
    ///
    /// # Errors
    /// Only store failures and calls from the wrong state are errors.
    pub fn submit(&mut self, candidate: &str) -> Result<&GateState, GateError> {
        self.expect_state("submit a key", |s| matches!(s, GateState::Prompting { .. }))?;

        let today = self.clock.today();
        let source = match LicenseSource::parse(candidate) {
            Ok(source) => source,
            Err(err) => return Ok(self.reject(err)),
        };

        if let LicenseSource::Signed(key) = &source {
            if let Err(err) = verify_license_key(key, self.config.secret_bytes(), today) {
                return Ok(self.reject(err));
            }
        }

        let key_string = source.to_key_string();
        let mut record = self.store.load()?;
        let stamped = record.stamp_installation(today);
        record.license_key = Some(key_string.clone());
        self.persist(&record)?;

        info!(
            app = self.config.app_name,
            key = %key_fingerprint(&key_string),
            trial = source.is_trial(),
            stamped,
            "activated license key"
        );

        self.refresh()
    }

    /// `Prompting -> Quit`. There is no way back.
    pub fn quit(&mut self) -> Result<&GateState, GateError> {
        self.expect_state("quit", |s| matches!(s, GateState::Prompting { .. }))?;
        info!(app = self.config.app_name, "activation cancelled by user");
        self.state = GateState::Quit;
        Ok(&self.state)
    }

    /// Describe the active license without changing any state.
    ///
    /// # Errors
    /// * `NotActivated` - nothing has been activated
    /// * `License(_)` - stored key or trial no longer grants access
    pub fn license_info(&self) -> Result<LicenseInfo, GateError> {
        let record = self.store.load()?;
        self.evaluate(&record).map_err(|reason| match reason {
            Some(err) => GateError::License(err),
            None => GateError::NotActivated,
        })
    }

    /// Drive the gate to `Unlocked` or `Quit` using the given prompter.
    ///
    /// Blocks for as long as the prompter does; there is no timeout.
    pub fn run<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Result<GateOutcome, GateError> {
        loop {
            match &self.state {
                GateState::Unchecked => {
                    self.check()?;
                }
                GateState::NeedsKey { .. } => {
                    self.begin_prompt()?;
                }
                GateState::Prompting { rejected } => match prompter.prompt(rejected.as_ref()) {
                    PromptResponse::Submit(candidate) => {
                        self.submit(&candidate)?;
                    }
                    PromptResponse::Quit => {
                        self.quit()?;
                    }
                },
                GateState::Unlocked(info) => {
                    let info = info.clone();
                    if let Some(notice) = &info.notice {
                        prompter.notify(notice);
                    }
                    return Ok(GateOutcome::Unlocked(info));
                }
                GateState::Quit => return Ok(GateOutcome::Quit),
            }
        }
    }

    /// Like [`run`](Self::run), but exits the process with status 0 on quit.
    pub fn run_or_exit<P: Prompter + ?Sized>(
        &mut self,
        prompter: &mut P,
    ) -> Result<LicenseInfo, GateError> {
        match self.run(prompter)? {
            GateOutcome::Unlocked(info) => Ok(info),
            GateOutcome::Quit => std::process::exit(0),
        }
    }

    /// Load the record and move to `Unlocked` or `NeedsKey`.
    fn refresh(&mut self) -> Result<&GateState, GateError> {
        let record = self.store.load()?;
        self.state = match self.evaluate(&record) {
            Ok(info) => {
                info!(
                    app = self.config.app_name,
                    trial = info.is_trial(),
                    "license check passed"
                );
                if let Some(notice) = &info.notice {
                    info!(app = self.config.app_name, %notice, "license notice");
                }
                GateState::Unlocked(info)
            }
            Err(reason) => {
                match &reason {
                    Some(err) => warn!(app = self.config.app_name, error = %err, "license check failed"),
                    None => info!(app = self.config.app_name, "no license activated"),
                }
                GateState::NeedsKey { reason }
            }
        };
        Ok(&self.state)
    }

    /// Decide whether a record grants access.
    ///
    /// `Err(None)` means nothing usable was ever activated; `Err(Some(_))`
    /// carries the specific reason access is refused.
    fn evaluate(&self, record: &ActivationRecord) -> Result<LicenseInfo, Option<LicenseError>> {
        let Some(stored) = record.license_key.as_deref() else {
            return Err(None);
        };
        let today = self.clock.today();

        match LicenseSource::parse(stored).map_err(Some)? {
            LicenseSource::Trial => {
                let installed_on = record
                    .installation_date
                    .ok_or(Some(LicenseError::TrialNeverStarted))?;
                let (days_remaining, ending) = match trial_status(
                    Some(installed_on),
                    today,
                    self.config.trial_length_days,
                ) {
                    TrialStatus::Active { days_remaining } => (days_remaining, false),
                    TrialStatus::WarnSoon { days_remaining } => (days_remaining, true),
                    TrialStatus::Expired => return Err(Some(LicenseError::TrialExpired)),
                };
                let ends_on = trial_end_date(installed_on, self.config.trial_length_days);
                Ok(LicenseInfo {
                    kind: LicenseKind::Trial {
                        installed_on,
                        ends_on,
                        days_remaining,
                    },
                    notice: ending.then_some(Notice::TrialEndingSoon {
                        days_remaining,
                        ends_on,
                    }),
                })
            }
            LicenseSource::Signed(key) => {
                if record.installation_date.is_none() {
                    return Err(None);
                }
                let payload =
                    verify_license_key(&key, self.config.secret_bytes(), today).map_err(Some)?;
                let expires_on = payload.expiry_date().map_err(Some)?;
                let days_remaining = (expires_on - today).num_days();
                let notice = renewal_due(expires_on, today, self.config.renewal_warning_days)
                    .map(|days_remaining| Notice::RenewalDue {
                        expires_on,
                        days_remaining,
                    });
                Ok(LicenseInfo {
                    kind: LicenseKind::Licensed {
                        payload,
                        expires_on,
                        days_remaining,
                    },
                    notice,
                })
            }
        }
    }

    /// Save, retrying once before giving up.
    fn persist(&self, record: &ActivationRecord) -> Result<(), GateError> {
        match self.store.save(record) {
            Ok(()) => Ok(()),
            Err(first) => {
                warn!(app = self.config.app_name, error = %first, "saving activation failed, retrying");
                self.store.save(record)
            }
        }
    }

    fn reject(&mut self, err: LicenseError) -> &GateState {
        warn!(app = self.config.app_name, error = %err, "license key rejected");
        self.state = GateState::Prompting {
            rejected: Some(err),
        };
        &self.state
    }

    fn expect_state(
        &self,
        action: &'static str,
        allowed: impl Fn(&GateState) -> bool,
    ) -> Result<(), GateError> {
        if allowed(&self.state) {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> GateError {
        GateError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::crypto::pipeline::issue;
    use crate::protocol::models::TRIAL_MARKER;
    use crate::store::memory::MemoryStore;
    use crate::store::record::{INSTALLATION_DATE_FIELD, LICENSE_KEY_FIELD};
    use serde_json::json;

    const SECRET: &str = "unit-test-secret";

    fn test_config() -> GateConfig {
        GateConfig::new("test-app", SECRET, "gatekey-test")
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn gate_on<'a>(store: &'a MemoryStore, today: &str) -> ActivationGate<&'a MemoryStore> {
        ActivationGate::with_clock(test_config(), store, Arc::new(MockClock::from_ymd(today)))
            .unwrap()
    }

    fn reason(state: &GateState) -> Option<&LicenseError> {
        match state {
            GateState::NeedsKey { reason } => reason.as_ref(),
            GateState::Prompting { rejected } => rejected.as_ref(),
            _ => None,
        }
    }

    /// Scripted prompter for driving `run`.
    struct Script {
        responses: Vec<PromptResponse>,
        seen: Vec<Option<LicenseError>>,
        notices: Vec<Notice>,
    }

    impl Script {
        fn new(responses: Vec<PromptResponse>) -> Self {
            Self {
                responses: responses.into_iter().rev().collect(),
                seen: Vec::new(),
                notices: Vec::new(),
            }
        }
    }

    impl Prompter for Script {
        fn prompt(&mut self, reason: Option<&LicenseError>) -> PromptResponse {
            self.seen.push(reason.cloned());
            self.responses.pop().unwrap_or(PromptResponse::Quit)
        }

        fn notify(&mut self, notice: &Notice) {
            self.notices.push(notice.clone());
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let store = MemoryStore::new();
        let mut config = test_config();
        config.secret = "";
        assert!(matches!(
            ActivationGate::new(config, &store),
            Err(GateError::ConfigError(_))
        ));
    }

    #[test]
    fn test_oversized_trial_window_rejected_before_activation() {
        let store = MemoryStore::new();
        let mut config = test_config();
        config.trial_length_days = 1_000_000_000;
        assert!(matches!(
            ActivationGate::new(config, &store),
            Err(GateError::ConfigError(_))
        ));
        assert!(store.document().is_empty());
    }

    #[test]
    fn test_empty_record_needs_key() {
        let store = MemoryStore::new();
        let mut gate = gate_on(&store, "2025-03-01");
        assert_eq!(gate.check().unwrap(), &GateState::NeedsKey { reason: None });
    }

    #[test]
    fn test_check_only_from_unchecked() {
        let store = MemoryStore::new();
        let mut gate = gate_on(&store, "2025-03-01");
        gate.check().unwrap();
        assert!(matches!(
            gate.check(),
            Err(GateError::InvalidTransition { action: "check", .. })
        ));
    }

    #[test]
    fn test_submit_requires_prompting() {
        let store = MemoryStore::new();
        let mut gate = gate_on(&store, "2025-03-01");
        assert!(matches!(
            gate.submit(TRIAL_MARKER),
            Err(GateError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_trial_activation_unlocks_and_stamps() {
        let store = MemoryStore::new();
        let mut gate = gate_on(&store, "2025-03-01");
        gate.check().unwrap();
        gate.begin_prompt().unwrap();

        let state = gate.submit(TRIAL_MARKER).unwrap();
        let GateState::Unlocked(info) = state else {
            panic!("expected unlocked, got {:?}", state);
        };
        assert!(info.is_trial());
        assert_eq!(info.notice, None);

        let doc = store.document();
        assert_eq!(doc[LICENSE_KEY_FIELD], json!(TRIAL_MARKER));
        assert_eq!(doc[INSTALLATION_DATE_FIELD], json!("2025-03-01"));
    }

    #[test]
    fn test_trial_day_six_warns_day_eight_needs_key() {
        let store = MemoryStore::new();
        {
            let mut gate = gate_on(&store, "2025-03-01");
            gate.check().unwrap();
            gate.begin_prompt().unwrap();
            gate.submit(TRIAL_MARKER).unwrap();
        }

        let mut day6 = gate_on(&store, "2025-03-07");
        let GateState::Unlocked(info) = day6.check().unwrap() else {
            panic!("trial should still be active on day 6");
        };
        assert_eq!(
            info.notice,
            Some(Notice::TrialEndingSoon {
                days_remaining: 1,
                ends_on: date("2025-03-08"),
            })
        );

        let mut day8 = gate_on(&store, "2025-03-09");
        let state = day8.check().unwrap();
        assert_eq!(reason(state), Some(&LicenseError::TrialExpired));
    }

    #[test]
    fn test_trial_reentry_does_not_reset_clock() {
        let store = MemoryStore::new();
        {
            let mut gate = gate_on(&store, "2025-03-01");
            gate.check().unwrap();
            gate.begin_prompt().unwrap();
            gate.submit(TRIAL_MARKER).unwrap();
        }

        let mut later = gate_on(&store, "2025-03-20");
        later.check().unwrap();
        later.begin_prompt().unwrap();
        let state = later.submit(TRIAL_MARKER).unwrap();

        assert_eq!(reason(state), Some(&LicenseError::TrialExpired));
        assert!(matches!(state, GateState::NeedsKey { .. }));
        assert_eq!(store.load().unwrap().installation_date, Some(date("2025-03-01")));
    }

    #[test]
    fn test_trial_marker_without_stamp_fails_closed() {
        let store = MemoryStore::with_document(
            json!({ "license_key": TRIAL_MARKER }).as_object().cloned().unwrap(),
        );
        let mut gate = gate_on(&store, "2025-03-01");
        let state = gate.check().unwrap();
        assert_eq!(reason(state), Some(&LicenseError::TrialNeverStarted));
    }

    #[test]
    fn test_signed_key_activation() {
        let store = MemoryStore::new();
        let key = issue("a@b.com", date("2030-01-01"), SECRET.as_bytes());

        let mut gate = gate_on(&store, "2025-03-01");
        gate.check().unwrap();
        gate.begin_prompt().unwrap();
        let GateState::Unlocked(info) = gate.submit(&key).unwrap() else {
            panic!("signed key should unlock");
        };
        let LicenseKind::Licensed { payload, expires_on, .. } = &info.kind else {
            panic!("expected licensed kind");
        };
        assert_eq!(payload.identifier, "a@b.com");
        assert_eq!(*expires_on, date("2030-01-01"));
        assert_eq!(info.notice, None);

        let record = store.load().unwrap();
        assert_eq!(record.license_key.as_deref(), Some(key.as_str()));
        assert_eq!(record.installation_date, Some(date("2025-03-01")));
    }

    #[test]
    fn test_signed_key_after_trial_keeps_stamp() {
        let store = MemoryStore::new();
        {
            let mut gate = gate_on(&store, "2025-03-01");
            gate.check().unwrap();
            gate.begin_prompt().unwrap();
            gate.submit(TRIAL_MARKER).unwrap();
        }

        let key = issue("a@b.com", date("2030-01-01"), SECRET.as_bytes());
        let mut gate = gate_on(&store, "2025-03-20");
        gate.check().unwrap();
        gate.begin_prompt().unwrap();
        assert!(matches!(gate.submit(&key).unwrap(), GateState::Unlocked(_)));
        assert_eq!(store.load().unwrap().installation_date, Some(date("2025-03-01")));
    }

    #[test]
    fn test_rejected_key_stays_prompting() {
        let store = MemoryStore::new();
        let mut gate = gate_on(&store, "2025-03-01");
        gate.check().unwrap();
        gate.begin_prompt().unwrap();

        let state = gate.submit("not-a-valid-key").unwrap();
        assert!(matches!(
            state,
            GateState::Prompting {
                rejected: Some(LicenseError::MalformedKey(_))
            }
        ));

        let forged = issue("a@b.com", date("2030-01-01"), b"wrong-secret");
        let state = gate.submit(&forged).unwrap();
        assert_eq!(reason(state), Some(&LicenseError::InvalidSignature));
        assert_eq!(store.save_attempts(), 0);
    }

    #[test]
    fn test_expired_key_rejected_with_payload() {
        let store = MemoryStore::new();
        let key = issue("a@b.com", date("2025-01-01"), SECRET.as_bytes());
        let mut gate = gate_on(&store, "2025-03-01");
        gate.check().unwrap();
        gate.begin_prompt().unwrap();

        let state = gate.submit(&key).unwrap();
        assert!(matches!(
            reason(state),
            Some(LicenseError::Expired { payload }) if payload.identifier == "a@b.com"
        ));
    }

    #[test]
    fn test_stored_key_expiring_soon_emits_renewal_notice() {
        let store = MemoryStore::new();
        let key = issue("a@b.com", date("2025-03-05"), SECRET.as_bytes());
        store
            .save(&ActivationRecord {
                license_key: Some(key),
                installation_date: Some(date("2024-03-05")),
            })
            .unwrap();

        let mut gate = gate_on(&store, "2025-03-01");
        let GateState::Unlocked(info) = gate.check().unwrap() else {
            panic!("key is still valid");
        };
        assert_eq!(
            info.notice,
            Some(Notice::RenewalDue {
                expires_on: date("2025-03-05"),
                days_remaining: 4,
            })
        );
    }

    #[test]
    fn test_stored_signed_key_without_stamp_needs_key() {
        let store = MemoryStore::new();
        let key = issue("a@b.com", date("2030-01-01"), SECRET.as_bytes());
        store
            .save(&ActivationRecord {
                license_key: Some(key),
                installation_date: None,
            })
            .unwrap();

        let mut gate = gate_on(&store, "2025-03-01");
        assert_eq!(gate.check().unwrap(), &GateState::NeedsKey { reason: None });
    }

    #[test]
    fn test_save_retried_once() {
        let store = MemoryStore::new();
        store.fail_next_saves(1);
        let mut gate = gate_on(&store, "2025-03-01");
        gate.check().unwrap();
        gate.begin_prompt().unwrap();

        assert!(matches!(gate.submit(TRIAL_MARKER).unwrap(), GateState::Unlocked(_)));
        assert_eq!(store.save_attempts(), 2);
    }

    #[test]
    fn test_save_failing_twice_is_hard_error() {
        let store = MemoryStore::new();
        store.fail_next_saves(2);
        let mut gate = gate_on(&store, "2025-03-01");
        gate.check().unwrap();
        gate.begin_prompt().unwrap();

        assert!(matches!(gate.submit(TRIAL_MARKER), Err(GateError::StoreIO(_))));
        assert_eq!(store.save_attempts(), 2);
    }

    #[test]
    fn test_quit_is_terminal() {
        let store = MemoryStore::new();
        let mut gate = gate_on(&store, "2025-03-01");
        gate.check().unwrap();
        gate.begin_prompt().unwrap();
        assert_eq!(gate.quit().unwrap(), &GateState::Quit);
        assert!(gate.submit(TRIAL_MARKER).is_err());
        assert!(gate.check().is_err());
    }

    #[test]
    fn test_run_retries_until_valid_key() {
        let store = MemoryStore::new();
        let key = issue("a@b.com", date("2030-01-01"), SECRET.as_bytes());
        let mut prompter = Script::new(vec![
            PromptResponse::Submit("garbage".to_string()),
            PromptResponse::Submit(key),
        ]);

        let mut gate = gate_on(&store, "2025-03-01");
        let outcome = gate.run(&mut prompter).unwrap();

        assert!(matches!(outcome, GateOutcome::Unlocked(ref info) if !info.is_trial()));
        assert_eq!(prompter.seen.len(), 2);
        assert_eq!(prompter.seen[0], None);
        assert!(matches!(prompter.seen[1], Some(LicenseError::MalformedKey(_))));
    }

    #[test]
    fn test_run_quit() {
        let store = MemoryStore::new();
        let mut prompter = Script::new(vec![PromptResponse::Quit]);
        let mut gate = gate_on(&store, "2025-03-01");
        assert_eq!(gate.run(&mut prompter).unwrap(), GateOutcome::Quit);
        assert_eq!(gate.state(), &GateState::Quit);
    }

    #[test]
    fn test_run_passes_notice_to_prompter() {
        let store = MemoryStore::new();
        {
            let mut gate = gate_on(&store, "2025-03-01");
            gate.run(&mut Script::new(vec![PromptResponse::Submit(
                TRIAL_MARKER.to_string(),
            )]))
            .unwrap();
        }

        let mut prompter = Script::new(vec![]);
        let mut gate = gate_on(&store, "2025-03-08");
        let outcome = gate.run(&mut prompter).unwrap();
        assert!(matches!(outcome, GateOutcome::Unlocked(_)));
        assert!(prompter.seen.is_empty());
        assert_eq!(
            prompter.notices,
            vec![Notice::TrialEndingSoon {
                days_remaining: 0,
                ends_on: date("2025-03-08"),
            }]
        );
    }

    #[test]
    fn test_run_shows_trial_expired_reason_first() {
        let store = MemoryStore::with_document(
            json!({ "license_key": TRIAL_MARKER, "installation_date": "2025-01-01" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        let mut prompter = Script::new(vec![PromptResponse::Quit]);
        let mut gate = gate_on(&store, "2025-03-01");
        gate.run(&mut prompter).unwrap();
        assert_eq!(prompter.seen, vec![Some(LicenseError::TrialExpired)]);
    }

    #[test]
    fn test_license_info_is_read_only() {
        let store = MemoryStore::new();
        let gate = gate_on(&store, "2025-03-01");
        assert!(matches!(gate.license_info(), Err(GateError::NotActivated)));

        let key = issue("a@b.com", date("2030-01-01"), SECRET.as_bytes());
        store
            .save(&ActivationRecord {
                license_key: Some(key),
                installation_date: Some(date("2025-01-01")),
            })
            .unwrap();
        let attempts = store.save_attempts();

        let info = gate.license_info().unwrap();
        assert_eq!(
            info.to_string(),
            "Licensed to: a@b.com\nExpires: 2030-01-01\nDays remaining: 1767"
        );
        assert_eq!(store.save_attempts(), attempts);
        assert_eq!(gate.state(), &GateState::Unchecked);
    }

    #[test]
    fn test_license_info_reports_expired_trial() {
        let store = MemoryStore::with_document(
            json!({ "license_key": TRIAL_MARKER, "installation_date": "2025-01-01" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        let gate = gate_on(&store, "2025-03-01");
        assert!(matches!(
            gate.license_info(),
            Err(GateError::License(LicenseError::TrialExpired))
        ));
    }

    #[test]
    fn test_notice_messages() {
        let ends = Notice::TrialEndingSoon {
            days_remaining: 1,
            ends_on: date("2025-03-08"),
        };
        assert_eq!(ends.to_string(), "Your trial ends in 1 day(s), on 2025-03-08.");

        let renew = Notice::RenewalDue {
            expires_on: date("2030-01-01"),
            days_remaining: 0,
        };
        assert_eq!(
            renew.to_string(),
            "Your license expires today (2030-01-01). Please renew."
        );
    }
}
