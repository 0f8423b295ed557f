use anchor_client::solana_sdk::{native_token::LAMPORTS_PER_SOL, pubkey::Pubkey};
use indexmap::IndexMap;

use crate::candy_machine::CandyMachineSnapshot;
use crate::constants::{ALERT_AUTO_HIDE_MS, MINT_SUCCEEDED_MESSAGE};
use crate::session::{
    activation::ActivationWindow,
    classify::{Classification, ErrorCategory},
};

pub type AttemptId = u64;

/// Connected wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub wallet_connected: bool,
    pub public_address: Pubkey,
    pub balance_lamports: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintStatus {
    Idle,
    Submitting,
    AwaitingConfirmation,
    Succeeded,
    Failed,
}

impl MintStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MintStatus::Succeeded | MintStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintAttempt {
    pub id: AttemptId,
    pub status: MintStatus,
    pub transaction_id: Option<String>,
    pub error_category: Option<ErrorCategory>,
    /// Message shown for this attempt once it settled.
    pub message: Option<String>,
}

impl MintAttempt {
    pub fn new(id: AttemptId) -> Self {
        MintAttempt {
            id,
            status: MintStatus::Idle,
            transaction_id: None,
            error_category: None,
            message: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    Success,
    #[default]
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlertNotice {
    pub visible: bool,
    pub message: String,
    pub severity: Severity,
    /// Unix milliseconds at which the alert was raised.
    pub raised_at: Option<i64>,
}

impl AlertNotice {
    pub fn new(severity: Severity, message: &str, now_ms: i64) -> Self {
        AlertNotice {
            visible: true,
            message: message.to_string(),
            severity,
            raised_at: Some(now_ms),
        }
    }
}

/// Terminal result of one mint attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Succeeded,
    Failed(Classification),
}

#[derive(Debug, Clone)]
pub enum Action {
    Connected { public_address: Pubkey },
    Disconnected,
    BalanceRefreshed { lamports: u64 },
    SnapshotRefreshed(CandyMachineSnapshot),
    ActivationObserved { now_ms: i64 },
    CountdownCompleted,
    AttemptStarted { id: AttemptId },
    AttemptSubmitted { id: AttemptId, signature: String },
    AttemptSettled {
        id: AttemptId,
        result: AttemptResult,
        now_ms: i64,
    },
    AlertDismissed,
    AlertExpired { now_ms: i64 },
    RefreshFailed {
        message: String,
        surface: bool,
        now_ms: i64,
    },
}

/// All session fields, owned by a single reducer. Every async operation of
/// the controller reports back through [`SessionState::dispatch`].
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub session: Option<Session>,
    pub snapshot: Option<CandyMachineSnapshot>,
    pub sold_out: bool,
    pub activation: ActivationWindow,
    pub alert: AlertNotice,
    pub attempts: IndexMap<AttemptId, MintAttempt>,
    pub last_refresh_error: Option<String>,
}

impl SessionState {
    pub fn new(start_date: Option<i64>) -> Self {
        SessionState {
            activation: ActivationWindow::new(start_date),
            ..Default::default()
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Connected { public_address } => {
                self.session = Some(Session {
                    wallet_connected: true,
                    public_address,
                    balance_lamports: 0,
                });
                self.last_refresh_error = None;
            }
            Action::Disconnected => {
                self.session = None;
            }
            Action::BalanceRefreshed { lamports } => {
                if let Some(session) = self.session.as_mut() {
                    session.balance_lamports = lamports;
                }
            }
            Action::SnapshotRefreshed(snapshot) => {
                self.sold_out = snapshot.is_sold_out();
                self.activation.set_target(snapshot.go_live_date);
                self.snapshot = Some(snapshot);
                self.last_refresh_error = None;
            }
            Action::ActivationObserved { now_ms } => {
                self.activation.observe(now_ms);
            }
            Action::CountdownCompleted => {
                self.activation.complete();
            }
            Action::AttemptStarted { id } => {
                let mut attempt = MintAttempt::new(id);
                attempt.status = MintStatus::Submitting;
                self.attempts.insert(id, attempt);
            }
            Action::AttemptSubmitted { id, signature } => {
                if let Some(attempt) = self.attempts.get_mut(&id) {
                    attempt.status = MintStatus::AwaitingConfirmation;
                    attempt.transaction_id = Some(signature);
                }
            }
            Action::AttemptSettled { id, result, now_ms } => {
                let attempt = self
                    .attempts
                    .entry(id)
                    .or_insert_with(|| MintAttempt::new(id));

                match result {
                    AttemptResult::Succeeded => {
                        attempt.status = MintStatus::Succeeded;
                        attempt.message = Some(MINT_SUCCEEDED_MESSAGE.to_string());
                        self.alert =
                            AlertNotice::new(Severity::Success, MINT_SUCCEEDED_MESSAGE, now_ms);
                    }
                    AttemptResult::Failed(classification) => {
                        attempt.status = MintStatus::Failed;
                        attempt.error_category = Some(classification.category);
                        attempt.message = Some(classification.message.clone());
                        if classification.force_sold_out {
                            self.sold_out = true;
                        }
                        self.alert =
                            AlertNotice::new(Severity::Error, &classification.message, now_ms);
                    }
                }
            }
            Action::AlertDismissed => {
                self.alert.visible = false;
            }
            Action::AlertExpired { now_ms } => {
                if let Some(raised_at) = self.alert.raised_at {
                    if self.alert.visible && now_ms - raised_at >= ALERT_AUTO_HIDE_MS {
                        self.alert.visible = false;
                    }
                }
            }
            Action::RefreshFailed {
                message,
                surface,
                now_ms,
            } => {
                if surface {
                    self.alert = AlertNotice::new(Severity::Warning, &message, now_ms);
                }
                self.last_refresh_error = Some(message);
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session
            .as_ref()
            .map(|session| session.wallet_connected)
            .unwrap_or(false)
    }

    pub fn is_minting(&self) -> bool {
        self.attempts
            .values()
            .any(|attempt| !attempt.status.is_terminal())
    }

    pub fn mint_enabled(&self) -> bool {
        self.is_connected() && !self.sold_out && !self.is_minting() && self.activation.is_active()
    }

    pub fn balance_sol(&self) -> Option<f64> {
        self.session
            .as_ref()
            .map(|session| session.balance_lamports as f64 / LAMPORTS_PER_SOL as f64)
    }

    pub fn attempt(&self, id: AttemptId) -> Option<&MintAttempt> {
        self.attempts.get(&id)
    }

    /// Text of the mint button for a batch of `count` mints.
    pub fn mint_button_label(&self, now_ms: i64, count: usize) -> String {
        if self.sold_out {
            "SOLD OUT".to_string()
        } else if self.activation.is_active() {
            if self.is_minting() {
                "MINTING...".to_string()
            } else if count == 1 {
                "MINT 1 NFT".to_string()
            } else {
                format!("MINT {} NFTs", count)
            }
        } else {
            match self.activation.remaining(now_ms) {
                Some(countdown) => countdown.to_string(),
                None => "NOT SCHEDULED".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candy_machine::CandyMachineHandle;
    use crate::session::classify::ErrorCategory;

    fn snapshot(available: u64, redeemed: u64, go_live: Option<i64>) -> CandyMachineSnapshot {
        CandyMachineSnapshot::new(
            CandyMachineHandle::new(Pubkey::new_unique(), Pubkey::new_unique()),
            available,
            redeemed,
            go_live,
        )
    }

    fn connected() -> SessionState {
        let mut state = SessionState::new(None);
        state.dispatch(Action::Connected {
            public_address: Pubkey::new_unique(),
        });
        state
    }

    #[test]
    fn refresh_of_exhausted_machine_sets_sold_out() {
        let mut state = connected();
        state.dispatch(Action::SnapshotRefreshed(snapshot(400, 400, Some(0))));

        let snapshot = state.snapshot.as_ref().unwrap();
        assert_eq!(snapshot.items_remaining, 0);
        assert!(state.sold_out);
        assert_eq!(state.mint_button_label(0, 1), "SOLD OUT");
    }

    #[test]
    fn refresh_overwrites_forced_sold_out() {
        let mut state = connected();
        state.dispatch(Action::AttemptStarted { id: 0 });
        state.dispatch(Action::AttemptSettled {
            id: 0,
            result: AttemptResult::Failed(crate::session::classify::classify(
                &crate::chain::ChainError::program(311),
            )),
            now_ms: 0,
        });
        assert!(state.sold_out);

        state.dispatch(Action::SnapshotRefreshed(snapshot(400, 10, Some(0))));
        assert!(!state.sold_out);
    }

    #[test]
    fn attempt_lifecycle() {
        let mut state = connected();
        state.dispatch(Action::AttemptStarted { id: 7 });
        assert_eq!(state.attempt(7).unwrap().status, MintStatus::Submitting);
        assert!(state.is_minting());

        state.dispatch(Action::AttemptSubmitted {
            id: 7,
            signature: "5ig".to_string(),
        });
        let attempt = state.attempt(7).unwrap();
        assert_eq!(attempt.status, MintStatus::AwaitingConfirmation);
        assert_eq!(attempt.transaction_id.as_deref(), Some("5ig"));

        state.dispatch(Action::AttemptSettled {
            id: 7,
            result: AttemptResult::Succeeded,
            now_ms: 1_000,
        });
        assert_eq!(state.attempt(7).unwrap().status, MintStatus::Succeeded);
        assert!(!state.is_minting());
        assert_eq!(
            state.alert,
            AlertNotice {
                visible: true,
                message: "Congratulations! Mint succeeded!".to_string(),
                severity: Severity::Success,
                raised_at: Some(1_000),
            }
        );
    }

    #[test]
    fn failed_attempt_records_category() {
        let mut state = connected();
        state.dispatch(Action::AttemptStarted { id: 1 });
        state.dispatch(Action::AttemptSettled {
            id: 1,
            result: AttemptResult::Failed(Classification {
                category: ErrorCategory::InsufficientFunds,
                message: "Insufficient funds to mint. Please fund your wallet.".to_string(),
                force_sold_out: false,
            }),
            now_ms: 0,
        });

        let attempt = state.attempt(1).unwrap();
        assert_eq!(attempt.status, MintStatus::Failed);
        assert_eq!(attempt.error_category, Some(ErrorCategory::InsufficientFunds));
        assert_eq!(state.alert.severity, Severity::Error);
        assert!(!state.sold_out);
    }

    #[test]
    fn mint_enabled_needs_every_condition() {
        let mut state = connected();
        state.dispatch(Action::SnapshotRefreshed(snapshot(10, 0, Some(100))));
        assert!(!state.mint_enabled());

        state.dispatch(Action::ActivationObserved { now_ms: 100_000 });
        assert!(state.mint_enabled());
        assert_eq!(state.mint_button_label(100_000, 2), "MINT 2 NFTs");

        state.dispatch(Action::AttemptStarted { id: 0 });
        assert!(!state.mint_enabled());
        assert_eq!(state.mint_button_label(100_000, 1), "MINTING...");

        state.dispatch(Action::Disconnected);
        assert!(!state.mint_enabled());
    }

    #[test]
    fn pending_label_shows_countdown() {
        let mut state = connected();
        state.dispatch(Action::SnapshotRefreshed(snapshot(10, 0, Some(3_661))));
        assert_eq!(
            state.mint_button_label(0, 1),
            "1 hours, 1 minutes, 1 seconds"
        );
    }

    #[test]
    fn alert_dismiss_and_expiry() {
        let mut state = connected();
        state.dispatch(Action::RefreshFailed {
            message: "Could not fetch wallet balance: boom".to_string(),
            surface: true,
            now_ms: 10_000,
        });
        assert!(state.alert.visible);
        assert_eq!(state.alert.severity, Severity::Warning);

        state.dispatch(Action::AlertExpired { now_ms: 15_999 });
        assert!(state.alert.visible);
        state.dispatch(Action::AlertExpired { now_ms: 16_000 });
        assert!(!state.alert.visible);

        state.dispatch(Action::AttemptSettled {
            id: 3,
            result: AttemptResult::Succeeded,
            now_ms: 20_000,
        });
        state.dispatch(Action::AlertDismissed);
        assert!(!state.alert.visible);
    }

    #[test]
    fn unsurfaced_refresh_failure_keeps_alert() {
        let mut state = connected();
        state.dispatch(Action::AttemptSettled {
            id: 0,
            result: AttemptResult::Succeeded,
            now_ms: 0,
        });
        state.dispatch(Action::RefreshFailed {
            message: "Could not refresh candy machine state: boom".to_string(),
            surface: false,
            now_ms: 1,
        });

        assert_eq!(state.alert.severity, Severity::Success);
        assert_eq!(
            state.last_refresh_error.as_deref(),
            Some("Could not refresh candy machine state: boom")
        );
    }

    #[test]
    fn balance_in_sol() {
        let mut state = connected();
        state.dispatch(Action::BalanceRefreshed {
            lamports: 1_500_000_000,
        });
        assert_eq!(state.balance_sol(), Some(1.5));

        state.dispatch(Action::Disconnected);
        assert_eq!(state.balance_sol(), None);
    }
}
