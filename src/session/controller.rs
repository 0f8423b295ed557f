use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use anchor_client::solana_sdk::{pubkey::Pubkey, signature::Signature};
use futures::future::join_all;
use tokio::{sync::Semaphore, time::sleep};
use tracing::{debug, error, info, warn};

use crate::candy_machine::{CandyMachineHandle, CandyMachineSnapshot};
use crate::chain::{CandyMachineClient, ConfirmationError};
use crate::config::MintSettings;
use crate::session::{
    activation::{Clock, Countdown, SystemClock},
    classify::classify_mint_error,
    errors::*,
    state::*,
};

/// Drives one wallet's mint session: refreshes balance and candy machine
/// state, runs mint attempts end to end and turns their errors into alerts.
///
/// Mint attempts are serialized by a single-permit semaphore. Overlapping
/// calls queue up in order, so each attempt sees the refreshes of the one
/// before it and no update is lost.
pub struct MintSessionController<C: CandyMachineClient> {
    client: Arc<C>,
    settings: MintSettings,
    clock: Arc<dyn Clock>,
    state: Mutex<SessionState>,
    in_flight: Semaphore,
    next_attempt: AtomicU64,
}

impl<C: CandyMachineClient> MintSessionController<C> {
    pub fn new(client: Arc<C>, settings: MintSettings) -> Self {
        Self::with_clock(client, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(client: Arc<C>, settings: MintSettings, clock: Arc<dyn Clock>) -> Self {
        let state = SessionState::new(settings.start_date);

        MintSessionController {
            client,
            settings,
            clock,
            state: Mutex::new(state),
            in_flight: Semaphore::new(1),
            next_attempt: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &MintSettings {
        &self.settings
    }

    /// Copy of the current state, for rendering.
    pub fn state(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // the state is plain data; a panic elsewhere cannot leave it half-written
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn dispatch(&self, action: Action) {
        debug!("Dispatching {:?}", action);
        self.lock().dispatch(action);
    }

    fn public_address(&self) -> Option<Pubkey> {
        self.lock()
            .session
            .as_ref()
            .filter(|session| session.wallet_connected)
            .map(|session| session.public_address)
    }

    /// Wallet connected: creates the session and loads balance and candy
    /// machine state. Both refreshes run even if the first one fails; the
    /// first error is returned after being surfaced as an alert.
    pub async fn connect(&self, public_address: Pubkey) -> Result<(), RefreshError> {
        info!("Wallet connected: {}", public_address);
        self.dispatch(Action::Connected { public_address });

        let balance = self.refresh_balance().await;
        let snapshot = self.refresh().await;

        balance?;
        snapshot?;
        Ok(())
    }

    pub fn disconnect(&self) {
        info!("Wallet disconnected");
        self.dispatch(Action::Disconnected);
    }

    /// Reloads the candy machine counters. Does nothing when no wallet is
    /// connected. A failure is shown as a warning alert.
    pub async fn refresh(&self) -> Result<Option<CandyMachineSnapshot>, RefreshError> {
        self.refresh_snapshot(true).await
    }

    /// Reloads the wallet balance. Does nothing when no wallet is connected.
    /// A failure is shown as a warning alert.
    pub async fn refresh_balance(&self) -> Result<Option<u64>, RefreshError> {
        self.refresh_wallet_balance(true).await
    }

    async fn refresh_snapshot(
        &self,
        surface: bool,
    ) -> Result<Option<CandyMachineSnapshot>, RefreshError> {
        if self.public_address().is_none() {
            return Ok(None);
        }

        match self
            .client
            .get_candy_machine_state(&self.settings.candy_machine_id)
            .await
        {
            Ok(snapshot) => {
                info!(
                    "Candy machine {}: {} available, {} redeemed, {} remaining",
                    snapshot.candy_machine_id(),
                    snapshot.items_available,
                    snapshot.items_redeemed,
                    snapshot.items_remaining
                );
                self.dispatch(Action::SnapshotRefreshed(snapshot.clone()));
                self.observe_activation();
                Ok(Some(snapshot))
            }
            Err(err) => {
                let err = RefreshError::Snapshot(err);
                self.refresh_failed(&err, surface);
                Err(err)
            }
        }
    }

    async fn refresh_wallet_balance(&self, surface: bool) -> Result<Option<u64>, RefreshError> {
        let public_address = match self.public_address() {
            Some(public_address) => public_address,
            None => return Ok(None),
        };

        match self.client.get_balance(&public_address).await {
            Ok(lamports) => {
                debug!("Balance of {}: {} lamports", public_address, lamports);
                self.dispatch(Action::BalanceRefreshed { lamports });
                Ok(Some(lamports))
            }
            Err(err) => {
                let err = RefreshError::Balance(err);
                self.refresh_failed(&err, surface);
                Err(err)
            }
        }
    }

    fn refresh_failed(&self, err: &RefreshError, surface: bool) {
        warn!("{}", err);
        self.dispatch(Action::RefreshFailed {
            message: err.to_string(),
            surface,
            now_ms: self.now_ms(),
        });
    }

    /// Checks the countdown against the clock; activates minting once the
    /// go-live date has passed.
    pub fn observe_activation(&self) {
        let now_ms = self.now_ms();
        self.dispatch(Action::ActivationObserved { now_ms });
    }

    /// Countdown timer. Ticks at most once a second, calling `on_tick` with
    /// the time left, and activates minting when it runs out.
    pub async fn wait_for_activation<F>(&self, mut on_tick: F) -> Result<(), ActivationError>
    where
        F: FnMut(&Countdown),
    {
        loop {
            self.observe_activation();

            let now_ms = self.now_ms();
            let remaining = {
                let state = self.lock();
                if state.activation.is_active() {
                    return Ok(());
                }
                state.activation.remaining(now_ms)
            };
            let remaining = remaining.ok_or(ActivationError::NotScheduled)?;

            on_tick(&remaining);

            if remaining.total_ms() <= 1000 {
                sleep(Duration::from_millis(remaining.total_ms())).await;
                info!("Countdown completed, minting is live");
                self.dispatch(Action::CountdownCompleted);
                return Ok(());
            }

            sleep(Duration::from_secs(1)).await;
        }
    }

    pub fn dismiss_alert(&self) {
        self.dispatch(Action::AlertDismissed);
    }

    /// Hides the alert once it has been visible for the auto-hide duration.
    pub fn expire_alert(&self) {
        let now_ms = self.now_ms();
        self.dispatch(Action::AlertExpired { now_ms });
    }

    /// Runs one mint attempt to completion.
    ///
    /// Waits for any attempt already in flight. Returns `Err` only when the
    /// attempt cannot start (no wallet or no snapshot); otherwise the settled
    /// attempt is returned whatever happened on chain, and balance and
    /// candy machine state have been refreshed exactly once.
    pub async fn mint(&self) -> Result<MintAttempt, MintRejected> {
        let _permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|_| MintRejected::SessionClosed)?;

        let (payer, handle) = {
            let state = self.lock();
            let payer = match state.session.as_ref() {
                Some(session) if session.wallet_connected => session.public_address,
                _ => return Err(MintRejected::WalletNotConnected),
            };
            let handle = match state.snapshot.as_ref() {
                Some(snapshot) => snapshot.program_handle.clone(),
                None => return Err(MintRejected::SnapshotNotLoaded),
            };
            (payer, handle)
        };

        let id = self.next_attempt.fetch_add(1, Ordering::SeqCst);
        self.dispatch(Action::AttemptStarted { id });
        info!("Mint attempt {} started for {}", id, payer);

        let result = match self.submit_and_confirm(id, &handle, &payer).await {
            Ok(signature) => {
                info!("Mint attempt {} succeeded: {}", id, signature);
                AttemptResult::Succeeded
            }
            Err(err) => {
                error!("Mint attempt {} failed: {}", id, err);
                AttemptResult::Failed(classify_mint_error(&err))
            }
        };
        self.dispatch(Action::AttemptSettled {
            id,
            result,
            now_ms: self.now_ms(),
        });

        // Runs on every path; failures here never replace the attempt's alert.
        self.refresh_wallet_balance(false).await.ok();
        self.refresh_snapshot(false).await.ok();

        let state = self.lock();
        Ok(state
            .attempt(id)
            .cloned()
            .unwrap_or_else(|| MintAttempt::new(id)))
    }

    /// Fires `count` mint attempts at once; they are queued behind the
    /// in-flight guard and settle one after the other.
    pub async fn mint_many(&self, count: usize) -> Vec<Result<MintAttempt, MintRejected>> {
        join_all((0..count).map(|_| self.mint())).await
    }

    async fn submit_and_confirm(
        &self,
        id: AttemptId,
        handle: &CandyMachineHandle,
        payer: &Pubkey,
    ) -> Result<Signature, MintError> {
        let treasury = self.settings.treasury.unwrap_or(handle.wallet);

        let signature = self
            .client
            .mint_one_token(handle, &self.settings.config, payer, &treasury)
            .await
            .map_err(MintError::Submission)?;

        self.dispatch(Action::AttemptSubmitted {
            id,
            signature: signature.to_string(),
        });

        match self
            .client
            .await_transaction_signature_confirmation(
                &signature,
                self.settings.tx_timeout,
                self.settings.commitment,
            )
            .await
        {
            Ok(None) => Ok(signature),
            Ok(Some(error)) => Err(MintError::OnChainFailure {
                signature: signature.to_string(),
                error,
            }),
            Err(ConfirmationError::Timeout(timeout_ms)) => Err(MintError::ConfirmationTimeout {
                signature: signature.to_string(),
                timeout_ms,
            }),
            Err(ConfirmationError::Rpc(error)) => Err(MintError::Confirmation {
                signature: signature.to_string(),
                error,
            }),
        }
    }
}
