use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicI64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anchor_client::solana_sdk::{
    commitment_config::CommitmentConfig, native_token::LAMPORTS_PER_SOL, pubkey::Pubkey,
    signature::Signature, transaction::TransactionError,
};
use async_trait::async_trait;
use candy_mint::{
    candy_machine::{CandyMachineHandle, CandyMachineSnapshot},
    chain::{CandyMachineClient, ChainError, ConfirmationError},
    config::MintSettings,
    session::{Clock, MintSessionController},
};

pub fn sol(amount: f64) -> u64 {
    (amount * LAMPORTS_PER_SOL as f64) as u64
}

/// What the chain looks like to the scripted client.
#[derive(Default)]
pub struct ChainScript {
    pub items_available: u64,
    pub items_redeemed: u64,
    pub go_live_date: Option<i64>,
    pub balance: u64,
    pub price: u64,
    /// Outcome of each submission, in order; an empty queue means success.
    pub submissions: VecDeque<Result<(), ChainError>>,
    /// Outcome of each confirmation, in order; an empty queue means success.
    pub confirmations: VecDeque<Result<Option<TransactionError>, ConfirmationError>>,
    pub snapshot_error: Option<ChainError>,
    pub balance_error: Option<ChainError>,
    /// Applied on the next submission, to simulate other minters.
    pub redeemed_by_others: u64,
    /// Makes every refresh after the next submission fail.
    pub break_refresh_on_submit: bool,
}

/// Records what the mint session asked of the chain.
#[derive(Default)]
pub struct CallLog {
    pub snapshots: AtomicUsize,
    pub balances: AtomicUsize,
    pub submissions: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub last_accounts: Mutex<Option<(Pubkey, Pubkey, Pubkey)>>,
}

impl CallLog {
    pub fn snapshots(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }

    pub fn balances(&self) -> usize {
        self.balances.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

pub struct ScriptedClient {
    pub candy_machine_id: Pubkey,
    pub wallet: Pubkey,
    pub script: Mutex<ChainScript>,
    pub calls: CallLog,
}

impl ScriptedClient {
    pub fn new(script: ChainScript) -> Self {
        ScriptedClient {
            candy_machine_id: Pubkey::new_unique(),
            wallet: Pubkey::new_unique(),
            script: Mutex::new(script),
            calls: CallLog::default(),
        }
    }

    pub fn with_items(items_available: u64, items_redeemed: u64) -> Self {
        ScriptedClient::new(ChainScript {
            items_available,
            items_redeemed,
            go_live_date: Some(0),
            balance: sol(2.0),
            price: sol(0.5),
            ..Default::default()
        })
    }

    pub fn script(&self) -> std::sync::MutexGuard<'_, ChainScript> {
        self.script.lock().unwrap()
    }

    fn finish_attempt(&self) {
        self.calls.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CandyMachineClient for ScriptedClient {
    async fn get_candy_machine_state(
        &self,
        candy_machine_id: &Pubkey,
    ) -> Result<CandyMachineSnapshot, ChainError> {
        self.calls.snapshots.fetch_add(1, Ordering::SeqCst);
        assert_eq!(candy_machine_id, &self.candy_machine_id);

        let script = self.script();
        if let Some(err) = &script.snapshot_error {
            return Err(err.clone());
        }

        let mut handle = CandyMachineHandle::new(self.candy_machine_id, self.wallet);
        handle.price = script.price;

        Ok(CandyMachineSnapshot::new(
            handle,
            script.items_available,
            script.items_redeemed,
            script.go_live_date,
        ))
    }

    async fn mint_one_token(
        &self,
        candy_machine: &CandyMachineHandle,
        config: &Pubkey,
        payer: &Pubkey,
        treasury: &Pubkey,
    ) -> Result<Signature, ChainError> {
        self.calls.submissions.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.calls.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls
            .max_in_flight
            .fetch_max(in_flight, Ordering::SeqCst);

        *self.calls.last_accounts.lock().unwrap() = Some((*config, *payer, *treasury));
        assert_eq!(candy_machine.candy_machine_id, self.candy_machine_id);

        // give queued attempts a chance to run if the guard were missing
        tokio::task::yield_now().await;

        let outcome = {
            let mut script = self.script();
            script.items_redeemed += script.redeemed_by_others;
            script.redeemed_by_others = 0;
            if script.break_refresh_on_submit {
                script.snapshot_error = Some(ChainError::message("connection refused"));
                script.balance_error = Some(ChainError::message("connection refused"));
            }
            script.submissions.pop_front().unwrap_or(Ok(()))
        };

        match outcome {
            Ok(()) => Ok(Signature::new_unique()),
            Err(err) => {
                self.finish_attempt();
                Err(err)
            }
        }
    }

    async fn await_transaction_signature_confirmation(
        &self,
        _signature: &Signature,
        _timeout: Duration,
        _commitment: CommitmentConfig,
    ) -> Result<Option<TransactionError>, ConfirmationError> {
        tokio::task::yield_now().await;

        let outcome = {
            let mut script = self.script();
            let outcome = script.confirmations.pop_front().unwrap_or(Ok(None));
            if let Ok(None) = outcome {
                script.items_redeemed += 1;
                script.balance = script.balance.saturating_sub(script.price);
            }
            outcome
        };

        self.finish_attempt();
        outcome
    }

    async fn get_balance(&self, _address: &Pubkey) -> Result<u64, ChainError> {
        self.calls.balances.fetch_add(1, Ordering::SeqCst);

        let script = self.script();
        match &script.balance_error {
            Some(err) => Err(err.clone()),
            None => Ok(script.balance),
        }
    }
}

/// Clock set by hand.
pub struct ManualClock(pub AtomicI64);

impl ManualClock {
    pub fn at(now_ms: i64) -> Arc<Self> {
        Arc::new(ManualClock(AtomicI64::new(now_ms)))
    }

    pub fn set(&self, now_ms: i64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Clock that follows tokio's (pausable) timer, starting at `base_ms`.
pub struct TokioClock {
    pub base_ms: i64,
    pub start: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(base_ms: i64) -> Arc<Self> {
        Arc::new(TokioClock {
            base_ms,
            start: tokio::time::Instant::now(),
        })
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> i64 {
        self.base_ms + self.start.elapsed().as_millis() as i64
    }
}

pub fn controller(
    client: &Arc<ScriptedClient>,
    clock: Arc<dyn Clock>,
) -> MintSessionController<ScriptedClient> {
    let settings = MintSettings::new(client.candy_machine_id);
    MintSessionController::with_clock(Arc::clone(client), settings, clock)
}
