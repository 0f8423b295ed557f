use std::time::Duration;

use anchor_client::solana_sdk::{
    commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature,
    transaction::TransactionError,
};
use async_trait::async_trait;

pub mod errors;
pub mod rpc;

pub use errors::*;
pub use rpc::*;

use crate::candy_machine::{CandyMachineHandle, CandyMachineSnapshot};

/// Everything the mint session needs from the chain.
///
/// [`RpcCandyMachineClient`] talks to a real RPC node; tests provide scripted
/// implementations.
#[async_trait]
pub trait CandyMachineClient: Send + Sync {
    /// Reads the candy machine account and returns its counters and configuration.
    async fn get_candy_machine_state(
        &self,
        candy_machine_id: &Pubkey,
    ) -> Result<CandyMachineSnapshot, ChainError>;

    /// Builds, signs and sends a mint transaction without waiting for it to
    /// be confirmed.
    ///
    /// # Arguments
    ///
    /// * `candy_machine` - Handle from the latest snapshot
    /// * `config` - Account holding the config lines
    /// * `payer` - Wallet paying for and receiving the NFT
    /// * `treasury` - Wallet receiving the mint price
    ///
    async fn mint_one_token(
        &self,
        candy_machine: &CandyMachineHandle,
        config: &Pubkey,
        payer: &Pubkey,
        treasury: &Pubkey,
    ) -> Result<Signature, ChainError>;

    /// Polls the status of `signature` until it reaches `commitment` or
    /// `timeout` elapses. `Ok(None)` means the transaction succeeded and
    /// `Ok(Some(err))` that it landed but failed.
    async fn await_transaction_signature_confirmation(
        &self,
        signature: &Signature,
        timeout: Duration,
        commitment: CommitmentConfig,
    ) -> Result<Option<TransactionError>, ConfirmationError>;

    /// Balance of `address` in lamports.
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ChainError>;
}
