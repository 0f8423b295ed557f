use anchor_client::solana_sdk::transaction::TransactionError;
use thiserror::Error;

use crate::chain::ChainError;

/// Everything that can go wrong between submitting a mint and seeing it land.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MintError {
    #[error("Mint transaction was not submitted: {0}")]
    Submission(ChainError),

    #[error("Timed out after {timeout_ms} ms waiting for confirmation of {signature}")]
    ConfirmationTimeout { signature: String, timeout_ms: u64 },

    #[error("Could not confirm {signature}: {error}")]
    Confirmation { signature: String, error: ChainError },

    #[error("Mint transaction {signature} failed: {error}")]
    OnChainFailure {
        signature: String,
        error: TransactionError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("Could not refresh candy machine state: {0}")]
    Snapshot(ChainError),

    #[error("Could not fetch wallet balance: {0}")]
    Balance(ChainError),
}

/// Reasons a mint is refused before anything is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MintRejected {
    #[error("Wallet is not connected")]
    WalletNotConnected,

    #[error("Candy machine state has not been loaded")]
    SnapshotNotLoaded,

    #[error("Mint session is closed")]
    SessionClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActivationError {
    #[error("Candy machine has no go-live date")]
    NotScheduled,
}
