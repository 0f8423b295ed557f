pub use anchor_client::solana_sdk::{
    commitment_config::CommitmentConfig,
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::TransactionError,
};
pub use anyhow::{anyhow, Result};
pub use std::{str::FromStr, sync::Arc, time::Duration};
pub use tracing::{debug, error, info, warn};

pub use crate::config::{
    get_settings_data, resolve_settings, MintSettings, SessionConfig, SettingsOverrides,
};
pub use crate::constants::*;
pub use crate::errors::*;
pub use crate::setup::{session_setup, setup_client};
