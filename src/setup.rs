use std::sync::Arc;

use anchor_client::solana_sdk::{
    commitment_config::CommitmentConfig,
    signature::{read_keypair_file, Keypair},
};
use anyhow::Result;
use solana_client::nonblocking::rpc_client::RpcClient;

use crate::config::data::SessionConfig;
use crate::constants::{DEFAULT_KEYPATH, DEFAULT_RPC_DEVNET};
use crate::errors::SetupError;
use crate::parse::*;

pub fn setup_client(session_config: &SessionConfig, commitment: CommitmentConfig) -> Arc<RpcClient> {
    Arc::new(RpcClient::new_with_commitment(
        session_config.rpc_url.clone(),
        commitment,
    ))
}

pub fn session_setup(
    keypair_opt: Option<String>,
    rpc_url_opt: Option<String>,
) -> Result<SessionConfig> {
    let sol_config_option = parse_solana_config();

    let rpc_url = match rpc_url_opt {
        Some(rpc_url) => rpc_url,
        None => match sol_config_option {
            Some(ref sol_config) => sol_config.json_rpc_url.clone(),
            None => String::from(DEFAULT_RPC_DEVNET),
        },
    };

    let keypair_path = match keypair_opt {
        Some(keypair_path) => keypair_path,
        None => match sol_config_option {
            Some(ref sol_config) => sol_config.keypair_path.clone(),
            None => DEFAULT_KEYPATH.to_string(),
        },
    };

    let keypair = read_keypair(&keypair_path)?;

    Ok(SessionConfig { rpc_url, keypair })
}

fn read_keypair(path: &str) -> Result<Keypair, SetupError> {
    let expanded = shellexpand::tilde(path).to_string();
    read_keypair_file(&expanded)
        .map_err(|err| SetupError::KeypairReadError(expanded, err.to_string()))
}
