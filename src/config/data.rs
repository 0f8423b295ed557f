use std::{
    fmt::Display,
    str::FromStr,
    time::Duration,
};

use anchor_client::solana_sdk::{
    commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Keypair,
};
pub use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::errors::ConfigError;
use crate::constants::DEFAULT_TX_TIMEOUT_MS;

pub struct SessionConfig {
    pub keypair: Keypair,
    pub rpc_url: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SolanaConfig {
    pub json_rpc_url: String,
    pub keypair_path: String,
    pub commitment: String,
}

/// Contents of the settings file (`mint.json`). Every field is optional so
/// that a missing file and a partial file behave the same way; command line
/// flags fill in or override what is here.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsData {
    #[serde(default, deserialize_with = "to_option_pubkey")]
    #[serde(serialize_with = "to_option_string")]
    pub candy_machine_id: Option<Pubkey>,

    #[serde(default, deserialize_with = "to_option_pubkey")]
    #[serde(serialize_with = "to_option_string")]
    pub config: Option<Pubkey>,

    #[serde(default, deserialize_with = "to_option_pubkey")]
    #[serde(serialize_with = "to_option_string")]
    pub treasury: Option<Pubkey>,

    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub tx_timeout: Option<u64>,

    #[serde(default)]
    pub commitment: Option<String>,
}

/// Resolved settings of a mint session.
#[derive(Debug, Clone, PartialEq)]
pub struct MintSettings {
    pub candy_machine_id: Pubkey,
    /// Account holding the config lines. For Candy Machine v2 this is the
    /// candy machine account itself.
    pub config: Pubkey,
    /// Treasury receiving the mint price; `None` uses the candy machine wallet.
    pub treasury: Option<Pubkey>,
    /// Countdown target used until the first snapshot arrives (unix seconds).
    pub start_date: Option<i64>,
    pub tx_timeout: Duration,
    pub commitment: CommitmentConfig,
}

impl MintSettings {
    pub fn new(candy_machine_id: Pubkey) -> MintSettings {
        MintSettings {
            candy_machine_id,
            config: candy_machine_id,
            treasury: None,
            start_date: None,
            tx_timeout: Duration::from_millis(DEFAULT_TX_TIMEOUT_MS),
            commitment: CommitmentConfig::confirmed(),
        }
    }
}

pub fn to_option_string<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    match value {
        Some(v) => serializer.collect_str(&v),
        None => serializer.serialize_none(),
    }
}

fn to_option_pubkey<'de, D>(deserializer: D) -> Result<Option<Pubkey>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Deserialize::deserialize(deserializer)?;

    match s {
        Some(s) if !s.is_empty() => {
            let pubkey = Pubkey::from_str(&s).map_err(serde::de::Error::custom)?;
            Ok(Some(pubkey))
        }
        _ => Ok(None),
    }
}

/// Accepts RFC2822, RFC3339 or a unix timestamp (seconds).
pub fn start_date_as_timestamp(start_date: &Option<String>) -> Result<Option<i64>> {
    if let Some(start_date) = start_date {
        let timestamp = if let Ok(date) = chrono::DateTime::parse_from_rfc2822(start_date) {
            date.timestamp()
        } else if let Ok(date) = chrono::DateTime::parse_from_rfc3339(start_date) {
            date.timestamp()
        } else if let Ok(timestamp) = start_date.parse::<i64>() {
            timestamp
        } else {
            return Err(anyhow!("Invalid date format. Format must be: RFC2822(Fri, 14 Jul 2022 02:40:00 -0400), RFC3339(2022-02-25T13:00:00Z), or UNIX timestamp."));
        };
        Ok(Some(timestamp))
    } else {
        Ok(None)
    }
}

/// Maps a commitment name to its configuration. Legacy names such as
/// `singleGossip` resolve to their current equivalent.
pub fn parse_commitment(commitment: &str) -> Result<CommitmentConfig, ConfigError> {
    match commitment {
        "processed" | "recent" => Ok(CommitmentConfig::processed()),
        "confirmed" | "single" | "singleGossip" => Ok(CommitmentConfig::confirmed()),
        "finalized" | "max" | "root" => Ok(CommitmentConfig::finalized()),
        _ => Err(ConfigError::InvalidCommitment(commitment.to_string())),
    }
}
