use std::{fs::File, path::Path, str::FromStr, time::Duration};

use anchor_client::solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::config::data::*;
use crate::config::errors::ConfigError;

/// Values given on the command line; they take precedence over the file.
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
    pub candy_machine: Option<String>,
    pub config: Option<String>,
    pub treasury: Option<String>,
    pub start_date: Option<String>,
    pub tx_timeout: Option<u64>,
    pub commitment: Option<String>,
}

pub fn get_settings_data(settings_path: &str) -> Result<SettingsData, ConfigError> {
    if !Path::new(settings_path).exists() {
        debug!("Settings file {} not found, using defaults", settings_path);
        return Ok(SettingsData::default());
    }

    let f = match File::open(settings_path) {
        Ok(f) => f,
        Err(_) => return Err(ConfigError::FileOpenError(settings_path.to_string())),
    };

    let settings_data: SettingsData = match serde_json::from_reader(f) {
        Ok(settings_data) => settings_data,
        Err(err) => {
            return Err(ConfigError::ParseError(err.to_string()));
        }
    };
    Ok(settings_data)
}

pub fn resolve_settings(
    data: SettingsData,
    overrides: SettingsOverrides,
) -> Result<MintSettings, ConfigError> {
    let candy_machine_id = match overrides.candy_machine {
        Some(candy_machine) => parse_pubkey(&candy_machine)?,
        None => data
            .candy_machine_id
            .ok_or(ConfigError::MissingCandyMachineId)?,
    };

    let mut settings = MintSettings::new(candy_machine_id);

    settings.config = match overrides.config {
        Some(config) => parse_pubkey(&config)?,
        None => data.config.unwrap_or(candy_machine_id),
    };

    settings.treasury = match overrides.treasury {
        Some(treasury) => Some(parse_pubkey(&treasury)?),
        None => data.treasury,
    };

    let start_date = overrides.start_date.or(data.start_date);
    settings.start_date = start_date_as_timestamp(&start_date)
        .map_err(|err| ConfigError::ParseError(err.to_string()))?;

    if let Some(tx_timeout) = overrides.tx_timeout.or(data.tx_timeout) {
        settings.tx_timeout = Duration::from_millis(tx_timeout);
    }

    if let Some(commitment) = overrides.commitment.or(data.commitment) {
        settings.commitment = parse_commitment(&commitment)?;
    }

    Ok(settings)
}

fn parse_pubkey(value: &str) -> Result<Pubkey, ConfigError> {
    Pubkey::from_str(value)
        .map_err(|_| ConfigError::ParseError(format!("invalid address: {}", value)))
}
