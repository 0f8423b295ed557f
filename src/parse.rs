use std::fs::File;

use crate::config::data::*;
use crate::constants::*;

pub fn parse_solana_config() -> Option<SolanaConfig> {
    let config_path = shellexpand::tilde("~/.config/solana/cli/config.yml").to_string();

    let conf_file = match File::open(config_path) {
        Ok(f) => f,
        Err(_) => return None,
    };
    serde_yaml::from_reader(&conf_file).ok()
}

/// Replaces raw program error codes in an error message with a readable
/// description.
pub fn parse_candy_mint_errors(msg: &str) -> String {
    let known = [
        (SOLD_OUT_ERROR_ID, "Candy machine is empty"),
        (NOT_LIVE_ERROR_ID, "Candy machine is not live"),
        (INSUFFICIENT_FUNDS_ERROR_ID, "Not enough SOL to pay for this minting"),
    ];

    for (id, description) in known {
        if msg.contains(&format!("custom program error: {}", id)) {
            return format!("{} ({})", description, msg);
        }
    }

    msg.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_program_errors_are_described() {
        let msg = "RPC response error -32002: Transaction simulation failed: Error processing Instruction 4: custom program error: 0x137";
        assert!(parse_candy_mint_errors(msg).starts_with("Candy machine is empty ("));
    }

    #[test]
    fn other_errors_are_unchanged() {
        assert_eq!(parse_candy_mint_errors("boom"), "boom");
    }
}
