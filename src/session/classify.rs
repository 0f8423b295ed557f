use anchor_client::solana_sdk::{instruction::InstructionError, transaction::TransactionError};

use mpl_candy_machine::CandyError;

use crate::chain::{candy_error, ChainError};
use crate::constants::*;
use crate::session::errors::MintError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    SoldOut,
    NotStarted,
    InsufficientFunds,
    Unknown,
}

/// User-facing reading of a failed mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: ErrorCategory,
    pub message: String,
    /// Set when the error proves the candy machine is empty, even without a
    /// fresh snapshot.
    pub force_sold_out: bool,
}

impl Classification {
    fn new(category: ErrorCategory, message: &str) -> Self {
        Classification {
            category,
            message: message.to_string(),
            force_sold_out: false,
        }
    }

    fn unknown() -> Self {
        Classification::new(ErrorCategory::Unknown, MINTING_FAILED_MESSAGE)
    }
}

/// Classifies an error reported by the chain. Never fails: anything not
/// recognised falls back to the generic message.
pub fn classify(error: &ChainError) -> Classification {
    match error {
        ChainError::Program { code, msg } => classify_code(*code, msg.as_deref()),
        ChainError::Message(text) => classify_message(text),
    }
}

pub fn classify_mint_error(error: &MintError) -> Classification {
    match error {
        MintError::Submission(error) | MintError::Confirmation { error, .. } => classify(error),
        MintError::ConfirmationTimeout { .. } => Classification::unknown(),
        MintError::OnChainFailure { error, .. } => match error {
            TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
                classify_code(*code, None)
            }
            _ => Classification::new(ErrorCategory::Unknown, MINT_FAILED_MESSAGE),
        },
    }
}

fn classify_code(code: u32, msg: Option<&str>) -> Classification {
    match code {
        CANDY_MACHINE_EMPTY_CODE => sold_out(),
        CANDY_MACHINE_NOT_LIVE_CODE => {
            Classification::new(ErrorCategory::NotStarted, NOT_STARTED_MESSAGE)
        }
        _ => match candy_error(code) {
            Some(CandyError::CandyMachineEmpty) => sold_out(),
            Some(CandyError::CandyMachineNotLive) => {
                Classification::new(ErrorCategory::NotStarted, NOT_STARTED_MESSAGE)
            }
            Some(CandyError::NotEnoughSOL) | Some(CandyError::NotEnoughTokens) => {
                Classification::new(ErrorCategory::InsufficientFunds, INSUFFICIENT_FUNDS_MESSAGE)
            }
            _ => match msg {
                Some(msg) if !msg.is_empty() => Classification::new(ErrorCategory::Unknown, msg),
                _ => Classification::unknown(),
            },
        },
    }
}

fn sold_out() -> Classification {
    Classification {
        force_sold_out: true,
        ..Classification::new(ErrorCategory::SoldOut, SOLD_OUT_MESSAGE)
    }
}

fn classify_message(text: &str) -> Classification {
    // The not-live identifier is recognised but has no message of its own;
    // it keeps the generic fallback and shadows the checks below.
    if text.contains(NOT_LIVE_ERROR_ID) {
        Classification::unknown()
    } else if text.contains(SOLD_OUT_ERROR_ID) {
        Classification::new(ErrorCategory::SoldOut, SOLD_OUT_MESSAGE)
    } else if text.contains(INSUFFICIENT_FUNDS_ERROR_ID) {
        Classification::new(ErrorCategory::InsufficientFunds, INSUFFICIENT_FUNDS_MESSAGE)
    } else {
        Classification::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_311_is_sold_out_and_forces_flag() {
        let c = classify(&ChainError::program(311));
        assert_eq!(c.category, ErrorCategory::SoldOut);
        assert_eq!(c.message, "SOLD OUT!");
        assert!(c.force_sold_out);
    }

    #[test]
    fn code_312_is_not_started() {
        let c = classify(&ChainError::Program {
            code: 312,
            msg: Some("Candy machine is not live!".to_string()),
        });
        assert_eq!(c.category, ErrorCategory::NotStarted);
        assert_eq!(c.message, "Minting period hasn't started yet.");
        assert!(!c.force_sold_out);
    }

    #[test]
    fn other_codes_use_their_own_description() {
        let c = classify(&ChainError::Program {
            code: 6000,
            msg: Some("Account does not have correct owner!".to_string()),
        });
        assert_eq!(c.category, ErrorCategory::Unknown);
        assert_eq!(c.message, "Account does not have correct owner!");

        let c = classify(&ChainError::program(6000));
        assert_eq!(c.message, "Minting failed! Please try again!");
    }

    #[test]
    fn candy_machine_program_codes() {
        let c = classify(&ChainError::Program {
            code: 6010,
            msg: Some("Candy machine is empty!".to_string()),
        });
        assert_eq!(c.category, ErrorCategory::SoldOut);
        assert!(c.force_sold_out);

        let c = classify(&ChainError::program(6011));
        assert_eq!(c.category, ErrorCategory::NotStarted);

        let c = classify(&ChainError::Program {
            code: 6008,
            msg: Some("Not enough SOL to pay for this minting".to_string()),
        });
        assert_eq!(c.category, ErrorCategory::InsufficientFunds);
        assert_eq!(
            c.message,
            "Insufficient funds to mint. Please fund your wallet."
        );

        let c = classify_mint_error(&MintError::OnChainFailure {
            signature: "sig".to_string(),
            error: TransactionError::InstructionError(4, InstructionError::Custom(6010)),
        });
        assert_eq!(c.category, ErrorCategory::SoldOut);
        assert!(c.force_sold_out);
    }

    #[test]
    fn sold_out_identifier_in_text() {
        let c = classify(&ChainError::message(
            "Transaction simulation failed: custom program error: 0x137",
        ));
        assert_eq!(c.category, ErrorCategory::SoldOut);
        assert_eq!(c.message, "SOLD OUT!");
        assert!(!c.force_sold_out);
    }

    #[test]
    fn insufficient_funds_identifier_in_text() {
        let c = classify(&ChainError::message("custom program error: 0x135"));
        assert_eq!(c.category, ErrorCategory::InsufficientFunds);
        assert_eq!(
            c.message,
            "Insufficient funds to mint. Please fund your wallet."
        );
    }

    #[test]
    fn not_live_identifier_keeps_generic_message() {
        let c = classify(&ChainError::message("custom program error: 0x138"));
        assert_eq!(c.category, ErrorCategory::Unknown);
        assert_eq!(c.message, "Minting failed! Please try again!");
    }

    #[test]
    fn unmatched_text_falls_back() {
        let c = classify(&ChainError::message("blockhash not found"));
        assert_eq!(c, Classification::unknown());
    }

    #[test]
    fn timeout_is_generic() {
        let c = classify_mint_error(&MintError::ConfirmationTimeout {
            signature: "sig".to_string(),
            timeout_ms: 30_000,
        });
        assert_eq!(c.category, ErrorCategory::Unknown);
        assert_eq!(c.message, "Minting failed! Please try again!");
    }

    #[test]
    fn landed_failures() {
        let c = classify_mint_error(&MintError::OnChainFailure {
            signature: "sig".to_string(),
            error: TransactionError::InstructionError(4, InstructionError::Custom(311)),
        });
        assert_eq!(c.category, ErrorCategory::SoldOut);
        assert!(c.force_sold_out);

        let c = classify_mint_error(&MintError::OnChainFailure {
            signature: "sig".to_string(),
            error: TransactionError::AccountNotFound,
        });
        assert_eq!(c.category, ErrorCategory::Unknown);
        assert_eq!(c.message, "Mint failed! Please try again!");
    }
}
