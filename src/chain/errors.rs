use anchor_lang::error::ERROR_CODE_OFFSET;
use mpl_candy_machine::CandyError;
use thiserror::Error;

/// Error reported by the chain or the candy machine program.
///
/// The two shapes are kept apart because they are classified differently: a
/// structured error carries the program's numeric code, an unstructured one
/// only has whatever text the RPC node or the client produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Program error {code}{}", .msg.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Program { code: u32, msg: Option<String> },

    #[error("{0}")]
    Message(String),
}

impl ChainError {
    pub fn program(code: u32) -> Self {
        ChainError::Program { code, msg: None }
    }

    pub fn message<S: Into<String>>(msg: S) -> Self {
        ChainError::Message(msg.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfirmationError {
    #[error("Transaction was not confirmed within {0} ms")]
    Timeout(u64),

    #[error("Failed to poll transaction status: {0}")]
    Rpc(ChainError),
}

/// Looks up a candy machine program error by its on-chain code. Only the
/// errors a mint transaction can run into are known.
pub fn candy_error(code: u32) -> Option<CandyError> {
    use CandyError::*;

    let index = code.checked_sub(ERROR_CODE_OFFSET)?;
    let error = match index {
        i if i == IncorrectOwner as u32 => IncorrectOwner,
        i if i == NumericalOverflowError as u32 => NumericalOverflowError,
        i if i == NotEnoughTokens as u32 => NotEnoughTokens,
        i if i == NotEnoughSOL as u32 => NotEnoughSOL,
        i if i == TokenTransferFailed as u32 => TokenTransferFailed,
        i if i == CandyMachineEmpty as u32 => CandyMachineEmpty,
        i if i == CandyMachineNotLive as u32 => CandyMachineNotLive,
        i if i == DerivedKeyInvalid as u32 => DerivedKeyInvalid,
        i if i == PublicKeyMismatch as u32 => PublicKeyMismatch,
        i if i == NoWhitelistToken as u32 => NoWhitelistToken,
        i if i == TokenBurnFailed as u32 => TokenBurnFailed,
        i if i == GatewayAppMissing as u32 => GatewayAppMissing,
        i if i == GatewayTokenMissing as u32 => GatewayTokenMissing,
        i if i == CannotFindUsableConfigLine as u32 => CannotFindUsableConfigLine,
        i if i == SuspiciousTransaction as u32 => SuspiciousTransaction,
        i if i == IncorrectSlotHashesPubkey as u32 => IncorrectSlotHashesPubkey,
        i if i == SlotHashesEmpty as u32 => SlotHashesEmpty,
        i if i == MetadataAccountMustBeEmpty as u32 => MetadataAccountMustBeEmpty,
        i if i == MissingSetCollectionDuringMint as u32 => MissingSetCollectionDuringMint,
        i if i == IncorrectRemainingAccountsLen as u32 => IncorrectRemainingAccountsLen,
        i if i == MissingFreezeAta as u32 => MissingFreezeAta,
        i if i == IncorrectFreezeAta as u32 => IncorrectFreezeAta,
        _ => return None,
    };

    Some(error)
}
