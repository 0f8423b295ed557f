use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error parsing the settings file: {0}")]
    ParseError(String),

    #[error("Error opening the settings file: {0}")]
    FileOpenError(String),

    #[error("Missing candy machine id: set `candyMachineId` in the settings file or pass --candy-machine")]
    MissingCandyMachineId,

    #[error("Invalid commitment level: {0}")]
    InvalidCommitment(String),
}
