use console::Emoji;

pub const CANDY_MACHINE_V2: &str = "cndy3Z4yapfJBmL3ShUp5exZKqR3z33thTzeNMm2gRZ";

pub const DEFAULT_RPC_DEVNET: &str = "https://api.devnet.solana.com";

pub const DEFAULT_KEYPATH: &str = "~/.config/solana/id.json";

pub const DEFAULT_SETTINGS: &str = "mint.json";

pub const LOG_FILE: &str = "candy-mint.log";

pub const MINT_LAYOUT: u64 = 82;

/// Default time to wait for a mint transaction to be confirmed.
pub const DEFAULT_TX_TIMEOUT_MS: u64 = 30_000;

/// Interval between signature status polls.
pub const CONFIRMATION_POLL_INTERVAL_MS: u64 = 500;

/// Time an alert stays visible before it hides itself.
pub const ALERT_AUTO_HIDE_MS: i64 = 6_000;

// Candy machine program error codes.
pub const CANDY_MACHINE_EMPTY_CODE: u32 = 311;
pub const CANDY_MACHINE_NOT_LIVE_CODE: u32 = 312;

// Program error identifiers as they appear in unstructured error text.
pub const NOT_LIVE_ERROR_ID: &str = "0x138";
pub const SOLD_OUT_ERROR_ID: &str = "0x137";
pub const INSUFFICIENT_FUNDS_ERROR_ID: &str = "0x135";

pub const MINT_SUCCEEDED_MESSAGE: &str = "Congratulations! Mint succeeded!";
pub const MINT_FAILED_MESSAGE: &str = "Mint failed! Please try again!";
pub const MINTING_FAILED_MESSAGE: &str = "Minting failed! Please try again!";
pub const SOLD_OUT_MESSAGE: &str = "SOLD OUT!";
pub const NOT_STARTED_MESSAGE: &str = "Minting period hasn't started yet.";
pub const INSUFFICIENT_FUNDS_MESSAGE: &str = "Insufficient funds to mint. Please fund your wallet.";

pub const CANDY_EMOJI: Emoji<'_, '_> = Emoji("🍬 ", "");
pub const COMPLETE_EMOJI: Emoji<'_, '_> = Emoji("✅ ", "");
pub const COMPUTER_EMOJI: Emoji<'_, '_> = Emoji("🖥  ", "");
pub const CONFETTI_EMOJI: Emoji<'_, '_> = Emoji("🎉 ", "");
pub const ERROR_EMOJI: Emoji<'_, '_> = Emoji("🛑 ", "");
pub const LOOKING_GLASS_EMOJI: Emoji<'_, '_> = Emoji("🔍 ", "");
pub const TIMER_EMOJI: Emoji<'_, '_> = Emoji("⏳ ", "");
pub const WARNING_EMOJI: Emoji<'_, '_> = Emoji("⚠️  ", "");
