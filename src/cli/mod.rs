use clap::{AppSettings, Parser, Subcommand};

use crate::constants::DEFAULT_SETTINGS;

#[derive(Parser)]
#[clap(author, version, about)]
#[clap(setting(AppSettings::SubcommandRequiredElseHelp))]
pub struct Cli {
    /// Log level: trace, debug, info, warn, error, off
    #[clap(short, long, global = true)]
    pub log_level: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect the wallet, wait for the go-live date and mint from the candy machine
    Mint {
        /// Path to the keypair file, uses Sol config or defaults to "~/.config/solana/id.json"
        #[clap(short, long)]
        keypair: Option<String>,

        /// RPC Url
        #[clap(short, long)]
        rpc_url: Option<String>,

        /// Path to the mint settings file, defaults to "mint.json"
        #[clap(short, long, default_value = DEFAULT_SETTINGS)]
        settings: String,

        /// Address of candy machine to mint from, overrides the settings file
        #[clap(long)]
        candy_machine: Option<String>,

        /// Address of the config account, defaults to the candy machine
        #[clap(long)]
        config: Option<String>,

        /// Treasury wallet, defaults to the candy machine wallet
        #[clap(long)]
        treasury: Option<String>,

        /// Countdown target used until the candy machine is loaded
        #[clap(long)]
        start_date: Option<String>,

        /// Confirmation timeout in milliseconds, defaults to 30000
        #[clap(long)]
        tx_timeout: Option<u64>,

        /// Commitment level for confirmations, defaults to "confirmed"
        #[clap(long)]
        commitment: Option<String>,

        /// Amount of NFTs to be minted in bulk
        #[clap(short, long)]
        number: Option<u64>,

        /// Fail instead of waiting when minting has not started yet
        #[clap(long)]
        no_wait: bool,
    },

    /// Show the on-chain state of the candy machine and its mint status
    Show {
        /// Path to the keypair file, uses Sol config or defaults to "~/.config/solana/id.json"
        #[clap(short, long)]
        keypair: Option<String>,

        /// RPC Url
        #[clap(short, long)]
        rpc_url: Option<String>,

        /// Path to the mint settings file, defaults to "mint.json"
        #[clap(short, long, default_value = DEFAULT_SETTINGS)]
        settings: String,

        /// Address of candy machine to show, overrides the settings file
        candy_machine: Option<String>,
    },
}
