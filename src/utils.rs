use anchor_client::solana_sdk::pubkey::Pubkey;
pub use indicatif::{ProgressBar, ProgressStyle};

pub fn spinner_with_style() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(120);
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "▹▹▹▹▹",
                "▸▹▹▹▹",
                "▹▸▹▹▹",
                "▹▹▸▹▹",
                "▹▹▹▸▹",
                "▹▹▹▹▸",
                "▪▪▪▪▪",
            ])
            .template("{spinner:.dim} {msg}"),
    );
    pb
}

pub fn progress_bar_with_style(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    // forces the progress bar to show immediately
    pb.tick();
    pb.enable_steady_tick(1000);
    pb.set_style(
        ProgressStyle::default_bar().template("[{elapsed_precise}] {msg}{wide_bar} {pos}/{len}"),
    );
    pb
}

/// Wallet address as shown next to the balance: first and last four
/// characters.
pub fn shorten_address(address: &Pubkey) -> String {
    let address = address.to_string();
    let len = address.len();

    if len <= 8 {
        return address;
    }

    format!("{}..{}", &address[..4], &address[len - 4..])
}
