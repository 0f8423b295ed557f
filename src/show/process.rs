use chrono::NaiveDateTime;
use console::style;
use mpl_candy_machine::WhitelistMintMode;

use crate::chain::RpcCandyMachineClient;
use crate::common::*;
use crate::session::MintSessionController;
use crate::utils::*;

pub struct ShowArgs {
    pub keypair: Option<String>,
    pub rpc_url: Option<String>,
    pub settings: String,
    pub candy_machine: Option<String>,
}

pub async fn process_show(args: ShowArgs) -> Result<()> {
    println!(
        "{} {}Looking up candy machine",
        style("[1/1]").bold().dim(),
        LOOKING_GLASS_EMOJI
    );

    let pb = spinner_with_style();
    pb.set_message("Connecting...");

    // the candy machine id specified takes precedence over the one from the settings file
    let settings = resolve_settings(
        get_settings_data(&args.settings)?,
        SettingsOverrides {
            candy_machine: args.candy_machine,
            ..Default::default()
        },
    )?;

    let session_config = session_setup(args.keypair, args.rpc_url)?;
    let rpc_client = setup_client(&session_config, settings.commitment);
    let client = Arc::new(RpcCandyMachineClient::new(
        rpc_client,
        session_config.keypair,
    ));
    let public_address = client.payer();

    let controller = MintSessionController::new(client, settings);
    let candy_machine_id = controller.settings().candy_machine_id;
    let connected = controller.connect(public_address).await;
    pb.finish_and_clear();
    connected?;

    let now_ms = controller.now_ms();
    let state = controller.state();
    let snapshot = state
        .snapshot
        .clone()
        .ok_or_else(|| anyhow!("Candy machine {} could not be loaded", candy_machine_id))?;

    println!(
        "\n{}{} {} ({})",
        COMPUTER_EMOJI,
        style("Wallet:").dim(),
        shorten_address(&public_address),
        state
            .balance_sol()
            .map(|balance| format!("◎{:.4}", balance))
            .unwrap_or_else(|| "unknown balance".to_string())
    );

    println!(
        "\n{}{} {}",
        CANDY_EMOJI,
        style("Candy machine ID:").dim(),
        &candy_machine_id
    );

    println!(" {}", style(":").dim());
    print_with_style("", "wallet", snapshot.program_handle.wallet.to_string());

    if let Some(token_mint) = snapshot.program_handle.token_mint {
        print_with_style("", "token mint", token_mint.to_string());
    }

    print_with_style("", "items available", snapshot.items_available.to_string());
    print_with_style("", "items redeemed", snapshot.items_redeemed.to_string());
    print_with_style("", "items remaining", snapshot.items_remaining.to_string());

    print_with_style(
        "",
        "price",
        format!(
            "◎{} ({})",
            snapshot.program_handle.price as f64 / LAMPORTS_PER_SOL as f64,
            snapshot.program_handle.price
        ),
    );

    if let Some(date) = snapshot.go_live_date {
        let date = NaiveDateTime::from_timestamp_opt(date, 0)
            .map(|date| date.format("%a %B %e %Y %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| date.to_string());
        print_with_style("", "go live date", date);
    } else {
        print_with_style("", "go live date", "none".to_string());
    }

    if let Some(whitelist_settings) = &snapshot.program_handle.whitelist_mint_settings {
        print_with_style("", "whitelist mint settings", "".to_string());
        print_with_style(
            ":   ",
            "mode",
            if whitelist_settings.mode == WhitelistMintMode::BurnEveryTime {
                "burn every time".to_string()
            } else {
                "never burn".to_string()
            },
        );
        print_with_style(":   ", "mint", whitelist_settings.mint.to_string());
        print_with_style(":   ", "presale", whitelist_settings.presale.to_string());
    } else {
        print_with_style("", "whitelist mint settings", "none".to_string());
    }

    print_with_style(
        "",
        "gatekeeper",
        if snapshot.program_handle.has_gatekeeper {
            "yes (not supported for minting)".to_string()
        } else {
            "none".to_string()
        },
    );

    // mint status

    print_with_style("", "mint status", "".to_string());
    print_with_style(
        "    ",
        "live",
        state.activation.is_active().to_string(),
    );
    print_with_style("    ", "sold out", state.sold_out.to_string());
    print_with_style("    ", "button", state.mint_button_label(now_ms, 1));

    Ok(())
}

fn print_with_style(indent: &str, key: &str, value: String) {
    println!(
        " {} {}",
        style(format!("{}:.. {}:", indent, key)).dim(),
        value
    );
}
