use console::{style, StyledObject};

use crate::chain::RpcCandyMachineClient;
use crate::common::*;
use crate::session::{AlertNotice, MintAttempt, MintSessionController, MintStatus, Severity};
use crate::utils::*;

pub struct MintArgs {
    pub keypair: Option<String>,
    pub rpc_url: Option<String>,
    pub settings: String,
    pub candy_machine: Option<String>,
    pub config: Option<String>,
    pub treasury: Option<String>,
    pub start_date: Option<String>,
    pub tx_timeout: Option<u64>,
    pub commitment: Option<String>,
    pub number: Option<u64>,
    pub no_wait: bool,
}

pub async fn process_mint(args: MintArgs) -> Result<()> {
    let number = args.number.unwrap_or(1);

    if number == 0 {
        let error = anyhow!("Number of NFTs to mint must be at least 1");
        error!("{:?}", error);
        return Err(error);
    }

    let settings_data = get_settings_data(&args.settings)?;
    let settings = resolve_settings(
        settings_data,
        SettingsOverrides {
            candy_machine: args.candy_machine,
            config: args.config,
            treasury: args.treasury,
            start_date: args.start_date,
            tx_timeout: args.tx_timeout,
            commitment: args.commitment,
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

    // connecting

    println!(
        "{} {}Connecting wallet",
        style("[1/3]").bold().dim(),
        COMPUTER_EMOJI
    );

    let pb = spinner_with_style();
    pb.set_message("Loading candy machine...");
    let connected = controller.connect(public_address).await;
    pb.finish_and_clear();
    connected?;

    let state = controller.state();

    println!(
        "{} {} ({})",
        style("Wallet:").bold(),
        shorten_address(&public_address),
        public_address
    );
    if let Some(balance) = state.balance_sol() {
        println!("{} ◎{:.4}", style("Balance:").bold(), balance);
    }
    println!(
        "{} {}",
        style("Candy machine ID:").bold(),
        controller.settings().candy_machine_id
    );
    if let Some(snapshot) = &state.snapshot {
        println!(
            "{} {} / {} ({} remaining)",
            style("Redeemed:").bold(),
            snapshot.items_redeemed,
            snapshot.items_available,
            snapshot.items_remaining
        );
    }

    if state.sold_out {
        let error = anyhow!("{}", SOLD_OUT_MESSAGE);
        error!("{:?}", error);
        return Err(error);
    }

    if let Some(snapshot) = &state.snapshot {
        if number > snapshot.items_remaining {
            let error = anyhow!(
                "{} item(s) available, requested {}",
                snapshot.items_remaining,
                number
            );
            error!("{:?}", error);
            return Err(error);
        }
    }

    // waiting for go-live

    println!(
        "\n{} {}Checking go-live date",
        style("[2/3]").bold().dim(),
        TIMER_EMOJI
    );

    controller.observe_activation();

    if !controller.state().activation.is_active() {
        if args.no_wait {
            let label = controller
                .state()
                .mint_button_label(controller.now_ms(), number as usize);
            let error = anyhow!("{} Minting opens in {}", NOT_STARTED_MESSAGE, label);
            error!("{:?}", error);
            return Err(error);
        }

        let pb = spinner_with_style();
        controller
            .wait_for_activation(|countdown| {
                pb.set_message(
                    style(format!("Minting opens in {}", countdown))
                        .dim()
                        .to_string(),
                );
            })
            .await?;
        pb.finish_and_clear();
    }

    println!("Minting is live!");

    // minting

    println!(
        "\n{} {}Minting from candy machine",
        style("[3/3]").bold().dim(),
        CANDY_EMOJI
    );

    let attempts: Vec<MintAttempt> = if number == 1 {
        let pb = spinner_with_style();
        pb.set_message(
            controller
                .state()
                .mint_button_label(controller.now_ms(), 1),
        );
        let attempt = controller.mint().await;
        pb.finish_and_clear();
        vec![attempt?]
    } else {
        let pb = progress_bar_with_style(number);
        pb.set_message(
            controller
                .state()
                .mint_button_label(controller.now_ms(), number as usize),
        );
        let results = controller.mint_many(number as usize).await;
        pb.set_position(results.len() as u64);
        pb.finish();

        results.into_iter().collect::<Result<Vec<_>, _>>()?
    };

    for attempt in &attempts {
        print_attempt(attempt);
    }

    let state = controller.state();
    print_alert(&state.alert);

    if let Some(snapshot) = &state.snapshot {
        println!(
            "\n{} {} / {} ({} remaining)",
            style("Redeemed:").bold(),
            snapshot.items_redeemed,
            snapshot.items_available,
            snapshot.items_remaining
        );
    }
    if let Some(balance) = state.balance_sol() {
        println!("{} ◎{:.4}", style("Balance:").bold(), balance);
    }

    let succeeded = attempts
        .iter()
        .filter(|attempt| attempt.status == MintStatus::Succeeded)
        .count();

    info!("{} of {} mint(s) succeeded", succeeded, attempts.len());

    if succeeded == 0 {
        let message = attempts
            .last()
            .and_then(|attempt| attempt.message.clone())
            .unwrap_or_else(|| MINTING_FAILED_MESSAGE.to_string());
        return Err(anyhow!(message));
    }

    if succeeded < attempts.len() {
        println!(
            "\n{}{} of {} mint(s) succeeded",
            WARNING_EMOJI,
            succeeded,
            attempts.len()
        );
    }

    Ok(())
}

fn print_attempt(attempt: &MintAttempt) {
    let signature = attempt
        .transaction_id
        .as_deref()
        .unwrap_or("not submitted");

    match attempt.status {
        MintStatus::Succeeded => println!(
            "{} {}",
            style("Signature:").bold(),
            signature
        ),
        _ => println!(
            "{} {} ({})",
            style("Failed:").red().bold(),
            attempt.message.as_deref().unwrap_or(MINTING_FAILED_MESSAGE),
            signature
        ),
    }
}

fn print_alert(alert: &AlertNotice) {
    if !alert.visible {
        return;
    }

    let message: StyledObject<&str> = match alert.severity {
        Severity::Success => style(alert.message.as_str()).green().bold(),
        Severity::Info => style(alert.message.as_str()).bold(),
        Severity::Warning => style(alert.message.as_str()).yellow().bold(),
        Severity::Error => style(alert.message.as_str()).red().bold(),
    };

    let emoji = match alert.severity {
        Severity::Success => CONFETTI_EMOJI,
        Severity::Error => ERROR_EMOJI,
        _ => WARNING_EMOJI,
    };

    println!("\n{}{}", emoji, message);
}
