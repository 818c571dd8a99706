//! zapple-pay: set up Zapple Pay reaction zaps and autozaps from a terminal

use clap::Parser;
use tracing_subscriber::EnvFilter;

use zapple_pay_core::domain::display_npub;
use zapple_pay_core::{parse_public_key, AuthToken, AuthorizationParams};

mod bridge;
mod cli;
mod desktop;
mod validation;

use bridge::ZappleBridge;
use cli::{Cli, Command};
use validation::{AutozapForm, ReactionForm};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let bridge = ZappleBridge::new(cli.config())?;

    match cli.command {
        Command::React {
            npub,
            amount,
            emoji,
            donate_damus,
            donate_opensats,
            wallet,
        } => {
            let valid = ReactionForm {
                npub,
                amount,
                emoji,
                donate_damus,
                donate_opensats,
                nwc: wallet.nwc,
            }
            .validate()?;

            let token = match valid.manual_nwc {
                Some(_) => None,
                None => Some(
                    connect_wallet(&bridge, valid.authorization_params(), wallet.open_wallet)
                        .await?,
                ),
            };
            let (emoji, amount_sats) = (valid.emoji.clone(), valid.amount_sats);
            bridge
                .submit_reaction(&valid.into_subscription(token)?)
                .await?;
            println!("Saved! React with {emoji} and Zapple Pay will zap {amount_sats} sats.");
        }
        Command::Autozap {
            to_npub,
            amount,
            interval,
            from_npub,
            wallet,
        } => {
            let valid = AutozapForm {
                to_npub,
                amount,
                interval,
                from_npub,
                nwc: wallet.nwc,
            }
            .validate()?;

            let recipient = bridge
                .lookup_profile(&valid.to)
                .await
                .and_then(|profile| profile.label().map(str::to_owned))
                .unwrap_or_else(|| display_npub(&valid.to));
            println!(
                "Autozap {recipient} {} sats every {}",
                valid.amount_sats, valid.interval
            );

            let token = match valid.manual_nwc {
                Some(_) => None,
                None => Some(
                    connect_wallet(&bridge, valid.authorization_params(), wallet.open_wallet)
                        .await?,
                ),
            };
            bridge
                .submit_autozap(&valid.into_subscription(token)?)
                .await?;
            println!("Saved! {recipient} will be zapped on schedule.");
        }
        Command::Profile { npub } => {
            let pubkey = parse_public_key(&npub)?;
            match bridge.lookup_profile(&pubkey).await {
                Some(profile) => {
                    println!("{}", profile.label().unwrap_or("(no name)"));
                    for (field, value) in [
                        ("nip05", &profile.nip05),
                        ("lud16", &profile.lud16),
                        ("picture", &profile.picture),
                        ("about", &profile.about),
                    ] {
                        if let Some(value) = value {
                            println!("  {field}: {value}");
                        }
                    }
                }
                None => println!("No profile found for {}", display_npub(&pubkey)),
            }
        }
    }

    Ok(())
}

async fn connect_wallet(
    bridge: &ZappleBridge,
    params: AuthorizationParams,
    open_wallet: bool,
) -> eyre::Result<AuthToken> {
    let request = bridge.request_wallet(params).await?;
    println!("Scan or paste this connection into your wallet:\n");
    if let Some(qr) = desktop::render_qr(&request.uri) {
        println!("{qr}");
    }
    println!("  {}\n", request.uri);
    if desktop::copy_to_clipboard(&request.uri) {
        println!("(copied to clipboard)");
    }

    let link = bridge.wallet_link(&request)?;
    if open_wallet {
        desktop::open_url(&link);
    } else {
        println!("Or open {link}");
    }

    let token = bridge.await_approval().await?;
    println!("Wallet connected.");
    Ok(token)
}
