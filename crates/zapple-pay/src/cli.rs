use clap::{Args, Parser, Subcommand};

use zapple_pay_adapters::ZappleConfig;
use zapple_pay_core::{PollOrdering, TimePeriod};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Zapple Pay API base url
    #[arg(
        long,
        env = "ZAPPLE_API_URL",
        default_value = "https://api.zapplepay.com"
    )]
    pub api_url: String,
    /// Milliseconds between wallet authorization checks
    #[arg(long, default_value_t = 3_000)]
    pub poll_interval_ms: u64,
    /// Give up on a single API request after this many milliseconds
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn config(&self) -> ZappleConfig {
        ZappleConfig {
            poll_interval_ms: self.poll_interval_ms,
            request_timeout_ms: self.request_timeout_ms,
            poll_ordering: PollOrdering::Latest,
            ..ZappleConfig::default()
        }
        .with_api_base_url(&self.api_url)
    }
}

#[derive(Debug, Args)]
pub struct WalletArgs {
    /// Use a Nostr Wallet Connect string instead of authorizing a wallet
    #[arg(long, value_name = "NWC_URI")]
    pub nwc: Option<String>,
    /// Open the wallet's connection screen with the authorization filled in
    #[arg(long)]
    pub open_wallet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Zap a note every time you react to it
    #[command(arg_required_else_help = true)]
    React {
        /// Your npub (or hex pubkey)
        #[arg(long)]
        npub: String,
        /// Sats per zap
        #[arg(long)]
        amount: String,
        /// Reaction that triggers the zap (default 🤙)
        #[arg(long)]
        emoji: Option<String>,
        /// Also donate the same amount to Damus
        #[arg(long)]
        donate_damus: bool,
        /// Also donate the same amount to OpenSats
        #[arg(long)]
        donate_opensats: bool,
        #[command(flatten)]
        wallet: WalletArgs,
    },
    /// Zap someone on a schedule
    #[command(arg_required_else_help = true)]
    Autozap {
        /// Recipient npub (or hex pubkey)
        to_npub: String,
        /// Sats per zap
        #[arg(long)]
        amount: String,
        /// How often to zap: day, week or month
        #[arg(long, default_value_t = TimePeriod::Day)]
        interval: TimePeriod,
        /// Zap from this npub instead of Zapple Pay's
        #[arg(long)]
        from_npub: Option<String>,
        #[command(flatten)]
        wallet: WalletArgs,
    },
    /// Look up someone's Nostr profile
    #[command(arg_required_else_help = true)]
    Profile {
        /// npub (or hex pubkey)
        npub: String,
    },
}
