use clap::Parser;
use log::info;
use solana_wallet_tracker::blockchain::{HeliusClient, TokioSleeper, WalletMonitor, WalletMonitorConfig};
use solana_wallet_tracker::config::AppConfig;
use solana_wallet_tracker::logging::init_logging;
use solana_wallet_tracker::notify::TelegramNotifier;

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Polls Helius for new transactions on tracked Solana wallets")]
#[command(version)]
struct Args {
    /// TOML configuration file (defaults to $CONFIG_FILE or ./config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Wallet to track as ADDRESS or ADDRESS=Label; repeat to track several.
    /// Replaces configured wallets
    #[arg(short, long = "wallet")]
    wallets: Vec<String>,

    /// Seconds to wait between polling cycles
    #[arg(short, long)]
    interval: Option<u64>,

    /// Run a single polling cycle and exit
    #[arg(long)]
    once: bool,

    /// Print a sample configuration file and exit
    #[arg(long)]
    sample_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.sample_config {
        print!("{}", AppConfig::generate_sample_config()?);
        return Ok(());
    }

    // Command line flags override file and environment values
    let mut config = AppConfig::resolve(args.config.as_deref())?;
    if !args.wallets.is_empty() {
        config.set_wallets(args.wallets);
    }
    if let Some(interval) = args.interval {
        config.tracker.poll_interval_seconds = interval;
    }
    config.validate()?;

    init_logging(&config.logging)?;
    info!("Loaded configuration for {} wallets", config.tracker.wallets.len());

    let client = HeliusClient::new(&config.helius)?;
    let telegram = TelegramNotifier::from_config(&config.telegram, config.helius.timeout_seconds)?;
    let mut monitor = WalletMonitor::new(
        client,
        TokioSleeper,
        std::io::stdout(),
        config.tracker.wallets.clone(),
        Some(WalletMonitorConfig::from(&config.tracker)),
    )
    .with_labels(config.tracker.labels.clone())
    .with_notifier(telegram);

    monitor.write_banner()?;
    monitor.run_cycles(if args.once { Some(1) } else { None }).await?;

    Ok(())
}
