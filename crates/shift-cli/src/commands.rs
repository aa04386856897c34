use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use shift_ledger::{Accrual, Chain, LoggedError, MintingPolicy};
use shift_store::{ChainSealer, FileChainStore};
use shift_sync::SyncClient;
use shift_types::Referrer;
use tracing::debug;

use crate::cli::*;
use crate::config::ShiftConfig;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = ShiftConfig::load(&cli.config)?;
    if let Some(chain) = cli.chain {
        config.chain_path = chain;
    }

    match cli.command {
        Command::Config => cmd_config(&config),
        command => run_with_client(command, &config).await,
    }
}

async fn run_with_client(command: Command, config: &ShiftConfig) -> anyhow::Result<()> {
    let mut client = open_client(config)?;
    let mark = client.chain().errors().len();

    let result = match command {
        Command::Register(args) => cmd_register(&mut client, args).await,
        Command::Start => cmd_start(&mut client).await,
        Command::Balance => cmd_balance(&mut client),
        Command::Status => cmd_status(&client),
        Command::Bookings => cmd_bookings(&client),
        Command::Message => cmd_message(&mut client).await,
        Command::Mates => cmd_mates(&mut client).await,
        Command::Config => cmd_config(config),
    };

    report_errors(client.chain().errors().since(mark));
    result
}

fn open_client(config: &ShiftConfig) -> anyhow::Result<SyncClient> {
    let key = config.envelope_key();
    debug!(path = %config.chain_path.display(), key = %key.fingerprint(), "opening chain");
    let store = FileChainStore::new(&config.chain_path, ChainSealer::new(key));
    let chain = Chain::open(Arc::new(store), MintingPolicy::default())
        .with_context(|| format!("cannot open chain {}", config.chain_path.display()))?;
    Ok(SyncClient::connect(chain, config.remote.clone())?)
}

async fn cmd_register(client: &mut SyncClient, args: RegisterArgs) -> anyhow::Result<()> {
    if client.chain().identity().is_registered() {
        bail!(
            "an account already exists in {} ({})",
            client.chain().location(),
            client.chain().identity().name()
        );
    }
    let referrer = Referrer::parse(&args.referrer);
    let id = client.create_account(&args.name, &referrer).await?;
    println!("{} Registered {}", "✓".green().bold(), args.name.bold());
    println!("  Account: {}", id.to_string().cyan());
    println!("  Balance: {} THX", client.chain().balance());
    Ok(())
}

async fn cmd_start(client: &mut SyncClient) -> anyhow::Result<()> {
    let now = Utc::now();
    let notified = client.start_session(now).await?;
    println!(
        "{} Scooping started at {}",
        "✓".green().bold(),
        local_time(now.timestamp()).yellow()
    );
    if !notified {
        println!("  {}", "service was not notified".dimmed());
    }
    Ok(())
}

fn cmd_balance(client: &mut SyncClient) -> anyhow::Result<()> {
    let milli = client.chain_mut().current_balance(Utc::now())?;
    println!("{} THX", format_milli(milli).bold());
    Ok(())
}

fn cmd_status(client: &SyncClient) -> anyhow::Result<()> {
    let chain = client.chain();
    let identity = chain.identity();
    if !identity.is_registered() {
        println!("No account yet. Run {} first.", "shift register <name>".bold());
        return Ok(());
    }

    println!("Account {} ({})", identity.name().bold(), identity.id().to_string().cyan());
    if !identity.is_self_referred() {
        println!("  Referred by: {}", identity.referrer_id().to_string().cyan());
    }
    println!("  Balance: {} THX", identity.balance().to_string().bold());
    println!("  Bookings: {}", chain.ledger().count());

    match chain.minted_balance(Utc::now()) {
        Accrual::Idle { .. } => println!("  Session: {}", "idle".dimmed()),
        Accrual::Accruing { milli, elapsed_secs } => {
            let left = (chain.policy().window_secs - elapsed_secs).max(0);
            println!(
                "  Session: {} since {} ({} left, {} THX so far)",
                "scooping".green(),
                local_time(chain.session().as_secs()),
                hours_minutes(left),
                format_milli(milli)
            );
        }
        Accrual::Expired { .. } => println!(
            "  Session: {} (run {} to collect)",
            "finished".yellow(),
            "shift balance".bold()
        ),
    }
    println!("  Chain: {}", chain.location().dimmed());
    println!("  Last error: {}", chain.errors().last_message());
    Ok(())
}

fn cmd_bookings(client: &SyncClient) -> anyhow::Result<()> {
    let ledger = client.chain().ledger();
    if ledger.is_empty() {
        println!("No bookings.");
        return Ok(());
    }
    for booking in ledger {
        println!(
            "{}  {:>8}  {}",
            booking.date().to_string().dimmed(),
            booking.amount().to_string().green(),
            booking.description()
        );
    }
    println!("{}", format!("{} bookings, {} THX", ledger.count(), client.chain().balance()).bold());
    Ok(())
}

async fn cmd_message(client: &mut SyncClient) -> anyhow::Result<()> {
    if !client.fetch_message().await? {
        println!("{}", "No account yet; showing the default message.".dimmed());
    }
    println!("{}", client.message());
    Ok(())
}

async fn cmd_mates(client: &mut SyncClient) -> anyhow::Result<()> {
    if !client.fetch_peers().await? {
        println!("No account yet. Run {} first.", "shift register <name>".bold());
        return Ok(());
    }
    if client.peers().is_empty() {
        println!("No mates yet.");
        return Ok(());
    }
    let now = Utc::now();
    let window = client.chain().policy().window_secs;
    for peer in client.peers() {
        let state = if peer.scooping.is_scooping(now.timestamp(), window) {
            "scooping".green()
        } else {
            "idle".dimmed()
        };
        println!("{:<24} {}  {}", peer.name.bold(), peer.id.short_id().cyan(), state);
    }
    let active = client.active_peers(now).count();
    println!("{} of {} mates scooping", active, client.peers().len());
    Ok(())
}

fn cmd_config(config: &ShiftConfig) -> anyhow::Result<()> {
    print!("{}", config.redacted()?);
    println!("# envelope key fingerprint: {}", config.envelope_key().fingerprint());
    Ok(())
}

fn report_errors(entries: &[LoggedError]) {
    for entry in entries {
        eprintln!("{} {}", "error:".red().bold(), entry);
    }
}

/// Thousandths rendered as a decimal token amount, e.g. `6500` -> `6.500`.
fn format_milli(milli: u64) -> String {
    format!("{}.{:03}", milli / 1000, milli % 1000)
}

fn hours_minutes(secs: i64) -> String {
    format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
}

fn local_time(unix_secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(unix_secs, 0)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| unix_secs.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milli_formatting() {
        assert_eq!(format_milli(0), "0.000");
        assert_eq!(format_milli(6500), "6.500");
        assert_eq!(format_milli(15_000), "15.000");
        assert_eq!(format_milli(1_007), "1.007");
    }

    #[test]
    fn remaining_time_formatting() {
        assert_eq!(hours_minutes(0), "0h00m");
        assert_eq!(hours_minutes(17 * 3600 + 5 * 60 + 59), "17h05m");
    }

    #[test]
    fn out_of_range_time_falls_back_to_seconds() {
        assert_eq!(local_time(i64::MAX), i64::MAX.to_string());
    }

    #[tokio::test]
    async fn status_and_bookings_on_fresh_chain() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShiftConfig {
            chain_path: dir.path().join("shift.db"),
            ..ShiftConfig::default()
        };
        let client = open_client(&config).unwrap();
        cmd_status(&client).unwrap();
        cmd_bookings(&client).unwrap();
        assert!(!config.chain_path.exists());
    }

    #[tokio::test]
    async fn corrupt_chain_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shift.db");
        std::fs::write(&path, b"definitely not a chain").unwrap();
        let config = ShiftConfig {
            chain_path: path.clone(),
            ..ShiftConfig::default()
        };
        let err = open_client(&config).err().unwrap();
        assert!(err.to_string().contains(&path.display().to_string()));
    }
}
