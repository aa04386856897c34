use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "shift",
    about = "Shift: a local-first token ledger with lazy session accrual",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (TOML). Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "shift.toml")]
    pub config: PathBuf,

    /// Chain file, overriding the configured path.
    #[arg(long, global = true)]
    pub chain: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an account and register it with the service
    Register(RegisterArgs),
    /// Start a scooping session
    Start,
    /// Show the current balance, settling an expired session
    Balance,
    /// Show account, session, and last error
    Status,
    /// List bookings, newest first
    Bookings,
    /// Fetch and show the welcome message
    Message,
    /// Fetch and list referred accounts
    Mates,
    /// Show the effective configuration
    Config,
}

#[derive(Args)]
pub struct RegisterArgs {
    pub name: String,
    /// Referrer account id, or `me` for none
    #[arg(long, default_value = "me")]
    pub referrer: String,
}
