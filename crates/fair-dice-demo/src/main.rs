//! Fair Dice: a non-transitive dice game against the computer.
//!
//! Every random value is produced with the commit-reveal fair-value
//! protocol, so the player can check that the computer did not cheat.

mod cli;
mod console;
mod error;
mod report;
mod session;

use crate::cli::Cli;
use crate::console::Console;
use crate::error::DemoError;
use crate::session::GameSession;
use clap::Parser;
use fair_dice_core::{FairValueProtocol, OsRandomSource, ProtocolConfig};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::process::ExitCode;
use tokio::io::BufReader;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = tokio::select! {
        result = run(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\nGame interrupted. Goodbye!");
            return ExitCode::SUCCESS;
        }
        _ = terminated() => {
            println!("\nGame terminated. Goodbye!");
            return ExitCode::SUCCESS;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(DemoError::Cancelled) => {
            println!("Game cancelled.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr so they never mix with the game dialogue.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::WARN.as_str()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install log subscriber: {}", err);
    }
}

/// Resolves on SIGTERM; never on platforms without it
#[cfg(unix)]
async fn terminated() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(err) => {
            warn!("Cannot listen for SIGTERM: {}", err);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminated() {
    std::future::pending::<()>().await;
}

async fn run(cli: Cli) -> Result<(), DemoError> {
    let dice = cli.dice_set()?;
    println!("Dice configurations loaded:");
    for (i, d) in dice.iter().enumerate() {
        println!("  Dice {}: [{}]", i, d);
    }

    let protocol =
        FairValueProtocol::with_config(OsRandomSource::default(), ProtocolConfig::from_env());
    info!("Protocol configuration: {:?}", protocol.config());
    let console = Console::new(BufReader::new(tokio::io::stdin()), std::io::stdout());

    let mut session = GameSession::new(dice, protocol, console, SmallRng::from_entropy())?;
    let outcome = session.play().await?;
    info!("Outcome: {:?}", outcome);
    Ok(())
}
