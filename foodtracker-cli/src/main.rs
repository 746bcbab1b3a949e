use std::{fmt::Display, path::PathBuf};

use clap::Parser;
use colored::Colorize;
use sysexits::ExitCode;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::session::Session;

mod meal;
mod session;

#[derive(Parser, Debug)]
#[command(name = "foodtracker")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: meal::Command,

    /// Override the file the meal list is saved to
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    // Logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Unable to set up logging: {e}");
    }

    let cli = Cli::parse();

    let result =
        Session::open(cli.file).and_then(|mut session| meal::handle(&mut session, &cli.command));

    match result {
        Ok(()) => ExitCode::Ok,
        Err(code) => code,
    }
}

/// Print `message` as an error and hand back `code` for the process to exit with.
pub(crate) fn fail(code: ExitCode, message: impl Display) -> ExitCode {
    eprintln!("{} {message}", "error:".red().bold());
    code
}
