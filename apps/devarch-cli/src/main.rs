//! devarch CLI binary entry point.
//!
//! Loads `.env`, parses arguments with clap, prepares logging for the
//! selected command and dispatches via [`Cli::run`].

mod cli;
mod logging;
mod output;
mod tui;
mod upload;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Best effort, before tracing is initialized.
    logging::cleanup_old_logs(&cli.work_dir);

    let _guard = logging::init_tracing(&cli.work_dir, cli.command_name(), cli.logs_to_stderr())?;

    cli.run().await
}
