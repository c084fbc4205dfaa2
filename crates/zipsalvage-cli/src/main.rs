//! zipsalvage CLI - bulk ZIP extraction that recovers members whose stored
//! paths cannot be written.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use zipsalvage_core::CancellationToken;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match run(&cli, &*formatter) {
        Ok(code) => code,
        Err(err) => {
            formatter.format_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli, formatter: &dyn output::OutputFormatter) -> Result<ExitCode> {
    if let cli::Commands::Completion(args) = &cli.command {
        commands::completion::execute(args.shell);
        return Ok(ExitCode::SUCCESS);
    }

    let display = progress::create_display(cli.quiet, cli.json);
    let _log = logging::init(
        &logging::LogOptions {
            verbose: cli.verbose,
            quiet: cli.quiet,
            log_dir: &cli.log_dir,
            file: !cli.no_log_file,
        },
        &display,
    )?;

    match &cli.command {
        cli::Commands::Extract(args) => {
            let cancel = install_interrupt_handler()?;
            commands::extract::execute(args, formatter, &display, cancel)
        }
        cli::Commands::Survey(args) => {
            commands::survey::execute(args, formatter)?;
            Ok(ExitCode::SUCCESS)
        }
        cli::Commands::List(args) => {
            commands::list::execute(args, formatter)?;
            Ok(ExitCode::SUCCESS)
        }
        cli::Commands::Completion(_) => Ok(ExitCode::SUCCESS),
    }
}

/// First Ctrl-C stops the batch after the current member; a second one
/// exits immediately.
fn install_interrupt_handler() -> Result<CancellationToken> {
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            std::process::exit(130);
        }
        tracing::warn!("interrupt received, stopping after the current member");
        handler_token.cancel();
    })
    .context("failed to install Ctrl-C handler")?;
    Ok(cancel)
}
