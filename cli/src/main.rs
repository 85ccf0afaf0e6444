//! CLI entrypoint for haven
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;
mod wiring;

use anyhow::{Result, bail};
use clap::Parser;
use commands::{Cli, Command};
use haven_domain::{Severity, Turn};
use haven_infrastructure::{ConfigLoader, ConfigValidationError, FileConfig};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wiring::App;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConfigLoader::load(cli.config.as_deref())?;

    let log_dir = cli.log_dir.as_deref().or(config.logging.dir.as_deref());
    let _log_guard = init_logging(cli.verbose, config.logging.filter.as_deref(), log_dir);

    match cli.command {
        Command::Config => {
            for source in ConfigLoader::config_sources(cli.config.as_deref()) {
                println!("# source: {}", source.display());
            }
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Command::CheckConfig => check_config(&config),
        Command::Ask { question, details } => {
            let app = start(&config, cli.config.as_deref()).await?;
            let id = app.service.start_session();
            let turn = app.service.submit_turn(&id, &question).await?;
            print_turn(&turn, details);
            app.service.end_session(&id).await?;
            app.shutdown().await;
            Ok(())
        }
        Command::Chat => {
            let app = start(&config, cli.config.as_deref()).await?;
            let result = chat(&app).await;
            app.shutdown().await;
            result
        }
    }
}

/// Console logging by `-v` count (or `RUST_LOG`), plus optional daily files.
fn init_logging(
    verbose: u8,
    configured: Option<&str>,
    log_dir: Option<&Path>,
) -> Option<WorkerGuard> {
    let default = match verbose {
        0 => configured.unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "haven.log"));
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();
    guard
}

fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    if issues.is_empty() {
        println!("Configuration OK");
        return Ok(());
    }
    for issue in &issues {
        let label = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        println!("{:>7}: {}", label, issue.message);
    }
    let errors = issues.iter().filter(|i| i.is_error()).count();
    if errors > 0 {
        bail!("{} configuration error(s)", errors);
    }
    Ok(())
}

/// Validate the config (logging warnings) and build the application.
async fn start(config: &FileConfig, explicit: Option<&Path>) -> Result<App> {
    let warnings = match ConfigLoader::check(config) {
        Ok(warnings) => warnings,
        Err(ConfigValidationError::Invalid(errors)) => {
            for error in &errors {
                eprintln!("error: {}", error.message);
            }
            bail!("{} configuration error(s); run `haven check-config`", errors.len());
        }
        Err(e) => return Err(e.into()),
    };
    for warning in &warnings {
        warn!("{}", warning.message);
    }
    info!(sources = ?ConfigLoader::config_sources(explicit), "Starting haven");
    App::build(config).await
}

async fn chat(app: &App) -> Result<()> {
    let service = &app.service;
    let id = service.start_session();
    println!("haven - disaster-preparedness assistant. Type 'exit' to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let next = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = next else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        let submit = service.submit_turn(&id, line);
        tokio::pin!(submit);
        let turn = tokio::select! {
            turn = &mut submit => turn?,
            _ = tokio::signal::ctrl_c() => {
                service.cancel_turn(&id)?;
                submit.await?
            }
        };
        print_turn(&turn, false);
    }

    let session = service.end_session(&id).await?;
    info!(turns = session.turns().len(), "Chat ended");
    Ok(())
}

fn print_turn(turn: &Turn, details: bool) {
    println!("{}", turn.reply_text());
    if !details {
        return;
    }
    println!();
    let guard = turn.guard_verdict();
    println!("  guard: {} ({})", guard.kind.as_str(), guard.reason);
    for record in turn.tool_calls() {
        let status = match record.error() {
            None => "ok".to_string(),
            Some(e) => e.kind.to_string(),
        };
        println!(
            "  tool {}{}: {} in {} ms, {} retr{}",
            record.tool_name,
            if record.injected { " (injected)" } else { "" },
            status,
            record.latency_ms,
            record.retry_count,
            if record.retry_count == 1 { "y" } else { "ies" },
        );
    }
    if let Some(alert) = turn.alert() {
        println!("  alert: {}", alert.level());
    }
    if !turn.providers().is_empty() {
        println!("  providers: {}", turn.providers().join(", "));
    }
    if let Some(verdict) = turn.validation() {
        println!("  validation: {} {}", verdict.kind, verdict.reason);
    }
}
