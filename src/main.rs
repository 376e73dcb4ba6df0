//! chronosort - merge photos from several cameras into one timeline
//!
//! A CLI tool that sorts a folder of photos by capture time, correcting
//! clock drift between cameras, and copies them under ranked names.

use anyhow::{Context, Result};
use chronosort::{Cli, Command, Config, Organizer, RunSummary};
use clap::Parser;
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Colored terminal output for the run summary

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(&format!("{}\n", "─".repeat(60))));
    }

    /// Print a centered title
    pub fn print_title(title: &str) {
        let width: usize = 60;
        let padding = width.saturating_sub(title.len()) / 2;
        let left_pad = " ".repeat(padding.saturating_sub(1));

        let _ = stdout().execute(Print(&format!(
            "{}{} {}{}\n",
            left_pad,
            "╔".bold().stylize(),
            title.bold().stylize(),
            "╗".bold().stylize(),
        )));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_hint(msg: &str) {
        let _ = stdout().execute(Print(style("→ ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// Print a statistic line
    pub fn print_stat(key: &str, value: &str, color: Color) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = style(value).with(color).bold();
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print one copy line
    pub fn print_result(status_icon: &str, status_color: Color, source: &str, dest: &str) {
        let icon_styled = style(status_icon).with(status_color).bold();
        let source_styled = style(source).italic();
        let dest_styled = style(dest).with(CliTheme::HINT);

        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(icon_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(source_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(dest_styled));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.command == Some(Command::SampleConfig) {
        print!("{}", Config::sample_config());
        return Ok(());
    }

    let guard = setup_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "chronosort starting");

    if let Err(e) = run(&cli) {
        error!("Run failed: {:#}", e);
        // Flush the file log before exiting
        drop(guard);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.load_config().context("Failed to load configuration")?;

    if cli.verbose {
        info!(?config, "Configuration loaded");
    }

    let organizer = Organizer::new(config);

    match cli.command {
        Some(Command::Models) => {
            for model in organizer.models()? {
                println!("{}", model);
            }
        }
        _ => {
            let summary = organizer.run()?;
            print_summary(&summary, cli.verbose);
            info!(copied = summary.copies.len(), "Processing complete");
        }
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, verbose: bool) {
    use cli_output::*;

    print_separator();
    print_title("Sorting complete");
    print_separator();

    print_blank();
    print_stat("Files scanned", &summary.scanned.to_string(), CliTheme::ACCENT);
    print_stat(
        if summary.dry_run { "Would copy" } else { "Copied" },
        &summary.copies.len().to_string(),
        CliTheme::SUCCESS,
    );
    print_stat("Not images", &summary.not_images.len().to_string(), CliTheme::WARNING);
    print_stat(
        "Missing metadata",
        &summary.incomplete.len().to_string(),
        CliTheme::WARNING,
    );
    print_blank();

    for camera in &summary.unknown_cameras {
        print_warning(&format!("No pictures taken with {}", camera));
    }

    if verbose || summary.dry_run {
        print_separator();
        for (copy, record) in summary.copies.iter().zip(&summary.sorted) {
            print_result(
                if summary.dry_run { "~" } else { "✓" },
                CliTheme::SUCCESS,
                &copy.source.display().to_string(),
                &format!("→ {} ({})", copy.destination.display(), record.capture_time_string()),
            );
        }
    }

    if summary.dry_run {
        print_separator();
        print_hint("Dry run: no files were copied");
    }
}

/// Setup logging: console on stderr, plus an optional log file
fn setup_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    let Some(log_path) = cli.log_file.as_deref() else {
        subscriber.init();
        return Ok(None);
    };

    if let Some(parent) = log_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .init();
    }

    Ok(Some(guard))
}
