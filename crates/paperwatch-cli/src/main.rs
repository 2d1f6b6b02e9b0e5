//! paperwatch - keyword-driven daily paper catalog
//!
//! Queries arXiv for each configured topic, merges the results into a
//! persisted catalog with retention cleanup, and renders it as Markdown.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use cmd::Status;
use config::Config;
use paperwatch_core::ProgressContext;

#[derive(Parser)]
#[command(name = "paperwatch")]
#[command(about = "Keyword-driven daily paper catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./paperwatch.toml or ~/.config/paperwatch/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Read timeout in seconds for stall detection
    #[arg(long, global = true)]
    read_timeout: Option<u64>,

    /// Maximum retry attempts for transient failures
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Refresh every configured topic and write the catalog
    Run(cmd::run::RunArgs),
    /// Summarize the stored catalog or list one topic
    Show(cmd::show::ShowArgs),
    /// Render the stored catalog as Markdown
    Render(cmd::render::RenderArgs),
    /// Check the stored catalog against its manifest
    Verify,
    /// Show current configuration
    Config,
}

fn show_config(config: &Config) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec![
        "Data directory",
        &config.data_dir.display().to_string(),
    ]);
    table.add_row(vec!["Markdown output", &config.render.markdown]);
    table.add_row(vec![
        "Page output",
        config.render.gitpage.as_deref().unwrap_or("none"),
    ]);
    table.add_row(vec![
        "Layout",
        match config.render.style {
            paperwatch_catalog::RenderStyle::Table => "table",
            paperwatch_catalog::RenderStyle::List => "list",
        },
    ]);
    table.add_row(vec!["Max results", &config.max_results.to_string()]);
    table.add_row(vec![
        "Retention",
        &if config.retention.keep_days == 0 {
            "disabled".to_string()
        } else {
            format!("{} days", config.retention.keep_days)
        },
    ]);
    table.add_row(vec![
        "Refresh window",
        &match (&config.refresh.start, &config.refresh.end) {
            (None, None) => "none".to_string(),
            (start, end) => format!(
                "{} .. {}",
                start.as_deref().unwrap_or("open"),
                end.as_deref().unwrap_or("open")
            ),
        },
    ]);
    table.add_row(vec![
        "Prune removed topics",
        if config.prune_removed_topics { "yes" } else { "no" },
    ]);
    table.add_row(vec!["arXiv base URL", &config.arxiv.base_url]);
    table.add_row(vec![
        "arXiv request delay",
        &format!("{}ms", config.arxiv.request_delay_ms),
    ]);
    table.add_row(vec![
        "Read timeout",
        &format!("{}s", config.http.read_timeout),
    ]);
    table.add_row(vec!["Max retries", &config.http.max_retries.to_string()]);
    table.add_row(vec!["Topics", &config.topics.len().to_string()]);

    eprintln!("\n{table}");
}

fn dispatch(cli: Cli, progress: &ProgressContext) -> Result<Status> {
    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    // Config file defaults, CLI overrides
    paperwatch_core::set_http_config(paperwatch_core::HttpConfig {
        read_timeout: std::time::Duration::from_secs(
            cli.read_timeout.unwrap_or(config.http.read_timeout),
        ),
        max_retries: cli.max_retries.unwrap_or(config.http.max_retries),
    });

    match cli.command {
        Command::Run(args) => cmd::run::run(args, &config, progress),
        Command::Show(args) => cmd::show::run(args, &config),
        Command::Render(args) => cmd::render::run(args, &config),
        Command::Verify => cmd::verify::run(&config),
        Command::Config => {
            show_config(&config);
            Ok(Status::Success)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let progress = ProgressContext::new();

    // Logging:
    //   TTY:     quiet (warn) unless --debug, progress bars show activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = is_tty.then(|| progress.multi());
    let quiet = is_tty && !cli.debug;
    if let Err(e) = paperwatch_core::init_logging(quiet, cli.debug, multi) {
        eprintln!("warning: logger already initialized: {e}");
    }

    if let Err(e) = paperwatch_core::install_signal_handlers() {
        log::warn!("failed to install signal handlers: {e}");
    }

    match dispatch(cli, &progress) {
        Ok(status) => status.exit_code(),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(cmd::FATAL)
        }
    }
}
