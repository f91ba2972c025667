//! Qalais CLI - find the winning cells of a Telegram game field
//!
//! Usage:
//!   qalais <URL> [--endpoint <url>] [--config <file>] [--json] [--verbose]
//!
//! Example:
//!   qalais https://t.me/qalais_bot/1234
//!   qalais https://t.me/qalais_bot/1234 --json

use anyhow::{Context, Result};
use colored::Colorize;
use qalais::notify::ConsoleNotifier;
use qalais::page::{AnalysisOutcome, AnalyzerPage};
use qalais::render::{self, HINT, LOADING, SUBTITLE, TITLE};
use qalais::AnalyzerConfig;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn print_usage() {
    eprintln!(
        r#"
{} - {}

{}
    qalais <URL> [OPTIONS]

{}
    <URL>      Link to the bot message or image with the game field

{}
    -e, --endpoint <URL>        Analysis service URL (overrides config)
    -c, --config <FILE>         Read settings from a TOML file
    -t, --timeout <SECS>        Give up on the request after SECS seconds
    --json                      Print the final page state as JSON on stdout
    -v, --verbose               Log requests
    -vv                         Extra verbose (debug logging)
    --dry-run                   Show what would be done without sending anything
    -h, --help                  Print this help message

{}
    qalais https://t.me/qalais_bot/1234
    qalais https://t.me/qalais_bot/1234 --json
    qalais https://t.me/qalais_bot/1234 -e http://localhost:9000/analyze
"#,
        TITLE.bold(),
        SUBTITLE,
        "USAGE:".bold(),
        "ARGS:".bold(),
        "OPTIONS:".bold(),
        "EXAMPLES:".bold(),
    );
}

struct CliArgs {
    url: String,
    endpoint: Option<String>,
    config: Option<PathBuf>,
    timeout_secs: Option<u64>,
    json: bool,
    verbose: u8, // 0=off, 1=info, 2=debug
    dry_run: bool,
}

/// Parse `argv`, program name included. The URL must come first.
fn parse_args(args: &[String]) -> Result<CliArgs> {
    let url = args.get(1).cloned().unwrap_or_default();
    if url.starts_with('-') {
        anyhow::bail!("Expected the URL before any options, got {}", url);
    }

    let mut endpoint = None;
    let mut config = None;
    let mut timeout_secs = None;
    let mut json = false;
    let mut verbose: u8 = 0;
    let mut dry_run = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--endpoint" | "-e" => {
                i += 1;
                if i < args.len() {
                    endpoint = Some(args[i].clone());
                }
            }
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config = Some(PathBuf::from(&args[i]));
                }
            }
            "--timeout" | "-t" => {
                i += 1;
                if i < args.len() {
                    let secs = args[i]
                        .parse::<u64>()
                        .with_context(|| format!("Invalid timeout: {}", args[i]))?;
                    timeout_secs = Some(secs);
                }
            }
            "--json" => {
                json = true;
            }
            "--verbose" | "-v" => {
                verbose = verbose.max(1);
            }
            "-vv" => {
                verbose = 2;
            }
            "--dry-run" => {
                dry_run = true;
            }
            other => {
                eprintln!("{} ignoring unknown argument {}", "Warning:".yellow(), other);
            }
        }
        i += 1;
    }

    Ok(CliArgs {
        url,
        endpoint,
        config,
        timeout_secs,
        json,
        verbose,
        dry_run,
    })
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn print_header(url: &str, config: &AnalyzerConfig) {
    eprintln!();
    eprintln!("{}  {}", "🎮".bold(), TITLE.bold().magenta());
    eprintln!("   {}", SUBTITLE.dimmed());
    eprintln!();
    eprintln!("   {}     {}", "Link:".dimmed(), url);
    eprintln!("   {} {}", "Service:".dimmed(), config.endpoint);
    if let Some(secs) = config.timeout_secs {
        eprintln!("   {} {}s", "Timeout:".dimmed(), secs);
    }
    eprintln!();
}

#[tokio::main]
async fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args().collect();
    if argv.len() < 2 || argv.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        std::process::exit(if argv.len() < 2 { 1 } else { 0 });
    }

    let args = parse_args(&argv)?;
    init_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if args.timeout_secs.is_some() {
        config.timeout_secs = args.timeout_secs;
    }

    print_header(&args.url, &config);

    if args.dry_run {
        eprintln!("{}", "DRY RUN MODE - nothing will be sent".yellow());
        eprintln!();
        eprintln!("{}", "Would perform the following:".dimmed());
        eprintln!("  1. POST {}", config.endpoint);
        eprintln!(
            "  2. Body: {}",
            serde_json::json!({ "telegram_url": &args.url })
        );
        eprintln!("  3. Mark winning cells on the 5x3 field");
        return Ok(());
    }

    let provider = config
        .provider()
        .context("Failed to create analysis client")?;
    let page = AnalyzerPage::new(Arc::new(provider), Arc::new(ConsoleNotifier));

    eprintln!("{}", LOADING.dimmed());
    let _ = std::io::stderr().flush();

    let outcome = page.analyze(&args.url).await;
    let state = page.snapshot();

    eprintln!();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else if state.has_results() {
        print!("{}", render::render_colored(&state));
    } else if outcome == AnalysisOutcome::Succeeded {
        eprintln!("{}", "No winning cells found".yellow());
    } else if outcome == AnalysisOutcome::Rejected {
        eprintln!("{}", HINT.dimmed());
    }

    if outcome != AnalysisOutcome::Succeeded {
        std::process::exit(1);
    }

    Ok(())
}
