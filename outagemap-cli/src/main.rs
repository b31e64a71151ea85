use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use is_terminal::IsTerminal;
use tracing::Level;

use outagemap_cli::args::{CompletionsArgs, Shell};
use outagemap_cli::commands::Commands;
use outagemap_cli::handlers::{
    handle_feed_command, handle_pick_command, handle_report_command, handle_watch_command,
};
use outagemap_cli::output::{CliColors, output_error_json};
use outagemap_cli::{OutageMapCliContext, identity_from};

#[derive(Parser)]
#[command(name = "outagemap-cli")]
#[command(about = "OutageMap community outage reports CLI", long_about = None)]
#[command(version = outagemap::VERSION)]
struct Cli {
    /// Custom data directory for storage
    #[arg(long, short, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep reports in memory for this run only
    #[arg(long, global = true)]
    memory: bool,

    /// Signed-in user id (env: OUTAGEMAP_USER)
    #[arg(long, short, global = true)]
    user: Option<String>,

    /// Display name for the signed-in user (env: OUTAGEMAP_USER_NAME)
    #[arg(long, global = true)]
    name: Option<String>,

    /// Output format (table, json) - use json for tool integration
    #[arg(long, short, default_value = "table", global = true)]
    output: String,

    /// Use machine-readable output (alias for --output json)
    #[arg(long, global = true)]
    machine: bool,

    /// Verbose output (debug level logging)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Quiet mode (suppress all logging output)
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli_args = Cli::parse();

    // Priority: machine flag > env var > cli arg > default
    let output_format = if cli_args.machine {
        "json".to_string()
    } else if let Ok(env_output) = std::env::var("OUTAGEMAP_OUTPUT") {
        env_output
    } else {
        cli_args.output.clone()
    };

    let is_quiet = cli_args.quiet
        || std::env::var("OUTAGEMAP_QUIET")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

    // Machine mode implies quiet for clean JSON output
    let log_level = if is_quiet || cli_args.machine {
        Level::ERROR
    } else if cli_args.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli_args, &output_format).await {
        output_error_json(&e, &output_format);
        std::process::exit(1);
    }
}

async fn run(cli_args: Cli, output_format: &str) -> outagemap::Result<()> {
    match &cli_args.command {
        Commands::Version => {
            println!("OutageMap CLI v{}", outagemap::VERSION);
            return Ok(());
        }
        Commands::Completions(args) => {
            print_completions(args);
            return Ok(());
        }
        _ => {}
    }

    let identity = identity_from(cli_args.user, cli_args.name);
    let ctx = OutageMapCliContext::new(cli_args.data_dir, cli_args.memory, identity).await?;

    match cli_args.command {
        Commands::Diagnose => diagnose(&ctx, output_format).await,
        Commands::Report(cmd) => handle_report_command(cmd, &ctx, output_format).await,
        Commands::Pick(args) => handle_pick_command(args, &ctx, output_format).await,
        Commands::Feed(cmd) => handle_feed_command(cmd, &ctx, output_format).await,
        Commands::Watch(args) => handle_watch_command(args, &ctx, output_format).await,
        Commands::Version | Commands::Completions(_) => Ok(()),
    }
}

async fn diagnose(ctx: &OutageMapCliContext, output_format: &str) -> outagemap::Result<()> {
    let healthy = ctx.service.health_check().await.unwrap_or(false);
    let report_count = ctx.service.list_reports().await.map(|r| r.len()).ok();
    let storage = &ctx.config.storage;

    if output_format == "json" {
        let diagnostics = serde_json::json!({
            "store_healthy": healthy,
            "engine": storage.engine.to_string(),
            "data_dir": storage.data_dir.display().to_string(),
            "reports": report_count,
            "geocoding": ctx.config.geocoding.enabled,
            "signed_in": ctx.identity.as_ref().map(|i| i.id.clone()),
            "anonymous_confirmations": ctx.guard.len(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&diagnostics).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(());
    }

    if healthy {
        println!("{} Store: Healthy ({})", "✓".color(CliColors::success()), storage.engine);
    } else {
        println!("{} Store: Unhealthy ({})", "✗".color(CliColors::error()), storage.engine);
    }
    println!("  Data directory: {}", storage.data_dir.display());
    if let Some(count) = report_count {
        println!("  Reports: {}", count);
    }
    println!(
        "  Geocoding: {}",
        if ctx.config.geocoding.enabled { "enabled" } else { "disabled" }
    );
    match &ctx.identity {
        Some(identity) => println!("  Signed in as: {}", identity.id),
        None => println!(
            "  Signed in as: {} ({} anonymous confirmations on this device)",
            "nobody".color(CliColors::muted()),
            ctx.guard.len()
        ),
    }
    Ok(())
}

fn print_completions(args: &CompletionsArgs) {
    let shell = match args.shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::Power => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "outagemap-cli", &mut std::io::stdout());
}
