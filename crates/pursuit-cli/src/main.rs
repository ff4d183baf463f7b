#![forbid(unsafe_code)]

mod actor;
mod clock;
mod cmd;
mod output;
mod source;
mod tui;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use output::OutputMode;
use pursuit_core::config::{self, ProjectConfig};
use source::JsonSource;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "pursuit: RFP pursuit tracker",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Override actor identity (skips env resolution).
    #[arg(long, global = true)]
    actor: Option<String>,

    /// Path to the work-item collection JSON (overrides config).
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Pretty
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Show the work-item grid",
        after_help = "EXAMPLES:\n    # First page, default columns\n    pur list\n\n    # Submitted pursuits sorted by budget, widest view\n    pur list --stage submitted --sort budget --desc --wide"
    )]
    List(cmd::list::ListArgs),

    #[command(
        about = "Export rows to delimited text",
        after_help = "EXAMPLES:\n    # Everything, to stdout\n    pur export\n\n    # Won pursuits to the suggested dated filename\n    pur export --stage won --save"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        about = "Move a work item to another stage",
        after_help = "EXAMPLES:\n    pur move rfp-204 submitted"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(about = "Print the stage order and legal-transition matrix")]
    Stages(cmd::stages::StagesArgs),

    #[command(about = "Open the interactive grid/board TUI")]
    Tui,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pur={default_level},pursuit={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_source(cli_data: Option<PathBuf>, config: &ProjectConfig) -> Result<JsonSource> {
    let path = cli_data
        .or_else(|| config.data.path.clone())
        .unwrap_or_else(|| PathBuf::from(".pursuit/items.json"));
    Ok(JsonSource::new(path))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir().context("resolve current directory")?;
    let config = config::load_project_config(&cwd)?;
    let mode = cli.output_mode();
    let actor = actor::resolve_actor(cli.actor.as_deref());
    let source = resolve_source(cli.data.clone(), &config)?;

    match &cli.command {
        Commands::List(args) => cmd::list::run_list(args, &source, &config, mode),
        Commands::Export(args) => cmd::export::run_export(args, &source, &config),
        Commands::Move(args) => {
            cmd::move_cmd::run_move(args, &source, &config, &actor, mode, clock::now_us())
        }
        Commands::Stages(args) => cmd::stages::run_stages(args, &config, mode),
        Commands::Tui => tui::run_tui(source, &config, &actor),
    }
}
