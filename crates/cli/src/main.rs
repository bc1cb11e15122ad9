mod create_commands;
mod index_commands;
mod presets;

use std::{path::PathBuf, process::ExitCode};

use {
    clap::{Parser, Subcommand},
    microlab_config::MicrolabConfig,
    tracing::{debug, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::create_commands::CreateArgs;

#[derive(Parser)]
#[command(
    name = "microlab",
    version,
    about = "Scaffold Vite + Tailwind micro-sites and keep a catalog of them",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to use instead of searching for one.
    #[arg(long, global = true, env = "MICROLAB_CONFIG")]
    config: Option<PathBuf>,

    // Scaffolding arguments, used when no subcommand is given.
    #[command(flatten)]
    create: CreateArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the catalog in a directory as a static index page.
    Index {
        /// Directory holding `registry.json` (default: current directory).
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Output file (default: `<dir>/index.html`).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Logs go to stderr; stdout is reserved for the run summary.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<MicrolabConfig> {
    match &cli.config {
        Some(path) => microlab_config::load_config(path),
        None => Ok(microlab_config::discover_and_load()),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Some(Commands::Index { dir, out }) => index_commands::handle_index(&dir, out.as_deref()),
        None => create_commands::handle_create(cli.create, &config),
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let cli = Cli::parse_from(presets::expand_presets(&args));

    init_telemetry(&cli);
    info!(version = env!("CARGO_PKG_VERSION"), "microlab starting");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}
