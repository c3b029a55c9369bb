//! Patchscope CLI entry point

use clap::{Args, Parser, Subcommand};
use patchscope_core::{OrderingMode, VisualizerConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "patchscope")]
#[command(about = "Live audio routing graph for PulseAudio and PipeWire", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (TOML); flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Flags shared by every command that draws a graph
#[derive(Args)]
struct ViewArgs {
    /// Number of characters after which to wrap node labels
    #[arg(long = "text-wrap", alias = "text_wrap")]
    text_wrap: Option<usize>,

    /// Strings to remove from node labels
    #[arg(long, num_args = 1..)]
    hide: Vec<String>,

    /// Nodes whose label contains any of these strings are not drawn
    #[arg(long, num_args = 1..)]
    ignore: Vec<String>,

    /// Only draw running nodes
    #[arg(long)]
    active: bool,

    /// Order columns alphabetically instead of by force-directed layout
    #[arg(long)]
    alpha: bool,

    /// Directory for snapshot records and rendered graphs
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Seed for the force-directed layout
    #[arg(long)]
    seed: Option<u64>,
}

impl ViewArgs {
    fn apply(self, config: &mut VisualizerConfig) {
        if let Some(width) = self.text_wrap {
            config.text_wrap = width;
        }
        if !self.hide.is_empty() {
            config.hide = self.hide;
        }
        if !self.ignore.is_empty() {
            config.ignore = self.ignore;
        }
        if self.active {
            config.active_only = true;
        }
        if self.alpha {
            config.ordering = OrderingMode::Alphabetical;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the audio server and redraw whenever the routing changes
    Watch {
        #[command(flatten)]
        view: ViewArgs,

        /// Poll interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Read routing from a JSON file instead of the audio server
        #[arg(long)]
        replay: Option<PathBuf>,
    },
    /// Render a saved snapshot record once
    Render {
        #[command(flatten)]
        view: ViewArgs,

        /// Record to render (defaults to the newest in the output directory)
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Show version
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("patchscope={}", log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Patchscope v{}", env!("CARGO_PKG_VERSION"));

    let mut config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Watch {
            view,
            interval_ms,
            replay,
        } => {
            view.apply(&mut config);
            if let Some(ms) = interval_ms {
                config.poll_interval_ms = ms;
            }
            config.validate()?;
            commands::watch(config, replay).await
        }
        Commands::Render { view, state } => {
            view.apply(&mut config);
            config.validate()?;
            commands::render(config, state)
        }
        Commands::Version => {
            println!("Patchscope v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
