mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, generate::GenerateArgs, saved::SavedSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "invoice-pdf",
    about = "Render invoice PDFs through a remote service, then download, preview, or save them",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .invoice/ or .git/)
    #[arg(long, global = true, env = "INVOICE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log progress at info level
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .invoice/config.yaml
    Init,

    /// Render a payload to PDF and run follow-on actions
    Generate(GenerateArgs),

    /// Save form values without rendering
    Save {
        /// JSON payload file, or `-` for stdin
        payload: String,

        /// Save even though no PDF has been generated
        #[arg(long)]
        always: bool,
    },

    /// Inspect saved invoices
    Saved {
        #[command(subcommand)]
        subcommand: SavedSubcommand,
    },

    /// Show or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Generate(args) => cmd::generate::run(&root, args, cli.json),
        Commands::Save { payload, always } => cmd::save::run(&root, &payload, always, cli.json),
        Commands::Saved { subcommand } => cmd::saved::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
