//! mavenref CLI - Resolve Maven references into deduplicated reference items

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;

use error::Result;

#[derive(Parser)]
#[command(name = "mavenref")]
#[command(author = "mavenref Contributors")]
#[command(version)]
#[command(about = "Resolve Maven references into deduplicated reference items", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

/// Options shared by commands that resolve a graph
#[derive(clap::Args)]
struct ResolveArgs {
    /// Manifest file or project directory
    #[arg(default_value = ".")]
    manifest: PathBuf,

    /// Artifact index to resolve against
    #[arg(long, env = "MAVENREF_INDEX")]
    index: PathBuf,

    /// Local repository root (overrides the index)
    #[arg(long)]
    local_repository: Option<PathBuf>,

    /// Cache file (overrides the manifest)
    #[arg(long, conflicts_with = "no_cache")]
    cache_file: Option<PathBuf>,

    /// Do not read or write the graph cache
    #[arg(long)]
    no_cache: bool,

    /// Admit test-scoped dependencies
    #[arg(long)]
    include_test: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve references into items
    Resolve {
        #[command(flatten)]
        args: ResolveArgs,

        /// Look up sources jars for every item
        #[arg(long)]
        sources: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the resolved dependency graph
    Tree {
        #[command(flatten)]
        args: ResolveArgs,
    },

    /// Inspect or remove the graph cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show the cached snapshot and whether it still applies
    Show {
        /// Manifest file or project directory
        #[arg(default_value = ".")]
        manifest: PathBuf,
    },

    /// Delete the cache file
    Clear {
        /// Manifest file or project directory
        #[arg(default_value = ".")]
        manifest: PathBuf,
    },
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Resolve {
            args,
            sources,
            json,
        } => commands::resolve::run(&args.into(), sources, json),

        Commands::Tree { args } => commands::tree::run(&args.into()),

        Commands::Cache { command } => match command {
            CacheCommands::Show { manifest } => commands::cache::show(&manifest),
            CacheCommands::Clear { manifest } => commands::cache::clear(&manifest),
        },
    }
}

impl From<ResolveArgs> for commands::ResolveOptions {
    fn from(args: ResolveArgs) -> Self {
        Self {
            manifest: args.manifest,
            index: args.index,
            local_repository: args.local_repository,
            cache_file: args.cache_file,
            no_cache: args.no_cache,
            include_test: args.include_test,
        }
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();

    if cli.debug {
        // SAFETY: We're the only thread at this point (start of main)
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    init_tracing(cli.debug);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
