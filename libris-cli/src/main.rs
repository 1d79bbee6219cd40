//! Libris CLI - Command-line interface for the book library core

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Parse and validate jobs argument (must be at least 1)
fn parse_jobs(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 1 {
        Err("jobs must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

#[derive(Parser)]
#[command(name = "libris")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the metadata read from a book file
    Inspect {
        /// Book file path
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Also read the text content
        #[arg(long)]
        model: bool,
    },

    /// Read every supported book in a directory
    Scan {
        /// Directory to scan
        dir: String,

        /// Only list books accepted by this filter (XML file)
        #[arg(short, long)]
        filter: Option<String>,

        /// Number of parallel jobs (must be at least 1)
        #[arg(short, long, default_value = "4", value_parser = parse_jobs)]
        jobs: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Select books from a library file with a filter
    Filter {
        /// Library file (JSON list of books)
        library: String,

        /// Filter file (XML)
        filter: String,

        /// Only books with a bookmark
        #[arg(long)]
        bookmarked_only: bool,
    },

    /// List the supported file types
    Formats,

    /// Parse a filter file and print it back
    CheckFilter {
        /// Filter file (XML)
        filter: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins unless -v is given
    let filter = if cli.verbose {
        EnvFilter::new("libris_cli=debug,libris_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("libris_cli=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Inspect { input, json, model } => commands::inspect(&input, json, model),

        Commands::Scan {
            dir,
            filter,
            jobs,
            json,
        } => commands::scan(&dir, filter.as_deref(), jobs, json),

        Commands::Filter {
            library,
            filter,
            bookmarked_only,
        } => commands::filter(&library, &filter, bookmarked_only),

        Commands::Formats => commands::formats(),

        Commands::CheckFilter { filter } => commands::check_filter(&filter),
    }
}
