//! docvault CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use docvault::{
    commands::{
        cmd_import_dir, cmd_init, cmd_list, cmd_show, cmd_status, cmd_store, cmd_versions,
        print_import_stats, print_outcome, print_status, print_summaries, print_versions,
    },
    config::Config,
    error::{Error, Result},
    meta::DocStore,
    progress::LogWriterFactory,
};
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docvault")]
#[command(version, about = "Versioned JSON document store backed by SQLite", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides the config)
    #[arg(long, global = true, env = "DOCVAULT_DB")]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file and create the database
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Store a JSON file as a new version of its doc key
    Store {
        /// Path to the JSON file
        path: PathBuf,

        /// Doc key (defaults to the file name without extension)
        doc_key: Option<String>,
    },

    /// Store every matching file under a directory
    Import {
        /// Directory to walk
        dir: PathBuf,
    },

    /// List all doc keys with their latest version
    List,

    /// List all stored versions of a doc key
    Versions {
        /// Doc key to inspect
        doc_key: String,
    },

    /// Print the stored content of a doc key
    Show {
        /// Doc key to print
        doc_key: String,

        /// Version to print (defaults to the latest)
        #[arg(long)]
        version: Option<i64>,
    },

    /// Show database location and statistics
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory::default()))
        .with(filter)
        .init();

    // Handle completions command (doesn't need config/db)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "docvault", &mut std::io::stdout());
        return Ok(());
    }

    if let Commands::Init { force } = cli.command {
        return handle_init(cli.config.as_deref(), force, cli.json).await;
    }

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(db_file) = cli.db {
        config = config.with_db_file(db_file);
    }
    let prefix_len = config.display.checksum_prefix_len;

    let db = DocStore::connect(&config).await?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Store { path, doc_key } => {
            let outcome = cmd_store(&db, &path, doc_key.as_deref()).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome, prefix_len);
            }
        }

        Commands::Import { dir } => {
            let stats = cmd_import_dir(&config, &db, &dir).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_import_stats(&stats, prefix_len);
            }

            if !stats.failures.is_empty() {
                return Err(Error::ImportFailed(stats.failures.len()));
            }
        }

        Commands::List => {
            let summaries = cmd_list(&db).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                print_summaries(&summaries);
            }
        }

        Commands::Versions { doc_key } => {
            let versions = cmd_versions(&db, &doc_key).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&versions)?);
            } else {
                print_versions(&doc_key, &versions, prefix_len);
            }
        }

        Commands::Show { doc_key, version } => {
            let doc = cmd_show(&db, &doc_key, version).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print!("{}", doc.content);
                if !doc.content.ends_with('\n') {
                    println!();
                }
            }
        }

        Commands::Status => {
            let status = cmd_status(&config, &db).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }
    }

    Ok(())
}

async fn handle_init(config_path: Option<&Path>, force: bool, json: bool) -> Result<()> {
    // A .toml argument names the file itself; anything else is the base directory
    let base_dir = match config_path {
        Some(path) if path.extension().is_some_and(|e| e == "toml") => path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(Config::default_base_dir),
        Some(path) => path.to_path_buf(),
        None => Config::default_base_dir(),
    };

    let config = cmd_init(base_dir, force).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "config": config.paths.config_file,
                "database": config.paths.db_file,
            })
        );
    } else {
        println!("✓ docvault initialized successfully");
        println!("  Config: {}", config.paths.config_file.display());
        println!("  Database: {}", config.paths.db_file.display());
        println!("\nNext steps:");
        println!("  1. Store a document: docvault store path/to/doc.json");
        println!("  2. Inspect versions: docvault versions doc");
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::load_from(None),
    }
}
