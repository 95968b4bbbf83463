//! keymesh command-line tool
//!
//! Generates composite keyed collection modules from `*.collection.toml`
//! manifests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use config::Config;
use orchestrator::{apply_overrides, generate, init_config, GenerateOverrides};

/// Command-line interface configuration for keymesh.
#[derive(Parser, Debug)]
#[command(name = "keymesh", about = "Generator for composite keyed collections", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,
}

/// Available keymesh commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate every manifest under the source directory
    Generate {
        /// Directory scanned for *.collection.toml manifests
        #[arg(long)]
        source: Option<PathBuf>,
        /// Directory the modules are written to
        #[arg(long)]
        output: Option<PathBuf>,
        /// Configuration file (defaults to the user config file, if any)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Emit type-checked output and run the type checker
        #[arg(long)]
        type_check: bool,
        /// Always use the generic mapping-of-sets templates
        #[arg(long)]
        no_specialization: bool,
    },
    /// Write a default configuration file
    InitConfig {
        /// Where to write it (defaults to the user config file)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Generate { source, output, config, type_check, no_specialization } => {
            let loaded = match Config::load_or_default(config.as_deref()) {
                Ok(loaded) => loaded,
                Err(e) => {
                    eprintln!("Error: Failed to load config: {}", e);
                    std::process::exit(1);
                }
            };
            logging::init(cli.log_level.as_deref().unwrap_or(&loaded.logging.level));

            let overrides = GenerateOverrides { source, output, type_check, no_specialization };
            let settings = apply_overrides(loaded, &overrides);
            match generate(&settings).await {
                Ok(names) => {
                    for name in &names {
                        println!("generated {}", name);
                    }
                    println!(
                        "{} collection(s) written to {}",
                        names.len(),
                        settings.codegen.output_dir.display()
                    );
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::InitConfig { path, force } => {
            logging::init(cli.log_level.as_deref().unwrap_or("info"));
            let path = match path.map(Ok).unwrap_or_else(Config::default_path) {
                Ok(path) => path,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = init_config(&path, force) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            println!("Wrote default configuration to {}", path.display());
        }
    }
}
