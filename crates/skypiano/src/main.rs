//! skypiano - import, compile, and auto-play Sky music sheets
//!
//! Subcommands:
//! - `skypiano import <files...>` - Compile sheets into the keymap store
//! - `skypiano compile <file>` - Print a sheet's compiled keymap
//! - `skypiano decode <file>` - Print an encrypted sheet's plain notes
//! - `skypiano play <keymap|file>` - Play through the dry-run key port
//! - `skypiano export <keymap|file> --out <path>` - Write a sheet file back out
//! - `skypiano config show` - Print the effective configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use skyconf::SkyConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "skypiano")]
#[command(about = "Import, compile, and auto-play Sky music sheets")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ./skypiano.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import sheet files into the keymap store
    Import {
        /// Sheet files (.json or .txt, UTF-8 or UTF-16)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the compiled keymap of a sheet file
    Compile {
        file: PathBuf,
    },

    /// Print the plaintext note list of a sheet file
    Decode {
        file: PathBuf,
    },

    /// Play a keymap id or sheet file
    Play {
        /// Keymap id from `import`, or a sheet file path
        target: String,

        /// Start offset in seconds
        #[arg(long, default_value = "0")]
        from: f64,

        /// Speed multiplier (0.1 to 5.0)
        #[arg(long)]
        speed: Option<f64>,

        /// Hold each key until just before the next one
        #[arg(long)]
        long_press: bool,

        /// Hold before silence in long-press mode, in seconds
        #[arg(long)]
        delay_next: Option<f64>,
    },

    /// Export a keymap id or sheet file in the sheet format
    Export {
        /// Keymap id from `import`, or a sheet file path
        target: String,

        /// Output path
        #[arg(short, long)]
        out: PathBuf,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        transcribed_by: Option<String>,

        #[arg(long)]
        bpm: Option<f64>,

        /// Write songNotes in the encrypted form
        #[arg(long)]
        encrypt: bool,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration and where it came from
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = SkyConfig::load_with_sources_from(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.telemetry.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Import { files } => {
            commands::import(&config, &files)?;
        }
        Commands::Compile { file } => {
            commands::compile(&file)?;
        }
        Commands::Decode { file } => {
            commands::decode(&file)?;
        }
        Commands::Play {
            target,
            from,
            speed,
            long_press,
            delay_next,
        } => {
            commands::play(
                &config,
                &target,
                commands::PlayOptions {
                    from,
                    speed,
                    long_press,
                    delay_next,
                },
            )
            .await?;
        }
        Commands::Export {
            target,
            out,
            name,
            author,
            transcribed_by,
            bpm,
            encrypt,
        } => {
            commands::export(
                &config,
                &target,
                &out,
                commands::ExportOptions {
                    name,
                    author,
                    transcribed_by,
                    bpm,
                    encrypt,
                },
            )?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::config_show(&config, &sources);
            }
        },
    }

    Ok(())
}
