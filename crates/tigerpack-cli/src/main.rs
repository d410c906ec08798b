use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;

use tigerpack_cli::{BuildConfig, commands};

#[derive(Parser)]
#[command(
    name = "tigerpack",
    about = "Package resource bundles into CDC-engine tiger archives",
    version,
    long_about = "Builds DRM resource bundles from section manifests and splices them \
                  into a tiger master archive, rewriting its content record index."
)]
struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, default_value = "info")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a DRM bundle from a manifest and splice it into the archive
    Build {
        /// Section manifest path
        manifest: PathBuf,

        /// Output bundle path (defaults to the manifest with a .drm extension)
        output: Option<PathBuf>,

        /// Master archive the engine loads (rewritten by the build)
        #[arg(long)]
        master_archive: Option<PathBuf>,

        /// Pristine backup archive (read, never written)
        #[arg(long)]
        master_backup: Option<PathBuf>,

        /// Directory receiving staged payload copies
        #[arg(long)]
        staging_dir: Option<PathBuf>,
    },

    /// Print a DRM bundle's header and section tables
    Inspect {
        /// Bundle file to inspect
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .init();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            master_archive,
            master_backup,
            staging_dir,
        } => {
            let mut config = BuildConfig::default();
            if let Some(path) = master_archive {
                config = config.with_master_archive(path);
            }
            if let Some(path) = master_backup {
                config = config.with_master_backup(path);
            }
            if let Some(path) = staging_dir {
                config = config.with_staging_directory(path);
            }
            commands::build::handle(&manifest, output, &config)?;
        }
        Commands::Inspect { file } => commands::inspect::handle(&file)?,
    }

    Ok(())
}
