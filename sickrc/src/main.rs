use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sickrc::Settings;
use sickrc::cli_commands;

#[derive(Parser)]
#[command(name = "sickrc")]
#[command(about = "rc-style service control for the SickRage daemon", long_about = None)]
struct Cli {
    /// YAML settings file, applied between the rc defaults and the
    /// sickrage_* environment variables
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Start the daemon using ./sickrc start")]
    Start {
        /// Start even when sickrage_enable is not set to YES (onestart)
        #[arg(long)]
        force: bool,
    },
    #[command(about = "Stop the daemon using ./sickrc stop")]
    Stop,
    #[command(about = "Stop and start the daemon using ./sickrc restart")]
    Restart {
        /// Restart even when sickrage_enable is not set to YES (onerestart)
        #[arg(long)]
        force: bool,
    },
    #[command(about = "Report the daemon state using ./sickrc status")]
    Status,
    #[command(about = "Print the rc enable variable using ./sickrc rcvar")]
    Rcvar,
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Start { force } => cli_commands::start_daemon(&settings, force),
        Commands::Stop => cli_commands::stop_daemon(&settings),
        Commands::Restart { force } => cli_commands::restart_daemon(&settings, force),
        Commands::Status => cli_commands::status_daemon(&settings),
        Commands::Rcvar => cli_commands::rcvar(&settings),
    }
}
