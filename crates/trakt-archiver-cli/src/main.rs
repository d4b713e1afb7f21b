use clap::{ArgAction, Parser, Subcommand};
use commands::{config, daemon, run};
use media_sync_config::PathManager;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "trakt-archiver")]
#[command(about = "Keep a Trakt watchlist under its cap by archiving the oldest entries to Notion")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive and remove watchlist overflow once
    #[command(long_about = "Fetch the Trakt watchlist, archive every entry beyond the capacity (oldest first) to the Notion database, then remove those entries from Trakt in one call.")]
    Run {
        /// Compute and log what would happen without writing to Notion or Trakt
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,

        /// Number of entries to keep on the watchlist
        #[arg(long, value_name = "N")]
        capacity: Option<usize>,

        /// Trakt username whose watchlist is read
        #[arg(long, value_name = "NAME")]
        user: Option<String>,
    },
    /// Run on a schedule
    #[command(long_about = "Run as a long-lived process that archives watchlist overflow on a cron schedule. An initial run happens on startup unless --no-startup-run is given.")]
    Daemon {
        /// Cron schedule with seconds (e.g., '0 0 */6 * * *' for every 6 hours)
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Skip the run on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,
    },
    /// Inspect or create configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks secrets)
    Show {
        /// Show secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Interactively write config.toml and credentials.toml
    Init,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // The daemon writes to the rolling log file; everything else logs to stderr
    let log_file = match cli.command {
        Commands::Daemon { .. } => Some(PathManager::default().daemon_log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Run { dry_run, capacity, user } => {
            let overrides = run::RunOverrides { dry_run, capacity, user };
            run::run_once(overrides, &output).await
        }
        Commands::Daemon { schedule, no_startup_run } => {
            daemon::run_daemon(schedule, no_startup_run, &output).await
        }
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
    }
}
