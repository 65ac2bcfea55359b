mod config;
mod jellyfin_rs;
mod logging;
mod ports;
mod services;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::{Config, FileConfig, ServerConfig},
    logging::setup_logging,
    services::media_server::client::MediaServerHttpAdapter,
    services::watch_sync::{SyncReport, WatchSyncService},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, global = true, env = "WATCH_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "WATCH_SYNC_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    sync: SyncArgs,
}

#[derive(ClapArgs, Debug)]
struct SyncArgs {
    /// Host for server A (e.g. jellyfin.example.net or https://...)
    #[arg(long, global = true, env = "WATCH_SYNC_A_HOST")]
    a_host: Option<String>,

    /// User ID on server A
    #[arg(long, global = true, env = "WATCH_SYNC_A_USER")]
    a_user: Option<String>,

    /// API token for server A
    #[arg(long, global = true, env = "WATCH_SYNC_A_TOKEN", hide_env_values = true)]
    a_token: Option<String>,

    /// Host for server B
    #[arg(long, global = true, env = "WATCH_SYNC_B_HOST")]
    b_host: Option<String>,

    /// User ID on server B
    #[arg(long, global = true, env = "WATCH_SYNC_B_USER")]
    b_user: Option<String>,

    /// API token for server B
    #[arg(long, global = true, env = "WATCH_SYNC_B_TOKEN", hide_env_values = true)]
    b_token: Option<String>,

    /// Only print what would be marked (default: true, pass --dry-run=false to write)
    #[arg(
        long,
        global = true,
        env = "WATCH_SYNC_DRY_RUN",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    dry_run: Option<bool>,
}

impl SyncArgs {
    fn server_a(&self) -> ServerConfig {
        ServerConfig {
            host: self.a_host.clone(),
            user_id: self.a_user.clone(),
            token: self.a_token.clone(),
        }
    }

    fn server_b(&self) -> ServerConfig {
        ServerConfig {
            host: self.b_host.clone(),
            user_id: self.b_user.clone(),
            token: self.b_token.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync played state between the two servers (the default)
    Sync,
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    match args.command {
        None | Some(Commands::Sync) => run_sync(args.config, &args.sync).await,
        Some(Commands::Config(config_commands)) => match config_commands {
            ConfigCommands::CreateDefault => {
                log::debug!("Creating default config");
                let path = FileConfig::create_default()?;
                log::info!("Default config created at {}", path.display());
                Ok(())
            }
            ConfigCommands::Path => {
                match FileConfig::config_path() {
                    Some(path) => println!("{}", path.display()),
                    None => println!("No default config path found"),
                }
                Ok(())
            }
        },
    }
}

async fn run_sync(config_path: Option<PathBuf>, sync: &SyncArgs) -> Result<()> {
    log::debug!("Loading configuration");
    let file = FileConfig::load(config_path.as_deref())
        .with_context(|| "Failed to load watch sync config")?;
    let config = Config::resolve(file, sync.server_a(), sync.server_b(), sync.dry_run)?;

    let service = WatchSyncService::new(MediaServerHttpAdapter::new()?, config.dry_run);

    println!("Starting sync (dry-run: {})", service.dry_run());
    let report = service.sync_both(&config.server_a, &config.server_b).await;
    print_report(&report, service.dry_run());

    if report.has_failures() {
        return Err(color_eyre::eyre::eyre!(
            "Sync finished with errors: played items could not be listed for at least one server"
        ));
    }
    Ok(())
}

fn print_report(report: &SyncReport, dry_run: bool) {
    for direction in [&report.a_to_b, &report.b_to_a] {
        match &direction.result {
            Ok(outcome) => println!(
                "{} -> {}: {} marked",
                direction.source_host, direction.destination_host, outcome.marked_count
            ),
            Err(e) => println!(
                "{} -> {}: failed ({})",
                direction.source_host, direction.destination_host, e
            ),
        }
    }

    if report.total_marked() == 0 {
        println!("No items to mark.");
    } else {
        println!(
            "Done. Marked {} items A->B and {} items B->A (dry-run={})",
            report.a_to_b.marked_count(),
            report.b_to_a.marked_count(),
            dry_run
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_dry_run_flag_forms() {
        let parse = |extra: &[&str]| {
            let mut argv = vec!["jellyfin-watch-sync"];
            argv.extend_from_slice(extra);
            Args::try_parse_from(argv).unwrap().sync.dry_run
        };

        assert_eq!(parse(&["--dry-run"]), Some(true));
        assert_eq!(parse(&["--dry-run=false"]), Some(false));
    }

    #[test]
    fn test_server_flags_map_to_server_config() {
        let args = Args::try_parse_from([
            "jellyfin-watch-sync",
            "--a-host",
            "a.example.net",
            "--a-user",
            "ua",
            "sync",
            "--b-token",
            "tb",
        ])
        .unwrap();

        assert!(matches!(args.command, Some(Commands::Sync)));
        let a = args.sync.server_a();
        assert_eq!(a.host.as_deref(), Some("a.example.net"));
        assert_eq!(a.user_id.as_deref(), Some("ua"));
        assert_eq!(args.sync.server_b().token.as_deref(), Some("tb"));
    }
}
