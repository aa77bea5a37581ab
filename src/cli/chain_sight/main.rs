use anyhow::{bail, Context, Result};
use chain_sync::{
    api::HttpRestClient,
    repositories::postgres::{create_pool, run_migrations, PostgresConfig},
    Repositories, SyncService,
};
use clap::{arg, value_parser, ArgMatches, Command};
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};
use tracing::{info, level_filters::LevelFilter};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod commands;
mod config;

use commands::Commands;
use config::Settings;

fn cli() -> Command {
    Command::new("chain-sight")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Sync validators, delegators and governance proposals of Cosmos SDK chains")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .args([
            arg!(--config <FILE> "Settings file (defaults to the user config directory)")
                .value_parser(value_parser!(PathBuf))
                .required(false)
                .global(true),
            arg!(--"database-url" <URL> "PostgreSQL connection string")
                .required(false)
                .global(true),
            arg!(--"log-level" <LEVEL> "Log level used when RUST_LOG is unset")
                .value_parser(config::parse_log_level)
                .required(false)
                .global(true),
            arg!(--"log-file" <FILE> "Also append log records to this file")
                .value_parser(value_parser!(PathBuf))
                .required(false)
                .global(true),
        ])
        .subcommand(
            Command::new("config")
                .about("Manage chain configuration")
                .subcommand_required(true)
                .subcommand(
                    Command::new("import")
                        .about("Import chains from a JSON file")
                        .arg(arg!(<FILE> "Chain descriptor file").value_parser(value_parser!(PathBuf))),
                )
                .subcommand(Command::new("display").about("Print configured chains as JSON"))
                .subcommand(
                    Command::new("remove")
                        .about("Remove a chain and everything stored for it")
                        .arg(arg!(<CHAIN> "Chain name or chain_id")),
                ),
        )
        .subcommand(
            Command::new("fetch")
                .about("Fetch data from a chain's REST API")
                .subcommand_required(true)
                .subcommand(
                    Command::new("validators")
                        .about("Sync validators and their delegators")
                        .arg(arg!(--chain <CHAIN> "Chain name or chain_id").required(true)),
                )
                .subcommand(
                    Command::new("governance")
                        .about("Sync governance proposals")
                        .arg(arg!(--chain <CHAIN> "Chain name or chain_id").required(true)),
                ),
        )
}

/// Log to stdout and, when `log_file` is set, to that file as well.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole run.
fn init_tracing(level: LevelFilter, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = || {
        EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy()
    };
    let stdout = fmt::layer().with_filter(filter());

    let (file, guard) = match log_file {
        Some(path) => {
            let name = path
                .file_name()
                .with_context(|| format!("log file {} has no file name", path.display()))?;
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(name.to_string_lossy())
                .build(dir)
                .with_context(|| format!("opening log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(stdout).with(file).init();
    Ok(guard)
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(id)
        .with_context(|| format!("missing argument {id}"))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = cli().get_matches();

    let settings = Settings::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?
        .with_database_url(matches.get_one::<String>("database-url").cloned())
        .with_log_level(matches.get_one::<LevelFilter>("log-level").map(LevelFilter::to_string))
        .with_log_file(matches.get_one::<PathBuf>("log-file").cloned());

    let _log_guard = init_tracing(settings.level_filter()?, settings.log_file())?;

    let pool = create_pool(&PostgresConfig {
        connection_string: settings.database_url.clone(),
        max_connections: settings.max_connections,
    })
    .await
    .context("connecting to database")?;
    run_migrations(&pool).await?;

    let client = HttpRestClient::new(settings.sync.request_timeout())?;
    let service = SyncService::new(Repositories::postgres(pool), Arc::new(client), &settings.sync);
    let commands = Commands::new(service);

    let succeeded = match matches.subcommand() {
        Some(("config", sub_matches)) => match sub_matches.subcommand() {
            Some(("import", args)) => {
                let path = args
                    .get_one::<PathBuf>("FILE")
                    .context("missing argument FILE")?;
                commands.import_config(path).await?
            }
            Some(("display", _)) => commands.display_config().await?,
            Some(("remove", args)) => commands.remove_chain(required(args, "CHAIN")?).await?,
            _ => bail!("unknown config subcommand"),
        },
        Some(("fetch", sub_matches)) => match sub_matches.subcommand() {
            Some(("validators", args)) => commands.fetch_validators(required(args, "chain")?).await?,
            Some(("governance", args)) => commands.fetch_governance(required(args, "chain")?).await?,
            _ => bail!("unknown fetch subcommand"),
        },
        _ => bail!("No subcommand specified. Use --help for usage information."),
    };

    info!(succeeded, "Done");
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
