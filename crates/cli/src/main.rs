//! `bookstore` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve` — connect to the database and start the API server.
//! - `ping`  — connect to the database and report whether it is healthy.

mod config;

use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::AppState;
use config::{DbArgs, PoolArgs};
use store::{check_health, Health, PgBookStore};

#[derive(Parser)]
#[command(
    name = "bookstore",
    about = "Book record service backed by Postgres",
    version
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
        bind: String,

        #[command(flatten)]
        db: DbArgs,

        #[command(flatten)]
        pool: PoolArgs,
    },
    /// Check that the database is reachable.
    Ping {
        #[command(flatten)]
        db: DbArgs,

        #[command(flatten)]
        pool: PoolArgs,
    },
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .try_init()
        .map_err(|err| anyhow!(err))
}

async fn connect(db: &DbArgs, pool: &PoolArgs) -> anyhow::Result<PgBookStore> {
    PgBookStore::connect(&db.to_config(), &pool.to_settings())
        .await
        .with_context(|| format!("cannot start without database at {}:{}", db.host, db.port))
}

async fn serve(bind: String, db: DbArgs, pool: PoolArgs) -> anyhow::Result<()> {
    let store = connect(&db, &pool).await?;

    info!("Starting API server on {bind}");
    let state = AppState::new(Arc::new(store.clone()));
    let result = api::serve(&bind, state, api::shutdown_signal())
        .await
        .with_context(|| format!("API server on {bind} failed"));

    store.close().await;
    result
}

async fn ping(db: DbArgs, pool: PoolArgs) -> anyhow::Result<()> {
    let store = connect(&db, &pool).await?;
    let health = check_health(&store).await;
    store.close().await;

    match health {
        Health::Healthy => {
            println!("healthy");
            Ok(())
        }
        Health::Unhealthy { error } => bail!("unhealthy: {error}"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    match cli.command {
        Command::Serve { bind, db, pool } => serve(bind, db, pool).await,
        Command::Ping { db, pool } => ping(db, pool).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::collections::HashMap;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("bookstore").chain(args.iter().copied()))
    }

    /// Default value of every argument of `sub`, keyed by argument id.
    /// Read from the command definition so ambient env vars play no part.
    fn defaults(sub: &str) -> HashMap<String, String> {
        let cli = Cli::command();
        let sub = cli.find_subcommand(sub).expect("subcommand");
        sub.get_arguments()
            .filter_map(|arg| {
                let value = arg.get_default_values().first()?;
                Some((
                    arg.get_id().to_string(),
                    value.to_string_lossy().into_owned(),
                ))
            })
            .collect()
    }

    #[test]
    fn serve_uses_documented_defaults() {
        let defaults = defaults("serve");

        assert_eq!(defaults["bind"], "0.0.0.0:8080");
        assert_eq!(defaults["host"], "localhost");
        assert_eq!(defaults["port"], "5432");
        assert_eq!(defaults["name"], "bookstore");
        assert_eq!(defaults["user"], "bookstore_user");
        assert!(!defaults.contains_key("password"));
        assert_eq!(defaults["max_open_conns"], "25");
        assert_eq!(defaults["max_idle_conns"], "20");
        assert_eq!(defaults["conn_max_lifetime_secs"], "300");
    }

    #[test]
    fn every_setting_names_its_env_var() {
        let cli = Cli::command();
        let serve = cli.find_subcommand("serve").expect("serve");
        let envs: Vec<String> = serve
            .get_arguments()
            .filter_map(|arg| arg.get_env())
            .map(|env| env.to_string_lossy().into_owned())
            .collect();

        for name in [
            "BIND_ADDR",
            "DB_HOST",
            "DB_PORT",
            "DB_NAME",
            "DB_USER",
            "DB_PASSWORD",
            "DB_MAX_OPEN_CONNS",
            "DB_MAX_IDLE_CONNS",
            "DB_CONN_MAX_LIFETIME_SECS",
        ] {
            assert!(envs.iter().any(|env| env == name), "missing {name}");
        }
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&[
            "ping",
            "--db-host",
            "db.internal",
            "--db-port",
            "6543",
            "--db-password",
            "pw",
            "--max-open-conns",
            "4",
            "--max-idle-conns",
            "2",
        ])
        .expect("parse");
        let Command::Ping { db, pool } = cli.command else {
            panic!("expected ping");
        };

        assert_eq!(db.to_config().host, "db.internal");
        assert_eq!(db.to_config().port, 6543);
        assert_eq!(pool.to_settings().max_open, 4);
        assert_eq!(pool.to_settings().max_idle, 2);
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        assert!(parse(&["ping", "--db-port", "fivefour", "--db-password", "pw"]).is_err());
    }
}
