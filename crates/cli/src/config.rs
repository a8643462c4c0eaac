//! Command-line / environment configuration.
//!
//! Every value can come from a flag or its environment variable. The
//! database password has no default and must be supplied.

use std::time::Duration;

use clap::Args;
use db::pool::{
    DEFAULT_CONN_MAX_LIFETIME, DEFAULT_MAX_IDLE_CONNECTIONS, DEFAULT_MAX_OPEN_CONNECTIONS,
};
use db::{DbConfig, PoolSettings};

/// Where the database lives and how to log in.
#[derive(Args, Clone)]
pub struct DbArgs {
    #[arg(long = "db-host", env = "DB_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long = "db-port", env = "DB_PORT", default_value_t = 5432)]
    pub port: u16,

    #[arg(long = "db-name", env = "DB_NAME", default_value = "bookstore")]
    pub name: String,

    #[arg(long = "db-user", env = "DB_USER", default_value = "bookstore_user")]
    pub user: String,

    #[arg(long = "db-password", env = "DB_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl DbArgs {
    pub fn to_config(&self) -> DbConfig {
        DbConfig {
            host: self.host.clone(),
            port: self.port,
            database: self.name.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
        }
    }
}

/// Connection pool limits.
#[derive(Args, Debug, Clone)]
pub struct PoolArgs {
    #[arg(long, env = "DB_MAX_OPEN_CONNS", default_value_t = DEFAULT_MAX_OPEN_CONNECTIONS)]
    pub max_open_conns: u32,

    #[arg(long, env = "DB_MAX_IDLE_CONNS", default_value_t = DEFAULT_MAX_IDLE_CONNECTIONS)]
    pub max_idle_conns: u32,

    #[arg(
        long,
        env = "DB_CONN_MAX_LIFETIME_SECS",
        default_value_t = DEFAULT_CONN_MAX_LIFETIME.as_secs()
    )]
    pub conn_max_lifetime_secs: u64,
}

impl PoolArgs {
    pub fn to_settings(&self) -> PoolSettings {
        PoolSettings {
            max_open: self.max_open_conns,
            max_idle: self.max_idle_conns,
            max_lifetime: Duration::from_secs(self.conn_max_lifetime_secs),
        }
    }
}
