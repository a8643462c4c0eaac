//! Postgres connection pool.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgConnection, PgPoolOptions, PgSslMode};
use sqlx::{Connection, PgPool};
use tracing::{debug, info};

use crate::DbError;

/// Type alias for the shared Postgres pool used across the whole application.
pub type DbPool = PgPool;

/// Ceiling on concurrently open connections.
pub const DEFAULT_MAX_OPEN_CONNECTIONS: u32 = 25;
/// Connections kept ready for reuse.
pub const DEFAULT_MAX_IDLE_CONNECTIONS: u32 = 20;
/// Age after which a connection is retired instead of being handed out again.
pub const DEFAULT_CONN_MAX_LIFETIME: Duration = Duration::from_secs(5 * 60);

/// Where and as whom to connect. No `Default`: the password must come from
/// the caller.
#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    /// Build sqlx connect options field by field.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
            .ssl_mode(PgSslMode::Disable)
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Limits applied to the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_open: u32,
    /// Enforced by [`IdleCap`] when connections are released.
    pub max_idle: u32,
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_open: DEFAULT_MAX_OPEN_CONNECTIONS,
            max_idle: DEFAULT_MAX_IDLE_CONNECTIONS,
            max_lifetime: DEFAULT_CONN_MAX_LIFETIME,
        }
    }
}

impl PoolSettings {
    pub fn validate(&self) -> Result<(), DbError> {
        if self.max_open == 0 {
            return Err(DbError::InvalidSettings(
                "max_open must be at least 1".to_string(),
            ));
        }
        if self.max_idle > self.max_open {
            return Err(DbError::InvalidSettings(format!(
                "max_idle ({}) exceeds max_open ({})",
                self.max_idle, self.max_open
            )));
        }
        if self.max_lifetime.is_zero() {
            return Err(DbError::InvalidSettings(
                "max_lifetime must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn pool_options(&self, idle_cap: &IdleCap) -> PgPoolOptions {
        let idle_cap = idle_cap.clone();
        PgPoolOptions::new()
            .max_connections(self.max_open)
            .min_connections(0)
            .max_lifetime(self.max_lifetime)
            .idle_timeout(self.max_lifetime)
            .after_release(move |_conn, _meta| {
                let keep = idle_cap.keep_released();
                Box::pin(async move { Ok::<_, sqlx::Error>(keep) })
            })
    }
}

/// Closes a released connection instead of parking it once `max_idle`
/// connections are already idle.
///
/// sqlx has no idle-count setting, so the cap is checked from the pool's
/// `after_release` hook against the pool it belongs to. Until a pool is
/// attached every connection is kept.
#[derive(Debug, Clone)]
pub struct IdleCap {
    max_idle: usize,
    pool: Arc<OnceLock<PgPool>>,
}

impl IdleCap {
    pub fn new(max_idle: u32) -> Self {
        Self {
            max_idle: max_idle as usize,
            pool: Arc::new(OnceLock::new()),
        }
    }

    /// Bind the cap to the pool built from options carrying it.
    pub fn attach(&self, pool: &PgPool) {
        let _ = self.pool.set(pool.clone());
    }

    pub fn is_attached(&self) -> bool {
        self.pool.get().is_some()
    }

    /// Whether one more connection may join `idle` already parked ones.
    pub fn admits(&self, idle: usize) -> bool {
        idle < self.max_idle
    }

    fn keep_released(&self) -> bool {
        let Some(pool) = self.pool.get() else {
            return true;
        };
        let idle = pool.num_idle();
        let keep = self.admits(idle);
        if !keep {
            debug!(idle, max_idle = self.max_idle, "closing released connection over idle cap");
        }
        keep
    }
}

/// Verify the database with one direct handshake and ping, then build the
/// pool.
///
/// Any failure here is a startup failure: it is reported as
/// [`DbError::Connect`] carrying the backend's own error and never retried.
pub async fn create_pool(config: &DbConfig, settings: &PoolSettings) -> Result<DbPool, DbError> {
    settings.validate()?;

    info!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        max_open = settings.max_open,
        max_idle = settings.max_idle,
        max_lifetime_secs = settings.max_lifetime.as_secs(),
        "Connecting to database"
    );

    let options = config.connect_options();

    let mut conn = PgConnection::connect_with(&options)
        .await
        .map_err(DbError::Connect)?;
    conn.ping().await.map_err(DbError::Connect)?;
    conn.close().await.map_err(DbError::Connect)?;

    let idle_cap = IdleCap::new(settings.max_idle);
    let pool = settings.pool_options(&idle_cap).connect_lazy_with(options);
    idle_cap.attach(&pool);

    info!("successfully connected to database");
    Ok(pool)
}

/// Round-trip to the database without running a data query.
pub async fn ping(pool: &DbPool) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;
    conn.ping().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DbConfig {
        DbConfig {
            host: "db.internal".to_string(),
            port: 6543,
            database: "bookstore".to_string(),
            user: "bookstore_user".to_string(),
            password: "s3cret".to_string(),
        }
    }

    #[test]
    fn default_settings_match_documented_limits() {
        let settings = PoolSettings::default();
        assert_eq!(settings.max_open, 25);
        assert_eq!(settings.max_idle, 20);
        assert_eq!(settings.max_lifetime, Duration::from_secs(300));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn idle_above_open_is_rejected() {
        let settings = PoolSettings {
            max_open: 5,
            max_idle: 6,
            ..PoolSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(DbError::InvalidSettings(_))
        ));
    }

    #[test]
    fn zero_open_connections_is_rejected() {
        let settings = PoolSettings {
            max_open: 0,
            max_idle: 0,
            ..PoolSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_lifetime_is_rejected() {
        let settings = PoolSettings {
            max_lifetime: Duration::ZERO,
            ..PoolSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn connect_options_carry_every_field() {
        let opts = config().connect_options();
        assert_eq!(opts.get_host(), "db.internal");
        assert_eq!(opts.get_port(), 6543);
        assert_eq!(opts.get_database(), Some("bookstore"));
        assert_eq!(opts.get_username(), "bookstore_user");
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn idle_cap_admits_up_to_the_limit() {
        let cap = IdleCap::new(DEFAULT_MAX_IDLE_CONNECTIONS);
        assert!(cap.admits(0));
        assert!(cap.admits(19));
        assert!(!cap.admits(20));
        assert!(!cap.admits(25));
    }

    #[test]
    fn zero_idle_cap_admits_nothing() {
        assert!(!IdleCap::new(0).admits(0));
    }

    #[test]
    fn unattached_cap_keeps_released_connections() {
        let cap = IdleCap::new(0);
        assert!(!cap.is_attached());
        assert!(cap.keep_released());
    }

    #[tokio::test]
    async fn lazy_pool_with_cap_attaches() {
        let settings = PoolSettings::default();
        let cap = IdleCap::new(settings.max_idle);
        let pool = settings
            .pool_options(&cap)
            .connect_lazy_with(config().connect_options());

        cap.attach(&pool);
        assert!(cap.is_attached());
        assert_eq!(pool.options().get_max_connections(), 25);
        assert_eq!(pool.num_idle(), 0);
        assert!(cap.keep_released());
    }

    #[tokio::test]
    async fn unreachable_database_fails_without_waiting_on_the_pool() {
        let config = DbConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..config()
        };

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            create_pool(&config, &PoolSettings::default()),
        )
        .await
        .expect("startup must fail before the pool acquire timeout");

        let Err(DbError::Connect(err)) = result else {
            panic!("expected a connect error");
        };
        assert!(!matches!(err, sqlx::Error::PoolTimedOut));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn released_connections_beyond_idle_cap_are_closed() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let settings = PoolSettings {
            max_open: 3,
            max_idle: 1,
            ..PoolSettings::default()
        };
        let cap = IdleCap::new(settings.max_idle);
        let pool = settings
            .pool_options(&cap)
            .connect(&url)
            .await
            .expect("pool creation failed");
        cap.attach(&pool);

        let mut held = Vec::new();
        for _ in 0..3 {
            held.push(pool.acquire().await.expect("acquire"));
        }
        drop(held);
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(pool.num_idle() <= 1, "idle = {}", pool.num_idle());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_answers_ping() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("pool creation failed");

        ping(&pool).await.expect("ping failed");
    }
}
