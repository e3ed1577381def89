//! Shared PostgreSQL pool for the user and history repositories.
//!
//! `diesel-async` connections managed by `bb8`. The checkout timeout is the
//! only timeout the persistence layer applies.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use tracing::{debug, info};

const DEFAULT_MAX_SIZE: u32 = 8;
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool failures, carrying the driver's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The pool could not be created or its first connection failed.
    #[error("database pool could not start: {0}")]
    Startup(String),
    /// No connection became free before the checkout timeout.
    #[error("no database connection available: {0}")]
    Checkout(String),
}

impl PoolError {
    /// Driver message without the prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Startup(detail) | Self::Checkout(detail) => detail,
        }
    }
}

/// Where to connect and how many connections to keep.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use backend::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://calories@localhost/calories")
///     .with_max_size(4)
///     .with_checkout_timeout(Duration::from_secs(2));
/// assert_eq!(config.database_url(), "postgres://calories@localhost/calories");
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    checkout_timeout: Duration,
}

impl PoolConfig {
    /// Eight connections with a five second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// Upper bound on open connections; zero is raised to one.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    /// How long a repository call waits for a free connection.
    #[must_use]
    pub fn with_checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Cloneable handle to the pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool and open one connection so a bad URL fails at startup.
    ///
    /// # Errors
    ///
    /// [`PoolError::Startup`] when the server cannot be reached.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let PoolConfig {
            database_url,
            max_size,
            checkout_timeout,
        } = config;
        debug!(max_size, ?checkout_timeout, "opening database pool");

        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let inner = Pool::builder()
            .max_size(max_size)
            .min_idle(Some(1))
            .connection_timeout(checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::Startup(err.to_string()))?;

        info!(max_size, "database pool ready");
        Ok(Self { inner })
    }

    /// Borrow a connection until the guard drops.
    ///
    /// # Errors
    ///
    /// [`PoolError::Checkout`] when the timeout elapses first.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::Checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_suit_a_small_service() {
        let config = PoolConfig::new("postgres://localhost/calories");
        assert_eq!(config.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(config.checkout_timeout, Duration::from_secs(5));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(32, 32)]
    fn max_size_is_at_least_one(#[case] requested: u32, #[case] expected: u32) {
        let config = PoolConfig::new("postgres://localhost/calories").with_max_size(requested);
        assert_eq!(config.max_size, expected);
    }

    #[rstest]
    #[case(PoolError::Startup("bad url".into()), "database pool could not start: bad url")]
    #[case(PoolError::Checkout("timed out".into()), "no database connection available: timed out")]
    fn errors_keep_the_driver_detail(#[case] error: PoolError, #[case] rendered: &str) {
        assert_eq!(error.to_string(), rendered);
        assert!(rendered.ends_with(error.detail()));
    }
}
