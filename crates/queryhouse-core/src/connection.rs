//! The connection capability and the shared handle.
//!
//! QueryHouse never establishes database connections itself; the host hands
//! it something that implements [`Connection`] (a real MySQL driver, or the
//! in-memory fake used by the test suite). The engine consumes exactly four
//! operations: statement execution, buffered querying, commit, and draining
//! of unread results.
//!
//! Every layer shares one connection through a [`DbHandle`]. The system is
//! designed for a single logical thread of control: no two statements are
//! ever in flight at once, and the handle's internal mutex exists to keep
//! that invariant if a host moves the handle across threads, not to enable
//! concurrent access.

use crate::error::Result;
use crate::row::Row;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Blocking database connection capability.
///
/// Implementations are expected to buffer result sets fully; the engine
/// never interleaves statements with partially-read results (it drains any
/// leftovers defensively before each statement).
pub trait Connection: Send {
    /// Execute a DDL/DML statement, returning the affected row count.
    fn execute(&mut self, sql: &str) -> Result<u64>;

    /// Run a query and buffer the full result set.
    fn query(&mut self, sql: &str) -> Result<Vec<Row>>;

    /// Commit the current transaction.
    fn commit(&mut self) -> Result<()>;

    /// Discard any unread result set left by a prior statement.
    fn consume_results(&mut self) -> Result<()>;
}

/// The process-wide shared connection handle.
///
/// Cheap to clone; all clones refer to the same underlying connection.
/// Before issuing any statement the handle drains pending unread results
/// from the prior statement, since the single shared connection cannot have
/// two result sets in flight.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<Mutex<Box<dyn Connection>>>,
}

impl DbHandle {
    /// Wrap a connection in a shared handle.
    pub fn new(connection: impl Connection + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(connection))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Connection>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Execute a statement, flushing any pending results first.
    pub fn execute(&self, sql: &str) -> Result<u64> {
        let mut conn = self.lock();
        if conn.consume_results().is_err() {
            tracing::trace!(sql, "ignored flush failure before statement");
        }
        tracing::debug!(sql, "executing statement");
        conn.execute(sql)
    }

    /// Run a query and buffer all rows, flushing any pending results first.
    pub fn query(&self, sql: &str) -> Result<Vec<Row>> {
        let mut conn = self.lock();
        if conn.consume_results().is_err() {
            tracing::trace!(sql, "ignored flush failure before query");
        }
        tracing::debug!(sql, "running query");
        conn.query(sql)
    }

    /// Commit the current transaction.
    pub fn commit(&self) -> Result<()> {
        self.lock().commit()
    }
}

impl std::fmt::Debug for DbHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbHandle").finish_non_exhaustive()
    }
}

/// Connection parameters a host uses to describe the database it provides.
///
/// Establishing the network connection, authenticating, and prompting for
/// credentials are the host's responsibility; this struct only gives those
/// collaborators a uniform shape to pass around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectConfig {
    /// Hostname or IP address.
    pub host: String,
    /// Port number.
    pub port: u16,
    /// Username for authentication.
    pub user: String,
    /// Password for authentication, when one is required.
    pub password: Option<String>,
    /// Database to select after connecting.
    pub database: Option<String>,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: None,
            database: None,
        }
    }
}

impl ConnectConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hostname.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the database to select.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// The socket address string for this configuration.
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
