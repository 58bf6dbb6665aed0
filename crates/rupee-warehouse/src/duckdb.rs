//! `DuckDB` connection pool.
//!
//! Every pooled connection is cloned from one root connection so that all
//! handles share a single database instance. Opening the same file twice in
//! one process is rejected by `DuckDB`.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use ::duckdb::Connection;

struct PoolInner {
    db_path: PathBuf,
    max_idle: usize,
    root: Mutex<Connection>,
    idle: Mutex<Vec<Connection>>,
}

/// Shared handle to a pool of `DuckDB` connections.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Open the database file and prepare the root connection.
    ///
    /// # Errors
    /// Returns an error if the database file cannot be opened or configured.
    pub fn open(path: impl Into<PathBuf>, max_idle: usize) -> Result<Self, ::duckdb::Error> {
        let db_path = path.into();
        let root = Connection::open(db_path.as_path())?;
        configure_connection(&root)?;

        Ok(Self {
            inner: Arc::new(PoolInner {
                db_path,
                max_idle: max_idle.max(1),
                root: Mutex::new(root),
                idle: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Take an idle connection or clone a new one from the root.
    ///
    /// # Errors
    /// Returns an error if a new connection cannot be created or configured.
    pub fn acquire(&self) -> Result<PooledConnection, ::duckdb::Error> {
        let idle = self
            .inner
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();

        let connection = match idle {
            Some(connection) => connection,
            None => {
                let root = self
                    .inner
                    .root
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let connection = root.try_clone()?;
                drop(root);
                configure_connection(&connection)?;
                connection
            }
        };

        Ok(PooledConnection {
            pool: Arc::clone(&self.inner),
            connection: Some(connection),
        })
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        self.inner.db_path.as_path()
    }
}

/// A connection that goes back to the idle list when dropped.
pub struct PooledConnection {
    pool: Arc<PoolInner>,
    connection: Option<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        // Only `Drop` takes the connection out.
        self.connection
            .as_ref()
            .expect("pooled connection unexpectedly missing")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("pooled connection unexpectedly missing")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        let mut idle = self
            .pool
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.pool.max_idle {
            idle.push(connection);
        }
    }
}

fn configure_connection(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch("PRAGMA disable_progress_bar;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn pooled_connections_share_one_database() {
        let temp = tempdir().expect("tempdir");
        let pool = ConnectionPool::open(temp.path().join("pool.duckdb"), 2).expect("open pool");

        let first = pool.acquire().expect("first connection");
        let second = pool.acquire().expect("second connection");

        first
            .execute_batch("CREATE TABLE shared (id INTEGER); INSERT INTO shared VALUES (7);")
            .expect("write through first connection");
        let value: i64 = second
            .query_row("SELECT id FROM shared", [], |row| row.get(0))
            .expect("read through second connection");

        assert_eq!(value, 7);
    }

    #[test]
    fn released_connections_are_reused_up_to_the_idle_limit() {
        let temp = tempdir().expect("tempdir");
        let pool = ConnectionPool::open(temp.path().join("pool.duckdb"), 1).expect("open pool");

        let first = pool.acquire().expect("first");
        let second = pool.acquire().expect("second");
        drop(first);
        drop(second);

        let idle = pool.inner.idle.lock().expect("idle lock").len();
        assert_eq!(idle, 1);
    }
}
