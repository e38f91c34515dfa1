//! The database handle.
//!
//! A [`Swirl`] pairs a connection source with the dialect that compiles
//! queries for it. Handles are cheap to clone and safe to share;
//! statements executed through a pooled handle may land on different
//! connections, while [`Swirl::sequential`] pins one connection for
//! order-dependent work.

use std::sync::Arc;

use tracing::debug;

use eddy_core::{Dialect, Sql};

use crate::driver::{Connection, ExecResult};
use crate::error::Result;
use crate::pool::Pool;

#[derive(Clone)]
enum Binding {
    Pooled(Pool),
    Direct(Arc<dyn Connection>),
}

#[derive(Clone)]
pub struct Swirl {
    binding: Binding,
    dialect: Arc<dyn Dialect>,
}

impl std::fmt::Debug for Swirl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Swirl").finish_non_exhaustive()
    }
}

impl Swirl {
    /// A handle that checks a connection out of `pool` per statement.
    pub fn pooled(pool: Pool, dialect: Arc<dyn Dialect>) -> Swirl {
        Swirl {
            binding: Binding::Pooled(pool),
            dialect,
        }
    }

    /// A handle bound to one connection for its whole lifetime.
    pub fn direct(conn: Arc<dyn Connection>, dialect: Arc<dyn Dialect>) -> Swirl {
        Swirl {
            binding: Binding::Direct(conn),
            dialect,
        }
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Executes one compiled statement.
    pub async fn execute(&self, sql: Sql) -> Result<ExecResult> {
        debug!(params = sql.params.len(), "executing: {}", sql.text);
        match &self.binding {
            Binding::Pooled(pool) => {
                let conn = pool.acquire().await?;
                conn.execute(sql).await
            }
            Binding::Direct(conn) => conn.execute(sql).await,
        }
    }

    /// A handle pinned to a single connection, so statements issued
    /// through it cannot interleave with each other across the pool.
    /// The connection returns to the pool when every clone of the
    /// returned handle is dropped.
    pub async fn sequential(&self) -> Result<Swirl> {
        match &self.binding {
            Binding::Pooled(pool) => Ok(Swirl {
                binding: Binding::Direct(Arc::new(pool.acquire().await?)),
                dialect: Arc::clone(&self.dialect),
            }),
            Binding::Direct(_) => Ok(self.clone()),
        }
    }
}
