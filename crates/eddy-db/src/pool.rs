//! A bounded connection pool.
//!
//! Connections are opened lazily through the driver's factory closure,
//! capped by a semaphore, and returned to an idle list when the guard
//! drops. Acquisition waits instead of failing when the cap is reached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use eddy_core::Sql;

use crate::driver::{Connection, ExecResult};
use crate::error::{DbError, Result};

#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    /// Upper bound on concurrently checked-out connections.
    pub max_connections: usize,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self { max_connections: 4 }
    }
}

type Factory = dyn Fn() -> Result<Arc<dyn Connection>> + Send + Sync;

struct PoolInner {
    factory: Box<Factory>,
    idle: Mutex<Vec<Arc<dyn Connection>>>,
    semaphore: Arc<Semaphore>,
}

/// A shareable handle to the pool. Cloning is cheap.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

impl Pool {
    pub fn new<F>(options: PoolOptions, factory: F) -> Pool
    where
        F: Fn() -> Result<Arc<dyn Connection>> + Send + Sync + 'static,
    {
        Pool {
            inner: Arc::new(PoolInner {
                factory: Box::new(factory),
                idle: Mutex::new(Vec::new()),
                semaphore: Arc::new(Semaphore::new(options.max_connections)),
            }),
        }
    }

    /// Checks out a connection, waiting for a free slot if the pool is
    /// at capacity. Idle connections are reused before new ones open.
    pub async fn acquire(&self) -> Result<PooledConnection> {
        if self.inner.semaphore.available_permits() == 0 {
            warn!("connection pool exhausted, waiting for a free slot");
        }
        let permit = Arc::clone(&self.inner.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| DbError::PoolClosed)?;

        let idle = self
            .inner
            .idle
            .lock()
            .ok()
            .and_then(|mut idle| idle.pop());
        let conn = match idle {
            Some(conn) => conn,
            None => {
                debug!("pool growing by one connection");
                (self.inner.factory)()?
            }
        };

        Ok(PooledConnection {
            conn,
            pool: Arc::clone(&self.inner),
            broken: Arc::new(AtomicBool::new(false)),
            _permit: permit,
        })
    }
}

/// A checked-out connection. Returns to the idle list on drop unless a
/// statement failed on it, in which case it is discarded and the pool
/// opens a replacement on demand.
pub struct PooledConnection {
    conn: Arc<dyn Connection>,
    pool: Arc<PoolInner>,
    broken: Arc<AtomicBool>,
    _permit: OwnedSemaphorePermit,
}

impl Connection for PooledConnection {
    fn execute(&self, sql: Sql) -> BoxFuture<'static, Result<ExecResult>> {
        let broken = Arc::clone(&self.broken);
        let fut = self.conn.execute(sql);
        async move {
            let result = fut.await;
            if result.is_err() {
                broken.store(true, Ordering::Relaxed);
            }
            result
        }
        .boxed()
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if self.broken.load(Ordering::Relaxed) {
            debug!("discarding connection after a failed statement");
            return;
        }
        if let Ok(mut idle) = self.pool.idle.lock() {
            idle.push(Arc::clone(&self.conn));
        }
    }
}
