//! Driver and dialect registry.
//!
//! A [`Manager`] maps URL schemes to drivers and dialects, and binds
//! connection URLs into ready-to-use [`Swirl`] handles. Registration is
//! explicit so embedders control exactly which backends exist.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use url::Url;

use eddy_core::{Dialect, SqliteDialect};

use crate::error::{DbError, Result};
use crate::driver::Driver;
use crate::pool::{Pool, PoolOptions};
use crate::sqlite::SqliteDriver;
use crate::swirl::Swirl;

#[derive(Default)]
pub struct Manager {
    drivers: HashMap<String, Arc<dyn Driver>>,
    dialects: HashMap<String, Arc<dyn Dialect>>,
}

impl Manager {
    /// An empty registry. Register at least one driver and one dialect
    /// before binding.
    pub fn new() -> Manager {
        Manager::default()
    }

    /// A registry preloaded with the SQLite driver and dialect.
    pub fn sqlite() -> Manager {
        let mut manager = Manager::new();
        manager.register_driver(Arc::new(SqliteDriver::new()));
        manager.register_dialect(Arc::new(SqliteDialect::new()));
        manager
    }

    pub fn register_driver(&mut self, driver: Arc<dyn Driver>) {
        info!("registering driver for scheme '{}'", driver.proto());
        self.drivers.insert(driver.proto().to_string(), driver);
    }

    pub fn register_dialect(&mut self, dialect: Arc<dyn Dialect>) {
        self.dialects.insert(dialect.proto().to_string(), dialect);
    }

    /// Binds a connection URL with default pool options.
    pub fn bind(&self, url: &str) -> Result<Swirl> {
        self.bind_with(url, PoolOptions::default())
    }

    /// Binds a connection URL, resolving driver and dialect by scheme.
    /// Both must be registered; a missing dialect is reported before any
    /// connection is opened.
    pub fn bind_with(&self, url: &str, options: PoolOptions) -> Result<Swirl> {
        let url = Url::parse(url).map_err(|e| DbError::InvalidUrl(e.to_string()))?;
        let scheme = url.scheme().to_string();

        let driver = self
            .drivers
            .get(&scheme)
            .cloned()
            .ok_or_else(|| DbError::NoDriver(scheme.clone()))?;
        let dialect = self
            .dialects
            .get(&scheme)
            .cloned()
            .ok_or_else(|| DbError::NoDialect(scheme))?;

        let pool = Pool::new(options, move || driver.connect(&url));
        Ok(Swirl::pooled(pool, dialect))
    }
}
