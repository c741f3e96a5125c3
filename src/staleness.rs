//! Cache freshness policy.
//!
//! The weight cache is rebuilt when it is missing or older than the
//! configured window. Only filesystem metadata is consulted, so photos added
//! inside the window go unnoticed until the next rebuild.

use crate::weights;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    max_age: Duration,
}

impl StalenessPolicy {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Whether the cache at `path` must be regenerated now.
    pub fn is_stale(&self, path: &Path) -> io::Result<bool> {
        self.is_stale_at(path, SystemTime::now())
    }

    /// Whether the cache at `path` must be regenerated at time `now`.
    ///
    /// A missing cache is stale. Otherwise the cache is stale once `now`
    /// reaches its modification time plus `max_age`.
    pub fn is_stale_at(&self, path: &Path, now: SystemTime) -> io::Result<bool> {
        if !weights::exists(path) {
            return Ok(true);
        }
        let modified = weights::modified(path)?;
        Ok(match modified.checked_add(self.max_age) {
            Some(expiry) => now >= expiry,
            // Window too large to represent: never expires
            None => false,
        })
    }

    /// When the cache at `path` expires. `None` if there is no cache.
    pub fn expires_at(&self, path: &Path) -> io::Result<Option<SystemTime>> {
        if !weights::exists(path) {
            return Ok(None);
        }
        Ok(weights::modified(path)?.checked_add(self.max_age))
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(24 * 60 * 60))
    }
}
