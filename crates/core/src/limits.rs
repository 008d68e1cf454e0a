use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

pub const LOAD_CONCURRENCY_ENV: &str = "ACHIEVEMENT_MIGRATE_LOAD_CONCURRENCY";

const MAX_LOAD_CONCURRENCY: usize = 32;

/// Blocking reads in flight at once when nothing overrides it.
pub fn default_load_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .clamp(1, 8)
}

pub(crate) fn parse_load_concurrency(raw: Option<&str>, default_value: usize) -> usize {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default_value)
        .clamp(1, MAX_LOAD_CONCURRENCY)
}

/// Read the load pool size from `ACHIEVEMENT_MIGRATE_LOAD_CONCURRENCY`.
pub fn load_concurrency_from_env() -> usize {
    let raw = std::env::var(LOAD_CONCURRENCY_ENV).ok();
    parse_load_concurrency(raw.as_deref(), default_load_concurrency())
}

#[derive(Clone)]
pub(crate) struct LoadLimiter {
    semaphore: Arc<Semaphore>,
}

pub(crate) struct LoadPermit {
    #[allow(dead_code)]
    permit: OwnedSemaphorePermit,
}

impl LoadLimiter {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(limit.clamp(1, MAX_LOAD_CONCURRENCY))),
        }
    }

    pub(crate) async fn acquire(&self) -> LoadPermit {
        // The semaphore is never closed; acquire failures are not expected.
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .unwrap_or_else(|_| unreachable!("load concurrency semaphore closed"));
        LoadPermit { permit }
    }
}
