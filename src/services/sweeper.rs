//! Overdue sweeper
//!
//! Idempotent batch pass reconciling stored copy state with the clock:
//! every Borrowed row whose due date has passed becomes Overdue, no
//! other field changes. Chunked so the store is never held under one
//! unbounded write, and restartable from scratch. Runs on a fixed
//! interval from main and on demand via the service or the API.

use std::time::Duration;

use chrono::Utc;

use crate::{error::AppResult, repository::Repository};

#[derive(Clone)]
pub struct OverdueSweeper {
    repository: Repository,
    chunk_size: i64,
}

impl OverdueSweeper {
    pub fn new(repository: Repository, chunk_size: i64) -> Self {
        Self {
            repository,
            chunk_size,
        }
    }

    /// Run one full sweep, returning the number of copies transitioned
    pub async fn sweep(&self) -> AppResult<u64> {
        let now = Utc::now();
        let mut total = 0u64;

        loop {
            let swept = self
                .repository
                .copies
                .mark_overdue_chunk(now, self.chunk_size)
                .await?;
            total += swept;

            if swept < self.chunk_size as u64 {
                break;
            }
        }

        if total > 0 {
            tracing::info!("Overdue sweep transitioned {} copies", total);
        }

        Ok(total)
    }

    /// Sweep forever on a fixed interval; spawned as a background task
    pub async fn run_periodic(self, interval_secs: u64) {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        // First tick fires immediately; a fresh start reconciles at once
        loop {
            interval.tick().await;
            if let Err(e) = self.sweep().await {
                tracing::error!("Overdue sweep failed: {}", e);
            }
        }
    }
}
