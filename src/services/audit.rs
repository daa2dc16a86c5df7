//! Fire-and-forget audit sink for circulation events
//!
//! A failure to record an event must never roll back the circulation
//! mutation that produced it; callers log and move on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::copy::ConditionCode;

/// Circulation event forwarded to the audit sink
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    Checkout {
        copy_id: i32,
        title_id: i32,
        copy_number: i32,
        patron_id: i32,
        due_at: DateTime<Utc>,
    },
    Return {
        copy_id: i32,
        patron_id: Option<i32>,
        condition: ConditionCode,
    },
    Renew {
        copy_id: i32,
        renewal_count: i16,
        due_at: DateTime<Utc>,
    },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<(), String>;
}

/// Default sink: structured log lines under the `audit` target
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), String> {
        let payload = serde_json::to_string(&event).map_err(|e| e.to_string())?;
        tracing::info!(target: "audit", "{}", payload);
        Ok(())
    }
}
