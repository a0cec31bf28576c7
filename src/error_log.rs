use crate::error::SupabaseError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorLogEntry {
    pub user_id: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl ErrorLogEntry {
    pub fn new(user_id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            user_id,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Durable sink for failures that callers should be able to look up later.
#[async_trait]
pub trait ErrorLog: Send + Sync {
    async fn log_error(&self, entry: &ErrorLogEntry) -> Result<(), SupabaseError>;
}

/// Fire-and-forget front for an [`ErrorLog`]. A failed write is reported
/// through tracing and otherwise ignored.
#[derive(Clone)]
pub struct ErrorReporter {
    log: Arc<dyn ErrorLog>,
}

impl ErrorReporter {
    pub fn new(log: Arc<dyn ErrorLog>) -> Self {
        Self { log }
    }

    pub fn report(
        &self,
        user_id: Option<&str>,
        kind: &str,
        context: &str,
        error: &dyn std::fmt::Display,
    ) {
        let entry = ErrorLogEntry::new(
            user_id.map(str::to_string),
            format!("[{}] {}: {}", kind, context, error),
        );
        tracing::error!(kind, context, "{}", error);

        let log = self.log.clone();
        tokio::spawn(async move {
            if let Err(e) = log.log_error(&entry).await {
                tracing::error!("Failed to log error: {}", e);
                tracing::error!("Original error: {}", entry.message);
            }
        });
    }
}
