use async_trait::async_trait;

use crate::error::SupabaseError;
use crate::error_log::{ErrorLog, ErrorLogEntry};
use crate::supabase::SupabaseClient;

const ERROR_LOGS_PATH: &str = "/rest/v1/error_logs";

/// Writes entries into the `error_logs` table through PostgREST.
pub struct SupabaseErrorLog {
    client: SupabaseClient,
}

impl SupabaseErrorLog {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ErrorLog for SupabaseErrorLog {
    async fn log_error(&self, entry: &ErrorLogEntry) -> Result<(), SupabaseError> {
        let response = self
            .client
            .post(ERROR_LOGS_PATH)
            .header("Prefer", "return=minimal")
            .json(entry)
            .send()
            .await?;

        SupabaseClient::ensure_success(response).await?;
        Ok(())
    }
}
