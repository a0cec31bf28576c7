use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::auth::{Principal, SessionVerifier};
use crate::error::SupabaseError;
use crate::supabase::SupabaseClient;

const USER_PATH: &str = "/auth/v1/user";

/// Resolves session tokens by asking Supabase Auth who they belong to.
pub struct SupabaseSessionVerifier {
    client: SupabaseClient,
}

impl SupabaseSessionVerifier {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
impl SessionVerifier for SupabaseSessionVerifier {
    async fn verify(&self, token: &str) -> Result<Option<Principal>, SupabaseError> {
        let response = self
            .client
            .get(USER_PATH)
            .bearer_auth(token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let user: AuthUser = SupabaseClient::ensure_success(response).await?.json().await?;
        Ok(Some(Principal {
            user_id: user.id,
            email: user.email,
        }))
    }
}
