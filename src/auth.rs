use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;

use crate::error::{ApiError, SupabaseError};

/// Identity a request is made on behalf of, already verified by the
/// session backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// `Ok(None)` means the token is unknown or expired.
    async fn verify(&self, token: &str) -> Result<Option<Principal>, SupabaseError>;
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn not_authenticated() -> ApiError {
    ApiError::Unauthorized("Not authenticated".to_string())
}

impl FromRequest for Principal {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let verifier = req.app_data::<web::Data<dyn SessionVerifier>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let verifier = verifier.ok_or_else(|| {
                ApiError::InternalError("session verifier not configured".to_string())
            })?;
            let token = token.ok_or_else(not_authenticated)?;

            match verifier.verify(&token).await {
                Ok(Some(principal)) => Ok(principal),
                Ok(None) => Err(not_authenticated()),
                Err(e) => {
                    tracing::warn!("Session verification failed: {}", e);
                    Err(not_authenticated())
                }
            }
        })
    }
}
