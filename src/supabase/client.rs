use crate::config::SupabaseConfig;
use crate::error::SupabaseError;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};

/// Thin HTTP handle on a Supabase project. Every request carries the
/// project's anon key in the `apikey` header.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    url: String,
    anon_key: SecretString,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            http: Client::new(),
            url: config.url.clone(),
            anon_key: config.anon_key.clone(),
        }
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.url, path))
            .header("apikey", self.anon_key.expose_secret())
    }

    /// POST authorised as the anon role.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(format!("{}{}", self.url, path))
            .header("apikey", self.anon_key.expose_secret())
            .header(
                "Authorization",
                format!("Bearer {}", self.anon_key.expose_secret()),
            )
    }

    pub async fn ensure_success(response: Response) -> Result<Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SupabaseError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
