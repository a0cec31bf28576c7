mod api;
mod auth;
mod config;
mod error;
mod error_log;
mod llm;
mod recipes;
mod supabase;
mod types;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::auth::SessionVerifier;
use crate::config::AppConfig;
use crate::error_log::ErrorReporter;
use crate::llm::openrouter::OpenRouterClient;
use crate::llm::{RetryConfig, RetryingChatClient};
use crate::recipes::RecipeParsingService;
use crate::supabase::{SupabaseClient, SupabaseErrorLog, SupabaseSessionVerifier};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;

    let transport = OpenRouterClient::new(&config.provider)
        .context("failed to create OpenRouter client")?;
    let client = RetryingChatClient::new(
        Arc::new(transport),
        RetryConfig::from(&config.provider),
    );
    tracing::info!(
        model = %config.provider.model,
        max_attempts = client.config().max_attempts,
        timeout_ms = client.config().timeout.as_millis() as u64,
        "Chat provider configured"
    );

    let supabase = SupabaseClient::new(&config.supabase);
    let reporter = ErrorReporter::new(Arc::new(SupabaseErrorLog::new(supabase.clone())));
    let verifier: Arc<dyn SessionVerifier> = Arc::new(SupabaseSessionVerifier::new(supabase));

    let parser = web::Data::new(RecipeParsingService::new(client, reporter));
    let verifier = web::Data::from(verifier);

    let bind = (config.server.host.clone(), config.server.port);
    tracing::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(parser.clone())
            .app_data(verifier.clone())
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
