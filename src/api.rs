use actix_web::{web, Responder};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::recipes::parser::EMPTY_RECIPE_TEXT;
use crate::recipes::{validate_recipe, RecipeParsingService};
use crate::types::{HealthResponse, ParseRecipeRequest, ParsedRecipe};

pub const SERVICE_NAME: &str = "healthy-meal-api";

pub async fn health() -> impl Responder {
    web::Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        service: SERVICE_NAME.to_string(),
    })
}

pub async fn parse_recipe(
    principal: Principal,
    body: web::Json<ParseRecipeRequest>,
    parser: web::Data<RecipeParsingService>,
) -> Result<impl Responder, ApiError> {
    let request = body.into_inner();

    if request.recipe_text.trim().is_empty() {
        tracing::warn!(
            user_id = %principal.user_id,
            "Rejected parse request: {}",
            EMPTY_RECIPE_TEXT
        );
        return Err(ApiError::BadRequest(EMPTY_RECIPE_TEXT.to_string()));
    }

    let span = tracing::info_span!(
        "parse_recipe",
        request_id = %Uuid::new_v4(),
        user_id = %principal.user_id
    );

    // Cancelled when actix drops this future, e.g. on client disconnect.
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let recipe = parser
        .parse_recipe(&principal, &request.recipe_text, &cancel)
        .instrument(span)
        .await?;

    Ok(web::Json(recipe))
}

pub async fn validate(
    _principal: Principal,
    body: web::Json<ParsedRecipe>,
) -> impl Responder {
    web::Json(validate_recipe(&body))
}

fn parse_json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|_, _| ApiError::BadRequest(EMPTY_RECIPE_TEXT.to_string()).into())
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _| {
        ApiError::BadRequest(format!("invalid request body: {}", err)).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .route("/health", web::get().to(health))
            .service(
                web::resource("/recipes/parse")
                    .app_data(parse_json_config())
                    .route(web::post().to(parse_recipe)),
            )
            .route("/recipes/validate", web::post().to(validate)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::StaticSessionVerifier;
    use crate::auth::SessionVerifier;
    use crate::error::LlmError;
    use crate::error_log::testing::ChannelErrorLog;
    use crate::error_log::ErrorReporter;
    use crate::llm::testing::{recipe_reply, ScriptedTransport};
    use crate::llm::{RetryConfig, RetryingChatClient};
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    const TOKEN: &str = "session-token";

    fn parser(transport: &Arc<ScriptedTransport>) -> web::Data<RecipeParsingService> {
        let config = RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            timeout: Duration::from_millis(10),
        };
        let (log, _entries) = ChannelErrorLog::new();
        web::Data::new(RecipeParsingService::new(
            RetryingChatClient::new(transport.clone(), config),
            ErrorReporter::new(log),
        ))
    }

    fn verifier() -> web::Data<dyn SessionVerifier> {
        let verifier: Arc<dyn SessionVerifier> =
            Arc::new(StaticSessionVerifier::new(TOKEN, "user-1"));
        web::Data::from(verifier)
    }

    fn parse_request(body: Value) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/recipes/parse")
            .insert_header((AUTHORIZATION, format!("Bearer {}", TOKEN)))
            .set_json(body)
    }

    macro_rules! app {
        ($transport:expr) => {
            test::init_service(
                App::new()
                    .app_data(parser($transport))
                    .app_data(verifier())
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_health() {
        let transport = ScriptedTransport::new(Vec::new());
        let app = app!(&transport);
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], SERVICE_NAME);
    }

    #[actix_web::test]
    async fn test_parse_success() {
        let transport = ScriptedTransport::new(vec![Ok(recipe_reply())]);
        let app = app!(&transport);

        let req = parse_request(json!({"recipe_text": "2 eggs, 1 cup flour. Mix and bake."}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({
                "title": "Simple Pancakes",
                "recipe_data": {
                    "ingredients": [
                        {"name": "eggs", "amount": 2.0, "unit": "piece"},
                        {"name": "flour", "amount": 1.0, "unit": "cup"}
                    ],
                    "steps": [
                        {"description": "Mix the eggs and flour"},
                        {"description": "Bake until golden"}
                    ]
                }
            })
        );
    }

    #[actix_web::test]
    async fn test_parse_requires_session() {
        let transport = ScriptedTransport::new(vec![Ok(recipe_reply())]);
        let app = app!(&transport);

        let req = test::TestRequest::post()
            .uri("/api/recipes/parse")
            .set_json(json!({"recipe_text": "2 eggs"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Not authenticated");
        assert_eq!(transport.calls(), 0);
    }

    #[actix_web::test]
    async fn test_parse_rejects_blank_or_missing_text() {
        let transport = ScriptedTransport::new(vec![Ok(recipe_reply())]);
        let app = app!(&transport);

        for body in [
            json!({"recipe_text": "   "}),
            json!({"recipe_text": 42}),
            json!({}),
        ] {
            let resp = test::call_service(&app, parse_request(body).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], EMPTY_RECIPE_TEXT);
        }
        assert_eq!(transport.calls(), 0);
    }

    #[actix_web::test]
    async fn test_parse_timeout_maps_to_408() {
        let transport = ScriptedTransport::new(Vec::new());
        let app = app!(&transport);

        let resp = test::call_service(
            &app,
            parse_request(json!({"recipe_text": "2 eggs"})).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "AI processing timed out");
        assert_eq!(transport.calls(), 3);
    }

    #[actix_web::test]
    async fn test_parse_failure_hides_provider_details() {
        let transport = ScriptedTransport::new(
            (0..3)
                .map(|_| {
                    Err(LlmError::Transport {
                        status: 500,
                        body: "upstream stack trace".to_string(),
                    })
                })
                .collect(),
        );
        let app = app!(&transport);

        let resp = test::call_service(
            &app,
            parse_request(json!({"recipe_text": "2 eggs"})).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = test::read_body(resp).await;
        let text = String::from_utf8_lossy(&body);
        assert!(!text.contains("upstream stack trace"));
    }

    #[actix_web::test]
    async fn test_validate_reports_field_errors() {
        let transport = ScriptedTransport::new(Vec::new());
        let app = app!(&transport);

        let req = test::TestRequest::post()
            .uri("/api/recipes/validate")
            .insert_header((AUTHORIZATION, format!("Bearer {}", TOKEN)))
            .set_json(json!({
                "title": "Salad",
                "recipe_data": {
                    "ingredients": [{"name": "lettuce", "amount": -1, "unit": "head"}],
                    "steps": []
                }
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["valid"], false);
        assert_eq!(
            body["errors"],
            json!([
                {"field": "recipe_data.ingredients[0].amount", "message": "must be a positive number"},
                {"field": "recipe_data.steps", "message": "must contain at least one step"}
            ])
        );
    }
}
