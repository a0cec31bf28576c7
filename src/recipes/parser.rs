use tokio_util::sync::CancellationToken;

use crate::auth::Principal;
use crate::error::ParseRecipeError;
use crate::error_log::ErrorReporter;
use crate::llm::{ChatOptions, Message, ModelParameters, RetryingChatClient};
use crate::recipes::validation::validate_recipe;
use crate::types::ParsedRecipe;

pub const EMPTY_RECIPE_TEXT: &str = "Recipe text is required and cannot be empty";

const PARSE_TEMPERATURE: f32 = 0.1;
const PARSE_TOP_P: f32 = 0.9;
const PARSE_MAX_TOKENS: u32 = 2000;

const RECIPE_PARSER_SYSTEM: &str = r#"You are a culinary assistant that converts free-form recipe text into structured data.

## Response Format
Respond ONLY with a single JSON object (no markdown, no explanation):
{
    "title": "Recipe name",
    "recipe_data": {
        "ingredients": [
            {"name": "flour", "amount": 1.5, "unit": "cup"}
        ],
        "steps": [
            {"description": "Mix the dry ingredients"}
        ],
        "notes": "optional tips, substitutions or storage advice",
        "calories": 450
    }
}

## Extraction Guidelines
1. title: use the name given in the text, otherwise write a short descriptive one
2. ingredients: one entry per ingredient; amount is always a positive number (convert fractions such as 1/2 to 0.5)
3. unit: always a non-empty string; use "piece" for countable items and "pinch" or "to taste" style units when no quantity is given
4. steps: keep the original order, one action per step
5. notes: include only if the text contains tips or remarks, otherwise omit the field
6. calories: optional estimate of total calories for the whole recipe, omit if it cannot be estimated"#;

/// Entry point for turning free text into a [`ParsedRecipe`].
pub struct RecipeParsingService {
    client: RetryingChatClient,
    reporter: ErrorReporter,
    options: ChatOptions,
}

impl RecipeParsingService {
    pub fn new(client: RetryingChatClient, reporter: ErrorReporter) -> Self {
        Self {
            client,
            reporter,
            options: ChatOptions::default().with_params(ModelParameters {
                temperature: Some(PARSE_TEMPERATURE),
                top_p: Some(PARSE_TOP_P),
                max_tokens: Some(PARSE_MAX_TOKENS),
            }),
        }
    }

    /// System instructions first, then the caller's text verbatim.
    pub fn build_messages(recipe_text: &str) -> Vec<Message> {
        vec![
            Message::system(RECIPE_PARSER_SYSTEM),
            Message::user(recipe_text),
        ]
    }

    pub async fn parse_recipe(
        &self,
        principal: &Principal,
        recipe_text: &str,
        cancel: &CancellationToken,
    ) -> Result<ParsedRecipe, ParseRecipeError> {
        let result = self.try_parse(principal, recipe_text, cancel).await;

        if let Err(e) = &result {
            self.reporter.report(
                Some(principal.user_id.as_str()),
                e.kind(),
                "parse recipe",
                e,
            );
        }

        result
    }

    async fn try_parse(
        &self,
        principal: &Principal,
        recipe_text: &str,
        cancel: &CancellationToken,
    ) -> Result<ParsedRecipe, ParseRecipeError> {
        if recipe_text.trim().is_empty() {
            return Err(ParseRecipeError::BadRequest(EMPTY_RECIPE_TEXT.to_string()));
        }

        let messages = Self::build_messages(recipe_text);
        let recipe = self.client.chat(&messages, &self.options, cancel).await?;

        let validation = validate_recipe(&recipe);
        if !validation.valid {
            return Err(ParseRecipeError::InternalValidation(validation.summary()));
        }

        tracing::info!(
            user_id = %principal.user_id,
            ingredients = recipe.recipe_data.ingredients.len(),
            steps = recipe.recipe_data.steps.len(),
            "Parsed recipe \"{}\"",
            recipe.title
        );

        Ok(recipe)
    }
}
