use crate::error::LlmError;
use crate::recipes::validation::structural_errors;
use crate::types::ParsedRecipe;
use serde_json::Value;

const CONTENT_POINTER: &str = "/choices/0/message/content";

/// Decode a provider reply into a [`ParsedRecipe`].
///
/// The first choice's message content must be a JSON string describing the
/// recipe. Any malformed entry rejects the whole reply.
pub fn validate_response(response: &Value) -> Result<ParsedRecipe, LlmError> {
    let content = response
        .pointer(CONTENT_POINTER)
        .and_then(Value::as_str)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| reject(LlmError::InvalidResponse(
            "no message content in response".to_string(),
        )))?;

    let parsed: Value = serde_json::from_str(content)
        .map_err(|e| reject(LlmError::InvalidJson(e.to_string())))?;

    if !parsed.is_object() {
        return Err(reject(LlmError::InvalidResponse(
            "message content is not a JSON object".to_string(),
        )));
    }

    let recipe: ParsedRecipe = serde_path_to_error::deserialize(parsed).map_err(|e| {
        // Missing top-level fields fail at the root path.
        let path = e.path().to_string();
        let message = if path == "." {
            e.inner().to_string()
        } else {
            format!("invalid {}: {}", path, e.inner())
        };
        reject(LlmError::InvalidResponse(message))
    })?;

    let errors = structural_errors(&recipe);
    if let Some(first) = errors.first() {
        return Err(reject(LlmError::InvalidResponse(format!(
            "invalid {}: {}",
            first.field, first.message
        ))));
    }

    Ok(recipe)
}

fn reject(err: LlmError) -> LlmError {
    tracing::warn!("Rejected provider response: {}", err);
    err
}
