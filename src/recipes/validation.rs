use crate::types::{FieldError, ParsedRecipe, ValidationResult};

/// Shape rules every recipe must satisfy: non-blank title, ingredient
/// names and units, and step descriptions.
pub fn structural_errors(recipe: &ParsedRecipe) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if recipe.title.trim().is_empty() {
        errors.push(field_error("title", "must not be empty"));
    }

    for (i, ingredient) in recipe.recipe_data.ingredients.iter().enumerate() {
        if ingredient.name.trim().is_empty() {
            errors.push(field_error(
                &format!("recipe_data.ingredients[{}].name", i),
                "must not be empty",
            ));
        }
        if ingredient.unit.trim().is_empty() {
            errors.push(field_error(
                &format!("recipe_data.ingredients[{}].unit", i),
                "must not be empty",
            ));
        }
    }

    for (i, step) in recipe.recipe_data.steps.iter().enumerate() {
        if step.description.trim().is_empty() {
            errors.push(field_error(
                &format!("recipe_data.steps[{}].description", i),
                "must not be empty",
            ));
        }
    }

    errors
}

/// Full domain check applied before a recipe is handed to callers.
pub fn validate_recipe(recipe: &ParsedRecipe) -> ValidationResult {
    let mut errors = structural_errors(recipe);
    let data = &recipe.recipe_data;

    if data.ingredients.is_empty() {
        errors.push(field_error(
            "recipe_data.ingredients",
            "must contain at least one ingredient",
        ));
    }

    for (i, ingredient) in data.ingredients.iter().enumerate() {
        if !ingredient.amount.is_finite() || ingredient.amount <= 0.0 {
            errors.push(field_error(
                &format!("recipe_data.ingredients[{}].amount", i),
                "must be a positive number",
            ));
        }
    }

    if data.steps.is_empty() {
        errors.push(field_error(
            "recipe_data.steps",
            "must contain at least one step",
        ));
    }

    if let Some(calories) = data.calories {
        if !calories.is_finite() || calories < 0.0 {
            errors.push(field_error(
                "recipe_data.calories",
                "must be a non-negative number",
            ));
        }
    }

    ValidationResult::from_errors(errors)
}

fn field_error(field: &str, message: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }
}
