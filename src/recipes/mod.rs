pub mod parser;
pub mod validation;

pub use parser::RecipeParsingService;
pub use validation::validate_recipe;
