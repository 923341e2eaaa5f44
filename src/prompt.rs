//! Natural-language prompt construction.

use crate::key::normalize_all;

/// Instruction appended to every prompt so the reply can be parsed as a
/// [`RecipeResult`](crate::RecipeResult).
const FORMAT_INSTRUCTION: &str = "Respond with only a JSON object and no other text. \
The object must have the fields \"title\" (string), \"ingredients\" (array of strings), \
\"instructions\" (array of strings, one step each), \"prepTime\" (string) and \
\"servings\" (integer).";

/// Build the prompt sent to the provider.
///
/// Items are normalized and sorted the same way as the cache key, so every
/// request that shares a key also shares a prompt.
pub fn build_prompt<I, R>(ingredients: &[I], restrictions: &[R]) -> String
where
    I: AsRef<str>,
    R: AsRef<str>,
{
    let ingredients = normalize_all(ingredients);
    let restrictions = normalize_all(restrictions);

    let mut prompt = format!(
        "Create a recipe using these ingredients: {}.",
        ingredients.join(", ")
    );
    if !restrictions.is_empty() {
        prompt.push_str(&format!(
            " The recipe must satisfy these dietary restrictions: {}.",
            restrictions.join(", ")
        ));
    }
    prompt.push(' ');
    prompt.push_str(FORMAT_INSTRUCTION);
    prompt
}
