//! Recipe result type and parsing of provider output.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// Title used when the provider output could not be parsed.
pub const DEGRADED_TITLE: &str = "Recipe";

/// A recipe returned to the caller.
///
/// Serialized in camelCase for the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResult {
    pub title: String,
    pub ingredient_list: Vec<String>,
    /// Preparation steps, in order.
    pub instructions: Vec<String>,
    pub prep_time: Option<String>,
    pub servings: Option<u32>,
    /// Whether this request was served without triggering a computation.
    pub was_cached: bool,
}

impl RecipeResult {
    /// Parse provider output as a structured recipe.
    ///
    /// Accepts a bare JSON object or one wrapped in a Markdown code fence.
    /// Returns `None` when the text is not JSON or lacks a title or
    /// instructions.
    pub fn parse(raw: &str, was_cached: bool) -> Option<Self> {
        let draft: RecipeDraft = serde_json::from_str(strip_code_fence(raw)).ok()?;

        let title = draft.title.trim().to_string();
        let instructions = draft.instructions.into_steps();
        if title.is_empty() || instructions.is_empty() {
            return None;
        }

        Some(Self {
            title,
            ingredient_list: draft.ingredients,
            instructions,
            prep_time: draft.prep_time.and_then(PrepTime::into_text),
            servings: draft.servings.and_then(Servings::into_count),
            was_cached,
        })
    }

    /// Fallback result carrying the raw provider text as its instructions.
    pub fn degraded<S: AsRef<str>>(raw: &str, ingredients: &[S], was_cached: bool) -> Self {
        Self {
            title: DEGRADED_TITLE.to_string(),
            ingredient_list: ingredients
                .iter()
                .map(|s| s.as_ref().trim().to_string())
                .collect(),
            instructions: vec![raw.to_string()],
            prep_time: None,
            servings: None,
            was_cached,
        }
    }
}

/// Shape the prompt asks the model to produce. Field aliases cover the
/// spellings models commonly drift to.
#[derive(Deserialize)]
struct RecipeDraft {
    title: String,
    #[serde(default, alias = "ingredientList", alias = "ingredient_list")]
    ingredients: Vec<String>,
    #[serde(alias = "steps")]
    instructions: Instructions,
    #[serde(default, rename = "prepTime", alias = "prep_time")]
    prep_time: Option<PrepTime>,
    #[serde(default)]
    servings: Option<Servings>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Instructions {
    Steps(Vec<String>),
    Text(String),
}

impl Instructions {
    fn into_steps(self) -> Vec<String> {
        let steps = match self {
            Instructions::Steps(steps) => steps,
            Instructions::Text(text) => text.lines().map(str::to_string).collect(),
        };
        steps
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Loose prep time. Unrecognized shapes become `None` rather than
/// failing the recipe.
#[derive(Deserialize)]
#[serde(untagged)]
enum PrepTime {
    Minutes(f64),
    Text(String),
    Other(IgnoredAny),
}

impl PrepTime {
    fn into_text(self) -> Option<String> {
        match self {
            PrepTime::Minutes(m) if m.is_finite() && m >= 0.0 => {
                Some(format!("{} minutes", m.round() as u32))
            }
            PrepTime::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Servings {
    Count(f64),
    Text(String),
    Other(IgnoredAny),
}

impl Servings {
    fn into_count(self) -> Option<u32> {
        match self {
            Servings::Count(n) if n.is_finite() && n.round() >= 1.0 => Some(n.round() as u32),
            // "4 servings", "serves 4"
            Servings::Text(text) => text
                .split(|c: char| !c.is_ascii_digit())
                .find(|part| !part.is_empty())
                .and_then(|digits| digits.parse().ok()),
            _ => None,
        }
    }
}

/// Remove a surrounding Markdown code fence (```` ```json ... ``` ````).
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string ("json") on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
