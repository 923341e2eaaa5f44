//! Public types for the Saucier API.

mod recipe;

pub use recipe::{DEGRADED_TITLE, RecipeResult};
