//! Canonical cache keys for recipe requests.
//!
//! A key is `ingredients|restrictions`, each segment being the normalized
//! (trimmed, lowercased), sorted items joined by `,`. Two requests naming
//! the same multiset of ingredients and restrictions in any order or
//! casing map to the same key.

/// Separator between the ingredient and restriction segments.
const SEGMENT_SEPARATOR: char = '|';

/// Separator between items inside a segment.
const ITEM_SEPARATOR: &str = ",";

/// Derive the cache key for a request.
///
/// The restriction segment is always present, even when empty
/// (`"chicken,rice|"`).
///
/// ```rust
/// # use saucier::key::derive_key;
/// assert_eq!(
///     derive_key(&["Chicken", " rice"], &["Gluten-Free"]),
///     derive_key(&["RICE", "chicken"], &["gluten-free "]),
/// );
/// ```
pub fn derive_key<I, R>(ingredients: &[I], restrictions: &[R]) -> String
where
    I: AsRef<str>,
    R: AsRef<str>,
{
    let mut key = normalize_all(ingredients).join(ITEM_SEPARATOR);
    key.push(SEGMENT_SEPARATOR);
    key.push_str(&normalize_all(restrictions).join(ITEM_SEPARATOR));
    key
}

/// Normalize and sort a list of items.
///
/// Also used by prompt construction.
pub(crate) fn normalize_all<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = items.iter().map(|s| normalize(s.as_ref())).collect();
    normalized.sort_unstable();
    normalized
}

fn normalize(item: &str) -> String {
    item.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn order_and_case_do_not_matter() {
        assert_eq!(
            derive_key(&["Chicken", "Rice"], &NONE),
            derive_key(&["rice", "chicken"], &NONE)
        );
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(
            derive_key(&["  chicken ", "rice\t"], &[" vegan"]),
            derive_key(&["chicken", "rice"], &["vegan"])
        );
    }

    #[test]
    fn empty_restrictions_keep_their_segment() {
        assert_eq!(derive_key(&["chicken", "rice"], &NONE), "chicken,rice|");
    }

    #[test]
    fn restrictions_are_sorted_too() {
        assert_eq!(
            derive_key(&["tofu"], &["Vegan", "gluten-free"]),
            "tofu|gluten-free,vegan"
        );
    }

    #[test]
    fn restrictions_and_ingredients_do_not_mix() {
        assert_ne!(
            derive_key(&["chicken"], &["rice"]),
            derive_key(&["chicken", "rice"], &NONE)
        );
    }

    #[test]
    fn duplicates_are_preserved() {
        assert_ne!(
            derive_key(&["egg", "egg"], &NONE),
            derive_key(&["egg"], &NONE)
        );
    }

    #[test]
    fn owned_strings_are_accepted() {
        let ingredients = vec!["Rice".to_string(), "Chicken".to_string()];
        let restrictions: Vec<String> = Vec::new();
        assert_eq!(derive_key(&ingredients, &restrictions), "chicken,rice|");
    }
}
