use std::collections::BTreeSet;

use pantry_core::models::{Recipe, Substitution};

/// "butter → olive oil; noodles → rice/spaghetti"
pub(crate) fn format_substitutions(subs: &[Substitution]) -> String {
    if subs.is_empty() {
        return "-".to_string();
    }
    subs.iter()
        .map(|s| format!("{} → {}", s.item, s.substitutes.join("/")))
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn join_or_dash<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<&str>>()
            .join(", ")
    }
}

pub(crate) fn join_set(items: &BTreeSet<String>) -> String {
    items.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

pub(crate) fn recipe_title(recipe: &Recipe) -> String {
    recipe.title().unwrap_or("(untitled)").to_string()
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_substitutions() {
        let subs = vec![
            Substitution {
                item: "butter".to_string(),
                substitutes: vec!["olive oil".to_string()],
            },
            Substitution {
                item: "noodles".to_string(),
                substitutes: vec!["rice".to_string(), "spaghetti".to_string()],
            },
        ];
        assert_eq!(
            format_substitutions(&subs),
            "butter → olive oil; noodles → rice/spaghetti"
        );
        assert_eq!(format_substitutions(&[]), "-");
    }

    #[test]
    fn test_join_or_dash() {
        assert_eq!(join_or_dash(&["egg", "flour"]), "egg, flour");
        assert_eq!(join_or_dash::<String>(&[]), "-");
    }

    #[test]
    fn test_recipe_title_fallback() {
        let recipe: Recipe = serde_json::from_str(r#"{"required_ingredients": []}"#).unwrap();
        assert_eq!(recipe_title(&recipe), "(untitled)");
        assert_eq!(recipe_title(&Recipe::new("Soup", ["broth"])), "Soup");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }
}
