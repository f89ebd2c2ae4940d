use std::collections::HashSet;

use lazy_static::lazy_static;

lazy_static! {
    /// Words that carry no food meaning in a craving sentence.
    pub static ref STOPWORDS: HashSet<&'static str> = [
        "craving", "want", "wants", "wanting", "recipe", "dish", "food",
        "something", "like", "with", "and", "the", "for", "from", "into",
        "that", "this", "have", "has", "had", "you", "your", "at", "home",
    ]
    .into_iter()
    .collect();
}

/// Lowercases, strips punctuation, and collapses whitespace.
/// Empty or punctuation-only input yields an empty string, never an error.
pub fn normalize_query(value: &str) -> String {
    let replaced: String = value
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Naive English singularizer: `-ies` -> `-y`, `-es` dropped, trailing `-s` dropped.
pub fn to_singular(value: &str) -> String {
    if let Some(stem) = value.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    if let Some(stem) = value.strip_suffix("es") {
        return stem.to_string();
    }
    if let Some(stem) = value.strip_suffix('s') {
        return stem.to_string();
    }
    value.to_string()
}

/// Trims entries, drops blanks, and deduplicates while preserving first-seen order.
pub fn unique(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut output = Vec::new();
    for value in values {
        let trimmed = value.trim().to_string();
        if trimmed.is_empty() || seen.contains(&trimmed) {
            continue;
        }
        seen.insert(trimmed.clone());
        output.push(trimmed);
    }
    output
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

pub fn to_title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_collapses_spaces() {
        assert_eq!(normalize_query("Cheesy,  SPICY!! pizza"), "cheesy spicy pizza");
        assert_eq!(normalize_query("   "), "");
        assert_eq!(normalize_query(""), "");
    }

    #[test]
    fn singularizer_handles_common_suffixes() {
        assert_eq!(to_singular("berries"), "berry");
        assert_eq!(to_singular("pancakes"), "pancak");
        assert_eq!(to_singular("nuts"), "nut");
        assert_eq!(to_singular("rice"), "rice");
    }

    #[test]
    fn unique_is_idempotent() {
        let input = vec![
            " cake ".to_string(),
            "cake".to_string(),
            "".to_string(),
            "pie".to_string(),
        ];
        let once = unique(input);
        assert_eq!(once, vec!["cake", "pie"]);
        let twice = unique(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(to_title_case("vitamin b12"), "Vitamin B12");
    }
}
