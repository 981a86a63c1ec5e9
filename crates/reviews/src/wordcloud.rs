//! Word-frequency accumulation for the word-cloud endpoint.

use std::collections::HashMap;

use crate::models::WordFrequency;

/// Fold one review's content into the running frequency map. Words are
/// lowercased with punctuation stripped; tokens that reduce to nothing are
/// dropped.
pub fn accumulate(freq: &mut HashMap<String, u64>, content: &str) {
    for token in content.split_whitespace() {
        let word: String = token
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .flat_map(char::to_lowercase)
            .collect();
        if word.is_empty() {
            continue;
        }
        *freq.entry(word).or_insert(0) += 1;
    }
}

/// Deterministic output order: most frequent first, ties alphabetical.
pub fn into_sorted(freq: HashMap<String, u64>) -> Vec<WordFrequency> {
    let mut words: Vec<WordFrequency> = freq
        .into_iter()
        .map(|(text, value)| WordFrequency { text, value })
        .collect();
    words.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.text.cmp(&b.text)));
    words
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_lowercases() {
        let mut freq = HashMap::new();
        accumulate(&mut freq, "Great product! Really great.");
        assert_eq!(freq.get("great"), Some(&2));
        assert_eq!(freq.get("product"), Some(&1));
        assert!(!freq.contains_key("product!"));
    }

    #[test]
    fn pure_punctuation_tokens_are_dropped() {
        let mut freq = HashMap::new();
        accumulate(&mut freq, "good --- !!! value");
        assert_eq!(freq.len(), 2);
    }

    #[test]
    fn accumulates_across_reviews() {
        let mut freq = HashMap::new();
        accumulate(&mut freq, "smooth texture");
        accumulate(&mut freq, "texture is smooth");
        assert_eq!(freq.get("smooth"), Some(&2));
        assert_eq!(freq.get("texture"), Some(&2));
        assert_eq!(freq.get("is"), Some(&1));
    }

    #[test]
    fn sorted_output_is_deterministic() {
        let mut freq = HashMap::new();
        accumulate(&mut freq, "b a b c a b");
        let words = into_sorted(freq);
        assert_eq!(words[0].text, "b");
        assert_eq!(words[0].value, 3);
        assert_eq!(words[1].text, "a");
        assert_eq!(words[2].text, "c");
    }
}
