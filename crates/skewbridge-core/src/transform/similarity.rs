//! Bigram string similarity

use crate::model::AttributeDefinition;

/// Dice coefficient over character bigrams
///
/// Scores range from `0.0` (nothing shared) to `1.0` (same bigram
/// multiset). Comparison is case-insensitive and ignores whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityIndex;

impl SimilarityIndex {
    pub fn compare_strings(first: &str, second: &str) -> f64 {
        let first = bigrams(first);
        let mut second = bigrams(second);
        let total = first.len() + second.len();
        if total == 0 {
            return 0.0;
        }

        let mut shared = 0usize;
        for pair in &first {
            if let Some(position) = second.iter().position(|p| p == pair) {
                second.swap_remove(position);
                shared += 1;
            }
        }
        (2 * shared) as f64 / total as f64
    }

    /// Similarity of two attribute definitions
    ///
    /// The name score is averaged with one point each for matching type,
    /// nillability and expression support.
    pub fn compare_attributes(current: &AttributeDefinition, legacy: &AttributeDefinition) -> f64 {
        let name = Self::compare_strings(&current.name, &legacy.name);
        let flags = [
            current.value_type == legacy.value_type,
            current.nillable == legacy.nillable,
            current.allows_expressions == legacy.allows_expressions,
        ];
        let matched = flags.iter().filter(|m| **m).count() as f64;
        (name + matched) / (1.0 + flags.len() as f64)
    }
}

fn bigrams(text: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}
