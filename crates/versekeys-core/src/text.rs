//! Text tokenization.
//!
//! Turns raw poem text into the ordered word sequence the cursor iterates.
//! Splitting happens on runs of whitespace; a fixed set of punctuation
//! characters is stripped from each candidate word and anything left empty
//! is discarded.

/// Punctuation characters removed from candidate words.
pub const STRIPPED_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];

/// Split raw text into speakable word tokens.
///
/// Total over all inputs: empty or whitespace-only text yields an empty
/// sequence, never an error.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(
            tokenize("Hello, world!  Friends forever."),
            vec!["Hello", "world", "Friends", "forever"]
        );
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert_eq!(tokenize(""), Vec::<String>::new());
        assert_eq!(tokenize("   "), Vec::<String>::new());
    }

    #[test]
    fn test_tokenize_pure_punctuation_dropped() {
        assert_eq!(tokenize("one ... two !!"), vec!["one", "two"]);
    }

    #[test]
    fn test_tokenize_embedded_punctuation() {
        // Punctuation inside a word is stripped, not used as a separator
        assert_eq!(tokenize("don:t,stop"), vec!["dontstop"]);
    }

    #[test]
    fn test_tokenize_preserves_order_and_case() {
        assert_eq!(
            tokenize("Blue skies; smiling, at me"),
            vec!["Blue", "skies", "smiling", "at", "me"]
        );
    }

    #[test]
    fn test_tokenize_keeps_other_characters() {
        // Apostrophes and hyphens are not in the stripped set
        assert_eq!(tokenize("can't stand-up"), vec!["can't", "stand-up"]);
    }
}
