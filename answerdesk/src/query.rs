//! Query validation.
//!
//! Keyboard-mash queries ("asdfgh", "zzzzzz") waste an embedding call
//! and always come back empty anyway, so the pipeline rejects them
//! before touching the embedder. The heuristics are deliberately
//! permissive: anything containing one plausible word goes through.

use std::sync::LazyLock;

use regex::Regex;

static WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]{2,}").expect("word pattern compiles"));

/// Returns true if the query contains at least one plausible word.
///
/// A word is plausible when it has at least two distinct letters,
/// contains no letter repeated four or more times in a row, and mixes
/// vowels and consonants.
pub(crate) fn is_plausible(query: &str) -> bool {
    WORDS.find_iter(&query.to_lowercase()).any(|m| is_plausible_word(m.as_str()))
}

fn is_plausible_word(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();

    let distinct = {
        let mut sorted = chars.clone();
        sorted.sort_unstable();
        sorted.dedup();
        sorted.len()
    };
    if distinct < 2 {
        return false;
    }
    if chars.windows(4).any(|run| run.iter().all(|c| *c == run[0])) {
        return false;
    }
    let vowels = chars.iter().filter(|c| "aeiou".contains(**c)).count();
    // All-vowel or all-consonant strings read as mashed keys.
    vowels > 0 && vowels < chars.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_questions() {
        assert!(is_plausible("What are the support hours?"));
        assert!(is_plausible("how do I open an account"));
        assert!(is_plausible("fees"));
    }

    #[test]
    fn rejects_mashed_keys() {
        assert!(!is_plausible(""));
        assert!(!is_plausible("???!!!"));
        assert!(!is_plausible("zzzzzzz"));
        assert!(!is_plausible("qwrtpsd"));
        assert!(!is_plausible("aeiouae"));
        assert!(!is_plausible("aaaab"));
        // Caught by the run scan alone: distinct letters and mixed
        // vowels/consonants, but one letter repeated four times.
        assert!(!is_plausible("heeeelp"));
    }

    #[test]
    fn three_letter_runs_are_still_words() {
        assert!(is_plausible("wheee"));
    }
}
