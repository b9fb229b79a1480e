use std::{collections::HashSet, path::Path};

use anyhow::Context;

const MAX_SUGGESTIONS: usize = 3;
const MAX_DISTANCE: usize = 2;

#[derive(Debug, PartialEq, Eq)]
pub struct Verdict {
    pub word: String,
    pub misspelled: bool,
    /// Closest dictionary words, nearest first; empty when correctly spelled
    pub suggestions: Vec<String>,
}

/// Case-insensitive dictionary lookup
pub struct Spellchecker {
    words: HashSet<String>,
}

impl Spellchecker {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Loads a newline-separated word list, such as `/usr/share/dict/words`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dictionary {}", path.display()))?;
        let checker = Self::from_words(contents.lines());
        anyhow::ensure!(!checker.words.is_empty(), "dictionary {} is empty", path.display());
        Ok(checker)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn check(&self, word: &str) -> Verdict {
        let normalized = word
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();

        if self.words.contains(&normalized) {
            return Verdict {
                word: word.trim().to_string(),
                misspelled: false,
                suggestions: vec![],
            };
        }

        let mut candidates: Vec<(usize, &String)> = self
            .words
            .iter()
            .filter(|w| w.chars().count().abs_diff(normalized.chars().count()) <= MAX_DISTANCE)
            .filter_map(|w| {
                let distance = edit_distance(&normalized, w);
                (distance <= MAX_DISTANCE).then_some((distance, w))
            })
            .collect();
        candidates.sort();

        Verdict {
            word: word.trim().to_string(),
            misspelled: true,
            suggestions: candidates
                .into_iter()
                .take(MAX_SUGGESTIONS)
                .map(|(_, w)| w.clone())
                .collect(),
        }
    }
}

/// Levenshtein distance over chars
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
