use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::AppError;

/// Result of running content through the abuse filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterVerdict {
    pub cleaned: String,
    pub flagged: bool,
}

#[async_trait]
pub trait ContentFilter: Send + Sync {
    async fn check(&self, text: &str) -> Result<FilterVerdict, AppError>;
}

/// Masks whole words found in a fixed, case-insensitive word list.
#[derive(Debug, Clone, Default)]
pub struct WordListFilter {
    words: HashSet<String>,
}

impl WordListFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Self { words }
    }

    /// Comma separated list from `BAD_WORDS`.
    pub fn from_env() -> Self {
        let raw = std::env::var("BAD_WORDS").unwrap_or_default();
        Self::new(raw.split(','))
    }

    fn flush(&self, word: &mut String, cleaned: &mut String, flagged: &mut bool) {
        if word.is_empty() {
            return;
        }
        if self.words.contains(&word.to_lowercase()) {
            *flagged = true;
            cleaned.extend(std::iter::repeat_n('*', word.chars().count()));
        } else {
            cleaned.push_str(word);
        }
        word.clear();
    }
}

#[async_trait]
impl ContentFilter for WordListFilter {
    async fn check(&self, text: &str) -> Result<FilterVerdict, AppError> {
        let mut cleaned = String::with_capacity(text.len());
        let mut flagged = false;
        let mut word = String::new();
        for ch in text.chars() {
            if ch.is_alphanumeric() {
                word.push(ch);
                continue;
            }
            self.flush(&mut word, &mut cleaned, &mut flagged);
            cleaned.push(ch);
        }
        self.flush(&mut word, &mut cleaned, &mut flagged);

        Ok(FilterVerdict { cleaned, flagged })
    }
}
