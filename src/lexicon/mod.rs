/*
    This module is for storing and looking up words
*/

use std::collections::HashMap;
use std::fmt::Display;

use itertools::Itertools;

use crate::grammar::Tag;

#[derive(Debug, Clone, PartialEq)]
pub struct LexiconEntry {
    pub word: String,
    pub tags: Vec<Tag>,
    pub translation: String,
}

impl LexiconEntry {
    pub fn new(word: &str, tags: Vec<Tag>, translation: &str) -> Self {
        LexiconEntry {
            word: word.to_lowercase(),
            tags,
            translation: translation.to_string(),
        }
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

impl Display for LexiconEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] ({})", self.word, self.tags.iter().join(", "), self.translation)
    }
}

// Words are stored lowercased and looked up case-insensitively
#[derive(Debug, Default, PartialEq)]
pub struct Lexicon {
    entries: HashMap<String, LexiconEntry>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns the entry that was replaced, if the word was already present
    pub fn insert(&mut self, entry: LexiconEntry) -> Option<LexiconEntry> {
        self.entries.insert(entry.word.clone(), entry)
    }

    pub fn get(&self, word: &str) -> Option<&LexiconEntry> {
        self.entries.get(&word.to_lowercase())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    pub fn tags_for(&self, word: &str) -> &[Tag] {
        self.get(word).map(|entry| entry.tags.as_slice()).unwrap_or(&[])
    }

    // In no particular order
    pub fn iter(&self) -> impl Iterator<Item = &LexiconEntry> {
        self.entries.values()
    }

    pub fn words_with(&self, tag: Tag) -> impl Iterator<Item = &LexiconEntry> {
        self.iter().filter(move |entry| entry.has_tag(tag))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<LexiconEntry> for Lexicon {
    fn from_iter<I: IntoIterator<Item = LexiconEntry>>(iter: I) -> Self {
        let mut lexicon = Lexicon::new();
        for entry in iter {
            lexicon.insert(entry);
        }
        lexicon
    }
}
