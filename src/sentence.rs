use std::fmt::Display;

/// A line of input split into normalized words: lowercase, with everything
/// that is not a letter or whitespace removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    original: String,
    words: Vec<String>,
}

impl Sentence {
    pub fn new(input: &str) -> Self {
        let cleaned: String = input
            .chars()
            .filter(|c| c.is_alphabetic() || c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        Sentence {
            original: input.to_string(),
            words: cleaned.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Display for Sentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.words.join(" "))
    }
}
