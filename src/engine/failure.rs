use itertools::Itertools;
use serde::Serialize;

use crate::grammar::Tag;

/// Where the input stopped fitting the grammar, as far as any branch got.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDiagnostic {
    pub index: usize,
    pub token: String,
    pub expected_categories: Vec<Tag>,
    pub message: String,
}

/// Keeps the deepest terminal mismatch seen by any abandoned branch. Every
/// tag expected at that position is kept, in the order first seen.
#[derive(Debug, Default)]
pub struct FailureTracker {
    furthest: Option<usize>,
    expected: Vec<Tag>,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, position: usize, expected: Tag) {
        match self.furthest {
            Some(furthest) if position < furthest => {}
            Some(furthest) if position == furthest => {
                if !self.expected.contains(&expected) {
                    self.expected.push(expected);
                }
            }
            _ => {
                self.furthest = Some(position);
                self.expected = vec![expected];
            }
        }
    }

    pub fn furthest(&self) -> Option<usize> {
        self.furthest
    }

    pub fn expected(&self) -> &[Tag] {
        &self.expected
    }

    /// Turns the witness into a diagnostic. With no witness at all the
    /// failure is pinned on the first word.
    pub fn diagnose<S: AsRef<str>>(&self, words: &[S]) -> FailureDiagnostic {
        let index = self.furthest.unwrap_or(0);
        let token = words.get(index).map(|w| w.as_ref().to_string()).unwrap_or_default();

        FailureDiagnostic {
            message: failure_message(index, &token, &self.expected),
            index,
            token,
            expected_categories: self.expected.clone(),
        }
    }
}

fn failure_message(index: usize, token: &str, expected: &[Tag]) -> String {
    if expected.is_empty() {
        return "Could not parse sentence".to_string();
    }
    format!("Expected {} at position {}, found '{}'", expected.iter().join(" or "), index, token)
}
