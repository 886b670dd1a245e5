use std::fmt::Display;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::grammar::{Rule, Symbol, Tag};

/// A derivation laid out as a tree. Leaves point at the word they consumed.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivationTree {
    Leaf {
        tag: Tag,
        index: usize,
    },
    Node {
        symbol: String,
        rule: usize,
        children: Vec<DerivationTree>,
    },
}

// Every node carries `symbol`; leaves are marked with `word: true`
impl Serialize for DerivationTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DerivationTree::Leaf { tag, index } => {
                let mut leaf = serializer.serialize_struct("Leaf", 3)?;
                leaf.serialize_field("symbol", tag)?;
                leaf.serialize_field("word", &true)?;
                leaf.serialize_field("index", index)?;
                leaf.end()
            }
            DerivationTree::Node { symbol, rule, children } => {
                let mut node = serializer.serialize_struct("Node", 3)?;
                node.serialize_field("symbol", symbol)?;
                node.serialize_field("rule", rule)?;
                node.serialize_field("children", children)?;
                node.end()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplayError {
    // A nonterminal was reached after the rule history ran out
    MissingRule(String),
    // The next rule in the history expands some other nonterminal
    RuleMismatch { expected: String, rule: usize },
    // A terminal was reached after the matched tags ran out
    MissingTag { expected: Tag, index: usize },
    // The next matched tag is not the terminal the rule asks for
    TagMismatch { expected: Tag, found: Tag, index: usize },
    // History was left over once the tree was complete
    UnusedHistory,
}

impl Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayError::MissingRule(symbol) => write!(f, "No rule left to expand `{}`", symbol),
            ReplayError::RuleMismatch { expected, rule } => write!(f, "Rule {} does not expand `{}`", rule, expected),
            ReplayError::MissingTag { expected, index } => write!(f, "No matched tag left for {} at {}", expected, index),
            ReplayError::TagMismatch { expected, found, index } => write!(f, "Expected {} at {}, history has {}", expected, index, found),
            ReplayError::UnusedHistory => write!(f, "Derivation history was not fully used"),
        }
    }
}

impl std::error::Error for ReplayError {}

// Cursor over a preorder derivation history
struct Replay<'a> {
    rules: std::slice::Iter<'a, Rule>,
    tags: &'a [Tag],
    next_tag: usize,
}

impl<'a> Replay<'a> {
    fn nonterminal(&mut self, symbol: &str) -> Result<DerivationTree, ReplayError> {
        let rule = self.rules.next().ok_or_else(|| ReplayError::MissingRule(symbol.to_string()))?;
        if rule.lhs != symbol {
            return Err(ReplayError::RuleMismatch { expected: symbol.to_string(), rule: rule.number });
        }

        let mut children = Vec::with_capacity(rule.rhs.len());
        for child in &rule.rhs {
            children.push(match child {
                Symbol::Terminal(tag) => self.terminal(*tag)?,
                Symbol::Nonterminal(name) => self.nonterminal(name)?,
            });
        }

        Ok(DerivationTree::Node {
            symbol: symbol.to_string(),
            rule: rule.number,
            children,
        })
    }

    fn terminal(&mut self, expected: Tag) -> Result<DerivationTree, ReplayError> {
        let index = self.next_tag;
        match self.tags.get(index) {
            Some(&found) if found == expected => {
                self.next_tag += 1;
                Ok(DerivationTree::Leaf { tag: found, index })
            }
            Some(&found) => Err(ReplayError::TagMismatch { expected, found, index }),
            None => Err(ReplayError::MissingTag { expected, index }),
        }
    }
}

impl DerivationTree {
    /// Rebuilds the tree from a rule history in expansion order and the tags
    /// in consumption order. Expansion order is preorder, so every nonterminal
    /// takes exactly the next rule.
    pub fn replay(start: &str, rules: &[Rule], tags: &[Tag]) -> Result<Self, ReplayError> {
        let mut replay = Replay {
            rules: rules.iter(),
            tags,
            next_tag: 0,
        };

        let tree = replay.nonterminal(start)?;
        if replay.rules.next().is_some() || replay.next_tag != tags.len() {
            return Err(ReplayError::UnusedHistory);
        }
        Ok(tree)
    }

    pub fn symbol(&self) -> &str {
        match self {
            DerivationTree::Leaf { tag, .. } => tag.as_str(),
            DerivationTree::Node { symbol, .. } => symbol,
        }
    }

    // Terminal leaves, left to right
    pub fn leaves(&self) -> Vec<Tag> {
        let mut tags = Vec::new();
        self.collect_leaves(&mut tags);
        tags
    }

    fn collect_leaves(&self, tags: &mut Vec<Tag>) {
        match self {
            DerivationTree::Leaf { tag, .. } => tags.push(*tag),
            DerivationTree::Node { children, .. } => {
                for child in children {
                    child.collect_leaves(tags);
                }
            }
        }
    }

    /// Indented outline, one symbol per line. Leaves show their word when
    /// `words` covers their index.
    pub fn outline<'a, S: AsRef<str>>(&'a self, words: &'a [S]) -> Outline<'a, S> {
        Outline { tree: self, words }
    }

    fn write_outline<S: AsRef<str>>(&self, f: &mut std::fmt::Formatter<'_>, depth: usize, words: &[S]) -> std::fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            DerivationTree::Leaf { tag, index } => match words.get(*index) {
                Some(word) => writeln!(f, "{}{} '{}'", indent, tag, word.as_ref()),
                None => writeln!(f, "{}{} [{}]", indent, tag, index),
            },
            DerivationTree::Node { symbol, rule, children } => {
                writeln!(f, "{}{} (rule {})", indent, symbol, rule)?;
                for child in children {
                    child.write_outline(f, depth + 1, words)?;
                }
                Ok(())
            }
        }
    }
}

pub struct Outline<'a, S> {
    tree: &'a DerivationTree,
    words: &'a [S],
}

impl<S: AsRef<str>> Display for Outline<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.tree.write_outline(f, 0, self.words)
    }
}

impl Display for DerivationTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_outline::<&str>(f, 0, &[])
    }
}
