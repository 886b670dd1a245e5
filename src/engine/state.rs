use std::rc::Rc;

use crate::grammar::{Rule, Symbol, Tag};

use super::tree::{DerivationTree, ReplayError};

#[derive(Debug)]
struct Node<T> {
    head: T,
    tail: Chain<T>,
}

// Persistent singly linked list, newest element first. Pushing shares the
// tail, so branching a state never copies its history.
#[derive(Debug)]
struct Chain<T>(Option<Rc<Node<T>>>);

impl<T> Clone for Chain<T> {
    fn clone(&self) -> Self {
        Chain(self.0.clone())
    }
}

impl<T> Chain<T> {
    fn empty() -> Self {
        Chain(None)
    }

    fn push(&self, head: T) -> Self {
        Chain(Some(Rc::new(Node { head, tail: self.clone() })))
    }

    fn split(&self) -> Option<(&T, &Chain<T>)> {
        self.0.as_deref().map(|node| (&node.head, &node.tail))
    }

    fn iter(&self) -> ChainIter<'_, T> {
        ChainIter(self.0.as_deref())
    }
}

// Unlinks iteratively so long histories do not recurse on drop
impl<T> Drop for Chain<T> {
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(node) = next {
            match Rc::try_unwrap(node) {
                Ok(mut node) => next = node.tail.0.take(),
                Err(_) => break,
            }
        }
    }
}

struct ChainIter<'a, T>(Option<&'a Node<T>>);

impl<'a, T> Iterator for ChainIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.map(|node| {
            self.0 = node.tail.0.as_deref();
            &node.head
        })
    }
}

/// One partial derivation on the search frontier.
///
/// Invariant: `matched_tags().len() == consumed()`, i.e. one tag per word
/// consumed so far.
#[derive(Debug, Clone)]
pub struct DerivationState<'g> {
    consumed: usize,
    stack: Chain<&'g Symbol>,
    rules: Chain<&'g Rule>,
    tags: Chain<Tag>,
}

impl<'g> DerivationState<'g> {
    pub fn seed(start: &'g Symbol) -> Self {
        DerivationState {
            consumed: 0,
            stack: Chain::empty().push(start),
            rules: Chain::empty(),
            tags: Chain::empty(),
        }
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    // Index of the last consumed word
    pub fn position(&self) -> Option<usize> {
        self.consumed.checked_sub(1)
    }

    /// Takes the top pending symbol, returning it with the state that remains.
    pub fn pop(&self) -> Option<(&'g Symbol, DerivationState<'g>)> {
        self.stack.split().map(|(&top, rest)| {
            (top, DerivationState {
                consumed: self.consumed,
                stack: rest.clone(),
                rules: self.rules.clone(),
                tags: self.tags.clone(),
            })
        })
    }

    // Consumes the next word as `tag`
    pub fn matched(&self, tag: Tag) -> Self {
        DerivationState {
            consumed: self.consumed + 1,
            stack: self.stack.clone(),
            rules: self.rules.clone(),
            tags: self.tags.push(tag),
        }
    }

    /// Applies `rule`. Its right-hand side is pushed in reverse so the first
    /// symbol ends up on top and is resolved first.
    pub fn expanded(&self, rule: &'g Rule) -> Self {
        let stack = rule.rhs.iter().rev().fold(self.stack.clone(), |stack, symbol| stack.push(symbol));
        DerivationState {
            consumed: self.consumed,
            stack,
            rules: self.rules.push(rule),
            tags: self.tags.clone(),
        }
    }

    // Top first
    pub fn pending(&self) -> impl Iterator<Item = &'g Symbol> + '_ {
        self.stack.iter().copied()
    }

    // Expansion order
    pub fn rules_applied(&self) -> Vec<&'g Rule> {
        let mut rules: Vec<_> = self.rules.iter().copied().collect();
        rules.reverse();
        rules
    }

    // Consumption order
    pub fn matched_tags(&self) -> Vec<Tag> {
        let mut tags: Vec<_> = self.tags.iter().copied().collect();
        tags.reverse();
        tags
    }

    /// Copies the shared history out into an owned derivation.
    pub fn materialize(&self, start: &str) -> Result<Derivation, ReplayError> {
        let rules_applied: Vec<Rule> = self.rules_applied().into_iter().cloned().collect();
        let matched_tags = self.matched_tags();
        let tree = DerivationTree::replay(start, &rules_applied, &matched_tags)?;

        Ok(Derivation {
            position: self.position(),
            rules_applied,
            matched_tags,
            tree,
        })
    }
}

/// An accepted derivation covering the whole input.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    // Index of the last consumed word
    pub position: Option<usize>,
    pub rules_applied: Vec<Rule>,
    pub matched_tags: Vec<Tag>,
    pub tree: DerivationTree,
}

impl Derivation {
    pub fn rule_numbers(&self) -> Vec<usize> {
        self.rules_applied.iter().map(|rule| rule.number).collect()
    }
}
