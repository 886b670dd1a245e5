/*
    Grammaticality checking for short sentences: a context-free grammar over
    part-of-speech tags, a lexicon mapping words to tags, and a breadth-first
    search that either returns the derivations found or says where the
    sentence stopped making sense.
*/

pub mod engine;
pub mod error_handling;
pub mod grammar;
pub mod lexicon;
pub mod loader;
pub mod render;
pub mod sentence;

pub use engine::{Derivation, DerivationTree, FailureDiagnostic, Metrics, ParseError, ParseReport, Parser, ParserOptions, SearchWarning};
pub use grammar::{Grammar, Rule, Symbol, Tag};
pub use lexicon::{Lexicon, LexiconEntry};
pub use sentence::Sentence;
