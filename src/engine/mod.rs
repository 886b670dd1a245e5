/*
    This module searches for derivations of a sentence
*/

mod failure;
mod metrics;
mod state;
mod tree;

use std::collections::VecDeque;
use std::fmt::Display;
use std::time::Instant;

use crate::grammar::{Grammar, Symbol, Tag};
use crate::lexicon::{Lexicon, LexiconEntry};
use crate::sentence::Sentence;

pub use failure::{FailureDiagnostic, FailureTracker};
pub use metrics::Metrics;
pub use state::{Derivation, DerivationState};
pub use tree::{DerivationTree, Outline, ReplayError};

pub const MAX_PARSES: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ParserOptions {
    // Stop once this many derivations are accepted
    pub max_parses: usize,
    // Give up after dequeuing this many states. None searches until the
    // frontier empties.
    pub max_states: Option<usize>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            max_parses: MAX_PARSES,
            max_states: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    // There were no words to parse
    EmptyInput,
    // A word is missing from the lexicon; no search was run
    UnknownWord { index: usize, word: String },
    // Every branch of the search was abandoned
    NoParseFound(FailureDiagnostic),
    // The explored-state ceiling was hit before anything was accepted
    StateLimitReached { limit: usize, furthest: FailureDiagnostic },
}

impl ParseError {
    pub fn index(&self) -> Option<usize> {
        match self {
            ParseError::EmptyInput => None,
            ParseError::UnknownWord { index, .. } => Some(*index),
            ParseError::NoParseFound(diagnostic) | ParseError::StateLimitReached { furthest: diagnostic, .. } => Some(diagnostic.index),
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            ParseError::EmptyInput => None,
            ParseError::UnknownWord { word, .. } => Some(word),
            ParseError::NoParseFound(diagnostic) | ParseError::StateLimitReached { furthest: diagnostic, .. } => Some(&diagnostic.token),
        }
    }

    pub fn expected_categories(&self) -> &[Tag] {
        match self {
            ParseError::NoParseFound(diagnostic) | ParseError::StateLimitReached { furthest: diagnostic, .. } => &diagnostic.expected_categories,
            _ => &[],
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyInput => write!(f, "Empty sentence"),
            ParseError::UnknownWord { word, .. } => write!(f, "Unknown word: '{}'", word),
            ParseError::NoParseFound(diagnostic) => write!(f, "{}", diagnostic.message),
            ParseError::StateLimitReached { limit, furthest } => write!(f, "Gave up after exploring {} states. {}", limit, furthest.message),
        }
    }
}

impl std::error::Error for ParseError {}

// Grammar defects met during a search. They drop a branch, never the search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchWarning {
    NoRulesFor(String),
}

impl Display for SearchWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchWarning::NoRulesFor(symbol) => write!(f, "No rules found for non-terminal: {}", symbol),
        }
    }
}

/// Everything one call to [`Parser::parse`] produced.
#[derive(Debug)]
pub struct ParseReport {
    pub result: Result<Vec<Derivation>, ParseError>,
    pub metrics: Metrics,
    pub warnings: Vec<SearchWarning>,
}

impl ParseReport {
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_ambiguous(&self) -> bool {
        self.derivations().len() > 1
    }

    pub fn derivations(&self) -> &[Derivation] {
        match &self.result {
            Ok(derivations) => derivations,
            Err(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&ParseError> {
        self.result.as_ref().err()
    }
}

/// Breadth-first recognizer over a grammar and lexicon.
///
/// The parser itself is immutable; each call keeps its own frontier, metrics
/// and failure witness, so one parser can serve many threads.
#[derive(Debug)]
pub struct Parser {
    grammar: Grammar,
    lexicon: Lexicon,
    options: ParserOptions,
}

impl Parser {
    pub fn new(grammar: Grammar, lexicon: Lexicon) -> Self {
        Self::with_options(grammar, lexicon, ParserOptions::default())
    }

    // A cap of zero could never accept anything, so it is raised to one
    pub fn with_options(grammar: Grammar, lexicon: Lexicon, mut options: ParserOptions) -> Self {
        if options.max_parses == 0 {
            log::warn!("max_parses must be at least 1, using 1");
            options.max_parses = 1;
        }
        Parser { grammar, lexicon, options }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn parse_sentence(&self, sentence: &Sentence) -> ParseReport {
        self.parse(sentence.words())
    }

    pub fn parse<S: AsRef<str>>(&self, words: &[S]) -> ParseReport {
        let started = Instant::now();
        let mut metrics = Metrics::default();
        let mut warnings = Vec::new();

        let result = self
            .lookup(words)
            .and_then(|entries| self.search(words, &entries, &mut metrics, &mut warnings));

        metrics.elapsed = started.elapsed();
        log::debug!(
            "Explored {} states ({} generated, peak frontier {}) in {:.3} ms",
            metrics.states_explored,
            metrics.states_generated,
            metrics.peak_frontier,
            metrics.elapsed_ms()
        );

        ParseReport { result, metrics, warnings }
    }

    // Every word must be known before any search runs
    fn lookup<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<&LexiconEntry>, ParseError> {
        if words.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        words
            .iter()
            .enumerate()
            .map(|(index, word)| {
                self.lexicon.get(word.as_ref()).ok_or_else(|| ParseError::UnknownWord {
                    index,
                    word: word.as_ref().to_string(),
                })
            })
            .collect()
    }

    fn search<S: AsRef<str>>(
        &self,
        words: &[S],
        entries: &[&LexiconEntry],
        metrics: &mut Metrics,
        warnings: &mut Vec<SearchWarning>,
    ) -> Result<Vec<Derivation>, ParseError> {
        let start = Symbol::Nonterminal(self.grammar.start_symbol().to_string());
        let last = words.len() - 1;

        let mut tracker = FailureTracker::new();
        let mut accepted = Vec::new();
        let mut frontier = VecDeque::new();
        let mut limit_reached = false;

        frontier.push_back(DerivationState::seed(&start));
        metrics.record_generated();

        while accepted.len() < self.options.max_parses {
            if self.options.max_states.is_some_and(|limit| metrics.states_explored >= limit) {
                limit_reached = !frontier.is_empty();
                break;
            }

            metrics.observe_frontier(frontier.len());
            let Some(state) = frontier.pop_front() else {
                break;
            };
            metrics.record_explored();

            let Some((symbol, rest)) = state.pop() else {
                // Stack is empty. Leftover words make this an under-generating
                // branch, which is not a failure witness.
                if state.consumed() == words.len() {
                    match state.materialize(self.grammar.start_symbol()) {
                        Ok(derivation) => accepted.push(derivation),
                        Err(e) => log::error!("Dropping accepted state with broken history: {}", e),
                    }
                }
                continue;
            };

            match symbol {
                Symbol::Terminal(tag) => {
                    metrics.record_terminal_attempt();
                    let next = state.consumed();
                    match entries.get(next) {
                        Some(entry) if entry.has_tag(*tag) => {
                            metrics.record_terminal_success();
                            frontier.push_back(rest.matched(*tag));
                            metrics.record_generated();
                        }
                        Some(_) => tracker.record(next, *tag),
                        // Out of input: blamed on the last word consumed
                        None => tracker.record(last, *tag),
                    }
                }
                Symbol::Nonterminal(name) => {
                    let mut rules = self.grammar.rules_for(name).peekable();
                    if rules.peek().is_none() {
                        let warning = SearchWarning::NoRulesFor(name.clone());
                        if !warnings.contains(&warning) {
                            log::warn!("{}", warning);
                            warnings.push(warning);
                        }
                        continue;
                    }

                    for rule in rules {
                        metrics.record_expansion();
                        frontier.push_back(rest.expanded(rule));
                        metrics.record_generated();
                    }
                }
            }
        }

        if accepted.is_empty() {
            let diagnostic = tracker.diagnose(words);
            return Err(match (limit_reached, self.options.max_states) {
                (true, Some(limit)) => ParseError::StateLimitReached { limit, furthest: diagnostic },
                _ => ParseError::NoParseFound(diagnostic),
            });
        }

        if limit_reached {
            log::warn!("State limit reached after {} parse(s); results may be incomplete", accepted.len());
        }
        let sentence: Vec<&str> = words.iter().map(|w| w.as_ref()).collect();
        log::info!("Found {} parse(s) for: {}", accepted.len(), sentence.join(" "));
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::loader::read_grammar;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn lexicon() -> Lexicon {
        vec![
            LexiconEntry::new("el", vec![Tag::Det], "the"),
            LexiconEntry::new("perro", vec![Tag::N], "dog"),
            LexiconEntry::new("es", vec![Tag::VCop], "is"),
            LexiconEntry::new("grande", vec![Tag::A], "big"),
            LexiconEntry::new("rojo", vec![Tag::A], "red"),
            LexiconEntry::new("corre", vec![Tag::V], "runs"),
        ].into_iter().collect()
    }

    fn parser(grammar: &str) -> Parser {
        parser_with(grammar, ParserOptions::default())
    }

    fn parser_with(grammar: &str, options: ParserOptions) -> Parser {
        init_logging();
        let grammar = read_grammar(grammar.as_bytes(), Path::new("test.bnf")).unwrap();
        Parser::with_options(grammar, lexicon(), options)
    }

    const COPULAR: &str = "
        S = NP VP
        NP = DET N | DET A N
        VP = V_COP AP | V
        AP = A
    ";

    #[test]
    fn empty_input_is_rejected_before_search() {
        let report = parser(COPULAR).parse::<&str>(&[]);
        assert_eq!(report.result, Err(ParseError::EmptyInput));
        assert_eq!(report.metrics.states_explored, 0);
    }

    #[test]
    fn first_unknown_word_is_reported_before_search() {
        let report = parser(COPULAR).parse(&["el", "xyz", "es", "abc"]);
        assert_eq!(report.result, Err(ParseError::UnknownWord { index: 1, word: "xyz".to_string() }));
        assert_eq!(report.metrics.states_explored, 0);
        assert_eq!(report.error().map(ToString::to_string), Some("Unknown word: 'xyz'".to_string()));
    }

    #[test]
    fn accepts_copular_sentence() {
        let report = parser(COPULAR).parse(&["El", "PERRO", "es", "grande"]);

        let derivations = report.derivations();
        assert_eq!(derivations.len(), 1);
        assert!(!report.is_ambiguous());
        assert_eq!(derivations[0].position, Some(3));
        assert_eq!(derivations[0].matched_tags, vec![Tag::Det, Tag::N, Tag::VCop, Tag::A]);
        assert_eq!(derivations[0].rule_numbers(), vec![1, 2, 4, 6]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn furthest_failure_names_the_missing_determiner() {
        let report = parser(COPULAR).parse(&["grande", "perro"]);

        let Err(ParseError::NoParseFound(diagnostic)) = report.result else {
            panic!("expected a failed parse");
        };
        assert_eq!(diagnostic.index, 0);
        assert_eq!(diagnostic.token, "grande");
        assert_eq!(diagnostic.expected_categories, vec![Tag::Det]);
        assert_eq!(diagnostic.message, "Expected DET at position 0, found 'grande'");
    }

    #[test]
    fn ties_at_the_furthest_position_are_merged() {
        let report = parser(COPULAR).parse(&["el", "corre"]);

        let error = report.error().unwrap();
        assert_eq!(error.index(), Some(1));
        assert_eq!(error.token(), Some("corre"));
        assert_eq!(error.expected_categories(), &[Tag::N, Tag::A]);
    }

    #[test]
    fn running_out_of_input_blames_the_last_word() {
        let report = parser(COPULAR).parse(&["el", "perro", "es"]);

        let error = report.error().unwrap();
        assert_eq!(error.index(), Some(2));
        assert_eq!(error.token(), Some("es"));
        assert_eq!(error.expected_categories(), &[Tag::V, Tag::A]);
    }

    #[test]
    fn leftover_words_are_not_failure_witnesses() {
        let report = parser("S = N").parse(&["perro", "perro"]);

        let Err(ParseError::NoParseFound(diagnostic)) = report.result else {
            panic!("expected a failed parse");
        };
        assert_eq!(diagnostic.index, 0);
        assert_eq!(diagnostic.token, "perro");
        assert!(diagnostic.expected_categories.is_empty());
        assert_eq!(diagnostic.message, "Could not parse sentence");
    }

    #[test]
    fn alternative_rules_give_every_derivation_in_discovery_order() {
        let report = parser("S = NP\nNP = DET N | DET NOM\nNOM = N").parse(&["el", "perro"]);

        let numbers: Vec<_> = report.derivations().iter().map(Derivation::rule_numbers).collect();
        assert_eq!(numbers, vec![vec![1, 2], vec![1, 3, 4]]);
        assert!(report.is_ambiguous());
    }

    #[test]
    fn unbounded_ambiguity_is_capped() {
        let report = parser("S = N | S").parse(&["perro"]);
        assert_eq!(report.derivations().len(), MAX_PARSES);

        // Each derivation wraps the previous one in one more S
        for (depth, derivation) in report.derivations().iter().enumerate() {
            assert_eq!(derivation.rules_applied.len(), depth + 1);
        }

        let options = ParserOptions { max_parses: 3, ..ParserOptions::default() };
        let report = parser_with("S = N | S", options).parse(&["perro"]);
        assert_eq!(report.derivations().len(), 3);
    }

    #[test]
    fn repeated_parses_agree() {
        let parser = parser("S = NP VP\nNP = DET NOM | DET N\nNOM = N | N AP\nVP = V_COP AP | V_COP A\nAP = A");
        let words = ["el", "perro", "es", "grande"];

        let first = parser.parse(&words);
        let second = parser.parse(&words);
        assert!(first.derivations().len() > 1);
        assert_eq!(first.result, second.result);
    }

    #[test]
    fn trees_flatten_back_to_matched_tags() {
        let parser = parser("S = NP VP\nNP = DET NOM | DET N\nNOM = N | N AP\nVP = V_COP AP | V_COP A | V\nAP = A");

        for words in [vec!["el", "perro", "es", "grande"], vec!["el", "perro", "rojo", "corre"]] {
            let report = parser.parse(&words);
            assert!(report.is_valid(), "{:?}", words);
            for derivation in report.derivations() {
                assert_eq!(derivation.tree.leaves(), derivation.matched_tags);
                assert_eq!(derivation.matched_tags.len(), words.len());
                assert_eq!(
                    DerivationTree::replay("S", &derivation.rules_applied, &derivation.matched_tags).as_ref(),
                    Ok(&derivation.tree)
                );
            }
        }
    }

    #[test]
    fn empty_productions_consume_nothing() {
        let parser = parser("S = NP V\nNP = DET N OPT\nOPT = | A");

        assert!(parser.parse(&["el", "perro", "corre"]).is_valid());
        assert!(parser.parse(&["el", "perro", "rojo", "corre"]).is_valid());
    }

    #[test]
    fn undefined_nonterminal_drops_the_branch_with_a_warning() {
        let report = parser("S = NP VP | NP V\nNP = DET N").parse(&["el", "perro", "corre"]);

        assert_eq!(report.derivations().len(), 1);
        assert_eq!(report.warnings, vec![SearchWarning::NoRulesFor("VP".to_string())]);
    }

    #[test]
    fn undefined_nonterminal_is_reported_once_per_call() {
        // Both alternatives of S reach the missing VP
        let parser = parser("S = NP VP | DET VP\nNP = DET N");
        let report = parser.parse(&["el", "perro", "corre"]);

        assert!(!report.is_valid());
        assert_eq!(report.warnings, vec![SearchWarning::NoRulesFor("VP".to_string())]);

        // A fresh call starts with no warnings of its own
        let report = parser.parse(&["el", "corre"]);
        assert_eq!(report.warnings, vec![SearchWarning::NoRulesFor("VP".to_string())]);
    }

    #[test]
    fn zero_parse_cap_still_accepts() {
        let options = ParserOptions { max_parses: 0, ..ParserOptions::default() };
        let parser = parser_with("S = DET N", options);

        assert_eq!(parser.options().max_parses, 1);
        let report = parser.parse(&["el", "perro"]);
        assert_eq!(report.derivations().len(), 1);
    }

    #[test]
    fn state_limit_stops_runaway_grammars() {
        let options = ParserOptions { max_states: Some(200), ..ParserOptions::default() };

        // Left recursion never runs out of states to try
        let report = parser_with("S = S N | N", options.clone()).parse(&["el"]);
        assert_eq!(report.metrics.states_explored, 200);
        match report.result {
            Err(ParseError::StateLimitReached { limit, furthest }) => {
                assert_eq!(limit, 200);
                assert_eq!(furthest.expected_categories, vec![Tag::N]);
            }
            other => panic!("expected the state limit, got {:?}", other),
        }

        let report = parser_with("S = S N | N", options).parse(&["perro"]);
        assert_eq!(report.derivations().len(), 1);
    }

    #[test]
    fn metrics_count_the_search() {
        let report = parser(COPULAR).parse(&["el", "perro", "corre"]);
        let metrics = &report.metrics;

        assert!(report.is_valid());
        assert_eq!(metrics.terminal_successes, 4);
        assert!(metrics.terminal_attempts > metrics.terminal_successes);
        assert!(metrics.states_explored <= metrics.states_generated);
        assert!(metrics.peak_frontier >= 2);
        assert_eq!(metrics.rule_expansions, 5);
    }

    #[test]
    fn one_parser_serves_many_threads() {
        let parser = Arc::new(parser(COPULAR));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let parser = Arc::clone(&parser);
                thread::spawn(move || {
                    let words = if i % 2 == 0 { vec!["el", "perro", "corre"] } else { vec!["grande", "perro"] };
                    parser.parse(&words).is_valid()
                })
            })
            .collect();

        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![true, false, true, false]);
    }
}
