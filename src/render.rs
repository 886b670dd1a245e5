/*
    This module turns parse reports into text or JSON
*/

use std::fmt::Display;

use serde::Serialize;

use crate::engine::{Derivation, DerivationTree, Metrics, ParseError, ParseReport};
use crate::grammar::{Rule, Tag};
use crate::lexicon::Lexicon;
use crate::sentence::Sentence;

const UNKNOWN_TAG: &str = "UNKNOWN";

#[derive(Serialize)]
struct TokenView<'a> {
    word: &'a str,
    tag: &'static str,
    translation: &'a str,
}

#[derive(Serialize)]
struct RuleView {
    number: usize,
    rule: String,
}

impl From<&Rule> for RuleView {
    fn from(rule: &Rule) -> Self {
        RuleView {
            number: rule.number,
            rule: rule.production(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureView<'a> {
    index: i64,
    token: &'a str,
    expected_categories: &'a [Tag],
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidView<'a> {
    valid: bool,
    sentence: String,
    tokens: Vec<TokenView<'a>>,
    parse_tree: &'a DerivationTree,
    rules_applied: Vec<RuleView>,
    parses: usize,
    ambiguous: bool,
    metrics: &'a Metrics,
}

#[derive(Serialize)]
struct InvalidView<'a> {
    valid: bool,
    sentence: String,
    tokens: Vec<TokenView<'a>>,
    failure: FailureView<'a>,
    metrics: &'a Metrics,
}

#[derive(Serialize)]
struct ErrorView<'a> {
    valid: bool,
    error: &'a str,
}

fn translation<'a>(lexicon: &'a Lexicon, word: &str) -> &'a str {
    lexicon.get(word).map_or("", |entry| entry.translation.as_str())
}

// Tags as the derivation matched them
fn matched_tokens<'a>(sentence: &'a Sentence, tags: &[Tag], lexicon: &'a Lexicon) -> Vec<TokenView<'a>> {
    sentence
        .words()
        .iter()
        .enumerate()
        .map(|(i, word)| TokenView {
            word,
            tag: tags.get(i).map_or(UNKNOWN_TAG, |tag| tag.as_str()),
            translation: translation(lexicon, word),
        })
        .collect()
}

// Best effort for failed parses: the first tag the lexicon knows
fn lexicon_tokens<'a>(sentence: &'a Sentence, lexicon: &'a Lexicon) -> Vec<TokenView<'a>> {
    sentence
        .words()
        .iter()
        .map(|word| TokenView {
            word,
            tag: lexicon.tags_for(word).first().map_or(UNKNOWN_TAG, |tag| tag.as_str()),
            translation: translation(lexicon, word),
        })
        .collect()
}

// Failures that happen before any word is read sit at -1
fn failure_index(error: &ParseError) -> i64 {
    error.index().map_or(-1, |index| index as i64)
}

/// JSON for one report. Tokens, tree and rules come from the first derivation.
pub fn to_json(report: &ParseReport, sentence: &Sentence, lexicon: &Lexicon) -> serde_json::Result<String> {
    match &report.result {
        Ok(derivations) => {
            // A successful search always carries at least one derivation
            let first = &derivations[0];
            serde_json::to_string_pretty(&ValidView {
                valid: true,
                sentence: sentence.to_string(),
                tokens: matched_tokens(sentence, &first.matched_tags, lexicon),
                parse_tree: &first.tree,
                rules_applied: first.rules_applied.iter().map(RuleView::from).collect(),
                parses: derivations.len(),
                ambiguous: derivations.len() > 1,
                metrics: &report.metrics,
            })
        }
        Err(error) => serde_json::to_string_pretty(&InvalidView {
            valid: false,
            sentence: sentence.to_string(),
            tokens: lexicon_tokens(sentence, lexicon),
            failure: FailureView {
                index: failure_index(error),
                token: error.token().unwrap_or_default(),
                expected_categories: error.expected_categories(),
                message: error.to_string(),
            },
            metrics: &report.metrics,
        }),
    }
}

// For failures that happen before any sentence is parsed
pub fn error_json(message: &str) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ErrorView { valid: false, error: message })
}

struct TextReport<'a> {
    report: &'a ParseReport,
    sentence: &'a Sentence,
    show_metrics: bool,
}

impl Display for TextReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.report.result {
            Ok(derivations) => write_derivations(f, derivations, self.sentence)?,
            Err(error) => {
                writeln!(f, "Invalid sentence: {}", self.sentence)?;
                writeln!(f, "Error: {}", error)?;
            }
        }

        for warning in &self.report.warnings {
            writeln!(f, "Warning: {}", warning)?;
        }

        if self.show_metrics {
            writeln!(f, "\n{}", self.report.metrics)?;
        }
        Ok(())
    }
}

pub fn to_text(report: &ParseReport, sentence: &Sentence, show_metrics: bool) -> String {
    TextReport { report, sentence, show_metrics }.to_string()
}

fn write_derivations(f: &mut std::fmt::Formatter<'_>, derivations: &[Derivation], sentence: &Sentence) -> std::fmt::Result {
    writeln!(f, "Valid sentence: {}", sentence)?;
    write!(f, "Parses found: {}", derivations.len())?;
    if derivations.len() > 1 {
        write!(f, " (ambiguous)")?;
    }
    writeln!(f)?;

    for (i, derivation) in derivations.iter().enumerate() {
        writeln!(f, "\nParse {}:", i + 1)?;
        write!(f, "{}", derivation.tree.outline(sentence.words()))?;
        for rule in &derivation.rules_applied {
            writeln!(f, "  {}", rule)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::Value;

    use super::*;
    use crate::engine::Parser;
    use crate::lexicon::LexiconEntry;
    use crate::loader::read_grammar;

    fn parser() -> Parser {
        let grammar = read_grammar(
            "S = NP VP\nNP = DET N | DET NOM\nNOM = N\nVP = V_COP A".as_bytes(),
            Path::new("test.bnf"),
        ).unwrap();
        let lexicon = vec![
            LexiconEntry::new("el", vec![Tag::Det], "the"),
            LexiconEntry::new("perro", vec![Tag::N], "dog"),
            LexiconEntry::new("es", vec![Tag::VCop], "is"),
            LexiconEntry::new("grande", vec![Tag::A], "big"),
        ].into_iter().collect();
        Parser::new(grammar, lexicon)
    }

    fn json(text: &str) -> Value {
        let parser = parser();
        let sentence = Sentence::new(text);
        let report = parser.parse_sentence(&sentence);
        serde_json::from_str(&to_json(&report, &sentence, parser.lexicon()).unwrap()).unwrap()
    }

    #[test]
    fn valid_parse_json() {
        let value = json("El perro es grande.");

        assert_eq!(value["valid"], true);
        assert_eq!(value["sentence"], "el perro es grande");
        assert_eq!(value["parses"], 2);
        assert_eq!(value["ambiguous"], true);
        assert_eq!(value["tokens"][1], serde_json::json!({"word": "perro", "tag": "N", "translation": "dog"}));
        assert_eq!(value["rulesApplied"][0], serde_json::json!({"number": 1, "rule": "S -> NP VP"}));
        assert_eq!(value["parseTree"]["symbol"], "S");
        assert_eq!(value["parseTree"]["children"][0]["children"][0], serde_json::json!({"symbol": "DET", "word": true, "index": 0}));
        assert!(value["metrics"]["statesExplored"].as_u64().unwrap() > 0);
        assert!(value["metrics"]["maxQueueSize"].as_u64().unwrap() > 0);
    }

    #[test]
    fn invalid_parse_json() {
        let value = json("grande perro");

        assert_eq!(value["valid"], false);
        assert_eq!(value["tokens"][0]["tag"], "A");
        assert_eq!(value["failure"]["index"], 0);
        assert_eq!(value["failure"]["token"], "grande");
        assert_eq!(value["failure"]["expectedCategories"], serde_json::json!(["DET"]));
        assert_eq!(value["failure"]["message"], "Expected DET at position 0, found 'grande'");
    }

    #[test]
    fn unknown_word_json() {
        let value = json("el xyz es grande");

        assert_eq!(value["tokens"][1]["tag"], "UNKNOWN");
        assert_eq!(value["tokens"][1]["translation"], "");
        assert_eq!(value["failure"]["index"], 1);
        assert_eq!(value["failure"]["message"], "Unknown word: 'xyz'");
    }

    #[test]
    fn empty_sentence_fails_before_the_first_word() {
        let value = json("¡!");
        assert_eq!(value["failure"]["index"], -1);
        assert_eq!(value["failure"]["token"], "");
        assert_eq!(value["failure"]["message"], "Empty sentence");
    }

    #[test]
    fn text_lists_every_parse() {
        let parser = parser();
        let sentence = Sentence::new("el perro es grande");
        let text = to_text(&parser.parse_sentence(&sentence), &sentence, false);

        assert!(text.starts_with("Valid sentence: el perro es grande\nParses found: 2 (ambiguous)\n"));
        assert!(text.contains("\nParse 2:\nS (rule 1)\n"));
        assert!(text.contains("    N 'perro'\n"));
        assert!(text.contains("  RULE 4: NOM -> N\n"));
        assert!(!text.contains("States explored"));
    }

    #[test]
    fn text_reports_the_failure() {
        let parser = parser();
        let sentence = Sentence::new("grande perro");
        let text = to_text(&parser.parse_sentence(&sentence), &sentence, true);

        assert!(text.starts_with("Invalid sentence: grande perro\nError: Expected DET at position 0, found 'grande'\n"));
        assert!(text.contains("States explored:"));
    }

    #[test]
    fn error_json_shape() {
        let value: Value = serde_json::from_str(&error_json("Grammar contains no rules").unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({"valid": false, "error": "Grammar contains no rules"}));
    }
}
