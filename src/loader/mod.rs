/*
    This module reads grammar (BNF) and lexicon files
*/

mod lexer;
mod lexicon;
mod verifier;

use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error_handling::*;
use crate::grammar::*;
use itertools::Itertools;
use lexer::*;

pub use lexicon::{load_lexicon, read_lexicon};
pub use verifier::{verify_rules, GrammarWarning};

#[derive(Debug)]
pub enum LoadErrorType {
    // A line which should contain a rule does not
    MissingEquals,
    // A rule has multiple equals signs
    UnexpectedEquals,
    // The user starts a rule line with something other than a nonterminal
    MissingNonterminal,
    // A character that cannot be part of a symbol name
    InvalidCharacter(char),
    // A lexicon line lacks one of `word | tags | translation`
    MissingField(&'static str),
    // A lexicon line has nothing before the first `|`
    EmptyWord,
    // A lexicon entry lists no tags at all
    MissingTags(String),
    // A lexicon entry uses a tag outside the fixed tag set
    UnknownTag(String),
    // The rules were read but do not form a usable grammar
    Grammar(GrammarError),
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for LoadErrorType {}

impl PartialEq for LoadErrorType {
    fn eq(&self, other: &Self) -> bool {
        use LoadErrorType::*;
        match (self, other) {
            (FileError(a), FileError(b)) => a.kind() == b.kind(),
            (InvalidCharacter(a), InvalidCharacter(b)) => a == b,
            (MissingField(a), MissingField(b)) => a == b,
            (MissingTags(a), MissingTags(b)) => a == b,
            (UnknownTag(a), UnknownTag(b)) => a == b,
            (Grammar(a), Grammar(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for LoadErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadErrorType::MissingEquals => write!(f, "Expected `=` after nonterminal"),
            LoadErrorType::UnexpectedEquals => write!(f, "Unexpected `=` encountered"),
            LoadErrorType::MissingNonterminal => write!(f, "Tried to define something other than a nonterminal"),
            LoadErrorType::InvalidCharacter(c) => write!(f, "Unexpected character `{}`", c),
            LoadErrorType::MissingField(field) => write!(f, "Missing {} field, expected `word | tags | translation`", field),
            LoadErrorType::EmptyWord => write!(f, "Lexicon entry has no word"),
            LoadErrorType::MissingTags(word) => write!(f, "No part-of-speech tags given for `{}`", word),
            LoadErrorType::UnknownTag(tag) => write!(f, "`{}` is not a part-of-speech tag", tag),
            LoadErrorType::Grammar(e) => write!(f, "{}", e),
            LoadErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type LoadError = Error<LoadErrorType>;
pub type LoadErrors = Errors<LoadErrorType>;

fn io_error(error: std::io::Error, file: &Path) -> LoadError {
    LoadError::in_file(file, LoadErrorType::FileError(error))
}

pub type Result<T> = std::result::Result<T, LoadErrorType>;
pub type LineResult<T> = std::result::Result<T, LoadError>;
pub type FileResult<T> = std::result::Result<T, LoadErrors>;

#[derive(PartialEq, Debug)]
struct RuleLine {
    symbol: String,
    alternatives: Vec<Vec<Symbol>>,
}

// One alternative, i.e. the tokens between two `|`
fn parse_alternative(tokens: &[Token]) -> Result<Vec<Symbol>> {
    tokens.iter().map(|t| match t {
        Token::Equals => Err(LoadErrorType::UnexpectedEquals),
        Token::Or => Err(LoadErrorType::InvalidCharacter('|')),
        Token::Identifier(name) => Ok(Symbol::classify(name))
    }).collect()
}

// Splits on `|`; an empty alternative is an empty production
fn parse_alternatives(tokens: &[Token]) -> Result<Vec<Vec<Symbol>>> {
    tokens.split(|t| *t == Token::Or).map(parse_alternative).collect()
}

fn parse_line(tokens: &[Token]) -> Result<RuleLine> {
    let symbol = match tokens.get(0) {
        Some(Token::Identifier(name)) => match Symbol::classify(name) {
            Symbol::Nonterminal(name) => Ok(name),
            Symbol::Terminal(_) => Err(LoadErrorType::MissingNonterminal),
        },
        _ => Err(LoadErrorType::MissingNonterminal),
    }?;

    if tokens.get(1) != Some(&Token::Equals) {
        return Err(LoadErrorType::MissingEquals)
    }

    let alternatives = parse_alternatives(&tokens[2..])?;

    return Ok(RuleLine {
        symbol,
        alternatives
    });
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<RuleLine> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line))
        .map_err(|error| LoadError { location, error })
}

fn is_content_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with(';')
}

// Returns an iterator over the content lines of a reader, with the io errors
// wrapped in LoadError and enumerated from 1
fn numbered_lines<'a, R: BufRead + 'a>(reader: R, path: &'a Path) -> impl Iterator<Item = (usize, LineResult<String>)> + 'a {
    reader
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, path)))
        .enumerate()
        .filter(|(_, line)| line.as_ref().map_or(true, |l| is_content_line(l)))
        .map(|(num, line)| (num + 1, line))
}

// Either every line parsed, or every line error
fn collect_lines<T>(lines: impl Iterator<Item = LineResult<T>>) -> FileResult<Vec<T>> {
    let (parsed, errors): (Vec<_>, Vec<_>) = lines.partition_result();
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(parsed)
}

// Numbers every alternative in declaration order, starting at 1
fn rules_from_lines(lines: Vec<RuleLine>) -> Vec<Rule> {
    lines
        .into_iter()
        .flat_map(|RuleLine { symbol, alternatives }| {
            alternatives.into_iter().map(move |rhs| (symbol.clone(), rhs))
        })
        .enumerate()
        .map(|(i, (lhs, rhs))| Rule { number: i + 1, lhs, rhs })
        .collect_vec()
}

fn grammar_from_lines(lines: Vec<RuleLine>, path: &Path) -> FileResult<Grammar> {
    // The first rule in the file names the start symbol
    let start_symbol = lines.first().map(|line| line.symbol.clone()).unwrap_or_default();

    let grammar = Grammar::new(start_symbol, rules_from_lines(lines)).map_err(|e| vec![LoadError::in_file(path, LoadErrorType::Grammar(e))])?;

    for warning in verify_rules(&grammar) {
        log::warn!("{}: {}", path.display(), warning);
    }
    log::info!("Loaded {} rules with starting symbol '{}'", grammar.rules().len(), grammar.start_symbol());

    Ok(grammar)
}

/// Reads a grammar from any line source. `path` is only used in error
/// locations and log lines.
pub fn read_grammar<R: BufRead>(reader: R, path: &Path) -> FileResult<Grammar> {
    let parsed_lines = numbered_lines(reader, path).map(|(num, line_res)| {
        line_res.and_then(|line| parse_lex_line(&line, Location::line(path, num)))
    });

    let lines = collect_lines(parsed_lines)?;
    grammar_from_lines(lines, path)
}

pub fn load_grammar(path: &Path) -> FileResult<Grammar> {
    log::info!("Loading grammar from {}", path.display());
    let file = File::open(path).map_err(|e| vec![io_error(e, path)])?;
    read_grammar(BufReader::new(file), path)
}
