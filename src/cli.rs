use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{ArgGroup, Parser};
use frase::engine::MAX_PARSES;
use frase::ParserOptions;

#[derive(Parser)]
#[command(version, about)]
#[command(group(ArgGroup::new("input").required(true).args(["sentence", "sentence_flag"])))]
pub struct Cli {
    /// Sentence to check
    pub sentence: Option<String>,

    /// Sentence to check, given as an option instead
    #[arg(long = "sentence", value_name = "TEXT")]
    pub sentence_flag: Option<String>,

    /// Language whose grammar and lexicon to load from the data directory
    #[arg(short, long, value_name = "NAME", default_value = "spanish")]
    pub language: String,

    /// Directory holding `<language>.bnf` and `<language>.lex`
    #[arg(short, long, value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Grammar file (overrides the language default)
    #[arg(short, long, value_name = "FILE")]
    pub grammar: Option<PathBuf>,

    /// Lexicon file (overrides the language default)
    #[arg(long, value_name = "FILE")]
    pub lexicon: Option<PathBuf>,

    /// Start symbol (default: first in the grammar file)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Also print search metrics
    #[arg(short, long)]
    pub metrics: bool,

    /// Stop after this many derivations
    #[arg(
        short = 'n',
        long,
        value_name = "AMOUNT",
        default_value_t = MAX_PARSES,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_parses: usize,

    /// Give up after exploring this many search states (default: no limit)
    #[arg(long, value_name = "AMOUNT")]
    pub max_states: Option<usize>
}

impl Cli {
    pub fn text(&self) -> &str {
        self.sentence.as_deref().or(self.sentence_flag.as_deref()).unwrap_or_default()
    }

    // Data files are named in lowercase, so `SPANISH` finds `spanish.bnf`
    fn language_file(&self, extension: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", self.language.to_lowercase(), extension))
    }

    pub fn grammar_path(&self) -> PathBuf {
        self.grammar.clone().unwrap_or_else(|| self.language_file("bnf"))
    }

    pub fn lexicon_path(&self) -> PathBuf {
        self.lexicon.clone().unwrap_or_else(|| self.language_file("lex"))
    }

    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            max_parses: self.max_parses,
            max_states: self.max_states,
        }
    }
}
