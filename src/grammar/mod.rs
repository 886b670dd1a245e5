/*
    This module is for storing and looking up grammars
*/

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use itertools::Itertools;
use serde::Serialize;

use crate::error_handling::ErrorType;

// The closed set of part-of-speech tags. Any grammar symbol that is not one of
// these is a nonterminal and needs productions of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tag {
    Det,
    N,
    V,
    VCop,
    VEx,
    A,
    Adv,
    Prep,
    Conj,
    Pron,
    Neg,
}

impl Tag {
    pub const ALL: [Tag; 11] = [
        Tag::Det,
        Tag::N,
        Tag::V,
        Tag::VCop,
        Tag::VEx,
        Tag::A,
        Tag::Adv,
        Tag::Prep,
        Tag::Conj,
        Tag::Pron,
        Tag::Neg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Det => "DET",
            Tag::N => "N",
            Tag::V => "V",
            Tag::VCop => "V_COP",
            Tag::VEx => "V_EX",
            Tag::A => "A",
            Tag::Adv => "ADV",
            Tag::Prep => "PREP",
            Tag::Conj => "CONJ",
            Tag::Pron => "PRON",
            Tag::Neg => "NEG",
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq)]
pub struct UnknownTag(pub String);

impl Display for UnknownTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` is not a part-of-speech tag", self.0)
    }
}

impl FromStr for Tag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

// The base unit in a grammar rule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(Tag),
    Nonterminal(String),
}

impl Symbol {
    // Terminal-hood comes from the tag set, never from the grammar file
    pub fn classify(name: &str) -> Symbol {
        match name.parse::<Tag>() {
            Ok(tag) => Symbol::Terminal(tag),
            Err(_) => Symbol::Nonterminal(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(tag) => tag.as_str(),
            Symbol::Nonterminal(name) => name,
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// A single production. Alternatives of the same nonterminal are separate rules
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub number: usize,
    pub lhs: String,
    pub rhs: Vec<Symbol>,
}

impl Rule {
    pub fn production(&self) -> String {
        if self.rhs.is_empty() {
            format!("{} -> (empty)", self.lhs)
        } else {
            format!("{} -> {}", self.lhs, self.rhs.iter().join(" "))
        }
    }

    pub fn is_directly_recursive(&self) -> bool {
        self.rhs.iter().any(|symbol| symbol.name() == self.lhs)
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RULE {}: {}", self.number, self.production())
    }
}

#[derive(Debug, PartialEq)]
pub enum GrammarError {
    // The grammar file contained no rules at all
    NoRules,
    // Nothing can be derived because the start symbol has no production
    MissingStartRule(String),
}

impl ErrorType for GrammarError {}

impl Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarError::NoRules => write!(f, "Grammar contains no rules"),
            GrammarError::MissingStartRule(start) => write!(f, "No rule produces starting symbol `{}`", start),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Grammar {
    start_symbol: String,
    rules: Vec<Rule>,
    // lhs -> indices into `rules`, kept in declaration order
    index: HashMap<String, Vec<usize>>,
}

impl Grammar {
    pub fn new(start_symbol: impl Into<String>, rules: Vec<Rule>) -> Result<Self, GrammarError> {
        if rules.is_empty() {
            return Err(GrammarError::NoRules);
        }

        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, rule) in rules.iter().enumerate() {
            index.entry(rule.lhs.clone()).or_default().push(i);
        }

        let grammar = Grammar {
            start_symbol: start_symbol.into(),
            rules,
            index,
        };
        grammar.check_start()?;
        Ok(grammar)
    }

    // Re-roots the grammar at another nonterminal
    pub fn with_start_symbol(self, start_symbol: impl Into<String>) -> Result<Self, GrammarError> {
        let grammar = Grammar {
            start_symbol: start_symbol.into(),
            ..self
        };
        grammar.check_start()?;
        Ok(grammar)
    }

    fn check_start(&self) -> Result<(), GrammarError> {
        if self.defines(&self.start_symbol) {
            Ok(())
        } else {
            Err(GrammarError::MissingStartRule(self.start_symbol.clone()))
        }
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn defines(&self, nonterminal: &str) -> bool {
        self.index.contains_key(nonterminal)
    }

    /// Alternatives for `nonterminal` in declaration order. The order decides
    /// which derivation the search discovers first.
    pub fn rules_for<'a>(&'a self, nonterminal: &str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.index
            .get(nonterminal)
            .into_iter()
            .flatten()
            .map(move |&i| &self.rules[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(number: usize, lhs: &str, rhs: &[&str]) -> Rule {
        Rule {
            number,
            lhs: lhs.to_string(),
            rhs: rhs.iter().map(|s| Symbol::classify(s)).collect(),
        }
    }

    #[test]
    fn tags_round_trip_through_their_names() {
        for tag in Tag::ALL {
            assert_eq!(tag.as_str().parse::<Tag>(), Ok(tag));
        }
        assert_eq!("NP".parse::<Tag>(), Err(UnknownTag("NP".to_string())));
        assert_eq!("det".parse::<Tag>(), Err(UnknownTag("det".to_string())));
    }

    #[test]
    fn classify_symbols() {
        assert_eq!(Symbol::classify("V_COP"), Symbol::Terminal(Tag::VCop));
        assert_eq!(Symbol::classify("VP"), Symbol::Nonterminal("VP".to_string()));
    }

    #[test]
    fn rules_for_keeps_declaration_order() {
        let grammar = Grammar::new("S", vec![
            rule(1, "S", &["NP", "VP"]),
            rule(2, "NP", &["DET", "N"]),
            rule(3, "VP", &["V"]),
            rule(4, "NP", &["PRON"]),
            rule(5, "NP", &["DET", "A", "N"]),
        ]).unwrap();

        let numbers: Vec<usize> = grammar.rules_for("NP").map(|r| r.number).collect();
        assert_eq!(numbers, vec![2, 4, 5]);
        assert_eq!(grammar.rules_for("PP").count(), 0);
        assert_eq!(grammar.rules().len(), 5);
    }

    #[test]
    fn start_symbol_must_be_producible() {
        assert_eq!(Grammar::new("S", vec![]), Err(GrammarError::NoRules));
        assert_eq!(
            Grammar::new("S", vec![rule(1, "NP", &["N"])]),
            Err(GrammarError::MissingStartRule("S".to_string()))
        );

        let grammar = Grammar::new("S", vec![rule(1, "S", &["NP"]), rule(2, "NP", &["N"])]).unwrap();
        let grammar = grammar.with_start_symbol("NP").unwrap();
        assert_eq!(grammar.start_symbol(), "NP");
        assert_eq!(
            grammar.with_start_symbol("VP"),
            Err(GrammarError::MissingStartRule("VP".to_string()))
        );
    }

    #[test]
    fn rule_display() {
        assert_eq!(rule(7, "NP", &["DET", "A", "N"]).to_string(), "RULE 7: NP -> DET A N");
        assert_eq!(rule(8, "OPT", &[]).production(), "OPT -> (empty)");
        assert!(rule(9, "AP", &["ADV", "AP"]).is_directly_recursive());
        assert!(!rule(10, "AP", &["A"]).is_directly_recursive());
    }
}
