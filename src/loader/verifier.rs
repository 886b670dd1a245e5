use std::fmt::Display;

use crate::grammar::{Grammar, Rule, Symbol};

// Grammar smells that are reported but never stop a load
#[derive(Debug, PartialEq)]
pub enum GrammarWarning {
    // A rule mentions a nonterminal that has no productions
    UndefinedNonterminal { rule: usize, symbol: String },
    // A rule mentions its own left-hand side
    DirectRecursion { rule: usize },
}

impl Display for GrammarWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarWarning::UndefinedNonterminal { rule, symbol } => write!(f, "Rule {} uses `{}`, which has no definition", rule, symbol),
            GrammarWarning::DirectRecursion { rule } => write!(f, "Direct recursion detected in rule {}", rule),
        }
    }
}

fn get_rule_undefined_symbols<'a>(rule: &'a Rule, grammar: &'a Grammar) -> impl Iterator<Item = GrammarWarning> + 'a {
    // Filter out everything but nonterminals, then keep the undefined ones
    rule.rhs.iter()
        .filter_map(|symbol| match symbol {
            Symbol::Nonterminal(name) => Some(name),
            _ => None
        })
        .filter(|name| !grammar.defines(name))
        .map(|name| GrammarWarning::UndefinedNonterminal {
            rule: rule.number,
            symbol: name.to_owned()
        })
}

pub fn verify_rules(grammar: &Grammar) -> Vec<GrammarWarning> {
    let mut warnings = Vec::new();

    for rule in grammar.rules() {
        warnings.extend(get_rule_undefined_symbols(rule, grammar));
        if rule.is_directly_recursive() {
            warnings.push(GrammarWarning::DirectRecursion { rule: rule.number });
        }
    }

    warnings
}
