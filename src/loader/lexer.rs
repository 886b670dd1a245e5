use itertools::{Itertools, PeekingNext};

use super::{LoadErrorType, Result};

#[derive(PartialEq, Debug)]
pub enum Token {
    Equals,
    Or,
    Identifier(String)
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '\'')
}

pub fn lex_identifier(line: &mut impl PeekingNext<Item = char>) -> Token {
    Token::Identifier(line.peeking_take_while(|&c| is_identifier_char(c)).collect())
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(&c) = line_chars.peek() {
        if c == '=' {
            line_chars.next();
            tokens.push(Token::Equals);
        } else if c == '|' {
            line_chars.next();
            tokens.push(Token::Or);
        } else if is_identifier_char(c) {
            tokens.push(lex_identifier(&mut line_chars));
        } else if c.is_whitespace() {
            line_chars.next();
        } else {
            return Err(LoadErrorType::InvalidCharacter(c));
        }
    }

    return Ok(tokens);
}
