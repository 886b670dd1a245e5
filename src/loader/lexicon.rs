use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error_handling::Location;
use crate::grammar::{Tag, UnknownTag};
use crate::lexicon::{Lexicon, LexiconEntry};

use super::{collect_lines, io_error, numbered_lines, FileResult, LineResult, LoadError, LoadErrorType, Result};

/// Parses one `word | TAG TAG | translation` line. The translation is
/// everything after the second `|` and may be empty.
fn parse_entry(line: &str) -> Result<LexiconEntry> {
    let mut fields = line.splitn(3, '|').map(str::trim);

    let word = fields.next().unwrap_or_default();
    let tags = fields.next().ok_or(LoadErrorType::MissingField("tags"))?;
    let translation = fields.next().ok_or(LoadErrorType::MissingField("translation"))?;

    if word.is_empty() {
        return Err(LoadErrorType::EmptyWord);
    }
    if let Some(c) = word.chars().find(|c| c.is_whitespace()) {
        return Err(LoadErrorType::InvalidCharacter(c));
    }

    let tags = tags
        .split_whitespace()
        .map(|tag| tag.parse::<Tag>().map_err(|UnknownTag(name)| LoadErrorType::UnknownTag(name)))
        .collect::<Result<Vec<_>>>()?;
    if tags.is_empty() {
        return Err(LoadErrorType::MissingTags(word.to_string()));
    }

    Ok(LexiconEntry::new(word, tags, translation))
}

fn parse_entry_line(line: &str, location: Location) -> LineResult<LexiconEntry> {
    parse_entry(line).map_err(|error| LoadError { location, error })
}

pub fn read_lexicon<R: BufRead>(reader: R, path: &Path) -> FileResult<Lexicon> {
    let parsed_lines = numbered_lines(reader, path).map(|(num, line_res)| {
        line_res.and_then(|line| parse_entry_line(&line, Location::line(path, num)))
    });

    let mut lexicon = Lexicon::new();
    for entry in collect_lines(parsed_lines)? {
        if let Some(previous) = lexicon.insert(entry) {
            log::warn!("{}: duplicate entry for `{}`, keeping the later one", path.display(), previous.word);
        }
    }

    log::info!("Loaded {} lexicon entries", lexicon.len());
    Ok(lexicon)
}

pub fn load_lexicon(path: &Path) -> FileResult<Lexicon> {
    log::info!("Loading lexicon from {}", path.display());
    let file = File::open(path).map_err(|e| vec![io_error(e, path)])?;
    read_lexicon(BufReader::new(file), path)
}
