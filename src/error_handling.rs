/*
    Located errors for the grammar and lexicon loaders
*/

use std::fmt::{Debug, Display};
use std::path::{Path, PathBuf};

pub trait ErrorType: Display + PartialEq {}

// `line` counts from 1; 0 means the error concerns the whole file
#[derive(Debug, PartialEq, Clone)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize
}

impl Location {
    pub fn file(file: &Path) -> Self {
        Location { file: file.to_path_buf(), line: 0 }
    }

    pub fn line(file: &Path, line: usize) -> Self {
        Location { file: file.to_path_buf(), line }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            0 => write!(f, "{}", self.file.display()),
            line => write!(f, "{}:{}", self.file.display(), line)
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Error<T: ErrorType> {
    pub location: Location,
    pub error: T
}

impl<T: ErrorType> Error<T> {
    pub fn in_file(file: &Path, error: T) -> Self {
        Error { location: Location::file(file), error }
    }
}

// Red location, bold message
impl<T: ErrorType> Display for Error<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\x1b[31;49;1m[{}]\x1b[39;49;1m  {}\x1b[0m", self.location, self.error)
    }
}

impl<T: ErrorType + Debug> std::error::Error for Error<T> {}

pub type Errors<T> = Vec<Error<T>>;
