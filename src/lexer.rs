//! A module implementing lexical analysis (tokenization) of an input line.
//!
//! The shell has no quoting, escaping or substitution: a line is just a list of
//! words separated by whitespace.

use crate::command::Argv;

/// Characters that separate words. Any run of them acts as a single delimiter.
pub const DELIMITERS: [char; 5] = [' ', '\t', '\n', '\r', '\x07'];

/// Splits `line` into an argument vector.
///
/// Consecutive delimiters collapse, and leading or trailing delimiters never
/// produce empty words. Quotes are ordinary characters.
pub fn tokenize(line: &str) -> Argv {
    line.split(|c: char| DELIMITERS.contains(&c))
        .filter(|word| !word.is_empty())
        .map(str::to_owned)
        .collect()
}
