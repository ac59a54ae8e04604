// SimLog - GPL-3.0-or-later
// This file is part of SimLog.
//
// Copyright (C) 2026 SimLog Contributors
//
// SimLog is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SimLog is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with SimLog.  If not, see <https://www.gnu.org/licenses/>.

//! Free-text extraction helpers and log record classification.

pub mod classify;
pub mod duration;
pub mod record;

pub use classify::classify;
pub use duration::{format_duration, parse_duration, Unit};

use fancy_regex::Regex;
use indexmap::IndexMap;
use std::sync::LazyLock;

// Signed ASCII decimal with optional exponent: 12, -0.5, .5, 1.23e-4
static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[+-]?[0-9]*\.?[0-9]+(?:[eE][+-]?[0-9]+)?").expect("valid regex literal")
});

/// Why a `{key: value, ...}` block could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamBlockError {
    /// `{` found without a closing `}`
    Unclosed,
    /// An entry without the `": "` separator
    MissingSeparator(String),
}

impl std::fmt::Display for ParamBlockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unclosed => write!(f, "parameter block is not closed"),
            Self::MissingSeparator(entry) => {
                write!(f, "parameter entry {entry:?} has no \": \" separator")
            }
        }
    }
}

/// Return the first number in `text`, or `None` if there is none.
pub fn parse_number(text: &str) -> Option<f64> {
    let Ok(Some(m)) = NUMBER_PATTERN.find(text) else {
        return None;
    };
    m.as_str().parse().ok()
}

/// Parse the first `{key1: value1, key2: value2}` block in `text`.
///
/// Keys keep their order of appearance; a repeated key keeps the last
/// value. Text without `{` yields an empty map.
pub fn parse_param_block(text: &str) -> Result<IndexMap<String, String>, ParamBlockError> {
    let Some(open) = text.find('{') else {
        return Ok(IndexMap::new());
    };
    let rest = &text[open + 1..];
    let close = rest.find('}').ok_or(ParamBlockError::Unclosed)?;
    let body = &rest[..close];

    let mut params = IndexMap::new();
    if body.is_empty() {
        return Ok(params);
    }

    for entry in body.split(", ") {
        let (key, value) = entry
            .split_once(": ")
            .ok_or_else(|| ParamBlockError::MissingSeparator(entry.to_string()))?;
        params.insert(key.to_string(), value.to_string());
    }

    Ok(params)
}

/// Split one delimited row into fields.
///
/// Fields may be wrapped in double quotes to carry the delimiter; a doubled
/// quote inside a quoted field is a literal quote.
pub fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);

    fields
}
