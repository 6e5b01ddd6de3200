//! Extraction of `#fix` records from Walls `.srv` survey text.
//!
//! Only fix records are understood. Every other line (comments, other
//! directives, vectors between stations, blank lines) is skipped without
//! complaint. A fix record has a fixed layout:
//!
//! ```text
//! #fix <name> <x> <y> <elevation> [;<note ...>]
//! ```
//!
//! The first malformed fix record aborts parsing.

use std::fs;
use std::path::Path;

use quick_xml::escape::partial_escape;
use tracing::{debug, trace};

use crate::error::{ConvertError, Result};
use crate::model::FixRecord;

pub const FIX_MARKER: &str = "#fix";

const NOTE_SEPARATOR: char = ';';
const MIN_FIELDS: usize = 5;

/// How the elevation field of a fix record is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ElevationPolicy {
    /// Keep the token as written. Nothing is validated.
    #[default]
    Passthrough,
    /// Require the token to parse as a floating-point number.
    Numeric,
}

pub fn parse_srv(text: &str) -> Result<Vec<FixRecord>> {
    parse_srv_with(text, ElevationPolicy::Passthrough)
}

pub fn parse_srv_with(text: &str, policy: ElevationPolicy) -> Result<Vec<FixRecord>> {
    let mut records = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens.first() {
            Some(&FIX_MARKER) => {
                let record = parse_fix(line_no, &tokens, policy)?;
                debug!(
                    "line {}: fix '{}' at ({}, {})",
                    line_no, record.name, record.x, record.y
                );
                records.push(record);
            }
            Some(_) => trace!("line {}: not a fix record, skipped", line_no),
            None => {}
        }
    }

    Ok(records)
}

/// Reads the whole file at `path` and parses it.
pub fn parse_srv_file(path: &Path, policy: ElevationPolicy) -> Result<Vec<FixRecord>> {
    let text = fs::read_to_string(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_srv_with(&text, policy)
}

fn parse_fix(line: usize, tokens: &[&str], policy: ElevationPolicy) -> Result<FixRecord> {
    if tokens.len() < MIN_FIELDS {
        return Err(ConvertError::IncompleteRecord {
            line,
            found: tokens.len(),
        });
    }

    let x = parse_coordinate(line, tokens[2])?;
    let y = parse_coordinate(line, tokens[3])?;

    let elevation = tokens[4];
    if policy == ElevationPolicy::Numeric && elevation.parse::<f64>().is_err() {
        return Err(ConvertError::MalformedElevation {
            line,
            token: elevation.to_string(),
        });
    }

    Ok(FixRecord {
        line,
        name: tokens[1].to_string(),
        x,
        y,
        elevation: elevation.to_string(),
        note: extract_note(&tokens[MIN_FIELDS..]),
    })
}

fn parse_coordinate(line: usize, token: &str) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|_| ConvertError::MalformedCoordinate {
            line,
            token: token.to_string(),
        })
}

/// Joins the trailing tokens into an escaped note.
///
/// One leading `;` is removed from the first token and every token is kept,
/// so a separator standing on its own (`; some text`) leaves a leading space.
fn extract_note(tail: &[&str]) -> String {
    let Some((first, rest)) = tail.split_first() else {
        return String::new();
    };

    let first = first.strip_prefix(NOTE_SEPARATOR).unwrap_or(*first);
    let words: Vec<&str> = std::iter::once(first)
        .chain(rest.iter().copied())
        .collect();

    partial_escape(words.join(" ").as_str()).into_owned()
}
