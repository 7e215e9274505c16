//! CSV codec for the answer log.
//!
//! Export: a `Question ID,Question,Answer,Timestamp` header, then one row per
//! answer in log order. The two text fields are double-quoted with embedded
//! quotes doubled (`"` → `""`); the id and timestamp fields are bare.
//!
//! Import accepts exactly that shape and nothing more. The scan is anchored
//! on the quoted fields rather than comma-split, so commas survive in the
//! timestamp tail but are rejected inside the quoted fields. Malformed rows
//! are skipped and reported (permissive decode); the decode only fails when
//! no valid row remains.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Answer, Deck, Question, QuestionId};

/// Column header emitted on export and discarded (unvalidated) on import.
pub const CSV_HEADER: &str = "Question ID,Question,Answer,Timestamp";

/// Substituted question text for answers whose question id does not resolve.
const UNKNOWN_QUESTION: &str = "Unknown question";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CsvError {
    #[error("no rows after the header")]
    Empty,
    #[error("no valid rows ({skipped} malformed)")]
    NoValidRows { skipped: usize },
}

/// One row decoded from an import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedAnswer {
    pub question_id: QuestionId,
    pub text: String,
    /// Timestamp tail, kept verbatim (embedded commas and all).
    pub timestamp: String,
}

/// Outcome of a permissive decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    /// Valid rows, in file order.
    pub answers: Vec<ImportedAnswer>,
    /// `(1-based data row number, raw line)` for every malformed row.
    pub skipped: Vec<(usize, String)>,
}

/// Serializes the answer log, joining each row with its question text.
///
/// Rows keep the input order. Answers whose question id does not resolve in
/// the deck get the literal `Unknown question` text (a one-way substitution).
/// Rows are joined with `\n` and there is no trailing newline.
#[must_use]
pub fn encode(answers: &[Answer], deck: &Deck) -> String {
    let mut out = String::from(CSV_HEADER);
    for answer in answers {
        let question_text = deck
            .by_id(answer.question_id())
            .map_or(UNKNOWN_QUESTION, Question::text);
        out.push('\n');
        out.push_str(&answer.question_id().to_string());
        out.push_str(",\"");
        push_escaped(&mut out, question_text);
        out.push_str("\",\"");
        push_escaped(&mut out, answer.text());
        out.push_str("\",");
        out.push_str(answer.timestamp());
    }
    out
}

fn push_escaped(out: &mut String, field: &str) {
    for ch in field.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
}

/// Parses CSV text back into importable answers.
///
/// The first line is always treated as a header and discarded; blank lines
/// are ignored. Every other line must match
/// `<integer>,"<question>","<answer>",<timestamp-tail>`, with doubled quotes
/// accepted inside the quoted fields. The question text group is scanned for
/// shape but otherwise ignored — the id is the authoritative reference.
///
/// # Errors
///
/// Returns `CsvError::Empty` when nothing follows the header, and
/// `CsvError::NoValidRows` when every data row is malformed. Partial damage
/// is not an error: valid rows are returned and the rest are reported in
/// `DecodeReport::skipped`.
pub fn decode(input: &str) -> Result<DecodeReport, CsvError> {
    let mut lines = input.split('\n');
    let _header = lines.next();

    let mut answers = Vec::new();
    let mut skipped = Vec::new();
    let mut saw_data = false;
    for (row_number, line) in lines.enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }
        saw_data = true;
        match parse_row(line) {
            Some(answer) => answers.push(answer),
            None => skipped.push((row_number + 1, line.to_owned())),
        }
    }

    if !saw_data {
        return Err(CsvError::Empty);
    }
    if answers.is_empty() {
        return Err(CsvError::NoValidRows {
            skipped: skipped.len(),
        });
    }
    Ok(DecodeReport { answers, skipped })
}

fn parse_row(line: &str) -> Option<ImportedAnswer> {
    let (id_field, rest) = line.split_once(',')?;
    if id_field.is_empty() || !id_field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let question_id = id_field.parse::<u32>().ok().map(QuestionId::new)?;

    let rest = rest.strip_prefix('"')?;
    let (_question_text, rest) = scan_quoted(rest)?;
    let rest = rest.strip_prefix(",\"")?;
    let (answer_text, rest) = scan_quoted(rest)?;
    let timestamp = rest.strip_prefix(',')?;

    Some(ImportedAnswer {
        question_id,
        text: answer_text,
        timestamp: timestamp.to_owned(),
    })
}

/// Scans a quoted field body, unescaping doubled quotes.
///
/// Returns the unescaped text and the remainder after the closing quote, or
/// `None` when the field is unterminated or contains a bare comma (commas
/// inside quoted fields are not part of this shape).
fn scan_quoted(rest: &str) -> Option<(String, &str)> {
    let mut text = String::new();
    let mut chars = rest.char_indices();
    while let Some((i, ch)) = chars.next() {
        match ch {
            '"' => {
                if rest[i + 1..].starts_with('"') {
                    text.push('"');
                    chars.next();
                } else {
                    return Some((text, &rest[i + 1..]));
                }
            }
            ',' => return None,
            _ => text.push(ch),
        }
    }
    None
}

/// Conventional export file name: `introspection_responses_<ISO-date>.csv`.
#[must_use]
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("introspection_responses_{}.csv", at.format("%Y-%m-%d"))
}
