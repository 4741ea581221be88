//! Line classifier for tabular search output with comment headers.

use std::str::FromStr;

use crate::error::Error;

use super::entry::TabularHit;

/// Number of columns in a tabular data line.
pub const TABULAR_COLUMNS: usize = 12;

/// Program names that open a query block in `-outfmt 7` output.
const PROGRAM_HEADERS: &[&str] = &["BLASTN", "BLASTP", "BLASTX", "TBLASTN", "TBLASTX"];

/// Result of parsing a single line.
#[derive(Debug, PartialEq)]
pub enum ParsedLine {
    /// `# BLASTN 2.x.y+`: start of a query block.
    ProgramHeader,
    /// `# N hits found`.
    HitCount(u64),
    Hit(Box<TabularHit>),
    /// Any other comment, or a blank line.
    Comment,
}

fn parse_field<T: FromStr>(value: &str, name: &str) -> Result<T, Error>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::Parse(format!("invalid {name} '{value}': {e}")))
}

fn parse_comment(line: &str) -> Result<ParsedLine, Error> {
    let body = line.trim_start_matches('#').trim();
    let mut words = body.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(ParsedLine::Comment);
    };

    if PROGRAM_HEADERS.contains(&first) {
        return Ok(ParsedLine::ProgramHeader);
    }

    if let Some(second) = words.next()
        && second == "hits"
        && words.next() == Some("found")
    {
        return parse_field(first, "hit count").map(ParsedLine::HitCount);
    }

    Ok(ParsedLine::Comment)
}

/// Parse a single line of tabular output.
pub fn parse_line(line: &str) -> Result<ParsedLine, Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ParsedLine::Comment);
    }
    if line.starts_with('#') {
        return parse_comment(line);
    }

    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.len() < TABULAR_COLUMNS {
        return Err(Error::Parse(format!(
            "tabular line has {} columns, expected {TABULAR_COLUMNS}",
            columns.len()
        )));
    }

    Ok(ParsedLine::Hit(Box::new(TabularHit {
        query_id: columns[0].to_string(),
        subject_id: columns[1].to_string(),
        percent_identity: parse_field(columns[2], "percent identity")?,
        alignment_length: parse_field(columns[3], "alignment length")?,
        mismatches: parse_field(columns[4], "mismatch count")?,
        gap_opens: parse_field(columns[5], "gap open count")?,
        query_start: parse_field(columns[6], "query start")?,
        query_end: parse_field(columns[7], "query end")?,
        subject_start: parse_field(columns[8], "subject start")?,
        subject_end: parse_field(columns[9], "subject end")?,
        evalue: parse_field(columns[10], "e-value")?,
        bitscore: parse_field(columns[11], "bitscore")?,
    })))
}
