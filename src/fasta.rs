//! Conversion of junction files into FASTA queries for the search tool.

use std::io::{BufRead, Write};

use crate::error::Error;

/// Column of the junction line holding the read name.
const READ_NAME_COLUMN: usize = 0;
/// Column of the junction line holding the downstream sequence.
const DOWNSTREAM_COLUMN: usize = 5;

/// Writes one `>QNAME\nDOWNSTREAM\n` record per junction line.
///
/// Returns the number of records written. Blank lines are skipped; a line
/// without a downstream column is a parse error.
pub fn convert_junction_file<R: BufRead, W: Write>(reader: R, mut writer: W) -> Result<usize, Error> {
    let mut records = 0;

    for (line_num, line) in reader.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() <= DOWNSTREAM_COLUMN {
            return Err(Error::Parse(format!(
                "junction line has {} columns, expected at least {} (line {line_num})",
                fields.len(),
                DOWNSTREAM_COLUMN + 1
            )));
        }
        writeln!(writer, ">{}", fields[READ_NAME_COLUMN])?;
        writeln!(writer, "{}", fields[DOWNSTREAM_COLUMN])?;
        records += 1;
    }

    writer.flush()?;
    Ok(records)
}
