//! Junction search over SAM alignment files.

use std::fmt;
use std::io::{BufRead, Write};

use crate::error::Error;
use crate::junction::{JunctionMatch, JunctionScanner, Orientation};

/// Minimum number of whitespace-delimited fields in an alignment line.
const MIN_SAM_FIELDS: usize = 10;

/// Reference name marking an unmapped read.
const UNMAPPED: &str = "*";

/// One accepted junction read, ready to be written as a junction-file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunctionHit {
    pub read_name: String,
    pub flag: String,
    pub reference: String,
    pub position: String,
    pub sequence: String,
    pub junction: JunctionMatch,
}

impl fmt::Display for JunctionHit {
    /// `QNAME FLAG RNAME POS SEQ DOWNSTREAM PROTEIN`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.read_name,
            self.flag,
            self.reference,
            self.position,
            self.sequence,
            String::from_utf8_lossy(&self.junction.downstream),
            String::from_utf8_lossy(&self.junction.protein),
        )
    }
}

/// Counters gathered while searching one alignment file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchSummary {
    /// Alignment (non-header, non-blank) lines read.
    pub lines: usize,
    /// Lines whose read is unmapped and therefore scanned.
    pub eligible: usize,
    pub forward_hits: usize,
    pub reverse_hits: usize,
    /// Reads dropped because their reverse complement hit an undefined base.
    pub undefined_base_reads: usize,
}

impl SearchSummary {
    #[must_use]
    pub fn hits(&self) -> usize {
        self.forward_hits + self.reverse_hits
    }
}

/// Fields of an alignment line that a junction hit carries forward.
struct AlignmentFields<'a> {
    read_name: &'a str,
    flag: &'a str,
    reference: &'a str,
    position: &'a str,
    sequence: &'a str,
}

impl<'a> AlignmentFields<'a> {
    fn parse(line: &'a str) -> Result<Self, Error> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_SAM_FIELDS {
            return Err(Error::Parse(format!(
                "alignment line has {} fields, expected at least {MIN_SAM_FIELDS}",
                fields.len()
            )));
        }
        Ok(Self {
            read_name: fields[0],
            flag: fields[1],
            reference: fields[2],
            position: fields[3],
            sequence: fields[9],
        })
    }

    fn is_unmapped(&self) -> bool {
        self.reference == UNMAPPED
    }

    fn into_hit(self, junction: JunctionMatch) -> JunctionHit {
        JunctionHit {
            read_name: self.read_name.to_string(),
            flag: self.flag.to_string(),
            reference: self.reference.to_string(),
            position: self.position.to_string(),
            sequence: self.sequence.to_string(),
            junction,
        }
    }
}

/// Scans a single alignment line. Returns `Ok(None)` for reads that are
/// mapped or carry no accepted junction.
pub fn scan_alignment_line(line: &str, scanner: &JunctionScanner) -> Result<Option<JunctionHit>, Error> {
    let fields = AlignmentFields::parse(line)?;
    if !fields.is_unmapped() {
        return Ok(None);
    }
    Ok(scanner
        .scan(fields.sequence.as_bytes())?
        .map(|junction| fields.into_hit(junction)))
}

/// Searches every unmapped read of a SAM stream and writes one line per hit.
///
/// A structurally short line fails the whole file. A read whose reverse
/// complement contains an undefined base is skipped and counted.
pub fn search_alignment_file<R: BufRead, W: Write>(
    reader: R,
    scanner: &JunctionScanner,
    mut writer: W,
) -> Result<SearchSummary, Error> {
    let mut summary = SearchSummary::default();

    for (line_num, line) in reader.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line?;
        if line.starts_with('@') || line.trim().is_empty() {
            continue;
        }
        summary.lines += 1;

        let fields = AlignmentFields::parse(&line)
            .map_err(|e| Error::Parse(format!("{e} (line {line_num})")))?;
        if !fields.is_unmapped() {
            continue;
        }
        summary.eligible += 1;

        let junction = match scanner.scan(fields.sequence.as_bytes()) {
            Ok(Some(junction)) => junction,
            Ok(None) => continue,
            Err(Error::UndefinedBase { .. }) => {
                summary.undefined_base_reads += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        match junction.orientation {
            Orientation::Forward => summary.forward_hits += 1,
            Orientation::ReverseComplement => summary.reverse_hits += 1,
        }
        writeln!(writer, "{}", fields.into_hit(junction))?;
    }

    writer.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::reverse_complement;
    use std::io::Cursor;

    const JUNCTION: &str = "CCTCTGCGAGTGGTGGCAACTCTGTGGCCGGCCCAGCCGGCCATGTCAGC";
    const DOWNSTREAM: &str = "ATGGCAATGGCAATGGCAATGGCAATGGCA";

    fn scanner() -> JunctionScanner {
        JunctionScanner::from_junctions(&[JUNCTION], "").unwrap()
    }

    fn junction_read() -> String {
        format!("GG{}{DOWNSTREAM}", &JUNCTION[30..50])
    }

    fn sam_line(name: &str, reference: &str, seq: &str) -> String {
        format!("{name}\t4\t{reference}\t0\t0\t*\t*\t0\t0\t{seq}\tIIIIIIII\n")
    }

    #[test]
    fn writes_forward_hit_line() {
        let read = junction_read();
        let input = format!("@HD\tVN:1.0\n{}", sam_line("read1", "*", &read));
        let mut out = Vec::new();
        let summary = search_alignment_file(Cursor::new(input), &scanner(), &mut out).unwrap();

        assert_eq!(summary.lines, 1);
        assert_eq!(summary.eligible, 1);
        assert_eq!(summary.forward_hits, 1);
        assert_eq!(summary.hits(), 1);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, format!("read1 4 * 0 {read} {DOWNSTREAM} MAMAMAMAMA\n"));
    }

    #[test]
    fn mapped_reads_are_not_scanned() {
        let read = junction_read();
        let input = sam_line("read1", "chr1", &read);
        let mut out = Vec::new();
        let summary = search_alignment_file(Cursor::new(input), &scanner(), &mut out).unwrap();
        assert_eq!(summary.lines, 1);
        assert_eq!(summary.eligible, 0);
        assert_eq!(summary.hits(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn reverse_complement_hit_counted() {
        let read = String::from_utf8(reverse_complement(junction_read().as_bytes()).unwrap()).unwrap();
        let input = sam_line("rc", "*", &read);
        let mut out = Vec::new();
        let summary = search_alignment_file(Cursor::new(input), &scanner(), &mut out).unwrap();
        assert_eq!(summary.reverse_hits, 1);
        assert_eq!(summary.forward_hits, 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(&format!("rc 4 * 0 {read} {DOWNSTREAM} ")));
    }

    #[test]
    fn short_line_fails_with_line_number() {
        let input = format!("@SQ\n{}read2\t4\t*\n", sam_line("read1", "*", "ACGT"));
        let err = search_alignment_file(Cursor::new(input), &scanner(), Vec::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 3"), "{msg}");
        assert!(msg.contains("3 fields"), "{msg}");
    }

    #[test]
    fn undefined_base_skips_read_only() {
        let read = junction_read();
        let input = format!(
            "{}{}",
            sam_line("bad", "*", "ACGTRYACGT"),
            sam_line("good", "*", &read)
        );
        let mut out = Vec::new();
        let summary = search_alignment_file(Cursor::new(input), &scanner(), &mut out).unwrap();
        assert_eq!(summary.undefined_base_reads, 1);
        assert_eq!(summary.eligible, 2);
        assert_eq!(summary.forward_hits, 1);
        assert!(String::from_utf8(out).unwrap().starts_with("good "));
    }

    #[test]
    fn scan_single_line() {
        let line = sam_line("read1", "*", &junction_read());
        let hit = scan_alignment_line(&line, &scanner()).unwrap().unwrap();
        assert_eq!(hit.read_name, "read1");
        assert_eq!(hit.junction.downstream, DOWNSTREAM.as_bytes());
        assert!(scan_alignment_line("a b c", &scanner()).is_err());
    }

    #[test]
    fn blank_lines_skipped() {
        let input = format!("\n\n{}\n", sam_line("read1", "*", "ACGTACGT"));
        let summary = search_alignment_file(Cursor::new(input), &scanner(), Vec::new()).unwrap();
        assert_eq!(summary.lines, 1);
        assert_eq!(summary.hits(), 0);
    }
}
