//! Tabular (outfmt 6/7) search-tool record.

/// One data line of tabular search output, in the standard 12-column order.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularHit {
    pub query_id: String,
    pub subject_id: String,
    pub percent_identity: f64,
    pub alignment_length: u32,
    pub mismatches: u32,
    pub gap_opens: u32,
    pub query_start: i64,
    pub query_end: i64,
    pub subject_start: i64,
    pub subject_end: i64,
    pub evalue: f64,
    pub bitscore: f64,
}

impl TabularHit {
    /// True when the subject coordinates run in reverse.
    #[must_use]
    pub fn is_backwards(&self) -> bool {
        self.subject_end - self.subject_start < 0
    }
}
