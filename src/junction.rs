//! Junction motif search over reads and their reverse complements.
//!
//! Each configured junction sequence contributes three 20-base variants taken
//! at 4-base staggered offsets, which tolerates uncertainty in the exact
//! insertion register. A read is searched forward first; only when that pass
//! yields no accepted match is its reverse complement searched.

use std::fmt;

use crate::codon::{self, CodonTable};
use crate::error::Error;
use crate::sequence::{contains_motif, find_motif, reverse_complement};

/// Offsets `(start, end)` of the three motif variants cut from each junction sequence.
pub const MOTIF_WINDOWS: [(usize, usize); 3] = [(30, 50), (26, 46), (22, 42)];

/// Shortest junction sequence that can provide every motif window.
pub const MIN_JUNCTION_LENGTH: usize = 50;

/// Bases between consecutive motif windows, used to realign the downstream start.
const REGISTER_STAGGER: usize = 4;

/// Downstream sequence must be strictly longer than this to be accepted.
pub const MIN_DOWNSTREAM_EXCLUSIVE: usize = 25;

/// Orientation of the read in which the junction was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Forward,
    ReverseComplement,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "+"),
            Self::ReverseComplement => write!(f, "-"),
        }
    }
}

/// An accepted junction match within one read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunctionMatch {
    pub orientation: Orientation,
    /// Index of the winning motif variant.
    pub motif_index: usize,
    /// Offset of the motif in the searched (possibly reverse-complemented) read.
    pub match_offset: usize,
    pub downstream: Vec<u8>,
    pub protein: Vec<u8>,
}

/// Builds the ordered motif list: three variants per junction sequence.
///
/// Sequences are upper-cased. A sequence shorter than [`MIN_JUNCTION_LENGTH`]
/// is rejected rather than truncated.
pub fn search_motifs<S: AsRef<str>>(junction_sequences: &[S]) -> Result<Vec<Vec<u8>>, Error> {
    let mut motifs = Vec::with_capacity(junction_sequences.len() * MOTIF_WINDOWS.len());
    for junction in junction_sequences {
        let junction = junction.as_ref().trim().to_ascii_uppercase();
        if junction.len() < MIN_JUNCTION_LENGTH {
            return Err(Error::Validation(format!(
                "junction sequence '{junction}' has {} bases, expected at least {MIN_JUNCTION_LENGTH}",
                junction.len()
            )));
        }
        let bytes = junction.as_bytes();
        for (start, end) in MOTIF_WINDOWS {
            motifs.push(bytes[start..end].to_vec());
        }
    }
    Ok(motifs)
}

/// Scans reads for junction motifs and extracts the downstream open reading frame.
#[derive(Debug, Clone)]
pub struct JunctionScanner {
    motifs: Vec<Vec<u8>>,
    exclusion: Vec<u8>,
    table: CodonTable,
}

impl JunctionScanner {
    /// Create a scanner from an ordered motif list and an optional exclusion motif.
    pub fn new(motifs: Vec<Vec<u8>>, exclusion: &str) -> Result<Self, Error> {
        if motifs.is_empty() {
            return Err(Error::Validation("no junction motifs to search".into()));
        }
        if motifs.iter().any(|m| m.is_empty()) {
            return Err(Error::Validation("junction motifs must not be empty".into()));
        }
        let exclusion = exclusion
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase()
            .into_bytes();
        Ok(Self {
            motifs,
            exclusion,
            table: CodonTable::standard(),
        })
    }

    /// Convenience constructor from raw junction sequences.
    pub fn from_junctions<S: AsRef<str>>(junctions: &[S], exclusion: &str) -> Result<Self, Error> {
        Self::new(search_motifs(junctions)?, exclusion)
    }

    #[must_use]
    pub fn motifs(&self) -> &[Vec<u8>] {
        &self.motifs
    }

    /// Scan a read: forward first, then its reverse complement.
    ///
    /// Returns `Ok(None)` when neither orientation yields an accepted match.
    /// The reverse complement is only built when the forward pass fails, so an
    /// undefined base only surfaces for reads that reach the second pass.
    pub fn scan(&self, read: &[u8]) -> Result<Option<JunctionMatch>, Error> {
        if let Some(hit) = self.scan_orientation(read, Orientation::Forward) {
            return Ok(Some(hit));
        }
        let reversed = reverse_complement(read)?;
        Ok(self.scan_orientation(&reversed, Orientation::ReverseComplement))
    }

    /// Last motif (by list index) present in the read, with its first offset.
    #[must_use]
    pub fn locate(&self, read: &[u8]) -> Option<(usize, usize)> {
        self.motifs
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, motif)| find_motif(read, motif).map(|offset| (index, offset)))
    }

    fn scan_orientation(&self, read: &[u8], orientation: Orientation) -> Option<JunctionMatch> {
        let (motif_index, match_offset) = self.locate(read)?;
        let start = match_offset
            + self.motifs[motif_index].len()
            + (motif_index % MOTIF_WINDOWS.len()) * REGISTER_STAGGER;
        let downstream = read.get(start..).unwrap_or_default();

        if downstream.len() <= MIN_DOWNSTREAM_EXCLUSIVE {
            return None;
        }
        if !self.exclusion.is_empty() && contains_motif(downstream, &self.exclusion) {
            return None;
        }

        Some(JunctionMatch {
            orientation,
            motif_index,
            match_offset,
            downstream: downstream.to_vec(),
            protein: codon::translate(downstream, &self.table),
        })
    }
}
