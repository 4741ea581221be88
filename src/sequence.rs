//! Nucleotide helpers: complementation and motif search.

use crate::error::Error;

fn complement(base: u8) -> Option<u8> {
    match base {
        b'A' => Some(b'T'),
        b'T' => Some(b'A'),
        b'G' => Some(b'C'),
        b'C' => Some(b'G'),
        b'N' => Some(b'N'),
        _ => None,
    }
}

/// Reverse-complement a read over the alphabet {A, C, G, T, N}.
///
/// Any other symbol fails with [`Error::UndefinedBase`]; the reported offset
/// refers to the input sequence, not the reversed one.
pub fn reverse_complement(seq: &[u8]) -> Result<Vec<u8>, Error> {
    seq.iter()
        .enumerate()
        .rev()
        .map(|(offset, &base)| {
            complement(base).ok_or(Error::UndefinedBase {
                symbol: base as char,
                offset,
            })
        })
        .collect()
}

/// Returns the offset of the first occurrence of `needle` in `haystack`.
///
/// An empty needle matches at offset 0.
#[must_use]
pub fn find_motif(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Returns true if `needle` occurs anywhere in `haystack`.
#[must_use]
pub fn contains_motif(haystack: &[u8], needle: &[u8]) -> bool {
    find_motif(haystack, needle).is_some()
}
