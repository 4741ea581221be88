//! Codon translation table used to translate downstream junction sequence.

/// Symbol emitted for stop codons.
pub const STOP: u8 = b'.';

/// Symbol emitted for any triplet that is not an uppercase ACGT codon.
pub const UNKNOWN: u8 = b'X';

/// Lookup table for translating codons to amino acids.
///
/// Indexed by 6-bit codon encoding: A=0, C=1, G=2, T=3.
/// Index = first*16 + second*4 + third.
#[derive(Debug, Clone)]
pub struct CodonTable {
    table: [u8; 64],
}

fn base_to_index(b: u8) -> Option<usize> {
    match b {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

impl CodonTable {
    /// Standard genetic code with `.` as the stop symbol.
    #[must_use]
    pub fn standard() -> Self {
        #[rustfmt::skip]
        let table: [u8; 64] = [
            b'K', b'N', b'K', b'N',  // AA*
            b'T', b'T', b'T', b'T',  // AC*
            b'R', b'S', b'R', b'S',  // AG*
            b'I', b'I', b'M', b'I',  // AT*
            b'Q', b'H', b'Q', b'H',  // CA*
            b'P', b'P', b'P', b'P',  // CC*
            b'R', b'R', b'R', b'R',  // CG*
            b'L', b'L', b'L', b'L',  // CT*
            b'E', b'D', b'E', b'D',  // GA*
            b'A', b'A', b'A', b'A',  // GC*
            b'G', b'G', b'G', b'G',  // GG*
            b'V', b'V', b'V', b'V',  // GT*
            STOP, b'Y', STOP, b'Y',  // TA*: TAA, TAG stop
            b'S', b'S', b'S', b'S',  // TC*
            STOP, b'C', b'W', b'C',  // TG*: TGA stop
            b'L', b'F', b'L', b'F',  // TT*
        ];
        Self { table }
    }

    /// Translate a single codon (exactly 3 bytes) to an amino acid symbol.
    #[must_use]
    pub fn translate_codon(&self, codon: &[u8]) -> u8 {
        let [b0, b1, b2] = codon else {
            return UNKNOWN;
        };
        match (base_to_index(*b0), base_to_index(*b1), base_to_index(*b2)) {
            (Some(a), Some(b), Some(c)) => self.table[a * 16 + b * 4 + c],
            _ => UNKNOWN,
        }
    }
}

impl Default for CodonTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Translate a nucleotide sequence from offset 0.
///
/// A trailing partial codon is dropped, so the output holds `len / 3` symbols.
pub fn translate(nucleotides: &[u8], table: &CodonTable) -> Vec<u8> {
    nucleotides
        .chunks_exact(3)
        .map(|codon| table.translate_codon(codon))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_start_codon() {
        let table = CodonTable::standard();
        assert_eq!(table.translate_codon(b"ATG"), b'M');
    }

    #[test]
    fn stop_codons_use_dot() {
        let table = CodonTable::standard();
        assert_eq!(table.translate_codon(b"TAA"), b'.');
        assert_eq!(table.translate_codon(b"TAG"), b'.');
        assert_eq!(table.translate_codon(b"TGA"), b'.');
    }

    #[test]
    fn table_has_twenty_amino_acids_and_three_stops() {
        let table = CodonTable::standard();
        let mut symbols: Vec<u8> = table.table.to_vec();
        assert_eq!(symbols.iter().filter(|&&s| s == STOP).count(), 3);
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), 21);
    }

    #[test]
    fn translate_short_orf() {
        let table = CodonTable::standard();
        // ATG GCA TGC TAA = M A C .
        assert_eq!(translate(b"ATGGCATGCTAA", &table), b"MAC.");
    }

    #[test]
    fn translate_drops_partial_codon() {
        let table = CodonTable::standard();
        assert_eq!(translate(b"ATGGC", &table), b"M");
        assert_eq!(translate(b"ATGG", &table), b"M");
        assert_eq!(translate(b"AT", &table), b"");
    }

    #[test]
    fn translate_empty() {
        let table = CodonTable::standard();
        assert!(translate(b"", &table).is_empty());
    }

    #[test]
    fn unknown_triplets_become_x() {
        let table = CodonTable::standard();
        assert_eq!(table.translate_codon(b"NNN"), b'X');
        assert_eq!(table.translate_codon(b"ATN"), b'X');
        assert_eq!(table.translate_codon(b"atg"), b'X');
        assert_eq!(translate(b"ATGNNNTGG", &table), b"MXW");
    }

    #[test]
    fn translate_is_deterministic() {
        let table = CodonTable::standard();
        let seq = b"TTTCCCAAAGGGTTAN";
        assert_eq!(translate(seq, &table), translate(seq, &table));
        assert_eq!(translate(seq, &table).len(), seq.len() / 3);
    }
}
