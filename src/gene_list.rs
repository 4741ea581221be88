//! Reference gene list: ORF boundaries and intron markers keyed by accession.

use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;

use sha2::{Digest, Sha256};

use crate::error::Error;

/// Minimum number of whitespace-delimited columns in a gene-list line.
const MIN_GENE_COLUMNS: usize = 10;

/// Feature marker identifying an intron region.
const INTRON_MARKER: &str = "INTRON";

/// Whether a gene-list row describes a coding ORF or an intron region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FeatureType {
    Orf = 0,
    Intron = 1,
}

impl FeatureType {
    #[must_use]
    pub fn from_marker(marker: &str) -> Self {
        if marker == INTRON_MARKER {
            Self::Intron
        } else {
            Self::Orf
        }
    }

    #[must_use]
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for FeatureType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Orf),
            1 => Ok(Self::Intron),
            _ => Err(Error::Parse(format!("invalid feature type byte: {value}"))),
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orf => write!(f, "orf"),
            Self::Intron => write!(f, "intron"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    pub accession: String,
    pub name: String,
    pub chromosome: String,
    /// 1-based ORF start.
    pub orf_start: i64,
    /// 1-based inclusive ORF stop.
    pub orf_stop: i64,
    /// Raw feature-marker column.
    pub marker: String,
    pub feature_type: FeatureType,
    pub mrna: String,
}

impl Gene {
    #[must_use]
    pub fn is_intron(&self) -> bool {
        self.feature_type == FeatureType::Intron
    }

    /// Parse one gene-list line. The ORF start column is 0-based.
    pub fn from_line(line: &str) -> Result<Self, Error> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_GENE_COLUMNS {
            return Err(Error::Parse(format!(
                "gene list line has {} columns, expected at least {MIN_GENE_COLUMNS}",
                fields.len()
            )));
        }

        let raw_start: i64 = fields[6]
            .parse()
            .map_err(|e| Error::Parse(format!("invalid ORF start '{}': {e}", fields[6])))?;
        let orf_stop: i64 = fields[7]
            .parse()
            .map_err(|e| Error::Parse(format!("invalid ORF stop '{}': {e}", fields[7])))?;

        Ok(Self {
            accession: fields[0].to_string(),
            name: fields[1].to_string(),
            chromosome: fields[2].to_string(),
            orf_start: raw_start + 1,
            orf_stop,
            marker: fields[8].to_string(),
            feature_type: FeatureType::from_marker(fields[8]),
            mrna: fields[9].to_string(),
        })
    }
}

/// Gene table with an accession lookup.
#[derive(Debug, Default)]
pub struct GeneIndex {
    genes: Vec<Gene>,
    by_accession: HashMap<String, usize>,
    fingerprint: u32,
    duplicates: usize,
}

impl GeneIndex {
    /// Gene rows in first-seen accession order.
    #[must_use]
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// First 4 bytes (little-endian) of the SHA-256 over the parsed lines.
    #[must_use]
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    /// Number of lines whose accession replaced an earlier row.
    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Index of the gene row for an accession.
    #[must_use]
    pub fn position(&self, accession: &str) -> Option<usize> {
        self.by_accession.get(accession).copied()
    }

    #[must_use]
    pub fn get(&self, accession: &str) -> Option<&Gene> {
        self.position(accession).map(|idx| &self.genes[idx])
    }

    /// Fails with every accession the index does not contain, in first-seen order.
    pub fn ensure_known<'a, I>(&self, accessions: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut unknown: Vec<String> = Vec::new();
        for accession in accessions {
            if !self.by_accession.contains_key(accession) && !unknown.iter().any(|u| u == accession) {
                unknown.push(accession.to_string());
            }
        }
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(Error::UnknownAccessions(unknown))
        }
    }

    fn insert(&mut self, gene: Gene) {
        if let Some(&idx) = self.by_accession.get(&gene.accession) {
            self.duplicates += 1;
            self.genes[idx] = gene;
        } else {
            self.by_accession.insert(gene.accession.clone(), self.genes.len());
            self.genes.push(gene);
        }
    }
}

/// Parses a whitespace-delimited gene list.
pub fn parse_gene_list<R: BufRead>(reader: R) -> Result<GeneIndex, Error> {
    let mut index = GeneIndex::default();
    let mut hasher = Sha256::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let gene = Gene::from_line(&line).map_err(|e| Error::Parse(format!("{e} (line {line_num})")))?;
        hasher.update(line.trim_end().as_bytes());
        hasher.update(b"\n");
        index.insert(gene);
    }

    let hash = hasher.finalize();
    index.fingerprint = u32::from_le_bytes([hash[0], hash[1], hash[2], hash[3]]);
    Ok(index)
}
