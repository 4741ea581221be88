//! Reader for junction database files.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::classification::types::{FrameClass, GeneStats, Junction, OrfClass};
use crate::error::Error;
use crate::gene_list::{FeatureType, Gene};
use crate::store::binary_io::BinaryRead;
use crate::store::common_header::{
    JUNCTION_DB_FILE_TYPE, JUNCTION_DB_FORMAT_VERSION, read_common_header,
};

/// A fully loaded junction database.
#[derive(Debug)]
pub struct JunctionDb {
    pub gene_list_fingerprint: u32,
    pub query_blocks: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub genes: Vec<Gene>,
    pub junctions: Vec<Junction>,
    pub stats: Vec<GeneStats>,
}

impl JunctionDb {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::from_reader(&mut reader)
    }

    /// Read and validate a complete database.
    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> Result<Self, Error> {
        let (file_type, format_version) = read_common_header(reader)?;

        if file_type != JUNCTION_DB_FILE_TYPE {
            return Err(Error::Format(format!(
                "unexpected file type: expected {JUNCTION_DB_FILE_TYPE}, got {file_type}"
            )));
        }
        if format_version != JUNCTION_DB_FORMAT_VERSION {
            return Err(Error::Format(format!(
                "unexpected format version: expected {JUNCTION_DB_FORMAT_VERSION}, got {format_version}"
            )));
        }

        let file_length = reader.read_u64()?;
        let gene_list_fingerprint = reader.read_u32()?;
        let query_blocks = reader.read_u64()?;
        let accepted = reader.read_u64()?;
        let rejected = reader.read_u64()?;

        let genes = read_genes(reader)?;
        let junctions = read_junctions(reader, genes.len())?;
        let stats = read_stats(reader, genes.len())?;

        let position = reader.stream_position()?;
        if position != file_length {
            return Err(Error::Format(format!(
                "file length mismatch: header says {file_length}, read {position}"
            )));
        }

        Ok(Self {
            gene_list_fingerprint,
            query_blocks,
            accepted,
            rejected,
            genes,
            junctions,
            stats,
        })
    }

    /// Stats row for a gene index, if the gene has any junctions.
    #[must_use]
    pub fn stats_for(&self, gene: usize) -> Option<&GeneStats> {
        self.stats.iter().find(|s| s.gene == gene)
    }
}

fn read_gene_index<R: Read>(reader: &mut R, gene_count: usize) -> Result<usize, Error> {
    let gene = reader.read_u32()? as usize;
    if gene >= gene_count {
        return Err(Error::Format(format!(
            "gene index {gene} out of range (count: {gene_count})"
        )));
    }
    Ok(gene)
}

fn read_genes<R: Read>(reader: &mut R) -> Result<Vec<Gene>, Error> {
    let gene_count = reader.read_u32()? as usize;
    let mut genes = Vec::with_capacity(gene_count);
    let mut mrna_lengths = Vec::with_capacity(gene_count);

    for _ in 0..gene_count {
        let accession = reader.read_prefixed_string()?;
        let name = reader.read_prefixed_string()?;
        let chromosome = reader.read_prefixed_string()?;
        let marker = reader.read_prefixed_string()?;
        let orf_start = reader.read_i64()?;
        let orf_stop = reader.read_i64()?;
        let feature_type = FeatureType::try_from(reader.read_u8()?)?;
        mrna_lengths.push(reader.read_u32()? as usize);

        genes.push(Gene {
            accession,
            name,
            chromosome,
            orf_start,
            orf_stop,
            marker,
            feature_type,
            mrna: String::new(),
        });
    }

    let compressed_size = reader.read_u32()? as usize;
    let mut compressed = vec![0u8; compressed_size];
    reader.read_exact(&mut compressed)?;
    let mrna = zstd::decode_all(compressed.as_slice())?;

    let expected: usize = mrna_lengths.iter().sum();
    if mrna.len() != expected {
        return Err(Error::Format(format!(
            "mRNA block holds {} bases, gene records expect {expected}",
            mrna.len()
        )));
    }

    let mut offset = 0;
    for (gene, len) in genes.iter_mut().zip(mrna_lengths) {
        gene.mrna = String::from_utf8(mrna[offset..offset + len].to_vec())
            .map_err(|e| Error::Parse(format!("invalid UTF-8 in mRNA: {e}")))?;
        offset += len;
    }

    Ok(genes)
}

fn read_junctions<R: Read>(reader: &mut R, gene_count: usize) -> Result<Vec<Junction>, Error> {
    let count = reader.read_u32()? as usize;
    let mut junctions = Vec::with_capacity(count);
    for _ in 0..count {
        let gene = read_gene_index(reader, gene_count)?;
        let position = reader.read_i64()?;
        let query_start = reader.read_i64()?;
        let frame = FrameClass::try_from(reader.read_u8()?)?;
        let orf = OrfClass::try_from(reader.read_u8()?)?;
        let in_frame_in_orf = reader.read_bool()?;
        let count = reader.read_u32()?;
        let ppm = reader.read_f64()?;
        junctions.push(Junction {
            gene,
            position,
            query_start,
            frame,
            orf,
            in_frame_in_orf,
            count,
            ppm,
        });
    }
    Ok(junctions)
}

fn read_stats<R: Read>(reader: &mut R, gene_count: usize) -> Result<Vec<GeneStats>, Error> {
    let count = reader.read_u32()? as usize;
    let mut stats = Vec::with_capacity(count);
    for _ in 0..count {
        let gene = read_gene_index(reader, gene_count)?;
        stats.push(GeneStats {
            gene,
            total: reader.read_u32()?,
            in_frame: reader.read_u32()?,
            not_in_frame: reader.read_u32()?,
            intron: reader.read_u32()?,
            backwards: reader.read_u32()?,
            in_orf: reader.read_u32()?,
            upstream: reader.read_u32()?,
            downstream: reader.read_u32()?,
            in_frame_in_orf: reader.read_u32()?,
        });
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blast::parse_blast_results;
    use crate::classification::{ClassifiedRun, classify_results};
    use crate::gene_list::{GeneIndex, parse_gene_list};
    use crate::store::writer::JunctionDbWriter;
    use std::io::Cursor;

    fn make_test_file() -> (GeneIndex, ClassifiedRun, Vec<u8>) {
        let genes = parse_gene_list(Cursor::new(
            "\
NM_001 GENEA chr1 0 0 0 99 199 EXON ACGTACGTAC
NM_002 GENEB chr2 0 0 0 9 300 INTRON GGGG
NM_003 GENEC chr3 0 0 0 0 60 EXON TTTTTTCCC
",
        ))
        .unwrap();
        let results = parse_blast_results(Cursor::new(
            "\
# BLASTN 2.2.31+
# 1 hits found
q1\tNM_001\t100.00\t50\t0\t0\t1\t50\t150\t199\t1e-20\t90.0
# BLASTN 2.2.31+
# 1 hits found
q2\tNM_003\t99.50\t50\t0\t0\t1\t50\t31\t80\t1e-20\t90.0
# BLASTN 2.2.31+
# 1 hits found
q3\tNM_001\t100.00\t50\t0\t0\t1\t50\t150\t199\t1e-20\t90.0
q3\tNM_001\t100.00\t50\t0\t0\t1\t50\t400\t420\t1e-20\t60.0
",
        ))
        .unwrap();
        let run = classify_results(&results, &genes).unwrap();

        let mut buf = Cursor::new(Vec::new());
        JunctionDbWriter::write(&mut buf, &genes, &run).unwrap();
        (genes, run, buf.into_inner())
    }

    #[test]
    fn read_back_everything() {
        let (genes, run, data) = make_test_file();
        let db = JunctionDb::from_reader(&mut Cursor::new(data)).unwrap();

        assert_eq!(db.gene_list_fingerprint, genes.fingerprint());
        assert_eq!(db.query_blocks, 3);
        assert_eq!(db.accepted, 3);
        assert_eq!(db.rejected, 1);
        assert_eq!(db.genes, genes.genes());
        assert_eq!(db.genes[2].mrna, "TTTTTTCCC");
        assert_eq!(db.junctions, run.junctions);
        assert_eq!(db.stats, run.stats);

        let stats = db.stats_for(0).unwrap();
        assert_eq!(stats.total, 1);
        assert!(db.stats_for(1).is_none());
    }

    #[test]
    fn wrong_file_type() {
        let (_, _, mut data) = make_test_file();
        data[8..10].copy_from_slice(&7u16.to_le_bytes());
        let err = JunctionDb::from_reader(&mut Cursor::new(data)).unwrap_err();
        assert!(err.to_string().contains("unexpected file type"));
    }

    #[test]
    fn wrong_version() {
        let (_, _, mut data) = make_test_file();
        data[10..12].copy_from_slice(&9u16.to_le_bytes());
        let err = JunctionDb::from_reader(&mut Cursor::new(data)).unwrap_err();
        assert!(err.to_string().contains("unexpected format version"));
    }

    #[test]
    fn truncated_file() {
        let (_, _, data) = make_test_file();
        let truncated = data[..data.len() - 3].to_vec();
        assert!(JunctionDb::from_reader(&mut Cursor::new(truncated)).is_err());
    }

    #[test]
    fn open_from_disk() {
        let (genes, run, _) = make_test_file();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.jdb");
        JunctionDbWriter::write_file(&path, &genes, &run).unwrap();

        let db = JunctionDb::open(&path).unwrap();
        assert_eq!(db.junctions.len(), run.junctions.len());
    }
}
