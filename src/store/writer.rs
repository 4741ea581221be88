//! Writer for junction database files.

use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use crate::classification::ClassifiedRun;
use crate::classification::types::{GeneStats, Junction};
use crate::error::Error;
use crate::gene_list::{Gene, GeneIndex};
use crate::store::binary_io::BinaryWrite;
use crate::store::common_header::{
    COMMON_HEADER_SIZE, JUNCTION_DB_FILE_TYPE, JUNCTION_DB_FORMAT_VERSION, write_common_header,
};

/// zstd level for the mRNA block.
const MRNA_COMPRESSION_LEVEL: i32 = 19;

/// gene(4) + position(8) + query_start(8) + frame(1) + orf(1) + flag(1) + count(4) + ppm(8)
const JUNCTION_RECORD_SIZE: usize = 4 + 8 + 8 + 1 + 1 + 1 + 4 + 8;

/// gene(4) + nine u32 tallies
const STATS_RECORD_SIZE: usize = 4 + 9 * 4;

/// Writes a junction database: genes, junctions and per-gene stats in one pass.
pub struct JunctionDbWriter;

impl JunctionDbWriter {
    /// Writes a complete database for one classified result file.
    ///
    /// Every junction and stats row must reference a gene in `genes`.
    pub fn write<W: Write + Seek>(
        writer: &mut W,
        genes: &GeneIndex,
        run: &ClassifiedRun,
    ) -> Result<(), Error> {
        Self::check_references(genes.genes(), run)?;

        let mrna = Self::compress_mrna(genes.genes())?;
        let file_length = Self::calculate_file_length(genes.genes(), &mrna, run);

        Self::write_header(writer, file_length, genes.fingerprint(), run)?;
        Self::write_genes(writer, genes.genes(), &mrna)?;
        Self::write_junctions(writer, &run.junctions)?;
        Self::write_stats(writer, &run.stats)?;
        Self::verify_position(writer, file_length)?;

        Ok(())
    }

    /// Writes the database to `path` through a temporary sibling file, so a
    /// failed write never leaves a truncated database behind.
    pub fn write_file(path: &Path, genes: &GeneIndex, run: &ClassifiedRun) -> Result<(), Error> {
        let tmp_path = path.with_extension("jdb.tmp");
        let result = (|| -> Result<(), Error> {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            Self::write(&mut writer, genes, run)?;
            writer.flush()?;
            fs::rename(&tmp_path, path)?;
            Ok(())
        })();
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    fn check_references(genes: &[Gene], run: &ClassifiedRun) -> Result<(), Error> {
        let gene_refs = run
            .junctions
            .iter()
            .map(|j| j.gene)
            .chain(run.stats.iter().map(|s| s.gene));
        for gene in gene_refs {
            if gene >= genes.len() {
                return Err(Error::Validation(format!(
                    "row references gene index {gene}, but only {} genes are present",
                    genes.len()
                )));
            }
        }
        Ok(())
    }

    fn compress_mrna(genes: &[Gene]) -> Result<Vec<u8>, Error> {
        let total: usize = genes.iter().map(|g| g.mrna.len()).sum();
        let mut raw = Vec::with_capacity(total);
        for gene in genes {
            raw.extend_from_slice(gene.mrna.as_bytes());
        }
        Ok(zstd::encode_all(raw.as_slice(), MRNA_COMPRESSION_LEVEL)?)
    }

    fn write_header<W: Write>(
        writer: &mut W,
        file_length: u64,
        fingerprint: u32,
        run: &ClassifiedRun,
    ) -> Result<(), Error> {
        write_common_header(writer, JUNCTION_DB_FILE_TYPE, JUNCTION_DB_FORMAT_VERSION)?;
        writer.write_u64(file_length)?;
        writer.write_u32(fingerprint)?;
        writer.write_u64(run.query_blocks as u64)?;
        writer.write_u64(run.accepted as u64)?;
        writer.write_u64(run.rejected as u64)?;
        Ok(())
    }

    fn write_genes<W: Write>(writer: &mut W, genes: &[Gene], mrna: &[u8]) -> Result<(), Error> {
        writer.write_len(genes.len(), "gene count")?;
        for gene in genes {
            writer.write_prefixed_string(&gene.accession)?;
            writer.write_prefixed_string(&gene.name)?;
            writer.write_prefixed_string(&gene.chromosome)?;
            writer.write_prefixed_string(&gene.marker)?;
            writer.write_i64(gene.orf_start)?;
            writer.write_i64(gene.orf_stop)?;
            writer.write_u8(gene.feature_type.to_byte())?;
            writer.write_len(gene.mrna.len(), "mRNA length")?;
        }
        writer.write_len(mrna.len(), "compressed mRNA size")?;
        writer.write_all(mrna)?;
        Ok(())
    }

    fn write_junctions<W: Write>(writer: &mut W, junctions: &[Junction]) -> Result<(), Error> {
        writer.write_len(junctions.len(), "junction count")?;
        for junction in junctions {
            writer.write_len(junction.gene, "gene index")?;
            writer.write_i64(junction.position)?;
            writer.write_i64(junction.query_start)?;
            writer.write_u8(junction.frame.to_byte())?;
            writer.write_u8(junction.orf.to_byte())?;
            writer.write_u8(u8::from(junction.in_frame_in_orf))?;
            writer.write_u32(junction.count)?;
            writer.write_f64(junction.ppm)?;
        }
        Ok(())
    }

    fn write_stats<W: Write>(writer: &mut W, stats: &[GeneStats]) -> Result<(), Error> {
        writer.write_len(stats.len(), "stats count")?;
        for s in stats {
            writer.write_len(s.gene, "gene index")?;
            for tally in [
                s.total,
                s.in_frame,
                s.not_in_frame,
                s.intron,
                s.backwards,
                s.in_orf,
                s.upstream,
                s.downstream,
                s.in_frame_in_orf,
            ] {
                writer.write_u32(tally)?;
            }
        }
        Ok(())
    }

    fn verify_position<W: Write + Seek>(writer: &mut W, expected: u64) -> Result<(), Error> {
        let actual = writer.stream_position()?;
        if actual != expected {
            return Err(Error::Validation(format!(
                "file length mismatch: expected {expected}, actual {actual}"
            )));
        }
        Ok(())
    }

    fn calculate_file_length(genes: &[Gene], mrna: &[u8], run: &ClassifiedRun) -> u64 {
        let size = Self::calculate_header_size()
            + Self::calculate_gene_block_size(genes, mrna)
            + 4
            + run.junctions.len() * JUNCTION_RECORD_SIZE
            + 4
            + run.stats.len() * STATS_RECORD_SIZE;
        size as u64
    }

    /// Common header + file_length(8) + fingerprint(4) + three u64 counters.
    fn calculate_header_size() -> usize {
        COMMON_HEADER_SIZE + 8 + 4 + 3 * 8
    }

    fn calculate_gene_block_size(genes: &[Gene], mrna: &[u8]) -> usize {
        let mut size = 4; // gene_count
        for gene in genes {
            size += prefixed_string_size(&gene.accession);
            size += prefixed_string_size(&gene.name);
            size += prefixed_string_size(&gene.chromosome);
            size += prefixed_string_size(&gene.marker);
            size += 8 + 8; // orf_start, orf_stop
            size += 1; // feature type
            size += 4; // mRNA length
        }
        size + 4 + mrna.len()
    }
}

/// Returns the on-disk size of a uint8-prefix ASCII string.
fn prefixed_string_size(s: &str) -> usize {
    1 + s.len()
}
