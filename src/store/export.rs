//! Tab-separated export of a junction database.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Error;
use crate::store::JunctionDb;

pub const GENES_TSV: &str = "genes.tsv";
pub const JUNCTIONS_TSV: &str = "junctions.tsv";
pub const STATS_TSV: &str = "stats.tsv";

pub fn write_genes<W: Write>(db: &JunctionDb, writer: &mut W) -> Result<(), Error> {
    writeln!(
        writer,
        "index\taccession\tname\tchromosome\torf_start\torf_stop\tfeature_type\tmarker\tmrna_length"
    )?;
    for (index, gene) in db.genes.iter().enumerate() {
        writeln!(
            writer,
            "{index}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            gene.accession,
            gene.name,
            gene.chromosome,
            gene.orf_start,
            gene.orf_stop,
            gene.feature_type,
            gene.marker,
            gene.mrna.len()
        )?;
    }
    Ok(())
}

/// One row per junction, keyed by gene accession rather than index.
pub fn write_junctions<W: Write>(db: &JunctionDb, writer: &mut W) -> Result<(), Error> {
    writeln!(
        writer,
        "accession\tname\tposition\tquery_start\tframe\torf\tin_frame_in_orf\tcount\tppm"
    )?;
    for junction in &db.junctions {
        let gene = &db.genes[junction.gene];
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.3}",
            gene.accession,
            gene.name,
            junction.position,
            junction.query_start,
            junction.frame,
            junction.orf,
            junction.in_frame_in_orf,
            junction.count,
            junction.ppm
        )?;
    }
    Ok(())
}

pub fn write_stats<W: Write>(db: &JunctionDb, writer: &mut W) -> Result<(), Error> {
    writeln!(
        writer,
        "accession\tname\ttotal\tin_frame\tnot_in_frame\tintron\tbackwards\tin_orf\tupstream\tdownstream\tin_frame_in_orf"
    )?;
    for s in &db.stats {
        let gene = &db.genes[s.gene];
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            gene.accession,
            gene.name,
            s.total,
            s.in_frame,
            s.not_in_frame,
            s.intron,
            s.backwards,
            s.in_orf,
            s.upstream,
            s.downstream,
            s.in_frame_in_orf
        )?;
    }
    Ok(())
}

/// Writes the three tables into `out_dir`, which must exist.
pub fn export_tsv(db: &JunctionDb, out_dir: &Path) -> Result<(), Error> {
    type TableWriter = fn(&JunctionDb, &mut BufWriter<File>) -> Result<(), Error>;
    let tables: [(&str, TableWriter); 3] = [
        (GENES_TSV, write_genes),
        (JUNCTIONS_TSV, write_junctions),
        (STATS_TSV, write_stats),
    ];
    for (name, write_table) in tables {
        let mut writer = BufWriter::new(File::create(out_dir.join(name))?);
        write_table(db, &mut writer)?;
        writer.flush()?;
    }
    Ok(())
}
