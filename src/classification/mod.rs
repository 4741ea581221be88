//! Frame/ORF classification of accepted hits, deduplication and per-gene stats.

pub mod types;

use std::collections::HashMap;

use crate::blast::BlastResults;
use crate::blast::entry::TabularHit;
use crate::error::Error;
use crate::gene_list::{Gene, GeneIndex};

use types::{Classification, FrameClass, GeneStats, Junction, OrfClass};

const PARTS_PER_MILLION: f64 = 1_000_000.0;

/// Classify a hit against its gene's ORF boundaries.
///
/// The frame check measures the distance from the ORF start to the base the
/// query would have started at. Intron and backwards overrides apply in that
/// order, and a downstream position overrides upstream.
#[must_use]
pub fn classify(position: i64, query_start: i64, subject_end: i64, gene: &Gene) -> Classification {
    let frame_offset = position - gene.orf_start - (query_start - 1);

    let mut frame = if frame_offset.rem_euclid(3) == 0 {
        FrameClass::InFrame
    } else {
        FrameClass::NotInFrame
    };
    if gene.is_intron() {
        frame = FrameClass::Intron;
    }
    if subject_end - position < 0 {
        frame = FrameClass::Backwards;
    }

    let mut orf = OrfClass::InOrf;
    if position < gene.orf_start {
        orf = OrfClass::Upstream;
    }
    if position > gene.orf_stop {
        orf = OrfClass::Downstream;
    }

    Classification { frame, orf }
}

/// Junction rows keyed by (gene, position, query start), kept in first-seen order.
#[derive(Debug, Default)]
pub struct JunctionTable {
    rows: Vec<Junction>,
    by_key: HashMap<(usize, i64, i64), usize>,
}

impl JunctionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one classified hit; a repeated key increments that row's count.
    pub fn record(&mut self, gene: usize, position: i64, query_start: i64, class: Classification) {
        let key = (gene, position, query_start);
        if let Some(&idx) = self.by_key.get(&key) {
            self.rows[idx].count += 1;
            return;
        }
        self.by_key.insert(key, self.rows.len());
        self.rows.push(Junction {
            gene,
            position,
            query_start,
            frame: class.frame,
            orf: class.orf,
            in_frame_in_orf: class.in_frame_in_orf(),
            count: 1,
            ppm: 0.0,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Assign ppm against the file's accepted total and derive per-gene stats.
    #[must_use]
    pub fn finish(self, accepted: usize) -> (Vec<Junction>, Vec<GeneStats>) {
        let mut junctions = self.rows;
        if accepted > 0 {
            for junction in &mut junctions {
                junction.ppm = f64::from(junction.count) * PARTS_PER_MILLION / accepted as f64;
            }
        }

        let mut stats_by_gene: HashMap<usize, GeneStats> = HashMap::new();
        for junction in &junctions {
            stats_by_gene
                .entry(junction.gene)
                .or_insert_with(|| GeneStats::new(junction.gene))
                .add(junction);
        }
        let mut stats: Vec<GeneStats> = stats_by_gene.into_values().collect();
        stats.sort_unstable_by_key(|s| s.gene);

        (junctions, stats)
    }
}

/// Everything produced by classifying one result file.
#[derive(Debug, Default)]
pub struct ClassifiedRun {
    pub junctions: Vec<Junction>,
    pub stats: Vec<GeneStats>,
    pub query_blocks: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Classify every accepted hit of a result file against the gene index.
///
/// Accessions are validated up front: if any is missing from the index the
/// whole file fails with a single error naming all of them.
pub fn classify_results(results: &BlastResults, genes: &GeneIndex) -> Result<ClassifiedRun, Error> {
    genes.ensure_known(results.hits.iter().map(|h| h.subject_id.as_str()))?;

    let mut table = JunctionTable::new();
    for hit in &results.hits {
        let (gene_idx, gene) = resolve(hit, genes)?;
        let class = classify(hit.subject_start, hit.query_start, hit.subject_end, gene);
        table.record(gene_idx, hit.subject_start, hit.query_start, class);
    }

    let accepted = results.accepted();
    let (junctions, stats) = table.finish(accepted);
    Ok(ClassifiedRun {
        junctions,
        stats,
        query_blocks: results.query_blocks,
        accepted,
        rejected: results.rejected,
    })
}

fn resolve<'a>(hit: &TabularHit, genes: &'a GeneIndex) -> Result<(usize, &'a Gene), Error> {
    let idx = genes
        .position(&hit.subject_id)
        .ok_or_else(|| Error::UnknownAccessions(vec![hit.subject_id.clone()]))?;
    Ok((idx, &genes.genes()[idx]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blast::parse_blast_results;
    use crate::gene_list::parse_gene_list;
    use std::io::Cursor;

    const GENE_LIST: &str = "\
NM_001 GENEA chr1 0 0 0 99 199 EXON SEQUENCE
NM_002 GENEB chr2 0 0 0 9 300 INTRON ACGT
NM_003 GENEC chr3 0 0 0 0 60 EXON ACGT
";

    fn genes() -> GeneIndex {
        parse_gene_list(Cursor::new(GENE_LIST)).unwrap()
    }

    fn hit_line(subject: &str, qstart: i64, sstart: i64, send: i64, bitscore: f64) -> String {
        format!("q\t{subject}\t100.00\t50\t0\t0\t{qstart}\t50\t{sstart}\t{send}\t1e-20\t{bitscore}\n")
    }

    fn results(blocks: &[String]) -> BlastResults {
        let text: String = blocks
            .iter()
            .map(|line| format!("# BLASTN 2.2.31+\n# 1 hits found\n{line}"))
            .collect();
        parse_blast_results(Cursor::new(text)).unwrap()
    }

    #[test]
    fn scenario_not_in_frame_in_orf() {
        let index = genes();
        let gene = index.get("NM_001").unwrap();
        let class = classify(150, 1, 199, gene);
        assert_eq!(class.frame, FrameClass::NotInFrame);
        assert_eq!(class.orf, OrfClass::InOrf);
        assert!(!class.in_frame_in_orf());
    }

    #[test]
    fn scenario_upstream() {
        let index = genes();
        let gene = index.get("NM_001").unwrap();
        assert_eq!(classify(50, 1, 99, gene).orf, OrfClass::Upstream);
        // Frame class is independent: 49 - 100 - 2 = -53, not a multiple of 3.
        let class = classify(49, 3, 99, gene);
        assert_eq!(class.orf, OrfClass::Upstream);
        assert_eq!(class.frame, FrameClass::NotInFrame);
    }

    #[test]
    fn in_frame_uses_query_start_correction() {
        let index = genes();
        let gene = index.get("NM_001").unwrap();
        // 151 - 100 - 0 = 51
        assert!(classify(151, 1, 200, gene).in_frame_in_orf());
        // 153 - 100 - 2 = 51
        assert_eq!(classify(153, 3, 200, gene).frame, FrameClass::InFrame);
        // Negative offsets use the Euclidean remainder: 97 - 100 - 0 = -3.
        assert_eq!(classify(97, 1, 150, gene).frame, FrameClass::InFrame);
    }

    #[test]
    fn downstream_and_overrides() {
        let index = genes();
        let gene = index.get("NM_001").unwrap();
        assert_eq!(classify(200, 1, 250, gene).orf, OrfClass::Downstream);
        assert_eq!(classify(199, 1, 250, gene).orf, OrfClass::InOrf);

        let intron = index.get("NM_002").unwrap();
        assert_eq!(classify(10, 1, 60, intron).frame, FrameClass::Intron);
        // Backwards wins over intron.
        assert_eq!(classify(60, 1, 10, intron).frame, FrameClass::Backwards);
    }

    #[test]
    fn inverted_boundaries_do_not_panic() {
        let mut gene = genes().get("NM_001").unwrap().clone();
        gene.orf_start = 300;
        gene.orf_stop = 100;
        // Both upstream and downstream hold; downstream wins.
        assert_eq!(classify(200, 1, 250, &gene).orf, OrfClass::Downstream);
    }

    #[test]
    fn duplicate_key_increments_count() {
        let mut table = JunctionTable::new();
        let class = Classification {
            frame: FrameClass::InFrame,
            orf: OrfClass::InOrf,
        };
        table.record(0, 150, 1, class);
        table.record(0, 150, 1, class);
        table.record(0, 150, 2, class);
        assert_eq!(table.len(), 2);

        let (junctions, stats) = table.finish(3);
        assert_eq!(junctions[0].count, 2);
        assert_eq!(junctions[1].count, 1);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].total, 2);
    }

    #[test]
    fn classify_results_end_to_end() {
        let run = classify_results(
            &results(&[
                hit_line("NM_001", 1, 150, 199, 90.0),
                hit_line("NM_001", 1, 150, 199, 90.0),
                hit_line("NM_003", 1, 31, 80, 90.0),
                hit_line("NM_001", 1, 50, 99, 90.0),
            ]),
            &genes(),
        )
        .unwrap();

        assert_eq!(run.accepted, 4);
        assert_eq!(run.query_blocks, 4);
        assert_eq!(run.rejected, 0);
        assert_eq!(run.junctions.len(), 3);

        let first = &run.junctions[0];
        assert_eq!((first.gene, first.position, first.query_start), (0, 150, 1));
        assert_eq!(first.count, 2);
        assert!((first.ppm - 500_000.0).abs() < 1e-6);

        let ppm_sum: f64 = run.junctions.iter().map(|j| j.ppm).sum();
        let count_sum: u32 = run.junctions.iter().map(|j| j.count).sum();
        assert!((ppm_sum - f64::from(count_sum) * 1e6 / 4.0).abs() < 1e-6);

        // NM_002 has no junctions and therefore no stats row.
        let stat_genes: Vec<usize> = run.stats.iter().map(|s| s.gene).collect();
        assert_eq!(stat_genes, [0, 2]);
        for stats in &run.stats {
            let rows = run.junctions.iter().filter(|j| j.gene == stats.gene).count();
            assert_eq!(stats.total as usize, rows);
        }
        assert_eq!(run.stats[0].upstream, 1);
        assert_eq!(run.stats[1].in_frame_in_orf, 1);
    }

    #[test]
    fn unknown_accessions_fail_together() {
        let err = classify_results(
            &results(&[
                hit_line("NM_001", 1, 150, 199, 90.0),
                hit_line("NM_404", 1, 150, 199, 90.0),
                hit_line("NM_500", 1, 150, 199, 90.0),
            ]),
            &genes(),
        )
        .unwrap_err();
        match err {
            Error::UnknownAccessions(missing) => assert_eq!(missing, ["NM_404", "NM_500"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_results_produce_empty_run() {
        let run = classify_results(&BlastResults::default(), &genes()).unwrap();
        assert!(run.junctions.is_empty());
        assert!(run.stats.is_empty());
        assert_eq!(run.accepted, 0);
    }
}
