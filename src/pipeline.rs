//! Stage orchestration for `junction_make`: junction search, FASTA conversion,
//! search-tool runs and classification into junction databases.
//!
//! Files are independent units of work. A stage runs every file to completion,
//! then reports all failures together and stops the run before the next stage.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;

use crate::blast::parse_blast_results;
use crate::classification::{ClassifiedRun, classify_results};
use crate::cli;
use crate::fasta::convert_junction_file;
use crate::gene_list::parse_gene_list;
use crate::junction::JunctionScanner;
use crate::perf;
use crate::sam::{SearchSummary, search_alignment_file};
use crate::search_tool::BlastSearch;
use crate::store::JunctionDbWriter;
use crate::workspace::{self, SamplePaths};

/// A file that failed a stage, with its full error chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub name: String,
    pub error: String,
}

/// Outcome of one stage across all of its files, in input order.
#[derive(Debug)]
pub struct StageReport<T> {
    pub completed: Vec<T>,
    pub failures: Vec<FileFailure>,
}

impl<T> StageReport<T> {
    fn from_outcomes(outcomes: Vec<(String, Result<T>)>) -> Self {
        let mut completed = Vec::new();
        let mut failures = Vec::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(value) => completed.push(value),
                Err(e) => failures.push(FileFailure {
                    name,
                    error: format!("{e:#}"),
                }),
            }
        }
        Self {
            completed,
            failures,
        }
    }

    /// Prints every failure and fails the run if there were any.
    pub fn ensure_success(&self, stage: &str) -> Result<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        for failure in &self.failures {
            cli::failure(&format!("{}: {}", failure.name, failure.error));
        }
        bail!("{stage} failed for {} file(s)", self.failures.len());
    }
}

/// Junction search result for one SAM file.
#[derive(Debug)]
pub struct SearchOutcome {
    pub paths: SamplePaths,
    pub summary: SearchSummary,
    pub elapsed: Duration,
}

/// Classification result for one search-result file.
#[derive(Debug)]
pub struct ClassifyOutcome {
    pub paths: SamplePaths,
    pub junctions: usize,
    pub genes_with_junctions: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Gene-list rows that repeated an earlier accession.
    pub duplicate_genes: usize,
    pub elapsed: Duration,
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Runs per-file work on a bounded rayon pool, keeping input order.
pub struct Pipeline {
    work_dir: PathBuf,
    pool: rayon::ThreadPool,
}

impl Pipeline {
    pub fn new(work_dir: &Path, threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .build()
            .context("failed to build thread pool")?;
        Ok(Self {
            work_dir: work_dir.to_path_buf(),
            pool,
        })
    }

    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn run_parallel<I, T, F>(&self, items: &[I], label: impl Fn(&I) -> String + Sync, task: F) -> StageReport<T>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> Result<T> + Sync,
    {
        let outcomes: Vec<(String, Result<T>)> = self
            .pool
            .install(|| items.par_iter().map(|item| (label(item), task(item))).collect());
        StageReport::from_outcomes(outcomes)
    }

    /// Scans every SAM file and writes `<sample>.junctions.txt`.
    pub fn search_junctions(&self, sam_files: &[PathBuf], scanner: &JunctionScanner) -> StageReport<SearchOutcome> {
        self.run_parallel(
            sam_files,
            |path| file_label(path),
            |path| self.search_file(path, scanner),
        )
    }

    fn search_file(&self, sam_path: &Path, scanner: &JunctionScanner) -> Result<SearchOutcome> {
        let start = Instant::now();
        let sample = workspace::sample_name(sam_path, workspace::SAM_EXTENSION)?;
        let paths = SamplePaths::new(&self.work_dir, &sample);

        let reader = workspace::open_text(sam_path)?;
        let writer = BufWriter::new(
            File::create(&paths.junctions)
                .with_context(|| format!("failed to create {}", paths.junctions.display()))?,
        );
        let summary = search_alignment_file(reader, scanner, writer)
            .with_context(|| format!("junction search failed for {}", sam_path.display()))?;

        Ok(SearchOutcome {
            paths,
            summary,
            elapsed: start.elapsed(),
        })
    }

    /// Converts each junction file into a FASTA query; returns (paths, records).
    pub fn convert_to_fasta(&self, samples: &[SamplePaths]) -> StageReport<(SamplePaths, usize)> {
        self.run_parallel(
            samples,
            |paths| file_label(&paths.junctions),
            |paths| {
                let reader = BufReader::new(
                    File::open(&paths.junctions)
                        .with_context(|| format!("failed to open {}", paths.junctions.display()))?,
                );
                let writer = BufWriter::new(
                    File::create(&paths.fasta)
                        .with_context(|| format!("failed to create {}", paths.fasta.display()))?,
                );
                let records = convert_junction_file(reader, writer)
                    .with_context(|| format!("FASTA conversion failed for {}", paths.junctions.display()))?;
                Ok((paths.clone(), records))
            },
        )
    }

    /// Runs the search tool once per FASTA file, sequentially.
    ///
    /// An empty FASTA file means no junctions were found, which usually
    /// indicates the wrong genome was chosen; it fails that file.
    pub fn run_searches(&self, search: &BlastSearch, samples: &[SamplePaths]) -> StageReport<SamplePaths> {
        let outcomes = samples
            .iter()
            .map(|paths| {
                let outcome = (|| -> Result<SamplePaths> {
                    let size = fs::metadata(&paths.fasta)
                        .with_context(|| format!("failed to stat {}", paths.fasta.display()))?
                        .len();
                    if size == 0 {
                        bail!("no junctions found, check that the right genome was chosen");
                    }
                    let start = Instant::now();
                    cli::kv("Searching", &file_label(&paths.fasta));
                    search.run(&paths.fasta, &paths.blast)?;
                    cli::success(&format!(
                        "{} searched in {}",
                        file_label(&paths.fasta),
                        perf::format_elapsed(start.elapsed())
                    ));
                    Ok(paths.clone())
                })();
                (file_label(&paths.fasta), outcome)
            })
            .collect();
        StageReport::from_outcomes(outcomes)
    }

    /// Classifies each search-result file and writes `<sample>.jdb`.
    ///
    /// The gene list is loaded fresh for every file.
    pub fn classify(&self, samples: &[SamplePaths], gene_list: &Path) -> StageReport<ClassifyOutcome> {
        self.run_parallel(
            samples,
            |paths| file_label(&paths.blast),
            |paths| classify_file(paths, gene_list),
        )
    }
}

fn classify_file(paths: &SamplePaths, gene_list: &Path) -> Result<ClassifyOutcome> {
    let start = Instant::now();

    let genes = parse_gene_list(workspace::open_text(gene_list)?)
        .with_context(|| format!("failed to parse gene list {}", gene_list.display()))?;

    let reader = BufReader::new(
        File::open(&paths.blast).with_context(|| format!("failed to open {}", paths.blast.display()))?,
    );
    let results = parse_blast_results(reader)
        .with_context(|| format!("failed to parse {}", paths.blast.display()))?;
    let run: ClassifiedRun = classify_results(&results, &genes)
        .with_context(|| format!("classification failed for {}", paths.blast.display()))?;

    JunctionDbWriter::write_file(&paths.database, &genes, &run)
        .with_context(|| format!("failed to write {}", paths.database.display()))?;

    Ok(ClassifyOutcome {
        paths: paths.clone(),
        junctions: run.junctions.len(),
        genes_with_junctions: run.stats.len(),
        accepted: run.accepted,
        rejected: run.rejected,
        duplicate_genes: genes.duplicates(),
        elapsed: start.elapsed(),
    })
}

/// Prints the per-file junction search summary, warning about dropped reads.
pub fn report_search(outcome: &SearchOutcome) {
    let s = &outcome.summary;
    cli::success(&format!(
        "{}: {} junctions ({} forward, {} reverse) from {} unmapped reads in {} ({})",
        outcome.paths.sample,
        s.hits(),
        s.forward_hits,
        s.reverse_hits,
        s.eligible,
        perf::format_elapsed(outcome.elapsed),
        perf::format_rate(s.lines, outcome.elapsed, "lines")
    ));
    if s.undefined_base_reads > 0 {
        cli::warning(&format!(
            "{}: {} read(s) skipped for undefined bases",
            outcome.paths.sample, s.undefined_base_reads
        ));
    }
}

pub fn report_classification(outcome: &ClassifyOutcome) {
    cli::success(&format!(
        "{}: accepted {} and rejected {} hits, {} junctions in {} genes ({})",
        outcome.paths.sample,
        outcome.accepted,
        outcome.rejected,
        outcome.junctions,
        outcome.genes_with_junctions,
        perf::format_elapsed(outcome.elapsed)
    ));
    if outcome.duplicate_genes > 0 {
        cli::warning(&format!(
            "{}: gene list repeats {} accession(s), later rows were used",
            outcome.paths.sample, outcome.duplicate_genes
        ));
    }
}

/// Sample paths for every existing search-result file, used by `--skip-search`.
pub fn existing_results(work_dir: &Path) -> Result<Vec<SamplePaths>> {
    let files = workspace::list_files(&work_dir.join(workspace::BLAST_RESULTS), workspace::BLAST_EXTENSION, false)?;
    files
        .iter()
        .map(|path| {
            let sample = workspace::sample_name(path, workspace::BLAST_EXTENSION)?;
            Ok(SamplePaths::new(work_dir, &sample))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::{OUTPUT_FOLDERS, check_and_create_folders};
    use crate::store::JunctionDb;

    const JUNCTION: &str = "CCTCTGCGAGTGGTGGCAACTCTGTGGCCGGCCCAGCCGGCCATGTCAGC";
    const DOWNSTREAM: &str = "ATGGCAATGGCAATGGCAATGGCAATGGCA";

    fn work_dir() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        check_and_create_folders(tmp.path(), &OUTPUT_FOLDERS).unwrap();
        tmp
    }

    fn sam_line(name: &str, seq: &str) -> String {
        format!("{name}\t4\t*\t0\t0\t*\t*\t0\t0\t{seq}\tIIII\n")
    }

    #[test]
    fn search_and_convert_stage() {
        let tmp = work_dir();
        let sam_dir = tmp.path().join("sam_files");
        fs::create_dir(&sam_dir).unwrap();

        let read = format!("GG{}{DOWNSTREAM}", &JUNCTION[30..50]);
        fs::write(sam_dir.join("s1.sam"), format!("@HD\n{}", sam_line("r1", &read))).unwrap();
        fs::write(sam_dir.join("s2.sam"), "r2\t4\t*\n").unwrap();

        let pipeline = Pipeline::new(tmp.path(), 2).unwrap();
        let scanner = JunctionScanner::from_junctions(&[JUNCTION], "").unwrap();
        let files = workspace::list_files(&sam_dir, ".sam", true).unwrap();
        let report = pipeline.search_junctions(&files, &scanner);

        assert_eq!(report.completed.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "s2.sam");
        assert!(report.failures[0].error.contains("line 1"));
        assert!(report.ensure_success("junction search").is_err());

        let samples: Vec<SamplePaths> = report.completed.iter().map(|o| o.paths.clone()).collect();
        let converted = pipeline.convert_to_fasta(&samples);
        assert!(converted.ensure_success("FASTA conversion").is_ok());
        assert_eq!(converted.completed[0].1, 1);
        let fasta = fs::read_to_string(&samples[0].fasta).unwrap();
        assert_eq!(fasta, format!(">r1\n{DOWNSTREAM}\n"));
    }

    #[test]
    fn empty_fasta_fails_search() {
        let tmp = work_dir();
        let paths = SamplePaths::new(tmp.path(), "s1");
        fs::write(&paths.fasta, "").unwrap();

        let pipeline = Pipeline::new(tmp.path(), 1).unwrap();
        let search = BlastSearch::new("/nonexistent/blastn".into(), "db".into(), 1);
        let report = pipeline.run_searches(&search, &[paths]);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].error.contains("no junctions found"));
    }

    #[test]
    fn classify_stage_writes_database() {
        let tmp = work_dir();
        let gene_list = tmp.path().join("genes.prn");
        fs::write(
            &gene_list,
            "NM_001 GENEA chr1 0 0 0 99 199 EXON ACGT\nNM_002 GENEB chr2 0 0 0 9 300 INTRON ACGT\n",
        )
        .unwrap();

        let good = SamplePaths::new(tmp.path(), "good");
        fs::write(
            &good.blast,
            "# BLASTN 2.2.31+\n# 1 hits found\nq\tNM_001\t100.00\t50\t0\t0\t1\t50\t151\t200\t1e-20\t90.0\n",
        )
        .unwrap();
        let bad = SamplePaths::new(tmp.path(), "bad");
        fs::write(
            &bad.blast,
            "# BLASTN 2.2.31+\n# 1 hits found\nq\tNM_404\t100.00\t50\t0\t0\t1\t50\t151\t200\t1e-20\t90.0\n",
        )
        .unwrap();

        let samples = existing_results(tmp.path()).unwrap();
        assert_eq!(samples.len(), 2);

        let pipeline = Pipeline::new(tmp.path(), 2).unwrap();
        let report = pipeline.classify(&samples, &gene_list);
        assert_eq!(report.completed.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "bad.blast.txt");
        assert!(report.failures[0].error.contains("NM_404"));
        assert!(!bad.database.exists());

        let db = JunctionDb::open(&good.database).unwrap();
        assert_eq!(db.junctions.len(), 1);
        assert!(db.junctions[0].in_frame_in_orf);
        assert_eq!(db.stats.len(), 1);
    }
}
