use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;

use deepn::cli;
use deepn::config::{self, PipelineConfig};
use deepn::junction::JunctionScanner;
use deepn::pipeline::{self, Pipeline};
use deepn::search_tool::BlastSearch;
use deepn::workspace::{self, SamplePaths};

#[derive(Parser)]
#[command(
    name = "junction_make",
    about = "Find junction reads, search them against a genome and classify the hits"
)]
struct Cli {
    /// Work folder created by init_workspace
    #[arg(short = 'd', long = "dir")]
    dir: PathBuf,

    /// Genome preset (e.g. hg38, saccer3, mm10, hg38_pGAD, saccer3_pGAD)
    #[arg(short = 'g', long = "genome")]
    genome: String,

    /// Comma-separated junction sequences replacing the genome's defaults
    #[arg(short = 's', long = "seq")]
    seq: Option<String>,

    /// Reject junction reads whose downstream sequence contains this motif
    #[arg(short = 'x', long = "exclude-seq", default_value = "")]
    exclude_seq: String,

    /// Worker threads for the parallel stages and the search tool
    #[arg(short = 't', long = "threads", default_value_t = num_cpus::get())]
    threads: usize,

    /// Read from unmapped_sam_files instead of sam_files
    #[arg(long = "unmapped")]
    unmapped: bool,

    /// JSON genome configuration replacing the built-in presets
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Data directory holding the search tool, databases and gene lists
    #[arg(long = "data-dir")]
    data_dir: Option<PathBuf>,

    /// Classify existing search results only
    #[arg(long = "skip-search")]
    skip_search: bool,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli_args = Cli::parse();

    cli::banner("Junction Make");

    // ── Configuration ────────────────────────────────────
    cli::section("Configuration");

    let config = PipelineConfig::load(cli_args.config.as_deref())?;
    let genome = config.genome(&cli_args.genome)?;
    let data_dir = match cli_args.data_dir {
        Some(ref dir) => dir.clone(),
        None => config::default_data_dir()?,
    };

    let junctions = match cli_args.seq {
        Some(ref seq) => config::parse_junction_override(seq),
        None => genome.junction_sequences.clone(),
    };
    if junctions.is_empty() {
        bail!("no junction sequences given");
    }
    let scanner = JunctionScanner::from_junctions(junctions.as_slice(), &cli_args.exclude_seq)
        .context("invalid junction sequence")?;

    let gene_list = config::resolve(&data_dir, &genome.gene_list);
    let search = BlastSearch::new(
        config.blast_bin(&data_dir),
        config::resolve(&data_dir, &genome.blast_db),
        cli_args.threads,
    );
    let input_folder = if cli_args.unmapped {
        workspace::UNMAPPED_SAM_FILES
    } else {
        workspace::SAM_FILES
    };

    cli::kv("Work folder", &cli_args.dir.display().to_string());
    cli::kv("Genome", &cli_args.genome);
    cli::kv("Junctions", &junctions.join(", "));
    if !cli_args.exclude_seq.is_empty() {
        cli::kv("Exclude", &cli_args.exclude_seq);
    }
    cli::kv("Gene list", &gene_list.display().to_string());
    cli::kv("Database", &search.database.display().to_string());
    cli::kv("Threads", &cli_args.threads.to_string());

    eprintln!();

    // ── Resources ────────────────────────────────────────
    cli::section("Resources");

    if !gene_list.is_file() {
        bail!("gene list not found: {}", gene_list.display());
    }
    let sam_files = if cli_args.skip_search {
        Vec::new()
    } else {
        search.check_program()?;
        search.check_database()?;

        let input_dir = cli_args.dir.join(input_folder);
        let files = workspace::list_files(&input_dir, workspace::SAM_EXTENSION, true)
            .with_context(|| format!("input folder {input_folder} is not readable"))?;
        if files.is_empty() {
            bail!("no SAM files found in {}", input_dir.display());
        }
        cli::kv("SAM files", &files.len().to_string());
        files
    };

    let existing = workspace::check_and_create_folders(&cli_args.dir, &workspace::OUTPUT_FOLDERS)?;
    for folder in existing {
        cli::warning(&format!("{folder} already exists, its files may be overwritten"));
    }

    let pipeline = Pipeline::new(&cli_args.dir, cli_args.threads)?;

    eprintln!();

    let samples: Vec<SamplePaths> = if cli_args.skip_search {
        let samples = pipeline::existing_results(pipeline.work_dir())?;
        if samples.is_empty() {
            bail!("no search results found to classify");
        }
        cli::kv("Result files", &samples.len().to_string());
        eprintln!();
        samples
    } else {
        // ── Junction Search ──────────────────────────────
        cli::section("Junction Search");

        let report = pipeline.search_junctions(&sam_files, &scanner);
        for outcome in &report.completed {
            pipeline::report_search(outcome);
        }
        report.ensure_success("junction search")?;
        let samples: Vec<SamplePaths> = report.completed.into_iter().map(|o| o.paths).collect();

        eprintln!();

        // ── FASTA Conversion ─────────────────────────────
        cli::section("FASTA Conversion");

        let report = pipeline.convert_to_fasta(&samples);
        for (paths, records) in &report.completed {
            cli::kv(&paths.sample, &format!("{records} records"));
        }
        report.ensure_success("FASTA conversion")?;

        eprintln!();

        // ── Search ───────────────────────────────────────
        cli::section("Search");

        let report = pipeline.run_searches(&search, &samples);
        report.ensure_success("search")?;

        eprintln!();
        report.completed
    };

    // ── Classification ───────────────────────────────────
    cli::section("Classification");

    let report = pipeline.classify(&samples, &gene_list);
    for outcome in &report.completed {
        pipeline::report_classification(outcome);
    }
    report.ensure_success("classification")?;

    eprintln!();
    eprintln!(
        "{} {} junction database(s) written to {}",
        "Done:".green().bold(),
        report.completed.len(),
        cli_args.dir.join(workspace::BLAST_RESULTS_QUERY).display()
    );
    cli::print_summary(start);

    Ok(())
}
