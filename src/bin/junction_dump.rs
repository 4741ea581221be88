use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use deepn::cli;
use deepn::store::JunctionDb;
use deepn::store::export::{self, GENES_TSV, JUNCTIONS_TSV, STATS_TSV};

#[derive(Parser)]
#[command(name = "junction_dump", about = "Export a junction database to TSV tables")]
struct Cli {
    /// Junction database (.jdb) written by junction_make
    #[arg(short = 'i', long = "in")]
    input: PathBuf,

    /// Output directory for genes.tsv, junctions.tsv and stats.tsv
    #[arg(short = 'o', long = "out")]
    out: PathBuf,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli_args = Cli::parse();

    cli::banner("Junction Dump");

    let db = JunctionDb::open(&cli_args.input)
        .with_context(|| format!("failed to read {}", cli_args.input.display()))?;

    cli::kv("Database", &cli_args.input.display().to_string());
    cli::kv("Gene list", &format!("{:08x}", db.gene_list_fingerprint));
    cli::kv("Genes", &db.genes.len().to_string());
    cli::kv("Junctions", &db.junctions.len().to_string());
    cli::kv("Genes with hits", &db.stats.len().to_string());
    cli::kv(
        "Hits",
        &format!("{} accepted, {} rejected in {} queries", db.accepted, db.rejected, db.query_blocks),
    );

    fs::create_dir_all(&cli_args.out)
        .with_context(|| format!("failed to create {}", cli_args.out.display()))?;
    export::export_tsv(&db, &cli_args.out)
        .with_context(|| format!("failed to export to {}", cli_args.out.display()))?;

    for name in [GENES_TSV, JUNCTIONS_TSV, STATS_TSV] {
        cli::success(&cli_args.out.join(name).display().to_string());
    }
    cli::print_summary(start);

    Ok(())
}
