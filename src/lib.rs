//! DEEPN: junction detection in sequencing reads, BLAST hit classification
//! against gene ORFs and per-gene junction statistics.

pub mod error;

pub mod blast;
pub mod classification;
pub mod cli;
pub mod codon;
pub mod config;
pub mod fasta;
pub mod gene_list;
pub mod junction;
pub mod perf;
pub mod pipeline;
pub mod sam;
pub mod search_tool;
pub mod sequence;
pub mod store;
pub mod workspace;
