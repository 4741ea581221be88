//! Tabular search-result parsing with per-block best-hit acceptance.
//!
//! Each query block opens with a program header comment. Within a block a hit
//! is accepted only if it beats the previously accepted bitscore by a 2%
//! margin, so at most the best hit (plus clear improvements) survives.

pub mod entry;
pub mod parser;

use std::io::BufRead;

use crate::error::Error;

use entry::TabularHit;
use parser::ParsedLine;

/// Minimum percent identity (exclusive) for an accepted hit.
pub const MIN_PERCENT_IDENTITY: f64 = 98.0;

/// Minimum bitscore (exclusive) for an accepted hit.
pub const MIN_BITSCORE: f64 = 50.0;

/// Blocks reporting more hits than this stop accepting until the next header.
pub const MAX_BLOCK_HITS: u64 = 100;

/// Fraction of an accepted bitscore that later hits in the block must beat.
const BITSCORE_MARGIN: f64 = 0.98;

/// Running acceptance state threaded through one result file.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockState {
    pub previous_bitscore: f64,
    pub collect_results: bool,
    pub query_blocks: usize,
}

impl Default for BlockState {
    fn default() -> Self {
        Self {
            previous_bitscore: 0.0,
            collect_results: true,
            query_blocks: 0,
        }
    }
}

impl BlockState {
    /// A program header opens a new query block.
    pub fn start_block(&mut self) {
        self.previous_bitscore = 0.0;
        self.collect_results = true;
        self.query_blocks += 1;
    }

    pub fn observe_hit_count(&mut self, hits: u64) {
        if hits > MAX_BLOCK_HITS {
            self.collect_results = false;
        }
    }

    /// Decide whether a data line is accepted, updating the bitscore floor.
    pub fn accept(&mut self, hit: &TabularHit) -> bool {
        let accepted = self.collect_results
            && hit.percent_identity > MIN_PERCENT_IDENTITY
            && hit.bitscore > MIN_BITSCORE
            && hit.bitscore > self.previous_bitscore;
        if accepted {
            self.previous_bitscore = hit.bitscore * BITSCORE_MARGIN;
        }
        accepted
    }
}

/// Accepted hits of one result file plus the counters gathered on the way.
#[derive(Debug, Default)]
pub struct BlastResults {
    pub hits: Vec<TabularHit>,
    pub query_blocks: usize,
    pub rejected: usize,
}

impl BlastResults {
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.hits.len()
    }
}

/// Parses tabular results and keeps the accepted hits in file order.
///
/// Only data lines count as rejected; comments and blank lines are not counted.
pub fn parse_blast_results<R: BufRead>(reader: R) -> Result<BlastResults, Error> {
    let mut state = BlockState::default();
    let mut results = BlastResults::default();

    for (line_num, line) in reader.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line?;
        match parser::parse_line(&line)
            .map_err(|e| Error::Parse(format!("{e} (line {line_num}: {line})")))?
        {
            ParsedLine::ProgramHeader => state.start_block(),
            ParsedLine::HitCount(hits) => state.observe_hit_count(hits),
            ParsedLine::Hit(hit) => {
                if state.accept(&hit) {
                    results.hits.push(*hit);
                } else {
                    results.rejected += 1;
                }
            }
            ParsedLine::Comment => continue,
        }
    }

    results.query_blocks = state.query_blocks;
    Ok(results)
}
