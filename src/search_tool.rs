//! Blocking invocation of the external `blastn` search tool.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};

/// E-value cutoff passed to the search tool.
pub const EVALUE: &str = "0.2";

/// Maximum number of target sequences reported per query.
pub const MAX_TARGET_SEQS: &str = "10";

/// Tabular output with comment lines.
const OUTPUT_FORMAT: &str = "7";

/// One search of a FASTA query file against a nucleotide database.
#[derive(Debug, Clone)]
pub struct BlastSearch {
    pub program: PathBuf,
    pub database: PathBuf,
    pub threads: usize,
}

impl BlastSearch {
    #[must_use]
    pub fn new(program: PathBuf, database: PathBuf, threads: usize) -> Self {
        Self {
            program,
            database,
            threads: threads.max(1),
        }
    }

    /// Arguments for searching `query` and writing results to `output`.
    #[must_use]
    pub fn arguments(&self, query: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(18);
        let mut push = |flag: &str, value: OsString| {
            args.push(flag.into());
            args.push(value);
        };
        push("-query", query.into());
        push("-db", self.database.clone().into());
        push("-task", "blastn".into());
        push("-dust", "no".into());
        push("-num_threads", self.threads.to_string().into());
        push("-outfmt", OUTPUT_FORMAT.into());
        push("-out", output.into());
        push("-evalue", EVALUE.into());
        push("-max_target_seqs", MAX_TARGET_SEQS.into());
        args
    }

    /// Runs the search and waits for it to finish.
    pub fn run(&self, query: &Path, output: &Path) -> Result<()> {
        let result = Command::new(&self.program)
            .args(self.arguments(query, output))
            .output()
            .with_context(|| format!("failed to start {}", self.program.display()))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            bail!(
                "{} exited with {} for {}: {}",
                self.program.display(),
                result.status,
                query.display(),
                stderr.trim()
            );
        }
        Ok(())
    }

    /// Fails early when the search binary is missing.
    pub fn check_program(&self) -> Result<()> {
        if !self.program.is_file() {
            bail!("search tool not found: {}", self.program.display());
        }
        Ok(())
    }

    /// Fails early when the database is missing. A database is either a single
    /// file or a prefix shared by its index files (`<db>.nhr`, `<db>.nin`, ...).
    pub fn check_database(&self) -> Result<()> {
        if self.database.is_file() {
            return Ok(());
        }
        let (Some(dir), Some(prefix)) = (self.database.parent(), self.database.file_name()) else {
            bail!("invalid search database path: {}", self.database.display());
        };
        let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
        let prefix = format!("{}.", prefix.to_string_lossy());

        let found = std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(std::result::Result::ok)
                    .any(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            })
            .unwrap_or(false);
        if !found {
            bail!("search database not found: {}", self.database.display());
        }
        Ok(())
    }
}
