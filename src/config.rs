use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::junction::MIN_JUNCTION_LENGTH;

/// Data directory name under `$HOME`.
const DATA_DIR_NAME: &str = ".deepn";

/// Search-tool binary relative to the data directory.
const DEFAULT_BLAST_BIN: &str = "data/blast/blastn";

const HUMAN_YEAST_JUNCTION: &str = "CCTCTGCGAGTGGTGGCAACTCTGTGGCCGGCCCAGCCGGCCATGTCAGC";
const MOUSE_JUNCTION: &str = "AATTCCACCCAAGCAGTGGTATCAACGCAGAGTGGCCATTACGGCCGGGG";
const YEAST_PGAD_JUNCTION: &str = "ATGATGAAGATACCCCACCAAACCCAAAAAAAGAGATCGAATTCCCGGGG";

/// Reference resources for one genome. Paths are relative to the data directory
/// unless absolute.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenomeEntry {
    pub blast_db: String,
    pub gene_list: String,
    pub junction_sequences: Vec<String>,
}

impl GenomeEntry {
    fn new(blast_db: &str, gene_list: &str, junction: &str) -> Self {
        Self {
            blast_db: blast_db.to_string(),
            gene_list: gene_list.to_string(),
            junction_sequences: vec![junction.to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    #[serde(default)]
    pub blast_bin: Option<String>,
    pub genomes: BTreeMap<String, GenomeEntry>,
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// The genome presets shipped with the DEEPN data bundle.
    #[must_use]
    pub fn builtin() -> Self {
        let hg38_db = "data/blastdb/hg38NMgenes.db";
        let saccer3_db = "data/blastdb/sacCer3.db";
        let hg38_list = "data/lists/hg38GeneList.prn";
        let saccer3_list = "data/lists/sacCer3GeneList.prn";

        let genomes = BTreeMap::from([
            ("hg38".to_string(), GenomeEntry::new(hg38_db, hg38_list, HUMAN_YEAST_JUNCTION)),
            ("saccer3".to_string(), GenomeEntry::new(saccer3_db, saccer3_list, HUMAN_YEAST_JUNCTION)),
            (
                "mm10".to_string(),
                GenomeEntry::new(
                    "data/blastdb/mm10mRNAnoSuffix.fa",
                    "data/lists/mm10GeneList.prn",
                    MOUSE_JUNCTION,
                ),
            ),
            ("hg38_pGAD".to_string(), GenomeEntry::new(hg38_db, hg38_list, MOUSE_JUNCTION)),
            (
                "saccer3_pGAD".to_string(),
                GenomeEntry::new(saccer3_db, saccer3_list, YEAST_PGAD_JUNCTION),
            ),
        ]);

        Self {
            blast_bin: None,
            genomes,
        }
    }

    /// Load `path` if given, otherwise the built-in presets.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.genomes.is_empty() {
            bail!("config defines no genomes");
        }
        for (name, genome) in &self.genomes {
            if name.trim().is_empty() {
                bail!("genome names must not be empty");
            }
            if genome.blast_db.trim().is_empty() {
                bail!("genome '{name}' has an empty blastDb path");
            }
            if genome.gene_list.trim().is_empty() {
                bail!("genome '{name}' has an empty geneList path");
            }
            if genome.junction_sequences.is_empty() {
                bail!("genome '{name}' has no junction sequences");
            }
            for junction in &genome.junction_sequences {
                validate_junction(name, junction)?;
            }
        }
        Ok(())
    }

    pub fn genome(&self, name: &str) -> Result<&GenomeEntry> {
        match self.genomes.get(name) {
            Some(genome) => Ok(genome),
            None => {
                let known: Vec<&str> = self.genomes.keys().map(String::as_str).collect();
                bail!("unknown genome '{name}', options: {}", known.join("/"))
            }
        }
    }

    /// Search-tool binary, resolved against the data directory.
    #[must_use]
    pub fn blast_bin(&self, data_dir: &Path) -> PathBuf {
        resolve(data_dir, self.blast_bin.as_deref().unwrap_or(DEFAULT_BLAST_BIN))
    }
}

fn validate_junction(genome: &str, junction: &str) -> Result<()> {
    if junction.len() < MIN_JUNCTION_LENGTH {
        bail!(
            "junction sequence for '{genome}' has {} bases, expected at least {MIN_JUNCTION_LENGTH}",
            junction.len()
        );
    }
    if let Some(c) = junction
        .chars()
        .find(|c| !matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T' | 'N'))
    {
        bail!("junction sequence for '{genome}' contains invalid base '{c}'");
    }
    Ok(())
}

/// Splits a comma-separated `--seq` value into junction sequences, dropping spaces.
#[must_use]
pub fn parse_junction_override(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Default data directory: `$HOME/.deepn`.
pub fn default_data_dir() -> Result<PathBuf> {
    let home = std::env::var_os("HOME").context("HOME is not set; pass --data-dir")?;
    Ok(PathBuf::from(home).join(DATA_DIR_NAME))
}

/// Resolve a possibly relative resource path against the data directory.
#[must_use]
pub fn resolve(data_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir.join(path)
    }
}
