//! Work-folder layout and file naming for a DEEPN run.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use flate2::read::MultiGzDecoder;

pub const SAM_FILES: &str = "sam_files";
pub const UNMAPPED_SAM_FILES: &str = "unmapped_sam_files";
pub const MAPPED_SAM_FILES: &str = "mapped_sam_files";
pub const JUNCTION_FILES: &str = "junction_files";
pub const BLAST_RESULTS: &str = "blast_results";
pub const BLAST_RESULTS_QUERY: &str = "blast_results_query";

/// Folders created by `init_workspace`.
pub const INPUT_FOLDERS: [&str; 3] = [MAPPED_SAM_FILES, UNMAPPED_SAM_FILES, SAM_FILES];

/// Folders created (or reused) by `junction_make`.
pub const OUTPUT_FOLDERS: [&str; 3] = [JUNCTION_FILES, BLAST_RESULTS, BLAST_RESULTS_QUERY];

pub const SAM_EXTENSION: &str = ".sam";
pub const JUNCTIONS_EXTENSION: &str = ".junctions.txt";
pub const FASTA_EXTENSION: &str = ".junctions.fa";
pub const BLAST_EXTENSION: &str = ".blast.txt";
pub const DATABASE_EXTENSION: &str = ".jdb";

const GZ_EXTENSION: &str = ".gz";

/// Create a fresh work folder with the input sub-folders.
pub fn init_workspace(dir: &Path) -> Result<()> {
    if dir.exists() {
        bail!("work folder already exists: {}", dir.display());
    }
    for folder in INPUT_FOLDERS {
        let path = dir.join(folder);
        fs::create_dir_all(&path).with_context(|| format!("failed to create {}", path.display()))?;
    }
    Ok(())
}

/// Create each folder under `dir` that does not exist yet.
///
/// Returns the folders that already existed; their contents may be overwritten.
pub fn check_and_create_folders(dir: &Path, folders: &[&str]) -> Result<Vec<String>> {
    if !dir.is_dir() {
        bail!("work folder not found: {}", dir.display());
    }
    let mut existing = Vec::new();
    for folder in folders {
        let path = dir.join(folder);
        if path.exists() {
            existing.push((*folder).to_string());
        } else {
            fs::create_dir_all(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
        }
    }
    Ok(existing)
}

/// Files in `dir` whose name ends in `suffix` (or `suffix` + `.gz` when
/// `allow_gz` is set), sorted by name.
pub fn list_files(dir: &Path, suffix: &str, allow_gz: bool) -> Result<Vec<PathBuf>> {
    let gz_suffix = format!("{suffix}{GZ_EXTENSION}");
    let entries = fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.ends_with(suffix) || (allow_gz && name.ends_with(&gz_suffix)) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// File name of `path` with `suffix` (and an optional `.gz`) removed.
pub fn sample_name(path: &Path, suffix: &str) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid file name: {}", path.display()))?;
    let name = name.strip_suffix(GZ_EXTENSION).unwrap_or(name);
    let Some(stem) = name.strip_suffix(suffix) else {
        bail!("{} does not end in {suffix}", path.display());
    };
    if stem.is_empty() {
        bail!("{} has an empty sample name", path.display());
    }
    Ok(stem.to_string())
}

/// Paths produced for one sample across the pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePaths {
    pub sample: String,
    pub junctions: PathBuf,
    pub fasta: PathBuf,
    pub blast: PathBuf,
    pub database: PathBuf,
}

impl SamplePaths {
    #[must_use]
    pub fn new(work_dir: &Path, sample: &str) -> Self {
        Self {
            sample: sample.to_string(),
            junctions: work_dir
                .join(JUNCTION_FILES)
                .join(format!("{sample}{JUNCTIONS_EXTENSION}")),
            fasta: work_dir
                .join(BLAST_RESULTS)
                .join(format!("{sample}{FASTA_EXTENSION}")),
            blast: work_dir
                .join(BLAST_RESULTS)
                .join(format!("{sample}{BLAST_EXTENSION}")),
            database: work_dir
                .join(BLAST_RESULTS_QUERY)
                .join(format!("{sample}{DATABASE_EXTENSION}")),
        }
    }
}

/// Open a text file for buffered reading, decompressing `.gz` files.
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let is_gz = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if is_gz {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::{Read, Write};

    #[test]
    fn init_creates_input_folders() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("work");
        init_workspace(&dir).unwrap();
        for folder in INPUT_FOLDERS {
            assert!(dir.join(folder).is_dir());
        }
        let err = init_workspace(&dir).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn check_and_create_reports_existing() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join(JUNCTION_FILES)).unwrap();

        let existing = check_and_create_folders(tmp.path(), &OUTPUT_FOLDERS).unwrap();
        assert_eq!(existing, [JUNCTION_FILES]);
        for folder in OUTPUT_FOLDERS {
            assert!(tmp.path().join(folder).is_dir());
        }
        assert!(check_and_create_folders(&tmp.path().join("missing"), &OUTPUT_FOLDERS).is_err());
    }

    #[test]
    fn list_files_filters_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.sam", "a.sam.gz", "c.txt", "d.sam.bak"] {
            fs::write(tmp.path().join(name), b"").unwrap();
        }
        fs::create_dir(tmp.path().join("e.sam")).unwrap();

        let names = |files: Vec<PathBuf>| -> Vec<String> {
            files
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };
        assert_eq!(names(list_files(tmp.path(), ".sam", true).unwrap()), ["a.sam.gz", "b.sam"]);
        assert_eq!(names(list_files(tmp.path(), ".sam", false).unwrap()), ["b.sam"]);
    }

    #[test]
    fn sample_names() {
        assert_eq!(sample_name(Path::new("/w/sam_files/s1.sam"), ".sam").unwrap(), "s1");
        assert_eq!(sample_name(Path::new("s1.sam.gz"), ".sam").unwrap(), "s1");
        assert_eq!(
            sample_name(Path::new("s1.blast.txt"), BLAST_EXTENSION).unwrap(),
            "s1"
        );
        assert!(sample_name(Path::new("s1.txt"), ".sam").is_err());
        assert!(sample_name(Path::new(".sam"), ".sam").is_err());
    }

    #[test]
    fn sample_paths_layout() {
        let paths = SamplePaths::new(Path::new("/w"), "s1");
        assert_eq!(paths.junctions, PathBuf::from("/w/junction_files/s1.junctions.txt"));
        assert_eq!(paths.fasta, PathBuf::from("/w/blast_results/s1.junctions.fa"));
        assert_eq!(paths.blast, PathBuf::from("/w/blast_results/s1.blast.txt"));
        assert_eq!(paths.database, PathBuf::from("/w/blast_results_query/s1.jdb"));
    }

    #[test]
    fn open_text_handles_gzip() {
        let tmp = tempfile::tempdir().unwrap();
        let plain = tmp.path().join("a.sam");
        fs::write(&plain, b"@HD\n").unwrap();

        let gz = tmp.path().join("b.sam.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(b"@HD\n").unwrap();
        fs::write(&gz, encoder.finish().unwrap()).unwrap();

        for path in [plain, gz] {
            let mut text = String::new();
            open_text(&path).unwrap().read_to_string(&mut text).unwrap();
            assert_eq!(text, "@HD\n");
        }
    }
}
