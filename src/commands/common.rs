use anyhow::{Context, Result};
use fq2bam_lib::pipeline::config::IntermediatePolicy;
use fq2bam_lib::pipeline::tools::Toolchain;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Run file accepted by `run --config`.
///
/// Mirrors the `run` options; every field is optional so the command line
/// can supply whatever the file leaves out.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunFile {
    pub fastq1: Option<PathBuf>,
    pub fastq2: Option<PathBuf>,
    pub reference: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub threads: Option<usize>,
    pub intermediates: Option<IntermediatePolicy>,
    pub reindex_reference: Option<bool>,
    pub tools: Option<Toolchain>,
}

/// Read a TOML run file. Relative data paths are resolved against the
/// directory containing the file.
pub fn load_run_file(path: &Path) -> Result<RunFile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read run file: {}", path.display()))?;

    let mut file: RunFile = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse TOML run file: {}", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for entry in [
        &mut file.fastq1,
        &mut file.fastq2,
        &mut file.reference,
        &mut file.output,
    ] {
        if let Some(p) = entry.as_mut() {
            *p = resolve_path(base, p);
        }
    }

    Ok(file)
}

pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
