//! Run configuration for a single FASTQ → BAM conversion.

use crate::core::concurrency::determine_allowed_cpus;
use crate::core::error::{PipelineError, Result};
use crate::pipeline::tools::Toolchain;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Thread count forwarded to bwa and samtools when none is configured.
pub const DEFAULT_THREADS: usize = 5;

/// Which intermediate files are deleted after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntermediatePolicy {
    /// Delete the SAM text, keep the unsorted BAM.
    #[default]
    RemoveSam,
    /// Delete both the SAM text and the unsorted BAM.
    RemoveAll,
    /// Leave every intermediate in place.
    KeepAll,
}

impl IntermediatePolicy {
    pub const VARIANTS: &'static [&'static str] = &["remove-sam", "remove-all", "keep-all"];

    pub fn removes_sam(self) -> bool {
        !matches!(self, IntermediatePolicy::KeepAll)
    }

    pub fn removes_unsorted(self) -> bool {
        matches!(self, IntermediatePolicy::RemoveAll)
    }
}

impl FromStr for IntermediatePolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "remove-sam" => Ok(IntermediatePolicy::RemoveSam),
            "remove-all" => Ok(IntermediatePolicy::RemoveAll),
            "keep-all" => Ok(IntermediatePolicy::KeepAll),
            other => Err(PipelineError::Config(format!(
                "unknown intermediate policy '{}', expected one of {}",
                other,
                Self::VARIANTS.join(", ")
            ))),
        }
    }
}

impl fmt::Display for IntermediatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntermediatePolicy::RemoveSam => "remove-sam",
            IntermediatePolicy::RemoveAll => "remove-all",
            IntermediatePolicy::KeepAll => "keep-all",
        };
        f.write_str(name)
    }
}

fn default_threads() -> usize {
    DEFAULT_THREADS
}

/// Everything one pipeline run needs.
///
/// `fastq2` switches bwa into paired-end mode. The same structure is read
/// from TOML run files by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    pub fastq1: PathBuf,
    #[serde(default)]
    pub fastq2: Option<PathBuf>,
    pub reference: PathBuf,
    pub output: PathBuf,
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default)]
    pub intermediates: IntermediatePolicy,
    /// Run `bwa index` even when the reference index already exists.
    #[serde(default)]
    pub reindex_reference: bool,
    #[serde(default)]
    pub tools: Toolchain,
}

impl RunConfig {
    pub fn new(
        fastq1: impl Into<PathBuf>,
        reference: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fastq1: fastq1.into(),
            fastq2: None,
            reference: reference.into(),
            output: output.into(),
            threads: DEFAULT_THREADS,
            intermediates: IntermediatePolicy::default(),
            reindex_reference: false,
            tools: Toolchain::default(),
        }
    }

    pub fn with_fastq2(mut self, fastq2: impl Into<PathBuf>) -> Self {
        self.fastq2 = Some(fastq2.into());
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_intermediates(mut self, policy: IntermediatePolicy) -> Self {
        self.intermediates = policy;
        self
    }

    pub fn with_tools(mut self, tools: Toolchain) -> Self {
        self.tools = tools;
        self
    }

    pub fn is_paired_end(&self) -> bool {
        self.fastq2.is_some()
    }

    /// Check parameters that do not depend on the filesystem.
    pub fn validate(&self) -> Result<()> {
        determine_allowed_cpus(self.threads)?;
        if self.output.file_name().is_none() {
            return Err(PipelineError::Config(format!(
                "output path '{}' does not name a file",
                self.output.display()
            )));
        }
        Ok(())
    }
}
