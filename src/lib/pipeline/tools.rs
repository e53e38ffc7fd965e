//! Argument lists for the external programs driven by the pipeline.

use crate::core::process::Invocation;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Programs used by the pipeline, resolved through `PATH` unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Toolchain {
    pub bwa: PathBuf,
    pub samtools: PathBuf,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            bwa: PathBuf::from("bwa"),
            samtools: PathBuf::from("samtools"),
        }
    }
}

impl Toolchain {
    /// `bwa index <reference>`
    pub fn index_reference(&self, reference: &Path) -> Invocation {
        Invocation::new(&self.bwa).arg("index").arg(reference)
    }

    /// `bwa mem -t <threads> <reference> <fastq1> [<fastq2>]`
    pub fn align(
        &self,
        threads: usize,
        reference: &Path,
        fastq1: &Path,
        fastq2: Option<&Path>,
    ) -> Invocation {
        let inv = Invocation::new(&self.bwa)
            .arg("mem")
            .arg("-t")
            .arg(threads.to_string())
            .arg(reference)
            .arg(fastq1);
        match fastq2 {
            Some(mate) => inv.arg(mate),
            None => inv,
        }
    }

    /// `samtools view -@ <threads> -bS -o <unsorted> <sam>`
    pub fn sam_to_bam(&self, threads: usize, sam: &Path, unsorted: &Path) -> Invocation {
        Invocation::new(&self.samtools)
            .arg("view")
            .arg("-@")
            .arg(threads.to_string())
            .arg("-bS")
            .arg("-o")
            .arg(unsorted)
            .arg(sam)
    }

    /// `samtools sort -@ <threads> -o <output> <unsorted>`
    pub fn sort(&self, threads: usize, unsorted: &Path, output: &Path) -> Invocation {
        Invocation::new(&self.samtools)
            .arg("sort")
            .arg("-@")
            .arg(threads.to_string())
            .arg("-o")
            .arg(output)
            .arg(unsorted)
    }

    /// `samtools index <bam>`
    pub fn index_bam(&self, bam: &Path) -> Invocation {
        Invocation::new(&self.samtools).arg("index").arg(bam)
    }
}
