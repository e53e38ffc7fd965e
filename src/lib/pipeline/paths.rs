//! File names derived from the configured output and reference paths.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix `bwa index` adds to the reference path; its presence marks an
/// already indexed reference.
pub const REFERENCE_INDEX_SUFFIX: &str = ".bwt";

/// Path of the marker file whose existence means the reference is indexed.
///
/// The suffix is appended to the full file name (`ref.fasta` →
/// `ref.fasta.bwt`), matching what `bwa index` writes.
pub fn reference_index_marker(reference: &Path) -> PathBuf {
    append_to_file_name(reference, REFERENCE_INDEX_SUFFIX)
}

fn append_to_file_name(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn has_bam_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("bam"))
        .unwrap_or(false)
}

/// Every file the pipeline reads or writes next to the final archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    /// Final coordinate-sorted BAM.
    pub output: PathBuf,
    /// SAM text streamed from the aligner.
    pub sam: PathBuf,
    /// BAM produced by `samtools view`, before sorting.
    pub unsorted: PathBuf,
    /// Companion index written by `samtools index`.
    pub output_index: PathBuf,
}

impl PipelinePaths {
    pub fn from_output(output: &Path) -> Self {
        let (sam, unsorted) = if has_bam_extension(output) {
            let stem = output
                .file_stem()
                .map(|s| s.to_os_string())
                .unwrap_or_default();
            let mut unsorted_name = stem;
            unsorted_name.push("-unsorted.bam");
            (output.with_extension("sam"), output.with_file_name(unsorted_name))
        } else {
            (
                append_to_file_name(output, ".sam"),
                append_to_file_name(output, "-unsorted.bam"),
            )
        };

        Self {
            output: output.to_path_buf(),
            sam,
            unsorted,
            output_index: append_to_file_name(output, ".bai"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intermediates_replace_bam_suffix() {
        let paths = PipelinePaths::from_output(Path::new("out.bam"));
        assert_eq!(paths.sam, PathBuf::from("out.sam"));
        assert_eq!(paths.unsorted, PathBuf::from("out-unsorted.bam"));
        assert_eq!(paths.output_index, PathBuf::from("out.bam.bai"));
    }

    #[test]
    fn intermediates_stay_in_output_directory() {
        let paths = PipelinePaths::from_output(Path::new("/runs/sample.v2/aln.bam"));
        assert_eq!(paths.sam, PathBuf::from("/runs/sample.v2/aln.sam"));
        assert_eq!(paths.unsorted, PathBuf::from("/runs/sample.v2/aln-unsorted.bam"));
    }

    #[test]
    fn output_without_bam_suffix_never_collides() {
        let paths = PipelinePaths::from_output(Path::new("results/sample"));
        assert_eq!(paths.sam, PathBuf::from("results/sample.sam"));
        assert_eq!(paths.unsorted, PathBuf::from("results/sample-unsorted.bam"));
        assert_ne!(paths.sam, paths.output);
    }

    #[test]
    fn reference_marker_appends_bwt() {
        assert_eq!(
            reference_index_marker(Path::new("genomes/ref.fasta")),
            PathBuf::from("genomes/ref.fasta.bwt")
        );
    }
}
