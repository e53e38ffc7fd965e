use anyhow::{anyhow, Result};
use fq2bam_lib::pipeline::config::{IntermediatePolicy, RunConfig, DEFAULT_THREADS};
use std::path::PathBuf;
use structopt::StructOpt;

use crate::commands::common::{self, RunFile};

/// Arguments for the `run` command.
///
/// Every option may also come from a TOML run file passed with `--config`;
/// values given on the command line take precedence.
#[derive(Debug, Clone, StructOpt)]
#[structopt(name = "run", about = "Align FASTQ reads and write a sorted, indexed BAM")]
pub struct RunArgs {
    /// First-read (R1) FASTQ file.
    #[structopt(long, short = "1", parse(from_os_str))]
    pub fastq1: Option<PathBuf>,

    /// Second-read (R2) FASTQ file; enables paired-end alignment.
    #[structopt(long, short = "2", parse(from_os_str))]
    pub fastq2: Option<PathBuf>,

    /// Reference genome FASTA. Indexed with `bwa index` when `<reference>.bwt` is missing.
    #[structopt(long, short = "r", parse(from_os_str))]
    pub reference: Option<PathBuf>,

    /// Output path for the sorted BAM. Intermediates are written next to it.
    #[structopt(long, short = "o", parse(from_os_str))]
    pub output: Option<PathBuf>,

    /// Number of threads passed to bwa and samtools (default: 5).
    #[structopt(short, long)]
    pub threads: Option<usize>,

    /// Intermediate files to delete after a successful run.
    #[structopt(long, possible_values = IntermediatePolicy::VARIANTS)]
    pub intermediates: Option<IntermediatePolicy>,

    /// Rebuild the reference index even if it already exists.
    #[structopt(long)]
    pub reindex_reference: bool,

    /// Reuse an existing reference index even if the run file asks for a rebuild.
    #[structopt(long)]
    pub no_reindex_reference: bool,

    /// bwa executable.
    #[structopt(long, parse(from_os_str))]
    pub bwa: Option<PathBuf>,

    /// samtools executable.
    #[structopt(long, parse(from_os_str))]
    pub samtools: Option<PathBuf>,

    /// TOML run file with default values for the options above.
    #[structopt(long, parse(from_os_str))]
    pub config: Option<PathBuf>,

    /// Validate inputs and print the commands without running them.
    #[structopt(long)]
    pub dry_run: bool,
}

fn missing(option: &str) -> anyhow::Error {
    anyhow!(
        "--{} must be given on the command line or in the --config file",
        option
    )
}

impl RunArgs {
    /// Explicit `--reindex-reference` / `--no-reindex-reference` choice, if any.
    fn reindex_override(&self) -> Result<Option<bool>> {
        match (self.reindex_reference, self.no_reindex_reference) {
            (true, true) => Err(anyhow!(
                "--reindex-reference and --no-reindex-reference cannot be used together"
            )),
            (true, false) => Ok(Some(true)),
            (false, true) => Ok(Some(false)),
            (false, false) => Ok(None),
        }
    }

    /// Merge command-line options over the optional run file.
    pub fn to_run_config(&self) -> Result<RunConfig> {
        let file = match &self.config {
            Some(path) => common::load_run_file(path)?,
            None => RunFile::default(),
        };

        let reindex_reference = self
            .reindex_override()?
            .or(file.reindex_reference)
            .unwrap_or(false);

        let mut tools = file.tools.unwrap_or_default();
        if let Some(bwa) = &self.bwa {
            tools.bwa = bwa.clone();
        }
        if let Some(samtools) = &self.samtools {
            tools.samtools = samtools.clone();
        }

        Ok(RunConfig {
            fastq1: self
                .fastq1
                .clone()
                .or(file.fastq1)
                .ok_or_else(|| missing("fastq1"))?,
            fastq2: self.fastq2.clone().or(file.fastq2),
            reference: self
                .reference
                .clone()
                .or(file.reference)
                .ok_or_else(|| missing("reference"))?,
            output: self
                .output
                .clone()
                .or(file.output)
                .ok_or_else(|| missing("output"))?,
            threads: self.threads.or(file.threads).unwrap_or(DEFAULT_THREADS),
            intermediates: self.intermediates.or(file.intermediates).unwrap_or_default(),
            reindex_reference,
            tools,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_minimal_arguments() {
        let args = RunArgs::from_iter_safe(&[
            "run",
            "--fastq1",
            "a_R1.fastq.gz",
            "--reference",
            "ref.fasta",
            "--output",
            "out.bam",
        ])
        .unwrap();

        let config = args.to_run_config().unwrap();
        assert_eq!(config.fastq1, PathBuf::from("a_R1.fastq.gz"));
        assert_eq!(config.fastq2, None);
        assert_eq!(config.reference, PathBuf::from("ref.fasta"));
        assert_eq!(config.output, PathBuf::from("out.bam"));
        assert_eq!(config.threads, 5);
        assert_eq!(config.intermediates, IntermediatePolicy::RemoveSam);
        assert_eq!(config.tools.bwa, PathBuf::from("bwa"));
        assert!(!args.dry_run);
    }

    #[test]
    fn parses_short_flags_and_policy() {
        let args = RunArgs::from_iter_safe(&[
            "run",
            "-1",
            "a_R1.fastq.gz",
            "-2",
            "a_R2.fastq.gz",
            "-r",
            "ref.fasta",
            "-o",
            "out.bam",
            "-t",
            "12",
            "--intermediates",
            "keep-all",
            "--samtools",
            "/opt/samtools",
        ])
        .unwrap();

        let config = args.to_run_config().unwrap();
        assert!(config.is_paired_end());
        assert_eq!(config.threads, 12);
        assert_eq!(config.intermediates, IntermediatePolicy::KeepAll);
        assert_eq!(config.tools.samtools, PathBuf::from("/opt/samtools"));
    }

    #[test]
    fn rejects_unknown_policy() {
        let result = RunArgs::from_iter_safe(&["run", "--intermediates", "delete-everything"]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_required_option_is_reported() {
        let args = RunArgs::from_iter_safe(&["run", "--fastq1", "a.fq", "--output", "o.bam"])
            .unwrap();
        let err = args.to_run_config().unwrap_err();
        assert!(err.to_string().contains("--reference"));
    }

    #[test]
    fn command_line_overrides_run_file() {
        let dir = tempdir().unwrap();
        let run_file = dir.path().join("run.toml");
        fs::write(
            &run_file,
            r#"
fastq1 = "reads/a_R1.fastq.gz"
fastq2 = "reads/a_R2.fastq.gz"
reference = "/refs/hg38.fa"
output = "out/a.bam"
threads = 16
intermediates = "remove-all"

[tools]
bwa = "/opt/bwa/bwa"
"#,
        )
        .unwrap();

        let args = RunArgs::from_iter_safe(&[
            "run",
            "--config",
            run_file.to_str().unwrap(),
            "--threads",
            "4",
        ])
        .unwrap();
        let config = args.to_run_config().unwrap();

        assert_eq!(config.threads, 4);
        assert_eq!(config.intermediates, IntermediatePolicy::RemoveAll);
        assert_eq!(config.fastq1, dir.path().join("reads/a_R1.fastq.gz"));
        assert_eq!(config.fastq2, Some(dir.path().join("reads/a_R2.fastq.gz")));
        assert_eq!(config.reference, PathBuf::from("/refs/hg38.fa"));
        assert_eq!(config.output, dir.path().join("out/a.bam"));
        assert_eq!(config.tools.bwa, PathBuf::from("/opt/bwa/bwa"));
        assert_eq!(config.tools.samtools, PathBuf::from("samtools"));
    }

    #[test]
    fn reindex_flags_override_run_file() {
        let dir = tempdir().unwrap();
        let run_file = dir.path().join("run.toml");
        fs::write(
            &run_file,
            "fastq1 = \"a.fq\"\nreference = \"ref.fa\"\noutput = \"o.bam\"\nreindex_reference = true\n",
        )
        .unwrap();
        let run_file = run_file.to_str().unwrap();

        let from_file = RunArgs::from_iter_safe(&["run", "--config", run_file]).unwrap();
        assert!(from_file.to_run_config().unwrap().reindex_reference);

        let disabled =
            RunArgs::from_iter_safe(&["run", "--config", run_file, "--no-reindex-reference"])
                .unwrap();
        assert!(!disabled.to_run_config().unwrap().reindex_reference);

        let both = RunArgs::from_iter_safe(&[
            "run",
            "--config",
            run_file,
            "--reindex-reference",
            "--no-reindex-reference",
        ])
        .unwrap();
        assert!(both.to_run_config().is_err());
    }
}
