//! FASTQ → BAM alignment pipeline
//!
//! Command-line front end for [`fq2bam_lib::pipeline::orchestrator`]:
//!
//! 1. Index the reference genome (`bwa index`) when no index exists yet
//! 2. Align reads (`bwa mem`), streaming SAM output to disk
//! 3. Convert SAM to BAM (`samtools view`)
//! 4. Coordinate-sort the BAM (`samtools sort`)
//! 5. Index the sorted BAM (`samtools index`)
//!
//! The SAM intermediate is removed afterwards; `--intermediates` controls
//! what happens to the unsorted BAM.

mod args;

use anyhow::Result;
use fq2bam_lib::core::process::ProcessRunner;
use fq2bam_lib::pipeline::observer::LogObserver;
use fq2bam_lib::pipeline::orchestrator::{fastq_to_bam, Pipeline};
use fq2bam_lib::pipeline::validation::validate_input_files;
use log::{debug, info};
use std::io::{self, Write};
use std::time::Instant;

pub use args::RunArgs;

/// Entry point for the `run` command.
pub fn run_pipeline(args: RunArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(args, &mut out)
}

/// Runs the pipeline, or prints its plan to `out` for `--dry-run`.
fn execute(args: RunArgs, out: &mut dyn Write) -> Result<()> {
    info!("Starting fq2bam pipeline");
    debug!("Arguments: {:?}", args);

    let config = args.to_run_config()?;
    info!(
        "Aligning {} reads from {:?} against {:?} with {} threads",
        if config.is_paired_end() { "paired-end" } else { "single-end" },
        config.fastq1,
        config.reference,
        config.threads
    );

    if args.dry_run {
        config.validate()?;
        validate_input_files(&config)?;
        let pipeline = Pipeline::new(&config, ProcessRunner::default(), &LogObserver);
        for invocation in pipeline.plan() {
            writeln!(out, "{}", invocation)?;
        }
        info!("Dry run completed successfully - all validations passed");
        return Ok(());
    }

    let start_time = Instant::now();
    let output = fastq_to_bam(&config)?;
    info!(
        "Pipeline finished in {:?}, output written to {:?}",
        start_time.elapsed(),
        output
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fq2bam_lib::core::error::PipelineError;
    use std::fs;
    use std::path::Path;
    use structopt::StructOpt;
    use tempfile::tempdir;

    fn dry_run_args(dir: &Path, extra: &[&str]) -> RunArgs {
        let path = |name: &str| dir.join(name).to_str().unwrap().to_string();
        let mut argv = vec![
            "run".to_string(),
            "--fastq1".to_string(),
            path("a_R1.fastq.gz"),
            "--reference".to_string(),
            path("ref.fasta"),
            "--output".to_string(),
            path("results/out.bam"),
            "--bwa".to_string(),
            path("bin/bwa"),
            "--samtools".to_string(),
            path("bin/samtools"),
            "--dry-run".to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        RunArgs::from_iter_safe(&argv).unwrap()
    }

    #[test]
    fn dry_run_prints_plan_without_running_tools() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a_R1.fastq.gz"), b"@r1\nACGT\n+\nIIII\n").unwrap();
        fs::write(dir.path().join("ref.fasta"), b">chr1\nACGT\n").unwrap();

        let mut out = Vec::new();
        execute(dry_run_args(dir.path(), &["--threads", "2"]), &mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = printed.lines().collect();
        let bwa = dir.path().join("bin/bwa").display().to_string();
        let samtools = dir.path().join("bin/samtools").display().to_string();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with(&format!("{} index ", bwa)));
        assert!(lines[1].starts_with(&format!("{} mem -t 2 ", bwa)));
        assert!(lines[2].starts_with(&format!("{} view -@ 2 ", samtools)));
        assert!(lines[3].starts_with(&format!("{} sort -@ 2 ", samtools)));
        assert!(lines[4].starts_with(&format!("{} index ", samtools)));

        assert!(!dir.path().join("results").exists());
        assert!(!dir.path().join("ref.fasta.bwt").exists());
    }

    #[test]
    fn dry_run_still_validates_inputs() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ref.fasta"), b">chr1\nACGT\n").unwrap();

        let mut out = Vec::new();
        let err = execute(dry_run_args(dir.path(), &[]), &mut out).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::FileNotFound { role: "FASTQ file 1", .. })
        ));
        assert!(out.is_empty());
        assert!(!dir.path().join("results").exists());
    }
}
