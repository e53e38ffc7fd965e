//! FASTQ → sorted, indexed BAM orchestration.
//!
//! # Pipeline Steps
//!
//! 1. Validate configuration and input files, create the output directory
//! 2. Index the reference with `bwa index` unless `<reference>.bwt` exists
//! 3. Align reads with `bwa mem`, streaming SAM text into `<output>.sam`
//! 4. Convert SAM to an unsorted BAM with `samtools view`
//! 5. Sort into the final output with `samtools sort`
//! 6. Index the output with `samtools index`
//! 7. Remove intermediates according to the configured policy
//!
//! Every step must succeed before the next one starts. The first failure
//! is reported to the observer and returned unchanged; files produced by
//! earlier steps are left on disk.

use crate::core::error::{PipelineError, Result};
use crate::core::fs::remove_file_if_exists;
use crate::core::process::{Invocation, ProcessRunner, ToolRunner};
use crate::pipeline::config::RunConfig;
use crate::pipeline::observer::{LogObserver, PipelineObserver, Stage};
use crate::pipeline::paths::{reference_index_marker, PipelinePaths};
use crate::pipeline::tools::Toolchain;
use crate::pipeline::validation::validate_run;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Run the whole pipeline with real processes, logging through `log`.
pub fn fastq_to_bam(config: &RunConfig) -> Result<PathBuf> {
    Pipeline::new(config, ProcessRunner::default(), &LogObserver).run()
}

fn run_stage<O, T>(observer: &O, stage: Stage, f: impl FnOnce() -> Result<T>) -> Result<T>
where
    O: PipelineObserver + ?Sized,
{
    observer.stage_started(stage);
    f().map_err(|err| {
        observer.stage_failed(stage, &err);
        err
    })
}

/// Whether `bwa index` has to run for `reference`.
///
/// Only the existence of the `.bwt` marker is checked; a stale index is not
/// detected.
pub fn needs_reference_index(reference: &Path, force: bool) -> bool {
    force || !reference_index_marker(reference).exists()
}

/// Run `bwa index` on `reference` when its index is missing (or `force`).
///
/// Returns `true` when the indexer was invoked.
pub fn ensure_reference_index<R, O>(
    tools: &Toolchain,
    reference: &Path,
    force: bool,
    runner: &R,
    observer: &O,
) -> Result<bool>
where
    R: ToolRunner + ?Sized,
    O: PipelineObserver,
{
    if !needs_reference_index(reference, force) {
        let marker = reference_index_marker(reference);
        observer.stage_skipped(
            Stage::IndexReference,
            &format!("reference index found at {}", marker.display()),
        );
        return Ok(false);
    }

    run_stage(observer, Stage::IndexReference, || {
        runner.run(&tools.index_reference(reference), None, observer)
    })?;
    Ok(true)
}

/// One configured FASTQ → BAM run.
pub struct Pipeline<'a, R: ToolRunner, O: PipelineObserver> {
    config: &'a RunConfig,
    paths: PipelinePaths,
    runner: R,
    observer: &'a O,
}

impl<'a, R: ToolRunner, O: PipelineObserver> Pipeline<'a, R, O> {
    pub fn new(config: &'a RunConfig, runner: R, observer: &'a O) -> Self {
        Self {
            config,
            paths: PipelinePaths::from_output(&config.output),
            runner,
            observer,
        }
    }

    pub fn paths(&self) -> &PipelinePaths {
        &self.paths
    }

    /// Execute every stage in order and return the final BAM path.
    pub fn run(&self) -> Result<PathBuf> {
        self.stage(Stage::Validate, || validate_run(self.config))?;

        ensure_reference_index(
            &self.config.tools,
            &self.config.reference,
            self.config.reindex_reference,
            &self.runner,
            self.observer,
        )?;

        self.stage(Stage::Align, || self.align())?;
        self.stage(Stage::Convert, || self.execute(&self.convert_invocation()))?;
        self.stage(Stage::Sort, || self.execute(&self.sort_invocation()))?;
        self.stage(Stage::IndexOutput, || {
            self.execute(&self.config.tools.index_bam(&self.paths.output))
        })?;
        self.stage(Stage::Cleanup, || self.cleanup())?;

        self.observer.finished(&self.config.output);
        Ok(self.config.output.clone())
    }

    /// Commands a run would execute right now, in order, without running them.
    pub fn plan(&self) -> Vec<Invocation> {
        let tools = &self.config.tools;
        let mut plan = Vec::with_capacity(5);
        if needs_reference_index(&self.config.reference, self.config.reindex_reference) {
            plan.push(tools.index_reference(&self.config.reference));
        }
        plan.push(self.align_invocation());
        plan.push(self.convert_invocation());
        plan.push(self.sort_invocation());
        plan.push(tools.index_bam(&self.paths.output));
        plan
    }

    fn stage<T>(&self, stage: Stage, f: impl FnOnce() -> Result<T>) -> Result<T> {
        run_stage(self.observer, stage, f)
    }

    fn execute(&self, invocation: &Invocation) -> Result<()> {
        self.runner.run(invocation, None, self.observer)
    }

    fn align_invocation(&self) -> Invocation {
        self.config.tools.align(
            self.config.threads,
            &self.config.reference,
            &self.config.fastq1,
            self.config.fastq2.as_deref(),
        )
    }

    fn convert_invocation(&self) -> Invocation {
        self.config
            .tools
            .sam_to_bam(self.config.threads, &self.paths.sam, &self.paths.unsorted)
    }

    fn sort_invocation(&self) -> Invocation {
        self.config
            .tools
            .sort(self.config.threads, &self.paths.unsorted, &self.paths.output)
    }

    fn align(&self) -> Result<()> {
        let sam = &self.paths.sam;
        let file = File::create(sam).map_err(|e| PipelineError::io(sam, "create SAM file", e))?;
        let mut writer = BufWriter::new(file);
        self.runner
            .run(&self.align_invocation(), Some(&mut writer), self.observer)?;
        writer
            .flush()
            .map_err(|e| PipelineError::io(sam, "flush SAM file", e))?;
        Ok(())
    }

    fn cleanup(&self) -> Result<()> {
        let policy = self.config.intermediates;
        if policy.removes_sam() {
            remove_file_if_exists(&self.paths.sam)?;
        }
        if policy.removes_unsorted() {
            remove_file_if_exists(&self.paths.unsorted)?;
        }
        Ok(())
    }
}
