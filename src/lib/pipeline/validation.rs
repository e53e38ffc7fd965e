//! Input validation utilities
//!
//! Checks run before any external program is started: configuration values,
//! presence of the read files and the reference, and the output directory.

use crate::core::error::Result;
use crate::core::fs::{make_parent_dirs, require_file};
use crate::pipeline::config::RunConfig;

/// Validate that all input files exist.
///
/// # Errors
///
/// Returns [`PipelineError::FileNotFound`](crate::core::error::PipelineError::FileNotFound)
/// naming the first missing path, checked in the order read 1, read 2 (when
/// configured), reference.
pub fn validate_input_files(config: &RunConfig) -> Result<()> {
    require_file("FASTQ file 1", &config.fastq1)?;
    if let Some(fastq2) = &config.fastq2 {
        require_file("FASTQ file 2", fastq2)?;
    }
    require_file("Reference genome file", &config.reference)?;
    Ok(())
}

/// Full precondition check for a run; creates the output directory.
pub fn validate_run(config: &RunConfig) -> Result<()> {
    config.validate()?;
    validate_input_files(config)?;
    make_parent_dirs(&config.output)?;
    Ok(())
}
