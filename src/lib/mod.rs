//! fq2bam: FASTQ to sorted, indexed BAM
//!
//! The library drives `bwa` and `samtools` to turn single- or paired-end
//! FASTQ reads into a coordinate-sorted, indexed BAM file. It provides:
//! 1. Process execution with live streaming of tool output
//! 2. Derivation of intermediate file names from the requested output
//! 3. A staged pipeline with pluggable progress reporting
//!
//! # Modules
//!
//! - [`core`]: errors, filesystem helpers and the external process runner
//! - [`pipeline`]: run configuration, command construction and orchestration
//!
//! # Example
//!
//! ```no_run
//! use fq2bam_lib::pipeline::prelude::*;
//!
//! let config = RunConfig::new("sample_R1.fastq.gz", "reference.fasta", "out/sample.bam")
//!     .with_fastq2("sample_R2.fastq.gz");
//! let bam = fastq_to_bam(&config)?;
//! println!("{}", bam.display());
//! # Ok::<(), fq2bam_lib::core::error::PipelineError>(())
//! ```

pub mod core;
pub mod pipeline;
pub mod utils;
