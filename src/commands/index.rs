//! Stand-alone reference indexing.

use anyhow::Result;
use fq2bam_lib::core::fs::require_file;
use fq2bam_lib::core::process::ProcessRunner;
use fq2bam_lib::pipeline::observer::LogObserver;
use fq2bam_lib::pipeline::orchestrator::ensure_reference_index;
use fq2bam_lib::pipeline::tools::Toolchain;
use log::info;
use std::path::PathBuf;
use structopt::StructOpt;

/// Arguments for the `index` command.
#[derive(Debug, Clone, StructOpt)]
#[structopt(name = "index", about = "Build the bwa index of a reference genome if missing")]
pub struct IndexArgs {
    /// Reference genome FASTA.
    #[structopt(long, short = "r", parse(from_os_str))]
    pub reference: PathBuf,

    /// bwa executable.
    #[structopt(long, default_value = "bwa", parse(from_os_str))]
    pub bwa: PathBuf,

    /// Rebuild the index even if `<reference>.bwt` exists.
    #[structopt(long)]
    pub force: bool,
}

/// Entry point for the `index` command.
pub fn run_index(args: IndexArgs) -> Result<()> {
    require_file("Reference genome file", &args.reference)?;

    let tools = Toolchain {
        bwa: args.bwa.clone(),
        ..Toolchain::default()
    };
    let indexed = ensure_reference_index(
        &tools,
        &args.reference,
        args.force,
        &ProcessRunner::default(),
        &LogObserver,
    )?;

    if indexed {
        info!("Reference index written for {:?}", args.reference);
    } else {
        info!("Reference {:?} is already indexed", args.reference);
    }
    Ok(())
}
