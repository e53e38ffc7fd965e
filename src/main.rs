//! fq2bam - FASTQ to sorted, indexed BAM
//!
//! Drives `bwa` and `samtools` to align single- or paired-end FASTQ reads
//! against a reference genome and produce a coordinate-sorted BAM together
//! with its `.bai` index.
//!
//! # Usage
//!
//! ```bash
//! # Paired-end alignment
//! fq2bam run --fastq1 sample_R1.fastq.gz --fastq2 sample_R2.fastq.gz \
//!     --reference reference.fasta --output out/sample.bam --threads 8
//!
//! # Same run described by a TOML file, overriding the thread count
//! fq2bam run --config sample.toml --threads 16
//!
//! # Show the commands without running them
//! fq2bam run --config sample.toml --dry-run
//!
//! # Only build the reference index
//! fq2bam index --reference reference.fasta
//! ```

extern crate fq2bam_lib;
pub mod commands;
use anyhow::Result;
use env_logger::Env;
use fq2bam_lib::utils;
use log::*;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case", author, about)]
/// Align FASTQ reads with bwa and build a sorted, indexed BAM with samtools
struct Args {
    #[structopt(subcommand)]
    subcommand: Subcommand,
}

#[derive(StructOpt)]
enum Subcommand {
    /// Run the full FASTQ → sorted, indexed BAM pipeline
    Run(commands::RunArgs),
    /// Build the bwa index of a reference genome
    Index(commands::IndexArgs),
}

impl Subcommand {
    fn run(self) -> Result<()> {
        match self {
            Subcommand::Run(args) => commands::run_pipeline(args)?,
            Subcommand::Index(args) => commands::run_index(args)?,
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = Args::from_args().subcommand.run() {
        if utils::is_broken_pipe(&err) {
            std::process::exit(0);
        }
        error!("{:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
