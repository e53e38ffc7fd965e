pub mod config;
pub mod observer;
pub mod orchestrator;
pub mod paths;
pub mod tools;
pub mod validation;


pub mod prelude {
    pub use super::config::{IntermediatePolicy, RunConfig, DEFAULT_THREADS};
    pub use super::observer::{
        LogObserver, PipelineEvent, PipelineObserver, RecordingObserver, Stage,
    };
    pub use super::orchestrator::{ensure_reference_index, fastq_to_bam, Pipeline};
    pub use super::paths::{reference_index_marker, PipelinePaths};
    pub use super::tools::Toolchain;
}
