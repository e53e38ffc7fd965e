pub mod common;
pub mod index;
pub mod run;

pub use index::{run_index, IndexArgs};
pub use run::{run_pipeline, RunArgs};
