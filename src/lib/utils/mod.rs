//! Flat re-exports of the helpers most callers need.

pub use crate::core::concurrency::determine_allowed_cpus;
pub use crate::core::errors::is_broken_pipe;
pub use crate::core::fs::{make_parent_dirs, remove_file_if_exists};
