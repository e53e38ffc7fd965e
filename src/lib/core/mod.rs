pub mod concurrency;
pub mod error;
pub mod errors;
pub mod fs;
pub mod process;
