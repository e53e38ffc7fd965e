//! Error types for the fq2bam library

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{role} not found: {}", .path.display())]
    FileNotFound { role: &'static str, path: PathBuf },

    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} failed with {}", describe_exit(.code))]
    ToolFailed { program: String, code: Option<i32> },

    #[error("I/O error during {operation} on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stream reader error: {0}")]
    StreamReader(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub fn io(path: impl AsRef<Path>, operation: &'static str, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.as_ref().to_path_buf(),
            operation,
            source,
        }
    }

    /// Exit code of a failed external tool, if the failure was a non-zero exit.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            PipelineError::ToolFailed { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_names_the_path() {
        let err = PipelineError::FileNotFound {
            role: "FASTQ file 1",
            path: PathBuf::from("/data/a_R1.fastq.gz"),
        };
        assert_eq!(err.to_string(), "FASTQ file 1 not found: /data/a_R1.fastq.gz");
    }

    #[test]
    fn tool_failure_carries_exit_code() {
        let err = PipelineError::ToolFailed {
            program: "samtools view".to_string(),
            code: Some(1),
        };
        assert_eq!(err.exit_code(), Some(1));
        assert_eq!(err.to_string(), "samtools view failed with code 1");

        let killed = PipelineError::ToolFailed {
            program: "bwa mem".to_string(),
            code: None,
        };
        assert_eq!(killed.exit_code(), None);
        assert!(killed.to_string().contains("terminated by signal"));
    }
}
