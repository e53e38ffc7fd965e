use anyhow::Error;
use std::io;

use super::error::PipelineError;

/// Returns `true` if the error originated from a broken pipe.
///
/// Errors raised by the library wrap the underlying [`io::Error`] inside
/// [`PipelineError::Io`], so both layers are inspected.
#[inline]
pub fn is_broken_pipe(err: &Error) -> bool {
    err.chain().any(|cause| {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return io_err.kind() == io::ErrorKind::BrokenPipe;
        }
        matches!(
            cause.downcast_ref::<PipelineError>(),
            Some(PipelineError::Io { source, .. }) if source.kind() == io::ErrorKind::BrokenPipe
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_raw_broken_pipe() {
        let err = Error::new(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert!(is_broken_pipe(&err));
    }

    #[test]
    fn detects_wrapped_broken_pipe() {
        let err = Error::new(PipelineError::io(
            "out.sam",
            "write",
            io::Error::new(io::ErrorKind::BrokenPipe, "closed"),
        ));
        assert!(is_broken_pipe(&err));
    }

    #[test]
    fn ignores_other_errors() {
        let err = Error::new(PipelineError::Config("unknown intermediate policy".into()));
        assert!(!is_broken_pipe(&err));
    }
}
