use crate::core::error::Result;
use log::warn;

/// Check a requested thread count before it is handed to external tools.
///
/// The value is never clamped or rejected: bwa and samtools receive exactly
/// what was requested. Zero and oversubscription only produce a warning.
pub fn determine_allowed_cpus(desired: usize) -> Result<usize> {
    if desired == 0 {
        warn!("Thread count is 0, forwarding unchanged; the tools apply their own minimum");
    } else if desired > num_cpus::get() {
        warn!(
            "Specified more threads ({}) than are available ({}), forwarding unchanged",
            desired,
            num_cpus::get()
        );
    }
    Ok(desired)
}
