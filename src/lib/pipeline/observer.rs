//! Progress reporting for pipeline runs.
//!
//! The orchestrator never writes to the console itself; it reports stage
//! transitions and child-process output to a [`PipelineObserver`].
//! [`LogObserver`] forwards everything to the `log` facade, and
//! [`RecordingObserver`] keeps the events in memory.

use crate::core::error::PipelineError;
use crate::core::process::{Invocation, ProcessObserver, StreamKind};
use log::{error, info, trace};
use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validate,
    IndexReference,
    Align,
    Convert,
    Sort,
    IndexOutput,
    Cleanup,
}

impl Stage {
    /// Progress line printed when the stage begins.
    pub fn start_message(self) -> &'static str {
        match self {
            Stage::Validate => "Validating input files...",
            Stage::IndexReference => "Indexing reference genome...",
            Stage::Align => "Running BWA alignment...",
            Stage::Convert => "Converting SAM to BAM...",
            Stage::Sort => "Sorting BAM file...",
            Stage::IndexOutput => "Indexing BAM file...",
            Stage::Cleanup => "Removing intermediate files...",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validate => "input validation",
            Stage::IndexReference => "BWA indexing",
            Stage::Align => "BWA alignment",
            Stage::Convert => "SAM to BAM conversion",
            Stage::Sort => "BAM sorting",
            Stage::IndexOutput => "BAM indexing",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// Receives stage-level events in addition to process-level ones.
pub trait PipelineObserver: ProcessObserver {
    fn stage_started(&self, _stage: Stage) {}

    fn stage_skipped(&self, _stage: Stage, _reason: &str) {}

    fn stage_failed(&self, _stage: Stage, _error: &PipelineError) {}

    fn finished(&self, _output: &Path) {}
}

/// Observer backed by the `log` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ProcessObserver for LogObserver {
    fn command_started(&self, invocation: &Invocation) {
        info!("Executing: {}", invocation);
    }

    fn output_chunk(
        &self,
        invocation: &Invocation,
        stream: StreamKind,
        chunk: &[u8],
        redirected: bool,
    ) {
        if redirected {
            trace!(
                "{} {}: {} bytes written to file",
                invocation.label(),
                stream,
                chunk.len()
            );
            return;
        }
        let text = String::from_utf8_lossy(chunk);
        let text = text.trim_end();
        if !text.is_empty() {
            info!("{} {}: {}", invocation.label(), stream, text);
        }
    }
}

impl PipelineObserver for LogObserver {
    fn stage_started(&self, stage: Stage) {
        info!("{}", stage.start_message());
    }

    fn stage_skipped(&self, stage: Stage, reason: &str) {
        info!("Skipping {}: {}", stage, reason);
    }

    fn stage_failed(&self, stage: Stage, error: &PipelineError) {
        error!("Error during {}: {}", stage, error);
    }

    fn finished(&self, output: &Path) {
        info!("Conversion completed successfully!");
        info!("Output BAM file: {}", output.display());
    }
}

/// Event captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    StageStarted(Stage),
    StageSkipped(Stage),
    StageFailed(Stage, String),
    CommandStarted(Invocation),
    Output {
        program: String,
        stream: StreamKind,
        len: usize,
        redirected: bool,
    },
    Finished(PathBuf),
}

/// Observer that stores every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().clone()
    }

    /// Invocations in the order they were started.
    pub fn commands(&self) -> Vec<Invocation> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                PipelineEvent::CommandStarted(inv) => Some(inv.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: PipelineEvent) {
        self.events.lock().push(event);
    }
}

impl ProcessObserver for RecordingObserver {
    fn command_started(&self, invocation: &Invocation) {
        self.push(PipelineEvent::CommandStarted(invocation.clone()));
    }

    fn output_chunk(
        &self,
        invocation: &Invocation,
        stream: StreamKind,
        chunk: &[u8],
        redirected: bool,
    ) {
        self.push(PipelineEvent::Output {
            program: invocation.label(),
            stream,
            len: chunk.len(),
            redirected,
        });
    }
}

impl PipelineObserver for RecordingObserver {
    fn stage_started(&self, stage: Stage) {
        self.push(PipelineEvent::StageStarted(stage));
    }

    fn stage_skipped(&self, stage: Stage, _reason: &str) {
        self.push(PipelineEvent::StageSkipped(stage));
    }

    fn stage_failed(&self, stage: Stage, error: &PipelineError) {
        self.push(PipelineEvent::StageFailed(stage, error.to_string()));
    }

    fn finished(&self, output: &Path) {
        self.push(PipelineEvent::Finished(output.to_path_buf()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        let inv = Invocation::new("samtools").arg("index").arg("out.bam");
        observer.stage_started(Stage::IndexOutput);
        observer.command_started(&inv);
        observer.output_chunk(&inv, StreamKind::Stderr, b"[W::hts_idx] warning", false);
        observer.finished(Path::new("out.bam"));

        let events = observer.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], PipelineEvent::StageStarted(Stage::IndexOutput));
        assert_eq!(observer.commands(), vec![inv]);
        assert_eq!(
            events[2],
            PipelineEvent::Output {
                program: "samtools index".to_string(),
                stream: StreamKind::Stderr,
                len: 20,
                redirected: false,
            }
        );
        assert_eq!(events[3], PipelineEvent::Finished(PathBuf::from("out.bam")));
    }

    #[test]
    fn stage_names_and_messages() {
        assert_eq!(Stage::Convert.to_string(), "SAM to BAM conversion");
        assert_eq!(Stage::IndexReference.start_message(), "Indexing reference genome...");
    }
}
