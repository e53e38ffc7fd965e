//! External process execution with live output streaming.
//!
//! A [`ToolRunner`] launches one external command, reports every chunk of
//! its standard output and standard error to a [`ProcessObserver`] as soon as
//! the chunk arrives, and resolves once the child has exited. Arguments are
//! always passed as discrete tokens; no shell is involved.
//!
//! [`ProcessRunner`] reads each output stream on its own thread and funnels
//! the chunks through a bounded channel back to the calling thread, which
//! owns the observer and the optional stdout sink. Both reader threads are
//! joined before the exit status is inspected.

use crate::core::error::{PipelineError, Result};
use crossbeam::channel::{bounded, Sender};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

/// Which output stream of a child process a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

/// A single external command: program plus ordered argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Arguments rendered as (lossy) UTF-8 strings.
    #[cfg(test)]
    pub(crate) fn display_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Short label used in error messages, e.g. `samtools view`.
    pub fn label(&self) -> String {
        let program = self.program.to_string_lossy();
        match self.args.first() {
            Some(sub) if !sub.to_string_lossy().starts_with('-') => {
                format!("{} {}", program, sub.to_string_lossy())
            }
            _ => program.into_owned(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Receives process-level events while a [`ToolRunner`] executes a command.
pub trait ProcessObserver {
    /// Called once, right before the child is spawned.
    fn command_started(&self, _invocation: &Invocation) {}

    /// Called for every chunk read from the child's output streams.
    ///
    /// `redirected` is `true` for stdout chunks that are also being written
    /// to a caller-provided sink.
    fn output_chunk(
        &self,
        _invocation: &Invocation,
        _stream: StreamKind,
        _chunk: &[u8],
        _redirected: bool,
    ) {
    }
}

/// Observer that ignores every event.
pub struct SilentObserver;

impl ProcessObserver for SilentObserver {}

/// Executes external commands.
pub trait ToolRunner {
    /// Run `invocation` to completion.
    ///
    /// When `stdout` is given, the child's standard output is written into
    /// it as it arrives, in addition to being reported to the observer.
    fn run(
        &self,
        invocation: &Invocation,
        stdout: Option<&mut dyn Write>,
        observer: &dyn ProcessObserver,
    ) -> Result<()>;
}

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
const CHANNEL_CAPACITY: usize = 16;

struct Chunk {
    stream: StreamKind,
    data: Vec<u8>,
}

/// [`ToolRunner`] backed by `std::process`.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    chunk_size: usize,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ProcessRunner {
    #[cfg(test)]
    pub(crate) fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }
}

fn spawn_reader<R>(
    stream: StreamKind,
    mut reader: R,
    chunk_size: usize,
    tx: Sender<Chunk>,
) -> io::Result<JoinHandle<io::Result<()>>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name(format!("fq2bam-{}", stream))
        .spawn(move || {
            let mut buf = vec![0u8; chunk_size];
            loop {
                let n = match reader.read(&mut buf) {
                    Ok(0) => return Ok(()),
                    Ok(n) => n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                let chunk = Chunk {
                    stream,
                    data: buf[..n].to_vec(),
                };
                if tx.send(chunk).is_err() {
                    // Receiver is gone; nothing left to report to.
                    return Ok(());
                }
            }
        })
}

fn join_reader(
    handle: JoinHandle<io::Result<()>>,
    stream: StreamKind,
    invocation: &Invocation,
) -> Result<()> {
    let result = handle.join().map_err(|err| {
        let panic_msg = if let Some(msg) = err.downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = err.downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        PipelineError::StreamReader(format!(
            "{} reader for {} panicked: {}",
            stream,
            invocation.label(),
            panic_msg
        ))
    })?;
    result.map_err(|e| PipelineError::io(invocation.program(), "read child output", e))
}

impl ToolRunner for ProcessRunner {
    fn run(
        &self,
        invocation: &Invocation,
        mut stdout: Option<&mut dyn Write>,
        observer: &dyn ProcessObserver,
    ) -> Result<()> {
        observer.command_started(invocation);

        let mut child = Command::new(invocation.program())
            .args(invocation.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PipelineError::Launch {
                program: invocation.program().to_string_lossy().into_owned(),
                source,
            })?;

        let child_stdout = child.stdout.take().ok_or_else(|| {
            PipelineError::StreamReader(format!("stdout of {} was not captured", invocation.label()))
        })?;
        let child_stderr = child.stderr.take().ok_or_else(|| {
            PipelineError::StreamReader(format!("stderr of {} was not captured", invocation.label()))
        })?;

        let (tx, rx) = bounded::<Chunk>(CHANNEL_CAPACITY);
        let spawned = spawn_reader(StreamKind::Stdout, child_stdout, self.chunk_size, tx.clone())
            .and_then(|out| {
                spawn_reader(StreamKind::Stderr, child_stderr, self.chunk_size, tx)
                    .map(|err| (out, err))
            });
        let (stdout_reader, stderr_reader) = match spawned {
            Ok(handles) => handles,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(PipelineError::io(invocation.program(), "spawn reader thread", e));
            }
        };

        // Runs until both readers have finished and dropped their senders.
        // A failing sink must not stop the draining, or the child would block.
        let mut sink_error: Option<io::Error> = None;
        for chunk in rx.iter() {
            let redirected = chunk.stream == StreamKind::Stdout && stdout.is_some();
            observer.output_chunk(invocation, chunk.stream, &chunk.data, redirected);
            if let (StreamKind::Stdout, Some(sink)) = (chunk.stream, stdout.as_mut()) {
                if sink_error.is_none() {
                    if let Err(e) = sink.write_all(&chunk.data) {
                        sink_error = Some(e);
                    }
                }
            }
        }

        let stdout_result = join_reader(stdout_reader, StreamKind::Stdout, invocation);
        let stderr_result = join_reader(stderr_reader, StreamKind::Stderr, invocation);

        let status = child
            .wait()
            .map_err(|e| PipelineError::io(invocation.program(), "wait for child", e))?;

        if let Some(e) = sink_error {
            return Err(PipelineError::io(invocation.program(), "write child stdout", e));
        }
        if let Some(sink) = stdout.as_mut() {
            sink.flush()
                .map_err(|e| PipelineError::io(invocation.program(), "flush child stdout", e))?;
        }
        stdout_result?;
        stderr_result?;

        if status.success() {
            Ok(())
        } else {
            Err(PipelineError::ToolFailed {
                program: invocation.label(),
                code: status.code(),
            })
        }
    }
}
