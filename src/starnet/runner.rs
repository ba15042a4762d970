//! Spawning starnet++ and streaming its output

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tokio::sync::mpsc;

use crate::config::RunnerConfig;
use crate::domain::{LogEvent, LogEventKind};

use super::{Invocation, ProcessRegistry, RunError};

/// Result of one tool run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: u64,
    /// Exit code 0
    pub success: bool,
    /// None when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub output_path: PathBuf,
    /// Whether the output file exists after the run
    pub output_exists: bool,
    /// Output lines seen on stdout and stderr
    pub lines: usize,
    pub duration_ms: u64,
}

/// Trait for anything that can execute an [`Invocation`]
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run the tool to completion
    ///
    /// # Arguments
    /// * `invocation` - What to run and where
    /// * `event_tx` - Channel to send log events for display
    async fn run(
        &self,
        invocation: &Invocation,
        event_tx: mpsc::Sender<LogEvent>,
    ) -> Result<RunOutcome, RunError>;

    /// Get the runner ID
    fn id(&self) -> &str;
}

/// Runs starnet++ as a child process
pub struct StarnetRunner {
    registry: ProcessRegistry,
    nudge_every: u32,
    nudge_message: String,
    next_run_id: AtomicU64,
}

impl StarnetRunner {
    pub fn new(registry: ProcessRegistry, config: &RunnerConfig) -> Self {
        Self {
            registry,
            nudge_every: config.stdin_nudge_every,
            nudge_message: config.nudge_message.clone(),
            next_run_id: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    fn allocate_run_id(&self) -> u64 {
        self.next_run_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn nudge(&self, stdin: &mut Option<ChildStdin>, run_id: u64) {
        let Some(pipe) = stdin.as_mut() else {
            return;
        };
        let written = match pipe.write_all(self.nudge_message.as_bytes()).await {
            Ok(()) => pipe.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            // Tool closed its stdin; stop nudging
            tracing::debug!("Run #{}: stdin closed: {}", run_id, e);
            *stdin = None;
        }
    }
}

/// Read one line from a tool stream, decoding invalid UTF-8 lossily.
///
/// Pending forever once the stream is gone. Partial reads stay in `buf`, so a
/// call cancelled by `select!` resumes where it left off.
async fn read_line<R>(reader: Option<&mut R>, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let Some(reader) = reader else {
        return std::future::pending().await;
    };
    reader.read_until(b'\n', buf).await?;
    if buf.is_empty() {
        return Ok(None);
    }
    let mut end = buf.len();
    while end > 0 && matches!(buf[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    let line = String::from_utf8_lossy(&buf[..end]).into_owned();
    buf.clear();
    Ok(Some(line))
}

fn close_stream<O, E>(source: LogEventKind, out: &mut Option<O>, err: &mut Option<E>) {
    match source {
        LogEventKind::Stdout => *out = None,
        _ => *err = None,
    }
}

#[async_trait]
impl ToolRunner for StarnetRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        event_tx: mpsc::Sender<LogEvent>,
    ) -> Result<RunOutcome, RunError> {
        let run_id = self.allocate_run_id();
        let program = invocation.program.display().to_string();
        let started = Instant::now();

        let _ = event_tx
            .send(
                LogEvent::system(format!(
                    "Starting {} {}",
                    program,
                    invocation.args().join(" ")
                ))
                .for_run(run_id),
            )
            .await;

        let mut child = Command::new(&invocation.program)
            .args(invocation.args())
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                program: program.clone(),
                source,
            })?;

        if let Some(pid) = child.id() {
            self.registry.register(run_id, pid, &program);
            tracing::info!("Run #{} started {} (pid {})", run_id, program, pid);
            let _ = event_tx
                .send(LogEvent::system(format!("pid {}", pid)).for_run(run_id))
                .await;
        }

        let mut stdin = child.stdin.take();
        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            self.registry.unregister(run_id);
            return Err(RunError::Io {
                path: invocation.working_dir.clone(),
                source: std::io::Error::other("child output not captured"),
            });
        };
        let mut out = Some(BufReader::new(stdout));
        let mut err = Some(BufReader::new(stderr));
        let mut out_buf = Vec::new();
        let mut err_buf = Vec::new();
        let mut lines = 0usize;

        while out.is_some() || err.is_some() {
            let (source, read) = tokio::select! {
                read = read_line(out.as_mut(), &mut out_buf) => (LogEventKind::Stdout, read),
                read = read_line(err.as_mut(), &mut err_buf) => (LogEventKind::Stderr, read),
            };

            let event = match read {
                Ok(Some(line)) => LogEvent::new(source, line),
                Ok(None) => {
                    close_stream(source, &mut out, &mut err);
                    continue;
                }
                Err(e) => {
                    // Dropping the reader closes the pipe so the tool cannot block on it
                    close_stream(source, &mut out, &mut err);
                    LogEvent::error(format!("Failed to read {}: {}", source, e))
                }
            };

            let counts = event.is_output();
            match event.kind {
                LogEventKind::Stderr => tracing::debug!("Run #{} stderr: {}", run_id, event.message),
                _ => tracing::trace!("Run #{}: {}", run_id, event.message),
            }
            let _ = event_tx.send(event.for_run(run_id)).await;

            if counts {
                lines += 1;
                if self.nudge_every > 0 && lines % self.nudge_every as usize == 0 {
                    self.nudge(&mut stdin, run_id).await;
                }
            }
        }

        drop(stdin);
        let status = child.wait().await;
        self.registry.unregister(run_id);
        let status = status.map_err(|e| RunError::io(&invocation.working_dir, e))?;

        let exit_code = status.code();
        let _ = event_tx
            .send(LogEvent::terminated(exit_code).for_run(run_id))
            .await;

        let output_path = invocation.output_path();
        let outcome = RunOutcome {
            run_id,
            success: status.success(),
            exit_code,
            output_exists: output_path.exists(),
            output_path,
            lines,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        if outcome.success {
            tracing::info!("Run #{} finished in {} ms", run_id, outcome.duration_ms);
        } else {
            tracing::warn!("Run #{} failed: {}", run_id, status);
        }

        Ok(outcome)
    }

    fn id(&self) -> &str {
        "starnet"
    }
}
