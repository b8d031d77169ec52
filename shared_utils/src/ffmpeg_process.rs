//! FFmpeg Process Module
//!
//! Wrapper around an external encoder process:
//! - stderr is drained on its own thread, so an encoder that logs more than the
//!   pipe buffer holds cannot stall
//! - the wait is bounded; a process still running at the deadline is killed
//! - a missing binary surfaces as `ToolNotFound`
//!
//! ```ignore
//! use shared_utils::ffmpeg_process::FfmpegProcess;
//! use std::process::Command;
//! use std::time::Duration;
//!
//! let mut cmd = Command::new("ffmpeg");
//! cmd.arg("-i").arg("input.mov").arg("output.mp4");
//! let (status, stderr) = FfmpegProcess::spawn(&mut cmd)?.wait_with_timeout(Some(Duration::from_secs(60)))?;
//! ```

use std::borrow::Cow;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::errors::{ConvertError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct FfmpegProcess {
    tool: String,
    child: Child,
    stdout_thread: Option<JoinHandle<String>>,
    stderr_thread: Option<JoinHandle<String>>,
}

#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

fn drain<R: std::io::Read + Send + 'static>(reader: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        for line in BufReader::new(reader).lines().map_while(|l| l.ok()) {
            buf.push_str(&line);
            buf.push('\n');
        }
        buf
    })
}

impl FfmpegProcess {
    /// Spawn `cmd` with stdin closed, stdout discarded and stderr piped.
    pub fn spawn(cmd: &mut Command) -> Result<Self> {
        cmd.stdout(Stdio::null());
        Self::start(cmd)
    }

    /// Spawn `cmd` keeping its stdout, for tools like ffprobe that answer there.
    pub fn spawn_capturing(cmd: &mut Command) -> Result<Self> {
        cmd.stdout(Stdio::piped());
        Self::start(cmd)
    }

    fn start(cmd: &mut Command) -> Result<Self> {
        let tool = Path::new(cmd.get_program())
            .file_name()
            .unwrap_or_else(|| cmd.get_program())
            .to_string_lossy()
            .into_owned();

        info!(command = ?cmd, "Executing {}", tool);

        cmd.stdin(Stdio::null()).stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConvertError::ToolNotFound(tool.clone())
            } else {
                ConvertError::Io(e)
            }
        })?;

        let stdout_thread = child.stdout.take().map(drain);
        let stderr_thread = child.stderr.take().map(drain);

        Ok(Self {
            tool,
            child,
            stdout_thread,
            stderr_thread,
        })
    }

    /// Wait for the process, killing it once `limit` has elapsed.
    ///
    /// Returns the exit status and everything the process wrote to stderr.
    pub fn wait_with_timeout(self, limit: Option<Duration>) -> Result<(ExitStatus, String)> {
        let output = self.wait_for_output(limit)?;
        Ok((output.status, output.stderr))
    }

    /// Wait for the process and collect both captured streams.
    pub fn wait_for_output(mut self, limit: Option<Duration>) -> Result<ProcessOutput> {
        let started = Instant::now();

        let status = loop {
            match self.child.try_wait()? {
                Some(status) => break status,
                None => {
                    if let Some(limit) = limit {
                        if started.elapsed() >= limit {
                            warn!(tool = %self.tool, limit_secs = limit.as_secs(), "Killing process after timeout");
                            let _ = self.child.kill();
                            let _ = self.child.wait();
                            self.join_readers();
                            return Err(ConvertError::Timeout {
                                tool: self.tool.clone(),
                                limit,
                            });
                        }
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        };

        let (stdout, stderr) = self.join_readers();
        if status.success() {
            debug!(tool = %self.tool, stderr_output = %stderr, "Process completed");
        } else {
            error!(
                tool = %self.tool,
                exit_code = status.code(),
                stderr_output = %stderr,
                "Process failed"
            );
        }
        Ok(ProcessOutput {
            status,
            stdout,
            stderr,
        })
    }

    fn join_readers(&mut self) -> (String, String) {
        let join = |t: Option<JoinHandle<String>>| {
            t.map(|t| t.join().unwrap_or_default()).unwrap_or_default()
        };
        (join(self.stdout_thread.take()), join(self.stderr_thread.take()))
    }
}

/// Run `cmd` to completion and turn a non-zero exit into [`ConvertError::FfmpegFailed`].
pub fn run_ffmpeg(cmd: &mut Command, limit: Option<Duration>) -> Result<()> {
    let (status, stderr) = FfmpegProcess::spawn(cmd)?.wait_with_timeout(limit)?;
    if status.success() {
        Ok(())
    } else {
        Err(ConvertError::FfmpegFailed {
            exit_code: status.code(),
            stderr: format_ffmpeg_error(&stderr),
        })
    }
}

/// Pick the most meaningful line out of ffmpeg's stderr.
///
/// Prefers the last line mentioning an error, then the last line that is not a
/// progress report.
pub fn format_ffmpeg_error(stderr: &str) -> String {
    if let Some(line) = stderr
        .lines()
        .rev()
        .find(|line| line.contains("Error") || line.contains("error"))
    {
        return line.trim().to_string();
    }

    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && !line.starts_with("frame=")
                && !line.starts_with("fps=")
                && !line.starts_with("size=")
        })
        .map(String::from)
        .unwrap_or_else(|| "Unknown FFmpeg error".to_string())
}

/// ffmpeg has no `--` delimiter; a relative path starting with '-' would be read as a flag.
pub fn safe_path_arg(path: &Path) -> Cow<'_, OsStr> {
    if path.as_os_str().to_string_lossy().starts_with('-') {
        Cow::Owned(Path::new(".").join(path).into_os_string())
    } else {
        Cow::Borrowed(path.as_os_str())
    }
}
