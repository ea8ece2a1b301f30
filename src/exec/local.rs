// src/exec/local.rs

//! Local process executor backed by `tokio::process`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::errors::ExecError;
use crate::exec::backend::{CommandExecutor, ExecFuture};

/// Which process streams end up in the returned output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Nothing,
    Stdout,
    Combined,
}

/// Runs commands as local child processes.
///
/// The command is spawned directly (no shell). Both pipes are always drained
/// so a chatty child can't block on a full buffer; uncaptured lines are only
/// logged. Captured output is returned byte for byte, decoded as lossy UTF-8.
/// A non-zero exit becomes [`ExecError::Failed`] carrying whatever output was
/// captured.
#[derive(Debug, Clone, Default)]
pub struct LocalExecutor {
    working_dir: Option<PathBuf>,
    default_timeout: Option<Duration>,
}

impl LocalExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command from `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Bound the operations that don't take an explicit timeout.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    async fn run_process(
        &self,
        suppress: bool,
        command: &str,
        args: &[String],
        capture: Capture,
        limit: Option<Duration>,
    ) -> Result<Vec<u8>, ExecError> {
        if suppress {
            debug!(command = %command, "running command (output suppressed)");
        } else {
            info!(command = %command, args = ?args, "running command");
        }

        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
            command: command.to_string(),
            source,
        })?;

        let finished = {
            let run = wait_with_output(&mut child, command, capture, suppress);
            match limit {
                Some(limit) => tokio::time::timeout(limit, run).await.ok(),
                None => Some(run.await),
            }
        };

        let Some(result) = finished else {
            let timeout = limit.unwrap_or_default();
            warn!(
                command = %command,
                timeout_ms = timeout.as_millis() as u64,
                "command timed out; killing process"
            );
            if let Err(e) = child.kill().await {
                warn!(command = %command, error = %e, "failed to kill timed out process");
            }
            return Err(ExecError::Timeout {
                command: command.to_string(),
                timeout,
            });
        };

        let (output, status) = result.map_err(|source| ExecError::Wait {
            command: command.to_string(),
            source,
        })?;

        let code = status.code();
        if !suppress {
            info!(
                command = %command,
                exit_code = code.unwrap_or(-1),
                success = status.success(),
                "command exited"
            );
        }

        if status.success() {
            Ok(output)
        } else {
            Err(ExecError::Failed {
                command: command.to_string(),
                code,
                output: lossy(output),
            })
        }
    }

    async fn run_to_file(
        &self,
        suppress: bool,
        command: &str,
        output_file: &Path,
        args: &[String],
        limit: Option<Duration>,
    ) -> Result<String, ExecError> {
        let output = self
            .run_process(suppress, command, args, Capture::Stdout, limit)
            .await?;

        write_output_file(output_file, &output)
            .await
            .map_err(|source| ExecError::OutputFile {
                command: command.to_string(),
                path: output_file.to_path_buf(),
                source,
            })?;
        debug!(command = %command, path = ?output_file, "wrote command output to file");

        Ok(lossy(output))
    }
}

impl CommandExecutor for LocalExecutor {
    fn execute<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, ()> {
        Box::pin(async move {
            self.run_process(suppress, command, args, Capture::Nothing, self.default_timeout)
                .await
                .map(|_| ())
        })
    }

    fn execute_with_output<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, String> {
        Box::pin(async move {
            self.run_process(suppress, command, args, Capture::Stdout, self.default_timeout)
                .await
                .map(lossy)
        })
    }

    fn execute_with_combined_output<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, String> {
        Box::pin(async move {
            self.run_process(suppress, command, args, Capture::Combined, self.default_timeout)
                .await
                .map(lossy)
        })
    }

    fn execute_with_output_file<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        output_file: &'a Path,
        args: &'a [String],
    ) -> ExecFuture<'a, String> {
        Box::pin(self.run_to_file(suppress, command, output_file, args, self.default_timeout))
    }

    fn execute_with_output_file_timeout<'a>(
        &'a self,
        suppress: bool,
        timeout: Duration,
        command: &'a str,
        output_file: &'a Path,
        args: &'a [String],
    ) -> ExecFuture<'a, String> {
        Box::pin(self.run_to_file(suppress, command, output_file, args, Some(timeout)))
    }

    fn execute_with_timeout<'a>(
        &'a self,
        suppress: bool,
        timeout: Duration,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, ()> {
        Box::pin(async move {
            self.run_process(suppress, command, args, Capture::Nothing, Some(timeout))
                .await
                .map(|_| ())
        })
    }
}

/// Drain both pipes and wait for the child to exit.
async fn wait_with_output(
    child: &mut Child,
    command: &str,
    capture: Capture,
    suppress: bool,
) -> std::io::Result<(Vec<u8>, std::process::ExitStatus)> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (output, status) = tokio::join!(
        drain_streams(stdout, stderr, command, capture, suppress),
        child.wait()
    );
    Ok((output?, status?))
}

/// Read raw bytes from stdout and stderr until both are closed.
///
/// Chunks are appended in arrival order, so combined output interleaves the
/// two streams the way a terminal would show them.
async fn drain_streams<O, E>(
    mut stdout: Option<O>,
    mut stderr: Option<E>,
    command: &str,
    capture: Capture,
    suppress: bool,
) -> std::io::Result<Vec<u8>>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut output = Vec::new();
    let mut out_buf = [0u8; 8192];
    let mut err_buf = [0u8; 8192];
    let mut out_log = LineLog::new(command, "stdout", !suppress);
    let mut err_log = LineLog::new(command, "stderr", !suppress);

    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            n = read_chunk(&mut stdout, &mut out_buf), if stdout.is_some() => match n? {
                0 => {
                    out_log.flush();
                    stdout = None;
                }
                n => {
                    let chunk = &out_buf[..n];
                    out_log.push(chunk);
                    if capture != Capture::Nothing {
                        output.extend_from_slice(chunk);
                    }
                }
            },
            n = read_chunk(&mut stderr, &mut err_buf), if stderr.is_some() => match n? {
                0 => {
                    err_log.flush();
                    stderr = None;
                }
                n => {
                    let chunk = &err_buf[..n];
                    err_log.push(chunk);
                    if capture == Capture::Combined {
                        output.extend_from_slice(chunk);
                    }
                }
            },
        }
    }

    Ok(output)
}

async fn read_chunk<R>(stream: &mut Option<R>, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match stream {
        Some(stream) => stream.read(buf).await,
        None => Ok(0),
    }
}

/// Logs a byte stream one line at a time at debug level.
struct LineLog<'a> {
    command: &'a str,
    stream: &'static str,
    enabled: bool,
    pending: Vec<u8>,
}

impl<'a> LineLog<'a> {
    fn new(command: &'a str, stream: &'static str, enabled: bool) -> Self {
        Self {
            command,
            stream,
            enabled,
            pending: Vec::new(),
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        if !self.enabled {
            return;
        }
        self.pending.extend_from_slice(chunk);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.emit(&line);
        }
    }

    fn flush(&mut self) {
        if self.enabled && !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.emit(&line);
        }
    }

    fn emit(&self, line: &[u8]) {
        let text = String::from_utf8_lossy(line);
        debug!(command = %self.command, "{}: {}", self.stream, text.trim_end());
    }
}

fn lossy(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

async fn write_output_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, contents).await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn captures_stdout() {
        let exec = LocalExecutor::new();
        let out = exec
            .execute_with_output(false, "echo", &strings(&["hello"]))
            .await
            .unwrap();
        assert_eq!(out, "hello\n");
    }

    #[tokio::test]
    async fn stdout_mode_excludes_stderr() {
        let exec = LocalExecutor::new();
        let args = strings(&["-c", "echo out; echo err >&2"]);

        let out = exec.execute_with_output(true, "sh", &args).await.unwrap();
        assert_eq!(out, "out\n");

        let combined = exec
            .execute_with_combined_output(true, "sh", &args)
            .await
            .unwrap();
        assert!(combined.contains("out\n"));
        assert!(combined.contains("err\n"));
    }

    #[tokio::test]
    async fn non_zero_exit_is_failure_with_output() {
        let exec = LocalExecutor::new();
        let err = exec
            .execute_with_output(false, "sh", &strings(&["-c", "echo partial; exit 3"]))
            .await
            .unwrap_err();

        match err {
            ExecError::Failed { code, output, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(output, "partial\n");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let exec = LocalExecutor::new();
        let err = exec
            .execute(false, "cmdrelay-definitely-not-a-program", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn timeout_kills_process() {
        let exec = LocalExecutor::new();
        let started = std::time::Instant::now();
        let err = exec
            .execute_with_timeout(false, Duration::from_millis(100), "sleep", &strings(&["5"]))
            .await
            .unwrap_err();

        assert!(err.is_timeout(), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn default_timeout_applies_to_plain_operations() {
        let exec = LocalExecutor::new().with_default_timeout(Duration::from_millis(100));
        let err = exec
            .execute(true, "sleep", &strings(&["5"]))
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "got {err:?}");
    }

    #[tokio::test]
    async fn completes_within_timeout() {
        let exec = LocalExecutor::new();
        exec.execute_with_timeout(false, Duration::from_secs(5), "true", &[])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");
        let exec = LocalExecutor::new();

        let out = exec
            .execute_with_output_file(false, "echo", &path, &strings(&["to", "file"]))
            .await
            .unwrap();

        assert_eq!(out, "to file\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "to file\n");
    }

    #[tokio::test]
    async fn output_file_timeout_does_not_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let exec = LocalExecutor::new();

        let err = exec
            .execute_with_output_file_timeout(
                true,
                Duration::from_millis(100),
                "sleep",
                &path,
                &strings(&["5"]),
            )
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn runs_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exec = LocalExecutor::new().with_working_dir(dir.path());

        let out = exec.execute_with_output(false, "pwd", &[]).await.unwrap();
        let expected = std::fs::canonicalize(dir.path()).unwrap();
        let actual = std::fs::canonicalize(out.trim()).unwrap();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn output_is_captured_verbatim() {
        let exec = LocalExecutor::new();

        let no_newline = exec
            .execute_with_output(true, "printf", &strings(&["abc"]))
            .await
            .unwrap();
        assert_eq!(no_newline, "abc");

        let crlf = exec
            .execute_with_output(true, "printf", &strings(&["a\\r\\nb"]))
            .await
            .unwrap();
        assert_eq!(crlf, "a\r\nb");
    }

    #[tokio::test]
    async fn non_utf8_output_is_decoded_lossily() {
        let exec = LocalExecutor::new();

        let out = exec
            .execute_with_output(false, "printf", &strings(&["ok\\377\\n"]))
            .await
            .unwrap();
        assert_eq!(out, "ok\u{FFFD}\n");

        let stderr_only = strings(&["-c", "printf '\\377' >&2"]);
        let combined = exec
            .execute_with_combined_output(false, "sh", &stderr_only)
            .await
            .unwrap();
        assert_eq!(combined, "\u{FFFD}");
    }

    #[tokio::test]
    async fn output_file_gets_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.bin");
        let exec = LocalExecutor::new();

        exec.execute_with_output_file(true, "printf", &path, &strings(&["x\\377\\r\\n"]))
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"x\xff\r\n");
    }

    #[tokio::test]
    async fn failed_command_does_not_write_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let exec = LocalExecutor::new();

        let err = exec
            .execute_with_output_file(
                false,
                "sh",
                &path,
                &strings(&["-c", "echo partial; exit 2"]),
            )
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), Some(2));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn unwritable_output_file_is_output_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let exec = LocalExecutor::new();

        // The target is an existing directory, so the write fails.
        let err = exec
            .execute_with_output_file(false, "echo", dir.path(), &strings(&["hi"]))
            .await
            .unwrap_err();

        match err {
            ExecError::OutputFile { path, .. } => assert_eq!(path, dir.path()),
            other => panic!("expected OutputFile, got {other:?}"),
        }
    }
}
