use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cmdrelay::errors::ExecError;
use cmdrelay::exec::{CommandExecutor, ExecFuture};
use cmdrelay::types::{Invocation, Mode};

type Responder = dyn Fn(&Invocation) -> Result<String, ExecError> + Send + Sync;

/// A fake executor that:
/// - records every invocation it receives (mode, flag, command, args)
/// - answers each one through a scripted responder instead of spawning a
///   process.
///
/// Clones share the same call log.
#[derive(Clone)]
pub struct RecordingExecutor {
    calls: Arc<Mutex<Vec<Invocation>>>,
    responder: Arc<Responder>,
}

/// Default responder: succeeds with the received command line as output.
pub fn echo_response(inv: &Invocation) -> Result<String, ExecError> {
    let mut line = inv.command.clone();
    for arg in &inv.args {
        line.push(' ');
        line.push_str(arg);
    }
    Ok(line)
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::with_responder(echo_response)
    }

    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&Invocation) -> Result<String, ExecError> + Send + Sync + 'static,
    {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
        }
    }

    /// Times out every call that has a timeout, succeeds otherwise.
    pub fn timing_out() -> Self {
        Self::with_responder(|inv| match &inv.mode {
            Mode::Timeout(timeout) | Mode::OutputFileTimeout { timeout, .. } => {
                Err(ExecError::Timeout {
                    command: inv.command.clone(),
                    timeout: *timeout,
                })
            }
            _ => echo_response(inv),
        })
    }

    /// Fails every call with the given exit code.
    pub fn failing(code: i32) -> Self {
        Self::with_responder(move |inv| {
            Err(ExecError::Failed {
                command: inv.command.clone(),
                code: Some(code),
                output: "failure output".to_string(),
            })
        })
    }

    /// Every invocation received so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<Invocation> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn record(
        &self,
        suppress: bool,
        command: &str,
        args: &[String],
        mode: Mode,
    ) -> Result<String, ExecError> {
        let inv = Invocation {
            suppress,
            command: command.to_string(),
            args: args.to_vec(),
            mode,
        };
        self.calls.lock().unwrap().push(inv.clone());
        (self.responder)(&inv)
    }
}

impl Default for RecordingExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, ()> {
        let result = self.record(suppress, command, args, Mode::Run).map(|_| ());
        Box::pin(async move { result })
    }

    fn execute_with_output<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, String> {
        let result = self.record(suppress, command, args, Mode::Output);
        Box::pin(async move { result })
    }

    fn execute_with_combined_output<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, String> {
        let result = self.record(suppress, command, args, Mode::CombinedOutput);
        Box::pin(async move { result })
    }

    fn execute_with_output_file<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        output_file: &'a Path,
        args: &'a [String],
    ) -> ExecFuture<'a, String> {
        let mode = Mode::OutputFile(output_file.to_path_buf());
        let result = self.record(suppress, command, args, mode);
        Box::pin(async move { result })
    }

    fn execute_with_output_file_timeout<'a>(
        &'a self,
        suppress: bool,
        timeout: Duration,
        command: &'a str,
        output_file: &'a Path,
        args: &'a [String],
    ) -> ExecFuture<'a, String> {
        let mode = Mode::OutputFileTimeout {
            timeout,
            path: output_file.to_path_buf(),
        };
        let result = self.record(suppress, command, args, mode);
        Box::pin(async move { result })
    }

    fn execute_with_timeout<'a>(
        &'a self,
        suppress: bool,
        timeout: Duration,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, ()> {
        let result = self
            .record(suppress, command, args, Mode::Timeout(timeout))
            .map(|_| ());
        Box::pin(async move { result })
    }
}
