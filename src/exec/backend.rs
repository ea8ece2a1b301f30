// src/exec/backend.rs

//! The executor capability set.
//!
//! Callers run external commands through a [`CommandExecutor`] instead of
//! spawning processes themselves. This makes it easy to:
//!
//! - run commands locally ([`LocalExecutor`](super::LocalExecutor)),
//! - rewrite them for another environment
//!   ([`TranslatingExecutor`](super::TranslatingExecutor)),
//! - swap in a recording fake in tests.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ExecError;

/// Boxed future returned by every executor operation.
pub type ExecFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ExecError>> + Send + 'a>>;

/// Runs an external command in one of six modes.
///
/// Every operation takes the suppress-output flag first: when `true`, the
/// backend must not log the command's output (it may still log that the
/// command ran). Calls are independent; one instance may be shared by any
/// number of concurrent callers.
///
/// A timeout is reported as [`ExecError::Timeout`], so callers can tell it
/// apart from other failures with [`ExecError::is_timeout`].
pub trait CommandExecutor: Send + Sync {
    /// Run and wait for completion.
    fn execute<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, ()>;

    /// Run, wait and return stdout.
    fn execute_with_output<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, String>;

    /// Run, wait and return stdout and stderr combined.
    fn execute_with_combined_output<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, String>;

    /// Run, wait, write stdout to `output_file` and return it.
    fn execute_with_output_file<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        output_file: &'a Path,
        args: &'a [String],
    ) -> ExecFuture<'a, String>;

    /// As [`execute_with_output_file`](Self::execute_with_output_file), but
    /// the process is killed once it runs longer than `timeout`.
    fn execute_with_output_file_timeout<'a>(
        &'a self,
        suppress: bool,
        timeout: Duration,
        command: &'a str,
        output_file: &'a Path,
        args: &'a [String],
    ) -> ExecFuture<'a, String>;

    /// Run and wait, killing the process once it runs longer than `timeout`.
    fn execute_with_timeout<'a>(
        &'a self,
        suppress: bool,
        timeout: Duration,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, ()>;
}

macro_rules! forward_executor {
    ($ty:ty) => {
        impl<E: CommandExecutor + ?Sized> CommandExecutor for $ty {
            fn execute<'a>(
                &'a self,
                suppress: bool,
                command: &'a str,
                args: &'a [String],
            ) -> ExecFuture<'a, ()> {
                (**self).execute(suppress, command, args)
            }

            fn execute_with_output<'a>(
                &'a self,
                suppress: bool,
                command: &'a str,
                args: &'a [String],
            ) -> ExecFuture<'a, String> {
                (**self).execute_with_output(suppress, command, args)
            }

            fn execute_with_combined_output<'a>(
                &'a self,
                suppress: bool,
                command: &'a str,
                args: &'a [String],
            ) -> ExecFuture<'a, String> {
                (**self).execute_with_combined_output(suppress, command, args)
            }

            fn execute_with_output_file<'a>(
                &'a self,
                suppress: bool,
                command: &'a str,
                output_file: &'a Path,
                args: &'a [String],
            ) -> ExecFuture<'a, String> {
                (**self).execute_with_output_file(suppress, command, output_file, args)
            }

            fn execute_with_output_file_timeout<'a>(
                &'a self,
                suppress: bool,
                timeout: Duration,
                command: &'a str,
                output_file: &'a Path,
                args: &'a [String],
            ) -> ExecFuture<'a, String> {
                (**self).execute_with_output_file_timeout(
                    suppress,
                    timeout,
                    command,
                    output_file,
                    args,
                )
            }

            fn execute_with_timeout<'a>(
                &'a self,
                suppress: bool,
                timeout: Duration,
                command: &'a str,
                args: &'a [String],
            ) -> ExecFuture<'a, ()> {
                (**self).execute_with_timeout(suppress, timeout, command, args)
            }
        }
    };
}

// Shared (`Arc`) and borrowed (`&`) executors can be handed to a decorator
// directly.
forward_executor!(Arc<E>);
forward_executor!(&E);
