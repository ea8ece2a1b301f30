// src/exec/translating.rs

//! Decorator that rewrites every command before running it.
//!
//! Useful when the process runs outside the environment its tools live in:
//! a [`PrefixTranslator`](crate::translate::PrefixTranslator) can turn
//! `ceph status` into `kubectl exec toolbox -- ceph status` while callers keep
//! talking to a plain [`CommandExecutor`].

use std::path::Path;
use std::time::Duration;

use tracing::trace;

use crate::errors::{ConfigError, Result};
use crate::exec::backend::{CommandExecutor, ExecFuture};
use crate::translate::Translator;
use crate::types::Translated;

/// A [`CommandExecutor`] that translates each command with `T` and delegates
/// the rewritten command to `E`.
///
/// Only the command and arguments change. The suppress flag, timeout and
/// output-file path reach the inner executor untouched, and its result is
/// returned as is: no retries, no caching, no error wrapping.
pub struct TranslatingExecutor<E, T> {
    inner: E,
    translator: T,
}

impl<E, T> TranslatingExecutor<E, T>
where
    E: CommandExecutor,
    T: Translator,
{
    pub fn new(inner: E, translator: T) -> Self {
        Self { inner, translator }
    }

    /// Builder for the configuration-driven path, where the executor and
    /// translator are picked separately.
    pub fn builder() -> TranslatingExecutorBuilder<E, T> {
        TranslatingExecutorBuilder::default()
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    fn translate(&self, suppress: bool, command: &str, args: &[String]) -> Translated {
        let translated = self.translator.translate(suppress, command, args);
        trace!(
            from = %command,
            to = %translated.command,
            args = ?translated.args,
            "translated command"
        );
        translated
    }
}

impl<E, T> CommandExecutor for TranslatingExecutor<E, T>
where
    E: CommandExecutor,
    T: Translator,
{
    fn execute<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, ()> {
        let t = self.translate(suppress, command, args);
        Box::pin(async move { self.inner.execute(suppress, &t.command, &t.args).await })
    }

    fn execute_with_output<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, String> {
        let t = self.translate(suppress, command, args);
        Box::pin(async move {
            self.inner
                .execute_with_output(suppress, &t.command, &t.args)
                .await
        })
    }

    fn execute_with_combined_output<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, String> {
        let t = self.translate(suppress, command, args);
        Box::pin(async move {
            self.inner
                .execute_with_combined_output(suppress, &t.command, &t.args)
                .await
        })
    }

    fn execute_with_output_file<'a>(
        &'a self,
        suppress: bool,
        command: &'a str,
        output_file: &'a Path,
        args: &'a [String],
    ) -> ExecFuture<'a, String> {
        let t = self.translate(suppress, command, args);
        Box::pin(async move {
            self.inner
                .execute_with_output_file(suppress, &t.command, output_file, &t.args)
                .await
        })
    }

    fn execute_with_output_file_timeout<'a>(
        &'a self,
        suppress: bool,
        timeout: Duration,
        command: &'a str,
        output_file: &'a Path,
        args: &'a [String],
    ) -> ExecFuture<'a, String> {
        let t = self.translate(suppress, command, args);
        Box::pin(async move {
            self.inner
                .execute_with_output_file_timeout(
                    suppress,
                    timeout,
                    &t.command,
                    output_file,
                    &t.args,
                )
                .await
        })
    }

    fn execute_with_timeout<'a>(
        &'a self,
        suppress: bool,
        timeout: Duration,
        command: &'a str,
        args: &'a [String],
    ) -> ExecFuture<'a, ()> {
        let t = self.translate(suppress, command, args);
        Box::pin(async move {
            self.inner
                .execute_with_timeout(suppress, timeout, &t.command, &t.args)
                .await
        })
    }
}

/// Collects the parts of a [`TranslatingExecutor`].
///
/// [`build`](Self::build) rejects a missing part, so a half-configured
/// decorator never reaches its first call.
pub struct TranslatingExecutorBuilder<E, T> {
    inner: Option<E>,
    translator: Option<T>,
}

impl<E, T> Default for TranslatingExecutorBuilder<E, T> {
    fn default() -> Self {
        Self {
            inner: None,
            translator: None,
        }
    }
}

impl<E, T> TranslatingExecutorBuilder<E, T>
where
    E: CommandExecutor,
    T: Translator,
{
    pub fn executor(mut self, inner: E) -> Self {
        self.inner = Some(inner);
        self
    }

    pub fn translator(mut self, translator: T) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn build(self) -> Result<TranslatingExecutor<E, T>> {
        let inner = self.inner.ok_or(ConfigError::MissingExecutor)?;
        let translator = self.translator.ok_or(ConfigError::MissingTranslator)?;
        Ok(TranslatingExecutor::new(inner, translator))
    }
}
