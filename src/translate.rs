// src/translate.rs

//! Command translation.
//!
//! A [`Translator`] rewrites a command line before it reaches an executor.
//! Translation is total: it always produces a command, and it only sees its
//! inputs by shared reference. Implementations are expected to be pure, so
//! the same input always produces the same rewrite.
//!
//! - Any `Fn(bool, &str, &[String]) -> (String, Vec<String>)` closure is a
//!   translator.
//! - [`IdentityTranslator`] leaves commands untouched.
//! - [`PrefixTranslator`] runs commands through another program, e.g.
//!   `kubectl exec <pod> --`, for executing tools inside a remote environment.

use std::collections::BTreeSet;

use crate::config::TranslateSection;
use crate::errors::{ConfigError, Result};
use crate::types::Translated;

/// Rewrites a `(command, args)` pair.
///
/// `suppress` is the caller's suppress-output flag; translators may use it
/// (for instance to add a quiet flag to the wrapping program) but cannot
/// change it.
pub trait Translator: Send + Sync {
    fn translate(&self, suppress: bool, command: &str, args: &[String]) -> Translated;
}

impl<F> Translator for F
where
    F: Fn(bool, &str, &[String]) -> (String, Vec<String>) + Send + Sync,
{
    fn translate(&self, suppress: bool, command: &str, args: &[String]) -> Translated {
        self(suppress, command, args).into()
    }
}

/// Returns every command unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, _suppress: bool, command: &str, args: &[String]) -> Translated {
        Translated::new(command, args.to_vec())
    }
}

/// Runs every command through a wrapping program.
///
/// `(cmd, args)` becomes `(program, prefix_args ++ [cmd] ++ args)`, unless
/// `cmd` is listed in `passthrough`.
#[derive(Debug, Clone)]
pub struct PrefixTranslator {
    program: String,
    prefix_args: Vec<String>,
    passthrough: BTreeSet<String>,
}

impl PrefixTranslator {
    pub fn new(program: impl Into<String>, prefix_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args,
            passthrough: BTreeSet::new(),
        }
    }

    /// Leave `command` untranslated.
    pub fn with_passthrough(mut self, command: impl Into<String>) -> Self {
        self.passthrough.insert(command.into());
        self
    }

    /// Build from a `[translate]` config section.
    ///
    /// Fails when no wrapping program is configured, so a bad config is
    /// rejected before any command runs.
    pub fn from_config(section: &TranslateSection) -> Result<Self> {
        let program = section.program.as_deref().map(str::trim).unwrap_or("");
        if program.is_empty() {
            return Err(ConfigError::Invalid(
                "[translate].program must be set when translation is enabled".to_string(),
            ));
        }

        let mut translator = Self::new(program, section.prefix_args.clone());
        for cmd in &section.passthrough {
            translator = translator.with_passthrough(cmd.as_str());
        }
        Ok(translator)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn prefix_args(&self) -> &[String] {
        &self.prefix_args
    }
}

impl Translator for PrefixTranslator {
    fn translate(&self, _suppress: bool, command: &str, args: &[String]) -> Translated {
        if self.passthrough.contains(command) {
            return Translated::new(command, args.to_vec());
        }

        let mut new_args = Vec::with_capacity(self.prefix_args.len() + 1 + args.len());
        new_args.extend(self.prefix_args.iter().cloned());
        new_args.push(command.to_string());
        new_args.extend(args.iter().cloned());
        Translated::new(self.program.clone(), new_args)
    }
}
