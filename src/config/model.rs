// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [executor]
/// working_dir = "/var/lib/app"
/// default_timeout = "30s"
///
/// [translate]
/// enabled = true
/// program = "kubectl"
/// prefix_args = ["exec", "-n", "rook-ceph", "toolbox", "--"]
/// passthrough = ["echo"]
/// ```
///
/// All sections are optional. An empty file runs commands locally with no
/// translation and no default timeout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub executor: ExecutorSection,

    #[serde(default)]
    pub translate: TranslateSection,
}

/// `[executor]` section: settings of the local process backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutorSection {
    /// Directory commands are started in. Defaults to the current directory.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Duration string (e.g. `"30s"`) bounding operations that don't take an
    /// explicit timeout.
    #[serde(default)]
    pub default_timeout: Option<String>,
}

/// `[translate]` section: how commands are rewritten before they run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslateSection {
    /// Wrap the local executor in a translating executor.
    #[serde(default)]
    pub enabled: bool,

    /// Program every command is run through, e.g. `kubectl`.
    #[serde(default)]
    pub program: Option<String>,

    /// Arguments placed between `program` and the original command.
    #[serde(default)]
    pub prefix_args: Vec<String>,

    /// Commands that are never translated.
    #[serde(default)]
    pub passthrough: Vec<String>,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holding one means durations parsed and required fields are present.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub executor: ExecutorSection,
    pub translate: TranslateSection,
    default_timeout: Option<Duration>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        executor: ExecutorSection,
        translate: TranslateSection,
        default_timeout: Option<Duration>,
    ) -> Self {
        Self {
            executor,
            translate,
            default_timeout,
        }
    }

    /// Parsed `[executor].default_timeout`.
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    pub fn translation_enabled(&self) -> bool {
        self.translate.enabled
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(ExecutorSection::default(), TranslateSection::default(), None)
    }
}
