// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod translate;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, default_config_path, load_and_validate};
use crate::errors::ExecError;
use crate::exec::{CommandExecutor, LocalExecutor, TranslatingExecutor};
use crate::translate::{IdentityTranslator, PrefixTranslator, Translator};

/// Exit code used when a command is killed for exceeding its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - executor selection (local, or local behind a translating executor)
/// - dispatch of the single invocation described by the CLI flags
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(&args)?;
    let invocation = args.invocation()?;

    if args.dry_run {
        print_dry_run(&cfg, &invocation)?;
        return Ok(());
    }

    let executor = build_executor(&cfg)?;
    info!(
        command = %invocation.command,
        translated = cfg.translation_enabled(),
        "dispatching command"
    );

    if let Some(output) = invocation.dispatch(executor.as_ref()).await? {
        print!("{output}");
    }
    Ok(())
}

/// Pick the executor the configuration asks for.
///
/// Commands always end up in a [`LocalExecutor`]; with `[translate].enabled`
/// it sits behind a [`TranslatingExecutor`] using a [`PrefixTranslator`].
pub fn build_executor(cfg: &ConfigFile) -> crate::errors::Result<Arc<dyn CommandExecutor>> {
    let mut local = LocalExecutor::new();
    if let Some(dir) = &cfg.executor.working_dir {
        local = local.with_working_dir(dir);
    }
    if let Some(timeout) = cfg.default_timeout() {
        local = local.with_default_timeout(timeout);
    }

    match build_translator(cfg)? {
        Some(translator) => {
            let exec = TranslatingExecutor::builder()
                .executor(local)
                .translator(translator)
                .build()?;
            Ok(Arc::new(exec))
        }
        None => Ok(Arc::new(local)),
    }
}

/// The configured translator, or `None` when translation is disabled.
pub fn build_translator(cfg: &ConfigFile) -> crate::errors::Result<Option<PrefixTranslator>> {
    if !cfg.translation_enabled() {
        return Ok(None);
    }
    PrefixTranslator::from_config(&cfg.translate).map(Some)
}

/// Process exit code for a failed run.
///
/// A failed command propagates its own exit code, a timeout maps to
/// [`TIMEOUT_EXIT_CODE`], anything else is `1`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ExecError>() {
        Some(e) if e.is_timeout() => TIMEOUT_EXIT_CODE,
        Some(e) => e.exit_code().filter(|c| *c != 0).unwrap_or(1),
        None => 1,
    }
}

/// An explicit `--config` must exist; the default path is optional.
fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    if let Some(path) = &args.config {
        return load_and_validate(path)
            .with_context(|| format!("loading config {}", path.display()));
    }

    let path = default_config_path();
    if path.exists() {
        load_and_validate(&path).with_context(|| format!("loading config {}", path.display()))
    } else {
        debug!(path = %path.display(), "no config file; using defaults");
        Ok(ConfigFile::default())
    }
}

fn print_dry_run(cfg: &ConfigFile, invocation: &types::Invocation) -> Result<()> {
    let translated = match build_translator(cfg)? {
        Some(t) => t.translate(invocation.suppress, &invocation.command, &invocation.args),
        None => IdentityTranslator.translate(
            invocation.suppress,
            &invocation.command,
            &invocation.args,
        ),
    };

    println!("cmdrelay dry-run");
    println!("  mode: {:?}", invocation.mode);
    println!("  suppress: {}", invocation.suppress);
    println!(
        "  command: {}",
        std::iter::once(&translated.command)
            .chain(translated.args.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    );

    debug!("dry-run complete (no execution)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RawConfigFile, TranslateSection};

    #[test]
    fn exit_codes() {
        let timeout = anyhow::Error::new(ExecError::Timeout {
            command: "sleep".into(),
            timeout: std::time::Duration::from_secs(1),
        });
        assert_eq!(exit_code_for(&timeout), TIMEOUT_EXIT_CODE);

        let failed = anyhow::Error::new(ExecError::Failed {
            command: "false".into(),
            code: Some(7),
            output: String::new(),
        });
        assert_eq!(exit_code_for(&failed), 7);

        let signalled = anyhow::Error::new(ExecError::Failed {
            command: "yes".into(),
            code: None,
            output: String::new(),
        });
        assert_eq!(exit_code_for(&signalled), 1);

        assert_eq!(exit_code_for(&anyhow::anyhow!("other")), 1);
    }

    #[test]
    fn translator_only_when_enabled() {
        let cfg = ConfigFile::default();
        assert!(build_translator(&cfg).unwrap().is_none());

        let raw = RawConfigFile {
            translate: TranslateSection {
                enabled: true,
                program: Some("kubectl".to_string()),
                prefix_args: vec!["exec".to_string(), "pod".to_string(), "--".to_string()],
                passthrough: vec![],
            },
            ..RawConfigFile::default()
        };
        let cfg = ConfigFile::try_from(raw).unwrap();
        let translator = build_translator(&cfg).unwrap().unwrap();
        assert_eq!(translator.program(), "kubectl");
        assert!(build_executor(&cfg).is_ok());
    }
}
