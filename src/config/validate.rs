// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ConfigError, Result};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ConfigError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let default_timeout = validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.executor,
            raw.translate,
            default_timeout,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<Option<Duration>> {
    validate_working_dir(cfg)?;
    validate_translate(cfg)?;
    parse_default_timeout(cfg)
}

fn validate_working_dir(cfg: &RawConfigFile) -> Result<()> {
    if let Some(dir) = &cfg.executor.working_dir {
        if dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "[executor].working_dir must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_translate(cfg: &RawConfigFile) -> Result<()> {
    let section = &cfg.translate;
    if !section.enabled {
        return Ok(());
    }

    let program = section.program.as_deref().map(str::trim).unwrap_or("");
    if program.is_empty() {
        return Err(ConfigError::Invalid(
            "[translate].program must be set when translation is enabled".to_string(),
        ));
    }

    if let Some(cmd) = section.passthrough.iter().find(|c| c.trim().is_empty()) {
        return Err(ConfigError::Invalid(format!(
            "[translate].passthrough contains an empty command name ({:?})",
            cmd
        )));
    }

    Ok(())
}

fn parse_default_timeout(cfg: &RawConfigFile) -> Result<Option<Duration>> {
    let Some(raw) = cfg.executor.default_timeout.as_deref() else {
        return Ok(None);
    };

    let timeout = parse_duration(raw)
        .map_err(|e| ConfigError::Invalid(format!("[executor].default_timeout: {e}")))?;

    if timeout.is_zero() {
        return Err(ConfigError::Invalid(
            "[executor].default_timeout must be greater than zero".to_string(),
        ));
    }

    Ok(Some(timeout))
}
