// src/types.rs

//! Small value types shared by the executor, translation and CLI layers.

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ExecError;
use crate::exec::CommandExecutor;

/// A rewritten command line produced by a [`Translator`](crate::translate::Translator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    pub command: String,
    pub args: Vec<String>,
}

impl Translated {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

impl From<(String, Vec<String>)> for Translated {
    fn from((command, args): (String, Vec<String>)) -> Self {
        Self { command, args }
    }
}

/// Which executor operation an [`Invocation`] maps to, with the
/// mode-specific extras.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Run and wait; no captured output.
    Run,
    /// Capture stdout.
    Output,
    /// Capture stdout and stderr interleaved.
    CombinedOutput,
    /// Capture stdout and also write it to the given file.
    OutputFile(PathBuf),
    /// As [`Mode::OutputFile`], bounded by a timeout.
    OutputFileTimeout { timeout: Duration, path: PathBuf },
    /// Run and wait, bounded by a timeout.
    Timeout(Duration),
}

/// A single command invocation, as a value.
///
/// Built fresh per call and never mutated afterwards. Used by the binary to
/// turn CLI flags into exactly one executor operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub suppress: bool,
    pub command: String,
    pub args: Vec<String>,
    pub mode: Mode,
}

impl Invocation {
    /// Dispatch to the matching executor operation.
    ///
    /// Returns the captured output for the capturing modes and `None` for
    /// [`Mode::Run`] and [`Mode::Timeout`].
    pub async fn dispatch<E>(&self, executor: &E) -> Result<Option<String>, ExecError>
    where
        E: CommandExecutor + ?Sized,
    {
        let (suppress, command, args) = (self.suppress, self.command.as_str(), &self.args[..]);
        match &self.mode {
            Mode::Run => executor.execute(suppress, command, args).await.map(|()| None),
            Mode::Output => executor
                .execute_with_output(suppress, command, args)
                .await
                .map(Some),
            Mode::CombinedOutput => executor
                .execute_with_combined_output(suppress, command, args)
                .await
                .map(Some),
            Mode::OutputFile(path) => executor
                .execute_with_output_file(suppress, command, path, args)
                .await
                .map(Some),
            Mode::OutputFileTimeout { timeout, path } => executor
                .execute_with_output_file_timeout(suppress, *timeout, command, path, args)
                .await
                .map(Some),
            Mode::Timeout(timeout) => executor
                .execute_with_timeout(suppress, *timeout, command, args)
                .await
                .map(|()| None),
        }
    }
}

/// Parse duration strings like "500ms", "5s", "2m" or "1h".
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => scaled_secs(value, 60),
        "h" => scaled_secs(value, 60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn scaled_secs(value: u64, factor: u64) -> Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: {value} x {factor}s"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration(" 5s "), Ok(Duration::from_secs(5)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1H"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").unwrap_err().contains("missing unit"));
        assert!(parse_duration("s").unwrap_err().contains("invalid duration number"));
        assert!(parse_duration("3d").unwrap_err().contains("unsupported duration unit"));
    }

    #[test]
    fn rejects_overflowing_durations() {
        assert!(parse_duration("5124095576030432h").unwrap_err().contains("too large"));
        assert!(parse_duration("307445734561825861m").unwrap_err().contains("too large"));
        assert_eq!(
            parse_duration("18446744073709551615s"),
            Ok(Duration::from_secs(u64::MAX))
        );
    }
}
