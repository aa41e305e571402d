//! The runner's settings. These are read from a TOML file and then overridden by whatever was
//! passed on the command line.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::RunnerError;

/// Looked for in the working directory when no config path is given.
pub const DEFAULT_CONFIG_PATH: &str = "wraith.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The most verbose level that gets logged.
    pub log_level: LogLevel,
    /// How many frames to run before giving up on a verdict.
    pub max_frames: u64,
    /// Whether to write battery-backed RAM out to the save file on exit.
    pub save_ram: bool,
    /// Print serial output as it arrives.
    pub serial_echo: bool,
    /// Stop as soon as the serial output reports "Passed" or "Failed".
    pub stop_on_verdict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            // Two minutes of emulated time
            max_frames: 7200,
            save_ram: true,
            serial_echo: true,
            stop_on_verdict: true,
        }
    }
}

impl Config {
    /// Reads the config at the given path. Without a path, the default file is used if it exists,
    /// and the default config otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, RunnerError> {
        let data = match path {
            Some(path) => std::fs::read_to_string(path)?,
            None => match std::fs::read_to_string(DEFAULT_CONFIG_PATH) {
                Ok(data) => data,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
                Err(err) => return Err(err.into()),
            },
        };
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, RunnerError> {
        Ok(toml::from_str(data)?)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[display("error")]
    Error,
    #[display("warn")]
    Warn,
    #[display("info")]
    Info,
    #[display("debug")]
    Debug,
    #[display("trace")]
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file() {
        let config = Config::parse("log_level = \"trace\"\nmax_frames = 60\n").unwrap();
        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.max_frames, 60);
        assert!(config.save_ram);
        assert!(config.stop_on_verdict);
    }

    #[test]
    fn bad_level_is_an_error() {
        let err = Config::parse("log_level = \"loud\"").unwrap_err();
        assert!(matches!(err, RunnerError::Config(_)));
    }

    #[test]
    fn explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner.toml");
        std::fs::write(&path, "serial_echo = false\nsave_ram = false\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert!(!config.serial_echo);
        assert!(!config.save_ram);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(Some(&missing)), Err(RunnerError::Io(_))));
    }

    #[test]
    fn levels_map_onto_tracing() {
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(LogLevel::Debug.to_string(), "debug");
    }
}
