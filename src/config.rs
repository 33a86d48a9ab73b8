//! Command-line and environment configuration for the `pascal_interpreter` binary.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

const LOG_FORMAT_ENV: &str = "PASCAL_LOG_FORMAT";
const LOG_JSON_ENV: &str = "PASCAL_LOG_JSON";

pub const USAGE: &str = "usage: pascal_interpreter [--tokens | --ast] [FILE]";

/// Program run when no source file is given.
pub const DEMO_PROGRAM: &str = r#"
PROGRAM Demo;
VAR
   a, b : INTEGER;
   y    : REAL;

BEGIN {Demo}
   a := 2;
   b := 10 * a + 10 * a DIV 4;
   y := 20 / 7 + 3.14;
   BEGIN
      result := (a + b) * (y - 1)
   END
END.  {Demo}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Execute the program and print its variables.
    Run,
    /// Print the token stream.
    Tokens,
    /// Print the parsed tree.
    Ast,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown option: {0}\n{}", USAGE)]
    UnknownFlag(String),
    #[error("unexpected argument: {0}\n{}", USAGE)]
    ExtraArgument(String),
    #[error("invalid {} value: {0} (expected 'text' or 'json')", LOG_FORMAT_ENV)]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub input: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads the process arguments and environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_parts(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Builds a config from arguments (program name excluded) and an
    /// environment lookup.
    pub fn from_parts<I, F>(args: I, env: F) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut mode = Mode::Run;
        let mut input = None;

        for arg in args {
            match arg.as_str() {
                "--tokens" => mode = Mode::Tokens,
                "--ast" => mode = Mode::Ast,
                "-h" | "--help" => mode = Mode::Help,
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(ConfigError::UnknownFlag(flag.to_string()));
                }
                path if input.is_some() => return Err(ConfigError::ExtraArgument(path.to_string())),
                path => input = Some(PathBuf::from(path)),
            }
        }

        Ok(Config {
            mode,
            input,
            log_format: log_format(&env)?,
        })
    }

    /// Source text of the configured file, or the demo program.
    pub fn load_source(&self) -> std::io::Result<String> {
        match &self.input {
            Some(path) => fs::read_to_string(path),
            None => Ok(DEMO_PROGRAM.to_string()),
        }
    }
}

fn log_format<F: Fn(&str) -> Option<String>>(env: &F) -> Result<LogFormat, ConfigError> {
    if let Some(value) = env(LOG_FORMAT_ENV) {
        return match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" | "" => Ok(LogFormat::Text),
            _ => Err(ConfigError::InvalidLogFormat(value)),
        };
    }

    let json = env(LOG_JSON_ENV)
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false);
    Ok(if json { LogFormat::Json } else { LogFormat::Text })
}
