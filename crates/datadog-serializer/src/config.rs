// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Structured configuration parsed from the rendered artifact.
//!
//! The loader is deliberately strict: every key the artifact schema names
//! must be present and well formed, and a violation is surfaced to the
//! bootstrap caller instead of being papered over with a default.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use figment::providers::{Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ConfigError {
    #[error("failed to read configuration artifact: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse configuration artifact: {0}")]
    Parse(#[from] figment::Error),
}

/// Verbosity of the pipeline's logging, ordered from least to most verbose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Invalid log level: '{s}'. Valid levels are: error, warn, info, debug, trace",
            )),
        }
    }
}

// Strict on purpose: a malformed level in the artifact is a configuration
// error, not a silent fallback.
impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        LogLevel::from_str(&value).map_err(serde::de::Error::custom)
    }
}

/// Read-only view over the rendered configuration artifact.
///
/// Shared by reference (`Arc`) among every component that needs settings;
/// lives for the lifetime of the resolved graph.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub logs_enabled: bool,
    pub log_level: LogLevel,
    pub site: String,
    #[serde(deserialize_with = "deserialize_nullable_string")]
    pub api_key: String,
    pub apm_config: ApmConfig,
    /// forwarder hand-off timeout, in seconds
    pub forwarder_timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(clippy::module_name_repetitions)]
pub struct ApmConfig {
    pub enabled: bool,
    pub apm_non_local_traffic: bool,
}

// An empty credential renders as a YAML null; keep it an empty string. The
// key itself must still be present.
fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Config {
    /// Parses the artifact at `path`.
    ///
    /// Loading the same artifact twice yields equal handles.
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Config = Figment::new().merge(Yaml::string(&raw)).extract()?;
        Ok(config)
    }
}
