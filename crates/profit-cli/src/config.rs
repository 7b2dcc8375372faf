//! Optional TOML defaults for the command-line flags.
//!
//! ```toml
//! [run]
//! log = false
//! pretty = true
//!
//! [bench]
//! iterations = 250
//! ```
//!
//! Every key is optional. Flags given on the command line win.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub run: RunConfig,
    pub bench: BenchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Record the per-turn log in the output document.
    pub log: bool,
    /// Indent the output document.
    pub pretty: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            log: true,
            pretty: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Parse/simulate rounds per input file.
    pub iterations: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self { iterations: 100 }
    }
}

impl Config {
    /// Read `path`, or fall back to the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file: {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
