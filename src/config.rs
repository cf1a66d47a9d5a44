//! Runtime configuration.
//!
//! Defaults, overlaid by `~/.config/envsnap/config.toml` (or `--config`),
//! overlaid by command line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::platform::{self, Platform};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CUTOFF: f64 = 0.3;
const DEFAULT_PREVIEW: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store_dir: PathBuf,
    pub python: Option<String>,
    pub command_timeout: Duration,
    pub strict_capture: bool,
    pub fuzzy_match: bool,
    pub fuzzy_cutoff: f64,
    pub package_preview: usize,
    pub platform: Platform,
}

/// On-disk shape of config.toml. Every key is optional.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    store_dir: Option<PathBuf>,
    python: Option<String>,
    command_timeout: Option<String>,
    strict_capture: Option<bool>,
    fuzzy_match: Option<bool>,
    fuzzy_cutoff: Option<f64>,
    package_preview: Option<usize>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Config::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Config::from_file(&path)?,
                _ => Config::default(),
            },
        };

        if let Some(dir) = &cli.store_dir {
            config.store_dir = platform::expand_tilde(dir);
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Config::from_toml(&contents, path)
    }

    fn from_toml(contents: &str, path: &Path) -> Result<Self> {
        let invalid = |message: String| Error::Config { path: path.to_path_buf(), message };

        let file: FileConfig = toml::from_str(contents).map_err(|e| invalid(e.message().to_string()))?;
        let mut config = Config::default();

        if let Some(dir) = file.store_dir {
            config.store_dir = platform::expand_tilde(&dir);
        }
        if let Some(python) = file.python.filter(|p| !p.trim().is_empty()) {
            config.python = Some(python);
        }
        if let Some(timeout) = file.command_timeout {
            config.command_timeout = humantime::parse_duration(&timeout)
                .map_err(|e| invalid(format!("command_timeout {timeout:?}: {e}")))?;
        }
        if let Some(strict) = file.strict_capture {
            config.strict_capture = strict;
        }
        if let Some(fuzzy) = file.fuzzy_match {
            config.fuzzy_match = fuzzy;
        }
        if let Some(cutoff) = file.fuzzy_cutoff {
            if !(0.0..=1.0).contains(&cutoff) {
                return Err(invalid(format!("fuzzy_cutoff must be between 0 and 1, got {cutoff}")));
            }
            config.fuzzy_cutoff = cutoff;
        }
        if let Some(preview) = file.package_preview {
            config.package_preview = preview;
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        let store_dir = platform::home_dir()
            .map(|h| h.join(".envsnap"))
            .unwrap_or_else(|| PathBuf::from(".envsnap"));

        Config {
            store_dir,
            python: None,
            command_timeout: DEFAULT_TIMEOUT,
            strict_capture: false,
            fuzzy_match: true,
            fuzzy_cutoff: DEFAULT_CUTOFF,
            package_preview: DEFAULT_PREVIEW,
            platform: platform::detect(),
        }
    }
}

/// `~/.config/envsnap/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "envsnap").map(|dirs| dirs.config_dir().join("config.toml"))
}
