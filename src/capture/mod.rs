//! Environment capture.
//!
//! Builds a [`Snapshot`] from:
//! - the interpreter (`python --version`)
//! - installed packages (`python -m pip freeze`)
//! - the current git branch (`git rev-parse --abbrev-ref HEAD`)
//! - `VIRTUAL_ENV` and the tracked variables
//!
//! Optional data degrades to `None` or a recorded warning. Only a missing or
//! broken interpreter aborts the capture, and a failing pip does too in
//! strict mode.

pub mod env;
pub mod runner;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{Error, Result};
use crate::platform::{self, Platform};
use crate::snapshot::{Snapshot, TRACKED_VARS};
use env::EnvSource;
use runner::{CommandRunner, RunError};

pub struct CaptureOptions {
    /// Interpreter to probe instead of discovering one.
    pub python: Option<String>,
    /// Directory whose git branch is recorded.
    pub workdir: PathBuf,
    /// Fail instead of recording a warning when pip freeze fails.
    pub strict: bool,
    pub platform: Platform,
}

impl CaptureOptions {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        CaptureOptions {
            python: None,
            workdir: workdir.into(),
            strict: false,
            platform: platform::detect(),
        }
    }
}

pub struct Builder<'a> {
    runner: &'a dyn CommandRunner,
    env: &'a dyn EnvSource,
    options: CaptureOptions,
}

impl<'a> Builder<'a> {
    pub fn new(runner: &'a dyn CommandRunner, env: &'a dyn EnvSource, options: CaptureOptions) -> Self {
        Builder { runner, env, options }
    }

    pub fn capture(&self) -> Result<Snapshot> {
        let mut warnings = Vec::new();

        let venv_path = self.env.var("VIRTUAL_ENV").filter(|v| !v.is_empty());
        let python = self.find_interpreter(venv_path.as_deref())?;
        tracing::debug!(python = %python, "using interpreter");

        let python_version = self.python_version(&python)?;
        let packages = self.installed_packages(&python, &mut warnings)?;
        let git_branch = self.git_branch(&mut warnings);

        let env_vars: BTreeMap<String, Option<String>> = TRACKED_VARS
            .iter()
            .map(|key| (key.to_string(), self.env.var(key)))
            .collect();

        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        Ok(Snapshot {
            created_at: Utc::now(),
            python_version,
            venv_path,
            packages,
            git_branch,
            env_vars,
            warnings,
        })
    }

    fn find_interpreter(&self, venv: Option<&str>) -> Result<String> {
        if let Some(python) = &self.options.python {
            return Ok(python.clone());
        }

        if let Some(venv) = venv {
            let candidate = platform::venv_interpreter(Path::new(venv), self.options.platform);
            let candidate = candidate.to_string_lossy();
            if let Some(path) = self.runner.locate(&candidate) {
                return Ok(path.to_string_lossy().into_owned());
            }
            tracing::debug!(venv, "virtualenv has no interpreter, falling back to PATH");
        }

        platform::python_candidates(self.options.platform)
            .iter()
            .find_map(|name| self.runner.locate(name))
            .map(|path| path.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::capture("python", "no python interpreter found; set `python` in config.toml")
            })
    }

    fn python_version(&self, python: &str) -> Result<String> {
        let output = self
            .runner
            .run(python, &["--version"])
            .map_err(|e| Error::capture("python", e.to_string()))?;

        // python 2 and early 3.x print the version on stderr
        let raw = if output.stdout.trim().is_empty() { &output.stderr } else { &output.stdout };

        parse_python_version(raw)
            .ok_or_else(|| Error::capture("python", format!("unrecognized version output {:?}", raw.trim())))
    }

    fn installed_packages(&self, python: &str, warnings: &mut Vec<String>) -> Result<Vec<String>> {
        match self.runner.run(python, &["-m", "pip", "freeze"]) {
            Ok(output) => Ok(output
                .stdout
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect()),
            Err(e) if self.options.strict => Err(Error::capture("pip", e.to_string())),
            Err(e) => {
                warnings.push(format!("pip: {e} (package list left empty)"));
                Ok(Vec::new())
            }
        }
    }

    fn git_branch(&self, warnings: &mut Vec<String>) -> Option<String> {
        if self.runner.locate("git").is_none() {
            tracing::debug!("git not on PATH, branch not recorded");
            return None;
        }

        let workdir = self.options.workdir.to_string_lossy();
        match self.runner.run("git", &["-C", &workdir, "rev-parse", "--abbrev-ref", "HEAD"]) {
            Ok(output) => {
                let branch = output.stdout.trim();
                (!branch.is_empty()).then(|| branch.to_string())
            }
            // not a repository, or a repository without commits
            Err(RunError::Failed { stderr, .. }) => {
                tracing::debug!(stderr = %stderr, "no git branch");
                None
            }
            Err(e) => {
                warnings.push(format!("git: {e} (branch not recorded)"));
                None
            }
        }
    }
}

/// `"Python 3.11.2"` → `"3.11.2"`.
fn parse_python_version(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let version = line.strip_prefix("Python ").unwrap_or(line).trim();

    if version.starts_with(|c: char| c.is_ascii_digit()) {
        Some(version.to_string())
    } else {
        None
    }
}
