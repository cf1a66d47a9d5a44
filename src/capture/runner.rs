//! External command execution.
//!
//! Everything capture needs from the outside world goes through
//! [`CommandRunner`]: `SystemRunner` spawns real processes with a timeout,
//! `FixedRunner` answers from a table of canned responses.

use std::collections::HashMap;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("`{program}` not found")]
    NotFound { program: String },

    #[error("`{program}` exited with status {code}: {stderr}")]
    Failed { program: String, code: i32, stderr: String },

    #[error("`{program}` timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("failed to run `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

pub trait CommandRunner {
    /// Resolve `program` to an executable path, if there is one.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run `program` to completion. Non-zero exit is an error.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, RunError>;
}

pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        SystemRunner { timeout }
    }
}

impl CommandRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, RunError> {
        tracing::debug!(program, ?args, "running command");

        let mut child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RunError::NotFound { program: program.to_string() });
            }
            Err(e) => {
                return Err(RunError::Io { program: program.to_string(), source: e });
            }
        };

        // drain both pipes while polling, a full pipe would stall the child
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(RunError::TimedOut {
                            program: program.to_string(),
                            timeout: self.timeout,
                        });
                    }
                    thread::sleep(Duration::from_millis(20));
                }
                Err(e) => {
                    let _ = child.kill();
                    return Err(RunError::Io { program: program.to_string(), source: e });
                }
            }
        };

        let stdout = collect(stdout);
        let stderr = collect(stderr);

        if !status.success() {
            return Err(RunError::Failed {
                program: program.to_string(),
                code: status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        let _ = pipe.read_to_end(&mut bytes);
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

fn collect(handle: Option<thread::JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Canned responses keyed by the full command line (`program arg arg`).
/// Commands with no entry fail as if the program were missing.
#[derive(Default)]
pub struct FixedRunner {
    programs: HashMap<String, PathBuf>,
    responses: HashMap<String, Response>,
}

enum Response {
    Output(String, String),
    Exit(i32, String),
    Timeout,
}

impl FixedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `program` discoverable through `locate`.
    pub fn with_program(mut self, program: &str) -> Self {
        self.programs.insert(program.to_string(), PathBuf::from(program));
        self
    }

    pub fn respond(mut self, command_line: &str, stdout: &str) -> Self {
        self.responses.insert(
            command_line.to_string(),
            Response::Output(stdout.to_string(), String::new()),
        );
        self
    }

    /// Successful exit that only writes to stderr.
    pub fn respond_stderr(mut self, command_line: &str, stderr: &str) -> Self {
        self.responses.insert(
            command_line.to_string(),
            Response::Output(String::new(), stderr.to_string()),
        );
        self
    }

    pub fn fail(mut self, command_line: &str, code: i32, stderr: &str) -> Self {
        self.responses
            .insert(command_line.to_string(), Response::Exit(code, stderr.to_string()));
        self
    }

    pub fn time_out(mut self, command_line: &str) -> Self {
        self.responses.insert(command_line.to_string(), Response::Timeout);
        self
    }
}

impl CommandRunner for FixedRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.programs.get(program).cloned()
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, RunError> {
        let mut command_line = program.to_string();
        for arg in args {
            command_line.push(' ');
            command_line.push_str(arg);
        }

        match self.responses.get(&command_line) {
            Some(Response::Output(stdout, stderr)) => Ok(CommandOutput {
                stdout: stdout.clone(),
                stderr: stderr.clone(),
            }),
            Some(Response::Exit(code, stderr)) => Err(RunError::Failed {
                program: program.to_string(),
                code: *code,
                stderr: stderr.clone(),
            }),
            Some(Response::Timeout) => Err(RunError::TimedOut {
                program: program.to_string(),
                timeout: Duration::from_secs(30),
            }),
            None => Err(RunError::NotFound { program: program.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_runner_matches_full_command_line() {
        let runner = FixedRunner::new().respond("git rev-parse HEAD", "abc\n");
        let out = runner.run("git", &["rev-parse", "HEAD"]).unwrap();
        assert_eq!(out.stdout, "abc\n");
        assert!(matches!(
            runner.run("git", &["status"]),
            Err(RunError::NotFound { .. })
        ));
    }

    #[test]
    fn fixed_runner_reports_failures() {
        let runner = FixedRunner::new().fail("pip freeze", 2, "boom");
        match runner.run("pip", &["freeze"]) {
            Err(RunError::Failed { code, stderr, .. }) => {
                assert_eq!(code, 2);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_stdout() {
        let runner = SystemRunner::new(Duration::from_secs(10));
        let out = runner.run("sh", &["-c", "echo hello; echo oops >&2"]).unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_exit_code() {
        let runner = SystemRunner::new(Duration::from_secs(10));
        match runner.run("sh", &["-c", "echo bad >&2; exit 3"]) {
            Err(RunError::Failed { code, stderr, .. }) => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "bad");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_kills_on_timeout() {
        let runner = SystemRunner::new(Duration::from_millis(100));
        let start = Instant::now();
        let result = runner.run("sleep", &["5"]);
        assert!(matches!(result, Err(RunError::TimedOut { .. })));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_handles_large_output() {
        let runner = SystemRunner::new(Duration::from_secs(10));
        let out = runner
            .run("sh", &["-c", "i=0; while [ $i -lt 20000 ]; do echo package-$i==1.0.0; i=$((i+1)); done"])
            .unwrap();
        assert_eq!(out.stdout.lines().count(), 20000);
    }

    #[test]
    fn system_runner_missing_program() {
        let runner = SystemRunner::new(Duration::from_secs(10));
        let result = runner.run("envsnap-definitely-not-a-real-binary", &[]);
        assert!(matches!(result, Err(RunError::NotFound { .. })));
    }
}
