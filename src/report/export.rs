//! Shell assignment lines for `restore --env-vars`.
//!
//! Only variables that were set at capture time are emitted. An unset
//! variable produces no line at all, so evaluating the output never turns
//! "unset" into "set to empty".

use std::fmt::Write as _;

use clap::ValueEnum;

use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// sh, bash, zsh
    #[default]
    Posix,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

pub fn render_env_exports(snapshot: &Snapshot, shell: Shell) -> String {
    let mut output = String::new();

    for (key, value) in snapshot.present_vars() {
        let _ = match shell {
            Shell::Posix => writeln!(output, "export {key}={}", quote_posix(value)),
            Shell::Fish => writeln!(output, "set -gx {key} {}", quote_fish(value)),
            Shell::PowerShell => writeln!(output, "$env:{key} = {}", quote_powershell(value)),
        };
    }

    output
}

/// Single quotes suppress all expansion; an embedded quote closes the
/// string, adds an escaped quote and reopens it.
fn quote_posix(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// fish single quotes only recognize `\\` and `\'`.
fn quote_fish(value: &str) -> String {
    format!("'{}'", value.replace('\\', r"\\").replace('\'', r"\'"))
}

fn quote_powershell(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
