//! Human-readable snapshot output.
//!
//! - `view`: every attribute, every package
//! - `report`: counts and the first few packages

use std::fmt::Write as _;

use super::{format_time, or_not_set};
use crate::snapshot::{Snapshot, TRACKED_VARS};

pub fn render_view(name: &str, snapshot: &Snapshot) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Snapshot: {name}");
    let _ = writeln!(output, "{}", "-".repeat(40));
    let _ = writeln!(output, "{:<12} {}", "Created:", format_time(&snapshot.created_at));
    let _ = writeln!(output, "{:<12} {}", "Python:", snapshot.python_version);
    let _ = writeln!(output, "{:<12} {}", "Virtualenv:", or_not_set(snapshot.venv_path.as_deref()));
    let _ = writeln!(output, "{:<12} {}", "Git branch:", or_not_set(snapshot.git_branch.as_deref()));

    output.push_str("Env vars:\n");
    let width = snapshot.env_vars.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in &snapshot.env_vars {
        let _ = writeln!(output, "  {key:<width$} = {}", or_not_set(value.as_deref()));
    }

    let _ = writeln!(output, "Packages: {} installed", snapshot.packages.len());
    for package in &snapshot.packages {
        let _ = writeln!(output, "  - {package}");
    }

    push_warnings(&mut output, snapshot);
    output
}

pub fn render_report(name: &str, snapshot: &Snapshot, preview: usize) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Summary report for '{name}'");
    let _ = writeln!(output, "{}", "-".repeat(40));
    let _ = writeln!(output, "{:<18} {}", "Created", format_time(&snapshot.created_at));
    let _ = writeln!(output, "{:<18} {}", "Python version", snapshot.python_version);
    let _ = writeln!(output, "{:<18} {}", "Git branch", or_not_set(snapshot.git_branch.as_deref()));
    let _ = writeln!(output, "{:<18} {}", "Virtualenv path", or_not_set(snapshot.venv_path.as_deref()));
    let _ = writeln!(
        output,
        "{:<18} {} of {} set",
        "Env vars",
        snapshot.present_var_count(),
        TRACKED_VARS.len()
    );
    let _ = writeln!(output, "{:<18} {}", "Package count", snapshot.packages.len());

    if !snapshot.packages.is_empty() && preview > 0 {
        output.push_str("Top packages:\n");
        for package in snapshot.packages.iter().take(preview) {
            let _ = writeln!(output, "  - {package}");
        }
        let hidden = snapshot.packages.len().saturating_sub(preview);
        if hidden > 0 {
            let _ = writeln!(output, "  ... ({hidden} more)");
        }
    }

    push_warnings(&mut output, snapshot);
    output
}

fn push_warnings(output: &mut String, snapshot: &Snapshot) {
    if snapshot.warnings.is_empty() {
        return;
    }
    output.push_str("Warnings:\n");
    for warning in &snapshot.warnings {
        let _ = writeln!(output, "  {warning}");
    }
}
