//! Snapshot listing.
//!
//! Short form prints one name per line so it can feed scripts and shell
//! completion. Long form is a table of name, capture time and package count.

use std::fmt::Write as _;

use super::format_time;
use crate::snapshot::Snapshot;

pub struct ListEntry {
    pub name: String,
    /// `None` when the file exists but could not be read.
    pub snapshot: Option<Snapshot>,
}

pub fn render_list(entries: &[ListEntry], long: bool) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut output = String::new();

    if !long {
        for entry in entries {
            output.push_str(&entry.name);
            output.push('\n');
        }
        return output;
    }

    let _ = writeln!(output, "{:<30} {:<24} {:>8}", "Name", "Created", "Packages");
    output.push_str(&"-".repeat(64));
    output.push('\n');

    for entry in entries {
        let name = truncate(&entry.name, 30);
        let _ = match &entry.snapshot {
            Some(snapshot) => writeln!(
                output,
                "{name:<30} {:<24} {:>8}",
                format_time(&snapshot.created_at),
                snapshot.packages.len()
            ),
            None => writeln!(output, "{name:<30} {:<24} {:>8}", "<unreadable>", "-"),
        };
    }

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}
