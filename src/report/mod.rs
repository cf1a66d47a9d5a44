//! Text rendering for stored snapshots.
//!
//! Every renderer is a pure function of its input and returns the text to
//! print; the caller decides where it goes.

pub mod export;
pub mod table;
pub mod view;

pub use export::{render_env_exports, Shell};
pub use table::{render_list, ListEntry};
pub use view::{render_report, render_view};

use chrono::{DateTime, Utc};

/// Shown wherever a value was absent at capture time.
pub const NOT_SET: &str = "not set";

fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn or_not_set(value: Option<&str>) -> String {
    match value {
        Some("") => "\"\"".to_string(),
        Some(v) => v.to_string(),
        None => NOT_SET.to_string(),
    }
}
