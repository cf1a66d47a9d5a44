pub mod capture;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod platform;
pub mod report;
pub mod snapshot;
pub mod store;

pub use error::{Error, Result};
pub use snapshot::Snapshot;
pub use store::Store;
