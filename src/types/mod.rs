//! Type definitions for driver-logbook

mod error;
mod period;
mod report;
mod stats;

pub use error::*;
pub use period::*;
pub use report::*;
pub use stats::*;

/// Store loading warning types
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWarning {
    /// Failed to open or read a month file
    LoadFailed(String),
    /// Month file was corrupted (invalid JSON)
    Corrupted(String),
    /// Month file written by an unknown format version
    VersionMismatch(String),
}

impl StoreWarning {
    pub fn message(&self) -> &str {
        match self {
            Self::LoadFailed(msg) | Self::Corrupted(msg) | Self::VersionMismatch(msg) => msg,
        }
    }
}
