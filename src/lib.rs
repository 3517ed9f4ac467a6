//! Driver logbook: daily work reports, monthly statistics and CSV/PDF export

pub mod cli;
pub mod config;
pub mod export;
pub mod services;
pub mod tui;
pub mod types;
