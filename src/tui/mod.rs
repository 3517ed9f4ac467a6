//! Terminal UI: report history and monthly statistics

pub mod app;
pub mod theme;
pub mod widgets;

pub use app::run;
