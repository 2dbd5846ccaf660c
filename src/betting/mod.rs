pub mod aggregate;
pub mod synthetic;

pub use aggregate::{dashboard_stats, summarize_history, summarize_synthetic};
pub use synthetic::{generate_history, HistoryOptions};
