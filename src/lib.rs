//! Descriptive statistics for a daily drink-count ledger.
//!
//! Raw CSV rows become an immutable [`Dataset`]; report builders in
//! [`reports`] reduce a selection (entity and/or year) to plain structs that
//! a rendering layer can display. Undefined statistics are `None`, never NaN.
pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod output;
pub mod queries;
pub mod reports;
pub mod stats;
pub mod types;
pub mod util;

pub use config::{DashboardConfig, RowPolicy};
pub use dataset::{build_dataset, Dataset};
pub use error::{Error, Result};
pub use loader::{load_dataset, load_from_path, load_from_reader};
pub use reports::{
    high_consumption_streak, historical_maximum, individual_consumption, insights,
    monthly_stats, monthly_trends, overall_consumption, overview, relative_rankings, streaks,
    top_days, weekday_pattern, yearly_trend,
};
