// Runtime configuration shared by the loader and the CLI.
//
// Nothing here is global: the binary builds one `DashboardConfig` from its
// command-line flags and passes it down explicitly.
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "combined_birra_data.csv";
pub const DEFAULT_ENTITIES: [&str; 5] = ["CFC", "JCR", "JSP", "DMP", "DSS"];
/// Year preselected when the data contains it.
pub const PREFERRED_YEAR: i32 = 2025;

/// What to do with a source row that cannot become a `DailyRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Drop the row, log it and count it in the `LoadReport`.
    #[default]
    Skip,
    /// Fail the whole load on the first malformed row.
    Abort,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub entities: Vec<String>,
    pub row_policy: RowPolicy,
    pub default_year: Option<i32>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            entities: DEFAULT_ENTITIES.iter().map(|e| e.to_string()).collect(),
            row_policy: RowPolicy::Skip,
            default_year: None,
        }
    }
}

impl DashboardConfig {
    /// Replace the tracked entity list, trimming whitespace around each id.
    pub fn with_entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entities = entities
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .collect();
        self
    }

    pub fn with_row_policy(mut self, policy: RowPolicy) -> Self {
        self.row_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.entities.is_empty() {
            return Err(Error::Config("at least one entity must be tracked".to_string()));
        }
        let mut seen = HashSet::new();
        for e in &self.entities {
            if e.is_empty() {
                return Err(Error::Config("entity ids must not be empty".to_string()));
            }
            if !seen.insert(e.as_str()) {
                return Err(Error::Config(format!("duplicate entity id '{}'", e)));
            }
        }
        Ok(())
    }

    /// Pick the year a session starts on: the explicit default if the data
    /// has it, then `PREFERRED_YEAR`, then the latest year available.
    pub fn initial_year(&self, available: &[i32]) -> Option<i32> {
        let wanted = self.default_year.unwrap_or(PREFERRED_YEAR);
        if available.contains(&wanted) {
            Some(wanted)
        } else {
            available.last().copied()
        }
    }
}
