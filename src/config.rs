// Runtime configuration threaded through Store and Reporter

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_PATH: &str = "finance_tracker.db";
pub const DEFAULT_CHART_PATH: &str = "Images/monthly_spending_by_category.png";
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// What happens when a row that other rows point at is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeletePolicy {
    /// Delete anyway; dependents keep a dangling id
    #[default]
    AllowDangling,

    /// Refuse the delete while any dependent row exists
    Restrict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub database_path: PathBuf,
    pub chart_path: PathBuf,
    /// Default `n` for recent transactions in the printed report
    pub recent_limit: usize,
    pub delete_policy: DeletePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            chart_path: PathBuf::from(DEFAULT_CHART_PATH),
            recent_limit: DEFAULT_RECENT_LIMIT,
            delete_policy: DeletePolicy::default(),
        }
    }
}

impl Config {
    /// Default configuration pointing at a specific database file
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Config {
            database_path: database_path.into(),
            ..Config::default()
        }
    }

    pub fn with_chart_path(mut self, chart_path: impl Into<PathBuf>) -> Self {
        self.chart_path = chart_path.into();
        self
    }

    pub fn with_recent_limit(mut self, recent_limit: usize) -> Self {
        self.recent_limit = recent_limit;
        self
    }

    pub fn with_delete_policy(mut self, delete_policy: DeletePolicy) -> Self {
        self.delete_policy = delete_policy;
        self
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn chart_path(&self) -> &Path {
        &self.chart_path
    }
}
