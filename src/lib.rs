// Finance Tracker - Core Library
// Store (SQLite CRUD per entity) + Reporter (monthly / per-account aggregates)

pub mod chart;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod populate;
pub mod report;
pub mod schema;

// Re-export commonly used types
pub use chart::ChartKind;
pub use config::{Config, DeletePolicy, DEFAULT_CHART_PATH, DEFAULT_DATABASE_PATH, DEFAULT_RECENT_LIMIT};
pub use db::Store;
pub use entities::{
    Account, AccountPatch, AccountType,
    Category, CategoryPatch, CategoryTree,
    Frequency, RecurringRule, RecurringRulePatch,
    Tag, TagPatch,
    Transaction, TransactionPatch,
};
pub use error::{Error, Result};
pub use report::{GroupTotal, Pivot, Reporter, TransactionView, YearMonth};
pub use schema::initialize_database;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
