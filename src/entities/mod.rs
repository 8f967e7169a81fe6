// Entity rows and their Store operations
//
// Each module owns one table (tags also own the transaction_tags join):
// - row struct mirroring the columns
// - patch struct for partial updates
// - `impl Store` block with create / list / get / update / delete

pub mod account;
pub mod category;
pub mod recurring;
pub mod tag;
pub mod transaction;

pub use account::{Account, AccountPatch, AccountType};
pub use category::{Category, CategoryPatch, CategoryTree};
pub use recurring::{Frequency, RecurringRule, RecurringRulePatch};
pub use tag::{Tag, TagPatch};
pub use transaction::{Transaction, TransactionPatch};
