// 🔖 Tags and the transaction_tags join table (many-to-many)

use crate::db::{nullable, Assignments, Store};
use crate::entities::transaction::Transaction;
use crate::error::Result;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    /// UNIQUE but nullable in the schema
    pub name: Option<String>,
}

impl Tag {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

/// Partial update. `name: Some(None)` clears the name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagPatch {
    pub name: Option<Option<String>>,
}

impl TagPatch {
    pub fn name(name: impl Into<String>) -> Self {
        TagPatch {
            name: Some(Some(name.into())),
        }
    }

    fn assignments(&self) -> Assignments {
        let mut set = Assignments::new();
        set.set("name", self.name.clone().map(nullable));
        set
    }
}

impl Store {
    /// Tag names are unique; a duplicate fails with ConstraintViolation
    pub fn create_tag(&self, name: &str) -> Result<i64> {
        let id = self.insert("INSERT INTO tags (name) VALUES (?1)", params![name])?;
        log::debug!("tags: created id {} ('{}')", id, name);
        Ok(id)
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        self.query("SELECT id, name FROM tags ORDER BY id", [], Tag::from_row)
    }

    pub fn get_tag(&self, id: i64) -> Result<Option<Tag>> {
        self.query_one(
            "SELECT id, name FROM tags WHERE id = ?1",
            params![id],
            Tag::from_row,
        )
    }

    /// Renaming onto an existing name fails with ConstraintViolation
    pub fn update_tag(&self, id: i64, patch: &TagPatch) -> Result<usize> {
        self.update_columns("tags", id, patch.assignments())
    }

    pub fn delete_tag(&self, id: i64) -> Result<usize> {
        self.delete_row("tag", "tags", id, &[("transaction_tags", "tag_id")])
    }

    // ========================================================================
    // TRANSACTION <-> TAG LINKS
    // ========================================================================

    /// Idempotent: linking twice keeps a single row. Returns 1 when a new
    /// link was written, 0 when it already existed.
    pub fn add_tag_to_transaction(&self, transaction_id: i64, tag_id: i64) -> Result<usize> {
        self.execute(
            "INSERT OR IGNORE INTO transaction_tags (transaction_id, tag_id) VALUES (?1, ?2)",
            params![transaction_id, tag_id],
        )
    }

    /// No-op when the link does not exist
    pub fn remove_tag_from_transaction(&self, transaction_id: i64, tag_id: i64) -> Result<usize> {
        self.execute(
            "DELETE FROM transaction_tags WHERE transaction_id = ?1 AND tag_id = ?2",
            params![transaction_id, tag_id],
        )
    }

    /// Tags currently linked to a transaction. Links to deleted tags are skipped.
    pub fn get_transaction_tags(&self, transaction_id: i64) -> Result<Vec<Tag>> {
        self.query(
            "SELECT tags.id, tags.name
             FROM tags
             JOIN transaction_tags ON tags.id = transaction_tags.tag_id
             WHERE transaction_tags.transaction_id = ?1
             ORDER BY tags.id",
            params![transaction_id],
            Tag::from_row,
        )
    }

    /// Transactions carrying a tag, in id order
    pub fn get_transactions_for_tag(&self, tag_id: i64) -> Result<Vec<Transaction>> {
        self.query(
            "SELECT t.id, t.date, t.amount, t.description, t.category_id, t.account_id
             FROM transactions t
             JOIN transaction_tags tt ON t.id = tt.transaction_id
             WHERE tt.tag_id = ?1
             ORDER BY t.id",
            params![tag_id],
            Transaction::from_row,
        )
    }
}
