// 💸 Transaction Entity - one dated, signed amount
//
// Sign convention (income vs expense) is left to the caller.

use crate::db::{date_column, date_to_sql, nullable, Assignments, Store};
use crate::error::Result;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
}

const SELECT_TRANSACTION: &str =
    "SELECT id, date, amount, description, category_id, account_id FROM transactions";

impl Transaction {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Transaction {
            id: row.get(0)?,
            date: date_column(row, 1)?,
            amount: row.get(2)?,
            description: row.get(3)?,
            category_id: row.get(4)?,
            account_id: row.get(5)?,
        })
    }
}

/// Partial update for a transaction.
///
/// Outer `None` leaves a column alone; for nullable columns `Some(None)`
/// writes NULL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<i64>>,
    pub account_id: Option<Option<i64>>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        *self == TransactionPatch::default()
    }

    fn assignments(&self) -> Assignments {
        let mut set = Assignments::new();
        set.set("date", self.date.map(|d| Value::from(date_to_sql(d))))
            .set("amount", self.amount.map(Value::from))
            .set("description", self.description.clone().map(nullable))
            .set("category_id", self.category_id.map(nullable))
            .set("account_id", self.account_id.map(nullable));
        set
    }
}

impl Store {
    pub fn create_transaction(
        &self,
        date: NaiveDate,
        amount: f64,
        description: Option<&str>,
        category_id: Option<i64>,
        account_id: Option<i64>,
    ) -> Result<i64> {
        let id = self.insert(
            "INSERT INTO transactions (date, amount, description, category_id, account_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![date_to_sql(date), amount, description, category_id, account_id],
        )?;
        log::debug!("transactions: created id {} ({} {:.2})", id, date, amount);
        Ok(id)
    }

    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.query(
            &format!("{} ORDER BY id", SELECT_TRANSACTION),
            [],
            Transaction::from_row,
        )
    }

    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        self.query_one(
            &format!("{} WHERE id = ?1", SELECT_TRANSACTION),
            params![id],
            Transaction::from_row,
        )
    }

    pub fn update_transaction(&self, id: i64, patch: &TransactionPatch) -> Result<usize> {
        self.update_columns("transactions", id, patch.assignments())
    }

    pub fn delete_transaction(&self, id: i64) -> Result<usize> {
        self.delete_row(
            "transaction",
            "transactions",
            id,
            &[("transaction_tags", "transaction_id")],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_store;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let (_dir, store) = temp_store();

        let id = store
            .create_transaction(day(2024, 1, 5), -45.99, Some("Local grocery"), Some(2), Some(1))
            .unwrap();

        let tx = store.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.date, day(2024, 1, 5));
        assert_eq!(tx.amount, -45.99);
        assert_eq!(tx.description.as_deref(), Some("Local grocery"));
        assert_eq!(tx.category_id, Some(2));
        assert_eq!(tx.account_id, Some(1));
    }

    #[test]
    fn test_list_in_insertion_order() {
        let (_dir, store) = temp_store();

        let a = store.create_transaction(day(2024, 2, 1), 1.0, None, None, None).unwrap();
        let b = store.create_transaction(day(2024, 1, 1), 2.0, None, None, None).unwrap();

        let ids: Vec<i64> = store.list_transactions().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_patch_updates_selected_columns() {
        let (_dir, store) = temp_store();
        let id = store
            .create_transaction(day(2024, 1, 5), 100.0, Some("Uber ride"), Some(3), Some(1))
            .unwrap();

        let patch = TransactionPatch {
            amount: Some(120.0),
            category_id: Some(None),
            ..Default::default()
        };
        assert_eq!(store.update_transaction(id, &patch).unwrap(), 1);

        let tx = store.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.amount, 120.0);
        assert_eq!(tx.category_id, None);
        assert_eq!(tx.date, day(2024, 1, 5));
        assert_eq!(tx.description.as_deref(), Some("Uber ride"));
        assert_eq!(tx.account_id, Some(1));
    }

    #[test]
    fn test_patch_date_and_description() {
        let (_dir, store) = temp_store();
        let id = store
            .create_transaction(day(2024, 1, 5), 10.0, Some("typo"), None, None)
            .unwrap();

        let patch = TransactionPatch {
            date: Some(day(2024, 1, 6)),
            description: Some(Some("Cinema ticket".to_string())),
            ..Default::default()
        };
        store.update_transaction(id, &patch).unwrap();

        let tx = store.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.date, day(2024, 1, 6));
        assert_eq!(tx.description.as_deref(), Some("Cinema ticket"));
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let (_dir, store) = temp_store();
        let id = store
            .create_transaction(day(2024, 1, 5), 10.0, Some("Bus pass"), Some(1), None)
            .unwrap();
        let before = store.get_transaction(id).unwrap();

        let patch = TransactionPatch::default();
        assert!(patch.is_empty());
        assert_eq!(store.update_transaction(id, &patch).unwrap(), 0);
        assert_eq!(store.get_transaction(id).unwrap(), before);
    }

    #[test]
    fn test_update_and_delete_missing_id() {
        let (_dir, store) = temp_store();
        store.create_transaction(day(2024, 1, 5), 10.0, None, None, None).unwrap();

        let patch = TransactionPatch {
            amount: Some(1.0),
            ..Default::default()
        };
        assert_eq!(store.update_transaction(77, &patch).unwrap(), 0);
        assert_eq!(store.delete_transaction(77).unwrap(), 0);
        assert_eq!(store.list_transactions().unwrap().len(), 1);
    }

    #[test]
    fn test_reads_timestamp_dates_from_existing_files() {
        let (_dir, store) = temp_store();
        let id = store
            .insert(
                "INSERT INTO transactions (date, amount) VALUES (?1, ?2)",
                params!["2024-01-20 08:15:00", 5.0],
            )
            .unwrap();

        let tx = store.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.date, day(2024, 1, 20));
    }
}
