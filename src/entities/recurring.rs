// 🔁 Recurring Rule - template for a bill that repeats
//
// Rules are stored only. Nothing here turns a due rule into a transaction
// or advances next_due; that belongs to a scheduler outside this crate.

use crate::db::{date_to_sql, nullable, optional_date_column, Assignments, Store};
use crate::error::{Error, Result};
use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, Row, ToSql};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// FREQUENCY
// ============================================================================

/// Allowed values of `recurring.frequency` (CHECK constraint)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(Error::ConstraintViolation(format!(
                "invalid frequency '{}': expected daily, weekly, monthly or yearly",
                other
            ))),
        }
    }
}

impl ToSql for Frequency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Frequency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

// ============================================================================
// RECURRING RULE ROW
// ============================================================================

/// Every column except `id` is nullable in the schema, so rows written by
/// other tools may have gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringRule {
    pub id: i64,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub frequency: Option<Frequency>,
    pub next_due: Option<NaiveDate>,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
}

const SELECT_RECURRING: &str =
    "SELECT id, description, amount, frequency, next_due, category_id, account_id FROM recurring";

impl RecurringRule {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RecurringRule {
            id: row.get(0)?,
            description: row.get(1)?,
            amount: row.get(2)?,
            frequency: row.get(3)?,
            next_due: optional_date_column(row, 4)?,
            category_id: row.get(5)?,
            account_id: row.get(6)?,
        })
    }

    /// Due on or before `today`
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_due.is_some_and(|due| due <= today)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecurringRulePatch {
    pub description: Option<Option<String>>,
    pub amount: Option<Option<f64>>,
    pub frequency: Option<Option<Frequency>>,
    pub next_due: Option<Option<NaiveDate>>,
    pub category_id: Option<Option<i64>>,
    pub account_id: Option<Option<i64>>,
}

impl RecurringRulePatch {
    fn assignments(&self) -> Assignments {
        let mut set = Assignments::new();
        set.set("description", self.description.clone().map(nullable))
            .set("amount", self.amount.map(nullable))
            .set(
                "frequency",
                self.frequency
                    .map(|f| nullable(f.map(|f| f.as_str().to_string()))),
            )
            .set(
                "next_due",
                self.next_due.map(|d| nullable(d.map(date_to_sql))),
            )
            .set("category_id", self.category_id.map(nullable))
            .set("account_id", self.account_id.map(nullable));
        set
    }
}

impl Store {
    pub fn create_recurring_rule(
        &self,
        description: &str,
        amount: f64,
        frequency: Frequency,
        next_due: NaiveDate,
        category_id: Option<i64>,
        account_id: Option<i64>,
    ) -> Result<i64> {
        let id = self.insert(
            "INSERT INTO recurring (description, amount, frequency, next_due, category_id, account_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                description,
                amount,
                frequency,
                date_to_sql(next_due),
                category_id,
                account_id
            ],
        )?;
        log::debug!("recurring: created id {} ('{}', {})", id, description, frequency);
        Ok(id)
    }

    pub fn list_recurring_rules(&self) -> Result<Vec<RecurringRule>> {
        self.query(
            &format!("{} ORDER BY id", SELECT_RECURRING),
            [],
            RecurringRule::from_row,
        )
    }

    pub fn get_recurring_rule(&self, id: i64) -> Result<Option<RecurringRule>> {
        self.query_one(
            &format!("{} WHERE id = ?1", SELECT_RECURRING),
            params![id],
            RecurringRule::from_row,
        )
    }

    pub fn update_recurring_rule(&self, id: i64, patch: &RecurringRulePatch) -> Result<usize> {
        self.update_columns("recurring", id, patch.assignments())
    }

    /// Nothing references a recurring rule, so the delete policy never blocks this
    pub fn delete_recurring_rule(&self, id: i64) -> Result<usize> {
        self.delete_row("recurring rule", "recurring", id, &[])
    }
}
