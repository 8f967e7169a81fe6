// 💳 Account Entity - where money lives (wallet, card, brokerage)
//
// Referenced by transactions and recurring rules through account_id.
// Deleting an account never touches those rows; see DeletePolicy.

use crate::db::{Assignments, Store};
use crate::error::{Error, Result};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{params, Row, ToSql};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ACCOUNT TYPE
// ============================================================================

/// Allowed values of `accounts.type` (enforced by a CHECK constraint)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Cash,
    Credit,
    Debit,
    Investment,
}

impl AccountType {
    pub const ALL: [AccountType; 4] = [
        AccountType::Cash,
        AccountType::Credit,
        AccountType::Debit,
        AccountType::Investment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Cash => "cash",
            AccountType::Credit => "credit",
            AccountType::Debit => "debit",
            AccountType::Investment => "investment",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cash" => Ok(AccountType::Cash),
            "credit" => Ok(AccountType::Credit),
            "debit" => Ok(AccountType::Debit),
            "investment" => Ok(AccountType::Investment),
            other => Err(Error::ConstraintViolation(format!(
                "invalid account type '{}': expected cash, credit, debit or investment",
                other
            ))),
        }
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

// ============================================================================
// ACCOUNT ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub account_type: AccountType,
}

impl Account {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Account {
            id: row.get(0)?,
            name: row.get(1)?,
            account_type: row.get(2)?,
        })
    }
}

/// Partial update: only `Some` fields are written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
}

impl AccountPatch {
    pub fn name(name: impl Into<String>) -> Self {
        AccountPatch {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn account_type(account_type: AccountType) -> Self {
        AccountPatch {
            account_type: Some(account_type),
            ..Default::default()
        }
    }

    fn assignments(&self) -> Assignments {
        let mut set = Assignments::new();
        set.set("name", self.name.clone().map(Value::from))
            .set(
                "type",
                self.account_type.map(|t| Value::from(t.as_str().to_string())),
            );
        set
    }
}

// ============================================================================
// STORE OPERATIONS
// ============================================================================

impl Store {
    pub fn create_account(&self, name: &str, account_type: AccountType) -> Result<i64> {
        let id = self.insert(
            "INSERT INTO accounts (name, type) VALUES (?1, ?2)",
            params![name, account_type],
        )?;
        log::debug!("accounts: created id {} ('{}', {})", id, name, account_type);
        Ok(id)
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        self.query(
            "SELECT id, name, type FROM accounts ORDER BY id",
            [],
            Account::from_row,
        )
    }

    pub fn get_account(&self, id: i64) -> Result<Option<Account>> {
        self.query_one(
            "SELECT id, name, type FROM accounts WHERE id = ?1",
            params![id],
            Account::from_row,
        )
    }

    /// Returns rows affected; a missing id is a silent no-op
    pub fn update_account(&self, id: i64, patch: &AccountPatch) -> Result<usize> {
        self.update_columns("accounts", id, patch.assignments())
    }

    pub fn delete_account(&self, id: i64) -> Result<usize> {
        self.delete_row(
            "account",
            "accounts",
            id,
            &[("transactions", "account_id"), ("recurring", "account_id")],
        )
    }
}
