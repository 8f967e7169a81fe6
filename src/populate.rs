// 🌱 Sample data - reset the database file and fill it with demo rows
//
// Layout of the generated data:
// - 4 accounts (one per account type)
// - 7 categories, three of them under "Utilities"
// - 5 tags, 3 monthly recurring bills
// - one transaction per day for the last 30 days, about half of them tagged

use crate::db::Store;
use crate::entities::{AccountType, Frequency};
use crate::error::Result;
use chrono::{Duration, Local, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;

const ACCOUNTS: [(&str, AccountType); 4] = [
    ("Cash Wallet", AccountType::Cash),
    ("HDFC Debit Card", AccountType::Debit),
    ("ICICI Credit Card", AccountType::Credit),
    ("Zerodha Investments", AccountType::Investment),
];

const ROOT_CATEGORIES: [&str; 4] = ["Housing", "Groceries", "Transport", "Utilities"];
const UTILITY_CATEGORIES: [&str; 3] = ["Electricity", "Water", "Internet"];

const TAGS: [&str; 5] = ["urgent", "monthly", "health", "fun", "reimbursable"];

const DESCRIPTIONS: [&str; 9] = [
    "Uber ride",
    "Amazon order",
    "Electricity bill",
    "Local grocery",
    "Cinema ticket",
    "Restaurant",
    "Bus pass",
    "Doctor visit",
    "Mobile recharge",
];

pub const SAMPLE_DAYS: i64 = 30;

/// Counts of what `populate_sample_data` inserted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateSummary {
    pub accounts: usize,
    pub categories: usize,
    pub tags: usize,
    pub recurring_rules: usize,
    pub transactions: usize,
    pub tag_links: usize,
}

/// Delete the database file (if any) and create an empty schema
pub fn reset_database(store: &Store) -> Result<()> {
    let path = store.config().database_path();
    if path.exists() {
        fs::remove_file(path)?;
        log::info!("Database '{}' deleted", path.display());
    }
    store.initialize()
}

/// Insert the demo rows into an initialized store, ending at `today`
pub fn populate_sample_data<R: Rng>(
    store: &Store,
    today: NaiveDate,
    rng: &mut R,
) -> Result<PopulateSummary> {
    let mut summary = PopulateSummary::default();

    let mut account_ids = Vec::new();
    for (name, account_type) in ACCOUNTS {
        account_ids.push(store.create_account(name, account_type)?);
    }
    summary.accounts = account_ids.len();

    let mut category_ids = Vec::new();
    for name in ROOT_CATEGORIES {
        category_ids.push(store.create_category(name, None)?);
    }
    let utilities = category_ids[3];
    for name in UTILITY_CATEGORIES {
        category_ids.push(store.create_category(name, Some(utilities))?);
    }
    summary.categories = category_ids.len();

    let mut tag_ids = Vec::new();
    for name in TAGS {
        tag_ids.push(store.create_tag(name)?);
    }
    summary.tags = tag_ids.len();

    let housing = category_ids[0];
    let internet = category_ids[6];
    let (cash, debit) = (account_ids[0], account_ids[1]);
    let bills = [
        ("Rent", 18000.0, 1, housing, debit),
        ("Internet Bill", 999.0, 2, internet, debit),
        ("Gym Membership", 1200.0, 3, housing, cash),
    ];
    let first_of_next_month = first_of_next_month(today);
    for (description, amount, day_offset, category, account) in bills {
        store.create_recurring_rule(
            description,
            amount,
            Frequency::Monthly,
            first_of_next_month + Duration::days(day_offset - 1),
            Some(category),
            Some(account),
        )?;
        summary.recurring_rules += 1;
    }

    // spending categories exclude Housing
    let spending_categories = &category_ids[1..];

    for offset in 0..SAMPLE_DAYS {
        let date = today - Duration::days(offset);
        let amount = (rng.gen_range(100.0..2000.0_f64) * 100.0).round() / 100.0;
        let description = DESCRIPTIONS.choose(rng).copied();
        let category = spending_categories.choose(rng).copied();
        let account = account_ids.choose(rng).copied();

        let tx = store.create_transaction(date, amount, description, category, account)?;
        summary.transactions += 1;

        if rng.gen_bool(0.5) {
            if let Some(&tag) = tag_ids.choose(rng) {
                summary.tag_links += store.add_tag_to_transaction(tx, tag)?;
            }
        }
    }

    log::info!(
        "Sample data populated: {} transactions over {} days",
        summary.transactions,
        SAMPLE_DAYS
    );
    Ok(summary)
}

/// Reset the file, then populate it with today's date and a thread RNG
pub fn rebuild_with_sample_data(store: &Store) -> Result<PopulateSummary> {
    reset_database(store)?;
    populate_sample_data(store, Local::now().date_naive(), &mut rand::thread_rng())
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    use chrono::Datelike;
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}
