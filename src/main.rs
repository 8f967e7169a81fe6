use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use finance_tracker::{
    populate::rebuild_with_sample_data, Config, Reporter, Store, DEFAULT_DATABASE_PATH,
};

#[derive(Parser)]
#[command(
    name = "finance-tracker",
    version,
    about = "Personal finance tracker: accounts, categories, transactions and monthly spending reports"
)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, default_value = DEFAULT_DATABASE_PATH)]
    database: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every report and write the monthly chart (default)
    Report,

    /// Create missing tables, keeping existing data
    Init,

    /// Delete the database, recreate it and insert sample data
    Populate,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::new(cli.database);

    match cli.command.unwrap_or(Commands::Report) {
        Commands::Report => run_report(config)?,
        Commands::Init => run_init(config)?,
        Commands::Populate => run_populate(config)?,
    }

    Ok(())
}

fn run_report(config: Config) -> Result<()> {
    if !config.database_path().exists() {
        eprintln!("❌ Database not found: {}", config.database_path().display());
        eprintln!("   Run: finance-tracker populate");
        std::process::exit(1);
    }

    let reporter = Reporter::new(config);
    reporter
        .run_all_analyses()
        .context("Failed to produce the spending report")?;

    println!("\n✓ Chart written to {}", reporter.config().chart_path().display());
    Ok(())
}

fn run_init(config: Config) -> Result<()> {
    let store = Store::new(config);
    store.initialize().context("Failed to initialize database")?;

    println!(
        "✓ Initialized database '{}' with all tables",
        store.config().database_path().display()
    );
    Ok(())
}

fn run_populate(config: Config) -> Result<()> {
    if let Some(dir) = config.chart_path().parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create chart directory {}", dir.display()))?;
        }
    }

    let store = Store::new(config);
    let summary = rebuild_with_sample_data(&store).context("Failed to populate sample data")?;

    println!("🌱 Sample data populated successfully.");
    println!("   Accounts:        {}", summary.accounts);
    println!("   Categories:      {}", summary.categories);
    println!("   Tags:            {}", summary.tags);
    println!("   Recurring rules: {}", summary.recurring_rules);
    println!("   Transactions:    {}", summary.transactions);
    println!("   Tag links:       {}", summary.tag_links);
    Ok(())
}
