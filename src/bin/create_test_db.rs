use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::OffsetDateTime;

use centsible::{PasswordHash, ValidatedPassword, initialize_db};

/// A utility for creating a demo database for the centsible server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// How many months of demo data to generate, ending at the current month.
const SEED_MONTHS: usize = 6;

/// Expense rows inserted for each seeded month.
const MONTHLY_EXPENSES: [(f64, &str, &str); 6] = [
    (-1450.00, "Rent", "housing"),
    (-96.40, "Groceries", "food"),
    (-54.99, "Dinner out", "food"),
    (-62.50, "Gas", "transport"),
    (-89.99, "Electric bill", "utilities"),
    (-15.99, "Streaming subscription", "entertainment"),
];

/// Budget rows inserted for each seeded month.
const MONTHLY_BUDGETS: [(&str, f64); 4] = [
    ("food", 400.0),
    ("housing", 1500.0),
    ("transport", 150.0),
    ("entertainment", 100.0),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    conn.execute(
        "INSERT INTO user (password) VALUES (?1)",
        (password_hash.as_ref(),),
    )?;

    println!("Seeding demo transactions and budgets...");

    for (months_ago, (month, year)) in recent_months().into_iter().enumerate() {
        conn.execute(
            "INSERT INTO \"transaction\" (amount, description, month, year, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (3200.0, "Salary", month, year, "income"),
        )?;

        for (index, (amount, description, category_id)) in MONTHLY_EXPENSES.into_iter().enumerate()
        {
            // Vary the amounts a little from month to month so the charts
            // have some shape to them.
            let amount = amount - (months_ago * 3 + index * 7) as f64;
            conn.execute(
                "INSERT INTO \"transaction\" (amount, description, month, year, category_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (amount, description, month, year, category_id),
            )?;
        }

        for (category_id, amount) in MONTHLY_BUDGETS {
            conn.execute(
                "INSERT INTO budget (category_id, amount, month, year)
                 VALUES (?1, ?2, ?3, ?4)",
                (category_id, amount, month, year),
            )?;
        }
    }

    println!("Success!");

    Ok(())
}

/// The current month and the months before it, newest first.
fn recent_months() -> Vec<(u8, i32)> {
    let today = OffsetDateTime::now_utc().date();
    let mut month = u8::from(today.month());
    let mut year = today.year();

    let mut months = Vec::with_capacity(SEED_MONTHS);
    for _ in 0..SEED_MONTHS {
        months.push((month, year));

        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }

    months
}
