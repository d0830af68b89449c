use std::{
    error::Error,
    io::{self},
    path::Path,
    process::exit,
};

use clap::Parser;
use rusqlite::Connection;

use centsible::{PasswordHash, User, UserID, ValidatedPassword, get_user_by_id};

/// A utility for changing the password for the registered user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file.
    #[arg(long)]
    db_path: String,
}

/// Reset the password for the registered user.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);
    validate_db_path(db_path);

    println!("Loading user from {db_path:#?}");
    let mut conn = Connection::open(db_path)
        .unwrap_or_else(|_| panic!("Could not open the database at {db_path:?}"));

    let user = get_user_by_id(UserID::new(1), &conn)
        .unwrap_or_else(|_| panic!("Could not get user with ID=1 in {db_path:?}"));
    println!("Resetting password for user {}", user.id);

    let password_hash = match get_new_password_hash() {
        Some(password_hash) => password_hash,
        None => return Ok(()),
    };
    update_password(&mut conn, &user, password_hash)?;

    Ok(())
}

fn validate_db_path(db_path: &Path) {
    let has_extension = db_path
        .extension()
        .is_some_and(|extension| !extension.is_empty());

    if !has_extension {
        print_error("Database path must include a file extension (e.g. 'finances.db').");
        exit(1);
    }

    if !db_path.is_file() {
        eprintln!("No database file at {db_path:#?}!");
        exit(1);
    }
}

/// Prompts for a password without echoing it. Returns `None` when stdin is
/// closed or unreadable.
fn prompt_password(prompt: &str) -> Option<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Some(password),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read the password from stdin: {error}"));
            None
        }
    }
}

fn get_new_password_hash() -> Option<PasswordHash> {
    loop {
        println!();

        let password = prompt_password("Enter a new password: ")?;
        if let Err(error) = ValidatedPassword::new(&password) {
            print_error(error);
            continue;
        }

        let repeated = prompt_password("Enter the same password again: ")?;
        if password != repeated {
            print_error("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::from_raw_password(&password, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => print_error(format!("Could not hash the password: {error}. Try again.")),
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", capitalise(&error.to_string()))
}

/// From https://crates.io/crates/capitalize
fn capitalise(string: &str) -> String {
    let mut chars = string.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn update_password(
    conn: &mut Connection,
    user: &User,
    password: PasswordHash,
) -> Result<(), rusqlite::Error> {
    let transaction = conn.transaction()?;

    let rows_affected = transaction.execute(
        "UPDATE user SET password = ?1 WHERE user.id = ?2;",
        (password.as_ref(), &user.id.as_i64()),
    )?;

    if rows_affected != 1 {
        print_error(format!(
            "Updating the password affected {rows_affected} user(s), expected 1. Rolling back..."
        ));
        transaction.rollback()?;
        return Err(rusqlite::Error::StatementChangedRows(rows_affected));
    }

    transaction.commit()?;

    println!("Password updated successfully!");

    Ok(())
}
