//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `expensary_core` linkage.
//! - Walk one add/lookup/remove cycle against a scratch store file.

use expensary_core::{Expense, ExpenseRepository, JsonExpenseRepository};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("expensary_core version={}", expensary_core::core_version());

    // Process-unique scratch path so repeated runs never see stale state.
    let store_path =
        std::env::temp_dir().join(format!("expensary-smoke-{}.json", std::process::id()));

    let mut store = JsonExpenseRepository::open(&store_path)?;
    let expense = Expense::new("Groceries", 50.0)?;
    let id = store.add(expense, false)?;
    println!("added count={}", store.expenses().len());

    let matches = store.find_by_title("groceries");
    println!("found_by_title count={}", matches.len());

    let removed = store.remove(id)?;
    println!("removed={removed}");

    let reopened = JsonExpenseRepository::open(&store_path)?;
    println!("reopened count={}", reopened.expenses().len());

    std::fs::remove_file(&store_path)?;
    Ok(())
}
