use std::env;
use std::path::PathBuf;

use tripboard::app::store::{Store, StoreResult};
use tripboard::config::load_config;

fn main() -> StoreResult<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: cargo run --bin store_explorer [--db path] [--backup dest.db]");
        return Ok(());
    }
    let flag = |name: &str| {
        args.iter()
            .position(|a| a == name)
            .and_then(|i| args.get(i + 1))
            .map(PathBuf::from)
    };

    let db_path = flag("--db").unwrap_or_else(|| load_config().store_path());
    println!("Opening trip store: {}", db_path.display());
    let store = Store::open(&db_path)?;

    println!("--- Tables ---");
    for (table, count) in store.table_counts()? {
        println!("{table:<16} {count:>6}");
    }

    let trip = store.trip()?;
    if !trip.name.is_empty() {
        println!(
            "Trip: {} ({} .. {})",
            trip.name,
            trip.start_date.as_deref().unwrap_or("?"),
            trip.end_date.as_deref().unwrap_or("?")
        );
    }

    if let Some(dest) = flag("--backup") {
        store.backup_to(&dest)?;
        println!("Backup written to {}", dest.display());
    }
    Ok(())
}
