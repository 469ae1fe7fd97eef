//! Full dump and CSV export of a small SQLite database
//!
//! This example demonstrates:
//! - Listing the tables available for export
//! - Writing a full SQL dump
//! - Exporting one table to CSV
//! - Telling an unknown table apart from other failures
//!
//! Run with: cargo run --example backup_sqlite

use rust_backup_system::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Rust Backup System - SQLite Example ===\n");

    let workdir = std::env::temp_dir().join("rust_backup_system_demo");
    std::fs::create_dir_all(&workdir).map_err(|e| BackupError::write(&workdir, e))?;
    let db_path = workdir.join("shop.db");
    let _ = std::fs::remove_file(&db_path);

    // Seed a database the way an application would
    {
        let conn = rusqlite::Connection::open(&db_path)
            .map_err(|e| BackupError::connection_with_source("seed", e))?;
        conn.execute_batch(
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, name TEXT NOT NULL, price REAL);
             INSERT INTO orders VALUES (1, 'Widget', 9.99);
             INSERT INTO orders VALUES (2, 'O''Brien''s Tea', 4.5);
             INSERT INTO orders VALUES (3, 'Gadget', NULL);
             CREATE TABLE log (id INTEGER PRIMARY KEY, message TEXT);",
        )
        .map_err(|e| BackupError::query_with_source("seed", e))?;
    }

    let config = ConnectionConfig::builder(DatabaseType::Sqlite)
        .database(db_path.to_string_lossy())
        .build()?;
    let settings = BackupSettings {
        output_dir: workdir.join("backups"),
    };

    println!("1. Available tables:");
    for table in available_tables(&config).await? {
        println!("   - {}", table);
    }

    println!("\n2. Full SQL dump...");
    let dump = full_backup(&config, &settings, DumpOptions::default()).await?;
    for table in &dump.tables {
        println!("   {:<10} {:>4} rows", table.name, table.rows);
    }
    println!("   ✓ {}\n", dump.path.display());

    println!("3. CSV export of `orders`...");
    let export = export_table(&config, &settings, "orders").await?;
    println!("   ✓ {} ({} rows)\n", export.path.display(), export.rows);

    println!("4. CSV export of a table that does not exist...");
    match export_table(&config, &settings, "customers").await {
        Err(e) if e.kind() == ErrorKind::UnknownTable => println!("   ✓ rejected: {}", e),
        Err(e) => return Err(e),
        Ok(artifact) => println!("   unexpected artifact {}", artifact.path.display()),
    }

    println!("\n=== Example completed ===");
    Ok(())
}
