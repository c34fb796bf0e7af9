//! Export binary checkpoint to SQLite database.
//!
//! Usage: export_sqlite [input.bin] [output.db]
//!
//! Converts the solver checkpoint to a SQLite table for on-demand lookups
//! by canonical position.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use british_solver::checkpoint::Checkpoint;
use clap::Parser;
use log::info;
use rusqlite::{params, Connection};

#[derive(Parser, Debug)]
#[command(name = "export_sqlite", about = "Export a solver checkpoint to SQLite")]
struct Args {
    /// Binary checkpoint written by `british --memo`
    #[arg(default_value = "data/british.bin")]
    input: PathBuf,

    /// SQLite database to create (replaced if present)
    #[arg(default_value = "data/tablebase.db")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Binary to SQLite Exporter");
    println!("=========================");
    println!("Input:  {:?}", args.input);
    println!("Output: {:?}", args.output);
    println!();

    let start = Instant::now();
    let checkpoint = Checkpoint::load(&args.input)
        .with_context(|| format!("loading checkpoint {:?}", args.input))?;
    info!(
        "Loaded {} positions in {:.2}s",
        checkpoint.entries.len(),
        start.elapsed().as_secs_f64()
    );

    if args.output.exists() {
        std::fs::remove_file(&args.output)
            .with_context(|| format!("removing old {:?}", args.output))?;
    }

    let start = Instant::now();
    let mut conn = Connection::open(&args.output)
        .with_context(|| format!("creating database {:?}", args.output))?;

    conn.execute(
        "CREATE TABLE positions (
            canonical INTEGER PRIMARY KEY,
            score INTEGER NOT NULL
        )",
        [],
    )?;

    // One transaction for all inserts
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare("INSERT INTO positions (canonical, score) VALUES (?1, ?2)")?;
        for (canonical, score) in &checkpoint.entries {
            stmt.execute(params![*canonical as i64, *score as i32])?;
        }
    }
    tx.commit()?;

    let insert_time = start.elapsed().as_secs_f64();
    info!(
        "Inserted {} positions in {:.2}s",
        checkpoint.entries.len(),
        insert_time
    );

    // Spot-check a handful of rows
    let step = (checkpoint.entries.len() / 5).max(1);
    for (canonical, expected) in checkpoint.entries.iter().step_by(step).take(5) {
        let score: i32 = conn.query_row(
            "SELECT score FROM positions WHERE canonical = ?1",
            params![*canonical as i64],
            |row| row.get(0),
        )?;
        ensure!(
            score == *expected as i32,
            "score mismatch for position {:#x}: {} != {}",
            canonical,
            score,
            expected
        );
    }
    println!("Verification passed!");

    let input_size = std::fs::metadata(&args.input).map(|m| m.len()).unwrap_or(0);
    let output_size = std::fs::metadata(&args.output).map(|m| m.len()).unwrap_or(0);
    println!("\nFile sizes:");
    println!("  Binary: {:.1} KB", input_size as f64 / 1024.0);
    println!("  SQLite: {:.1} KB", output_size as f64 / 1024.0);
    println!("\nDone! Database created at {:?}", args.output);
    Ok(())
}
