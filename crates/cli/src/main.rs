//! # CLI — RiptideKV Interactive Shell
//!
//! A minimal REPL-style command-line interface over [`db::Db`]. Reads
//! commands from stdin, executes them against the database, and prints
//! results to stdout. The storage engine is out of scope for this
//! specification's CLI/REPL richness (see `db`'s crate docs) — this binary
//! exists only to exercise the façade interactively.
//!
//! ## Commands
//!
//! ```text
//! PUT key value      Insert or overwrite a key-value pair
//! GET key            Look up a key (prints value, "(deleted)", or "(nil)")
//! DEL key            Delete a key (writes a tombstone)
//! CONTAINS key       Print whether the key is currently visible
//! LEN                Print the number of distinct visible keys
//! FLUSH              Force flush memtable to new segment(s)
//! STATS              Print database debug info
//! EXIT / QUIT        Shut down gracefully
//! ```
//!
//! ## Configuration
//!
//! All settings are controlled via environment variables:
//!
//! ```text
//! RIPTIDE_PATH              Segment directory      (default: "sst_data")
//! RIPTIDE_MAX_INMEMORY_SIZE Memtable capacity       (default: 1000)
//! RIPTIDE_SEGMENT_SIZE      Entries per segment     (default: 1000)
//! RIPTIDE_SPARSE_OFFSET     Sparse index period     (default: 100)
//! RIPTIDE_MERGE_THRESHOLD   Compaction trigger      (default: 10)
//! ```
use anyhow::Result;
use config::DbConfig;
use db::{Db, DbError};
use std::io::{self, BufRead, Write};

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn config_from_env() -> DbConfig {
    DbConfig::default()
        .with_path(env_or("RIPTIDE_PATH", "sst_data"))
        .with_max_inmemory_size(parse_env_or("RIPTIDE_MAX_INMEMORY_SIZE", 1000))
        .with_segment_size(parse_env_or("RIPTIDE_SEGMENT_SIZE", 1000))
        .with_sparse_offset(parse_env_or("RIPTIDE_SPARSE_OFFSET", 100))
        .with_merge_threshold(parse_env_or("RIPTIDE_MERGE_THRESHOLD", 10))
}

fn main() -> Result<()> {
    let config = config_from_env();
    let mut db = Db::open(config)?;

    println!(
        "RiptideKV started ({:?}, segment_count={})",
        db.config(),
        db.segment_count()
    );
    println!("Commands: PUT key value | GET key | DEL key | CONTAINS key | LEN");
    println!("          FLUSH | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "PUT" => {
                    if let Some(k) = parts.next() {
                        let v: String = parts.collect::<Vec<&str>>().join(" ");
                        if v.is_empty() {
                            println!("ERR usage: PUT key value");
                        } else {
                            match db.put(k.as_bytes().to_vec(), v.as_bytes().to_vec()) {
                                Ok(()) => println!("OK"),
                                Err(e) => println!("ERR put failed: {}", e),
                            }
                        }
                    } else {
                        println!("ERR usage: PUT key value");
                    }
                }
                "GET" => {
                    if let Some(k) = parts.next() {
                        match db.get(k.as_bytes()) {
                            Ok(v) => println!("{}", String::from_utf8_lossy(&v)),
                            Err(DbError::KeyDeleted) => println!("(deleted)"),
                            Err(DbError::KeyNotFound) => println!("(nil)"),
                            Err(e) => println!("ERR get failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: GET key");
                    }
                }
                "DEL" => {
                    if let Some(k) = parts.next() {
                        match db.delete(k.as_bytes().to_vec()) {
                            Ok(()) => println!("OK"),
                            Err(e) => println!("ERR del failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: DEL key");
                    }
                }
                "CONTAINS" => {
                    if let Some(k) = parts.next() {
                        match db.contains(k.as_bytes()) {
                            Ok(b) => println!("{}", b),
                            Err(e) => println!("ERR contains failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: CONTAINS key");
                    }
                }
                "LEN" => match db.len() {
                    Ok(n) => println!("{}", n),
                    Err(e) => println!("ERR len failed: {}", e),
                },
                "FLUSH" => match db.flush() {
                    Ok(()) => println!("OK (segment_count={})", db.segment_count()),
                    Err(e) => println!("ERR flush failed: {}", e),
                },
                "STATS" => {
                    println!("{:?}", db);
                }
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}
