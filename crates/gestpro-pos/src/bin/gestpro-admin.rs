//! # GestPro Admin
//!
//! Store maintenance from the command line: status, first-run setup,
//! backup export/import and the full wipe.
//!
//! ## Usage
//! ```bash
//! gestpro-admin status
//! gestpro-admin init "Ma Boutique"
//! gestpro-admin export                      # gestpro_backup_YYYY-MM-DD.json
//! gestpro-admin export ./backups/today.json
//! gestpro-admin import ./backups/today.json
//! gestpro-admin wipe --yes
//!
//! # Another config file
//! gestpro-admin --config ./pos.toml status
//! ```

use std::env;
use std::path::PathBuf;

use gestpro_core::report::RevenueSummary;
use gestpro_core::{Money, Session, StoreSettings};
use gestpro_pos::{init_tracing, PosConfig, PosTerminal};

const ADMIN_SESSION: &str = "admin";

fn print_help() {
    println!("GestPro Admin");
    println!();
    println!("Usage: gestpro-admin [--config <PATH>] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  status               Show store status and record counts");
    println!("  init [NAME]          Write default store settings");
    println!("  export [FILE]        Write a JSON backup");
    println!("  import <FILE>        Replace the store with a JSON backup");
    println!("  wipe --yes           Delete every record");
    println!("  help                 Show this help message");
}

/// Removes `--config <PATH>` from `args`. A flag with no path is an error.
fn take_config_path(args: &mut Vec<String>) -> Result<Option<PathBuf>, String> {
    let Some(pos) = args.iter().position(|a| a == "--config" || a == "-c") else {
        return Ok(None);
    };

    let flag = args.remove(pos);
    match args.get(pos) {
        Some(value) if !value.starts_with('-') => Ok(Some(PathBuf::from(args.remove(pos)))),
        _ => Err(format!("{} needs a config file path", flag)),
    }
}

/// Revenue as the tickets print money, never through a float.
fn revenue_label(summary: &RevenueSummary) -> String {
    Money::from_cents(summary.revenue_cents).to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    let config_path = match take_config_path(&mut args) {
        Ok(path) => path,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!();
            print_help();
            std::process::exit(2);
        }
    };

    let config = PosConfig::load(config_path)?;
    init_tracing(Some(&config.logging.filter));

    let command = args.first().map(String::as_str).unwrap_or("help");
    if command == "help" || command == "--help" || command == "-h" {
        print_help();
        return Ok(());
    }

    println!("Database: {}", config.database.path.display());
    let mut pos = PosTerminal::open(config, Session::new(ADMIN_SESSION, "Administrator")).await?;

    match command {
        "status" => {
            let view = pos.view();
            println!("Status:       {:?}", pos.store_status().await?);
            println!("Suppliers:    {}", view.suppliers().len());
            println!("Products:     {}", view.products().len());
            println!("Transactions: {}", view.transactions().len());
            println!("Revenue:      {}", revenue_label(&pos.revenue_summary()));
        }
        "init" => {
            let mut settings = StoreSettings::default();
            if let Some(name) = args.get(1) {
                settings.name = name.clone();
            }
            pos.initialize_store(settings).await?;
            println!("✓ Store initialized");
        }
        "export" => {
            let (default_name, json) = pos.capture_backup_json()?;
            let path = args.get(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(default_name));
            std::fs::write(&path, json)?;
            println!("✓ Backup written to {}", path.display());
        }
        "import" => {
            let Some(file) = args.get(1) else {
                eprintln!("import needs a backup file");
                std::process::exit(2);
            };
            let json = std::fs::read_to_string(file)?;
            let report = pos.restore_backup_json(&json).await?;
            println!(
                "✓ Restored {} suppliers, {} products, {} transactions ({} chunks of {})",
                report.suppliers, report.products, report.transactions, report.chunks, report.chunk_size
            );
        }
        "wipe" => {
            if !args.iter().any(|a| a == "--yes") {
                eprintln!("wipe deletes every record; pass --yes to confirm");
                std::process::exit(2);
            }
            let report = pos.wipe_store().await?;
            println!(
                "✓ Deleted {} suppliers, {} products, {} transactions",
                report.suppliers, report.products, report.transactions
            );
            println!("  Run `gestpro-admin init` before the next sale.");
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            std::process::exit(2);
        }
    }

    pos.database().close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_flag_with_path() {
        let mut argv = args(&["--config", "./pos.toml", "status"]);
        assert_eq!(take_config_path(&mut argv), Ok(Some(PathBuf::from("./pos.toml"))));
        assert_eq!(argv, args(&["status"]));

        let mut argv = args(&["export", "-c", "alt.toml"]);
        assert_eq!(take_config_path(&mut argv), Ok(Some(PathBuf::from("alt.toml"))));
        assert_eq!(argv, args(&["export"]));
    }

    #[test]
    fn test_config_flag_without_path_is_error() {
        let mut argv = args(&["status", "--config"]);
        assert!(take_config_path(&mut argv).is_err());

        let mut argv = args(&["--config", "--yes"]);
        assert!(take_config_path(&mut argv).is_err());
    }

    #[test]
    fn test_no_config_flag() {
        let mut argv = args(&["wipe", "--yes"]);
        assert_eq!(take_config_path(&mut argv), Ok(None));
        assert_eq!(argv, args(&["wipe", "--yes"]));
    }

    #[test]
    fn test_revenue_label_is_exact() {
        let summary = RevenueSummary {
            revenue_cents: 123_456_789_01,
            vat_cents: 0,
            net_cents: 0,
            sales_count: 3,
        };
        assert_eq!(revenue_label(&summary), "123456789.01 €");
    }
}
