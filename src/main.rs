//! order-distributor CLI
//!
//! 引数は取りません。カレントディレクトリに`order-distributor.json`があれば
//! 設定として読み込み、なければ既定の設定で実行します。

use std::path::Path;
use std::process;
use tracing::info;

use order_distributor::{logging, DistributionSummary, DistributorBuilder, DistributorError};

const CONFIG_FILE: &str = "order-distributor.json";

fn main() {
    logging::init();

    match run() {
        Ok(summary) => {
            if let Ok(json) = serde_json::to_string(&summary) {
                info!(summary = %json, "run summary");
            }
            println!(
                "Distribution completed: {} orders -> {} rows ({})",
                summary.input_rows,
                summary.output_rows,
                summary.output_path.as_deref().unwrap_or("-")
            );
        }
        Err(e) => {
            handle_error(e);
            process::exit(1);
        }
    }
}

fn run() -> Result<DistributionSummary, DistributorError> {
    let builder = if Path::new(CONFIG_FILE).exists() {
        info!(path = CONFIG_FILE, "using configuration file");
        DistributorBuilder::from_json_file(CONFIG_FILE)?
    } else {
        DistributorBuilder::new()
    };

    builder.build()?.run()
}

fn handle_error(error: DistributorError) {
    match error {
        DistributorError::Io(io_err) => {
            eprintln!("I/O Error: {}", io_err);
            eprintln!("Please check that the files exist and you have permission to access them.");
        }
        DistributorError::Parse(parse_err) => {
            eprintln!("Parse Error: {}", parse_err);
            eprintln!("The file may not be a valid Excel file or may be corrupted.");
        }
        DistributorError::Write(write_err) => {
            eprintln!("Write Error: {}", write_err);
            eprintln!("The result workbook could not be created.");
        }
        DistributorError::FileNotFound { role, path } => {
            eprintln!("Missing {} file: {}", role, path);
            eprintln!("Place the file in the working directory or set its path in {}.", CONFIG_FILE);
        }
        DistributorError::MissingColumn { table, column } => {
            eprintln!("Missing Column:");
            eprintln!("  Table: {}", table);
            eprintln!("  Column: {}", column);
        }
        DistributorError::EmptyWorkbook => {
            eprintln!("Empty Workbook: the first sheet has no header row.");
        }
        DistributorError::Config(msg) => {
            eprintln!("Configuration Error: {}", msg);
        }
        DistributorError::ConfigFile(json_err) => {
            eprintln!("Configuration File Error: {}", json_err);
            eprintln!("Please check that {} is valid JSON.", CONFIG_FILE);
        }
        DistributorError::SecurityViolation(msg) => {
            eprintln!("Security Violation: {}", msg);
            eprintln!("The input file exceeds the configured size limit.");
        }
    }
}
