//! Command-line entry point.
//!
//! # Responsibility
//! - Without a subcommand, print a deterministic ping of `orgledger_core`
//!   linkage.
//! - `history <EMPLOYEE_ID>` prints one employee's closed assignment
//!   periods as JSON lines, oldest first.

use clap::{Parser, Subcommand};
use log::error;
use orgledger_core::db::open_db;
use orgledger_core::{CoreConfig, EmployeeId, EmployeeService, HistoryWriter, SqliteRecordStore};
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(name = "orgledger_cli")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the assignment history of one employee as JSON lines.
    History {
        /// Identifier of the employee.
        employee_id: i64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            println!("orgledger_core ping={}", orgledger_core::ping());
            println!("orgledger_core version={}", orgledger_core::core_version());
            Ok(())
        }
        Some(Commands::History { employee_id }) => print_history(EmployeeId(employee_id)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn print_history(id: EmployeeId) -> Result<(), String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    config.init_logging()?;

    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let store = SqliteRecordStore::try_new(&conn).map_err(|err| err.to_string())?;
    let service = EmployeeService::new(store, HistoryWriter::new(config.history_clock()));

    let records = service.employee_history(id).map_err(|err| {
        error!("event=cli_history module=cli status=error employee_id={id} error={err}");
        err.to_string()
    })?;
    for record in &records {
        let line = serde_json::to_string(record).map_err(|err| err.to_string())?;
        println!("{line}");
    }
    Ok(())
}
