//! Local conversation probe.
//!
//! # Responsibility
//! - Wire `rotina_core` end to end without a real messaging channel: each
//!   stdin line is handled as an inbound message from one fixed identity
//!   and the reply is delivered through the console sender.

use chrono::Local;
use rotina_core::db::{open_db, open_db_in_memory};
use rotina_core::{
    Assistant, ConsoleSender, CoreConfig, MessageSender, OutboundResponse, SqliteTaskRepository,
    SqliteUserRepository, UserLocks,
};
use std::error::Error;
use std::io::{self, BufRead, Write};

const LOCAL_IDENTITY: &str = "local-user";

fn main() {
    if let Err(err) = run() {
        eprintln!("rotina_cli: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env();
    if let Some(log_dir) = &config.log_dir {
        rotina_core::init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };

    let assistant = Assistant::new(
        SqliteUserRepository::new(&conn),
        SqliteTaskRepository::new(&conn),
    );
    let locks = UserLocks::new();
    let sender = ConsoleSender;

    println!(
        "rotina_core {} — digite uma mensagem (Ctrl-D para sair)",
        rotina_core::core_version()
    );

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let response = locks.with(LOCAL_IDENTITY, || {
            assistant.handle_message(
                LOCAL_IDENTITY,
                LOCAL_IDENTITY,
                line.trim_end(),
                Local::now().naive_local(),
            )
        })?;

        match response {
            OutboundResponse::Ignored { reason } => {
                println!("(mensagem ignorada: {reason})");
            }
            other => {
                if let Some(text) = other.text() {
                    sender.send(LOCAL_IDENTITY, text)?;
                }
            }
        }
    }

    Ok(())
}
