//! Command-line entry point for the CRM record operations.
//!
//! # Responsibility
//! - Open a record store (file or in-memory) and run one operation.
//! - Print results in a stable `key=value` shape for quick checks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crm_core::db::{open_db, open_db_in_memory};
use crm_core::{
    AccountService, Contact, ContactService, LoggingConfig, RecordStore, SqliteRecordStore,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "crm_cli", version, about = "Run CRM record operations against a local store")]
struct Cli {
    /// SQLite database file; an in-memory store is used when omitted.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rotating log files; logging is off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, global = true, default_value = crm_core::default_log_level())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the core linkage probe.
    Ping,
    /// Create the sample default account.
    DefaultAccount,
    /// Find an account by name, creating it when missing.
    FindOrCreateAccount { name: String },
    /// Create contacts with the given last names and link each to its account.
    LinkContacts {
        #[arg(required = true)]
        last_names: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let config = LoggingConfig::new(log_dir).with_level(cli.log_level.as_str());
        crm_core::init_logging(&config)
            .map_err(anyhow::Error::msg)
            .context("failed to initialize logging")?;
    }

    let conn = match &cli.db {
        Some(path) => open_db(path)
            .with_context(|| format!("failed to open database `{}`", path.display()))?,
        None => open_db_in_memory().context("failed to open in-memory database")?,
    };
    let store = SqliteRecordStore::try_new(&conn).context("record store is not ready")?;

    run(&cli.command, &store)
}

fn run(command: &Command, store: &impl RecordStore) -> Result<()> {
    match command {
        Command::Ping => {
            println!("crm_core ping={}", crm_core::ping());
            println!("crm_core version={}", crm_core::core_version());
        }
        Command::DefaultAccount => {
            let id = AccountService::new(store)
                .create_default_account()
                .context("failed to create default account")?;
            println!("account_id={id}");
        }
        Command::FindOrCreateAccount { name } => {
            let account = AccountService::new(store)
                .find_or_create_account(name)
                .context("failed to find or create account")?;
            let id = account.id.map(|id| id.to_string()).unwrap_or_default();
            println!(
                "account_id={id} description={}",
                account.description.as_deref().unwrap_or_default()
            );
        }
        Command::LinkContacts { last_names } => {
            let mut contacts: Vec<Contact> = last_names.iter().map(Contact::new).collect();
            ContactService::new(store)
                .link_contacts_to_accounts(&mut contacts)
                .context("failed to link contacts to accounts")?;
            for contact in &contacts {
                let contact_id = contact.id.map(|id| id.to_string()).unwrap_or_default();
                let account_id = contact
                    .account_id
                    .map(|id| id.to_string())
                    .unwrap_or_default();
                println!(
                    "contact_id={contact_id} last_name={} account_id={account_id}",
                    contact.last_name
                );
            }
        }
    }
    Ok(())
}
