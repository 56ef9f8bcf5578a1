//! Segunda Mana CLI - back-office chores without the browser.
//!
//! # Usage
//!
//! ```bash
//! # Log in and keep the token for later commands
//! export SM_ADMIN_TOKEN=$(sm-cli login -e ana@segundamana.org)
//!
//! # Export a list as CSV
//! sm-cli export orders -q cubao -o orders.csv
//!
//! # Move an order along
//! sm-cli order-status 65a1f0 received
//! ```
//!
//! # Commands
//!
//! - `login` - Exchange email and password for a token
//! - `export` - Write a CSV export
//! - `order-status` - Change an order's fulfilment status

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::export::{ExportKind, ExportOptions};

mod commands;

#[derive(Parser)]
#[command(name = "sm-cli")]
#[command(author, version, about = "Segunda Mana CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print a token for `SM_ADMIN_TOKEN`
    Login {
        /// Admin email address
        #[arg(short, long)]
        email: String,
    },
    /// Export a list as CSV
    Export {
        #[arg(value_enum)]
        kind: ExportKind,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only rows matching this search
        #[arg(short, long, default_value = "")]
        query: String,

        /// Branch, for `collection`
        #[arg(long)]
        branch: Option<String>,

        /// Date (YYYY-MM-DD), for `collection`
        #[arg(long)]
        date: Option<String>,
    },
    /// Change an order's fulfilment status
    OrderStatus {
        /// Order id
        id: String,

        /// `to-receive`, `received` or `cancelled`
        status: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sm_cli=info,segunda_mana_admin=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Login { email } => commands::auth::login(&email).await?,
        Commands::Export {
            kind,
            output,
            query,
            branch,
            date,
        } => {
            let options = ExportOptions {
                query: &query,
                branch: branch.as_deref(),
                date: date.as_deref(),
            };
            commands::export::export(kind, options, output.as_deref()).await?;
        }
        Commands::OrderStatus { id, status } => {
            commands::orders::set_status(&id, &status).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_export_with_search_and_output() {
        let cli = Cli::try_parse_from([
            "sm-cli", "export", "orders", "-q", "cubao", "-o", "orders.csv",
        ])
        .unwrap();
        match cli.command {
            Commands::Export {
                kind,
                output,
                query,
                ..
            } => {
                assert_eq!(kind, ExportKind::Orders);
                assert_eq!(output, Some(PathBuf::from("orders.csv")));
                assert_eq!(query, "cubao");
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn test_rejects_unknown_export_kind() {
        assert!(Cli::try_parse_from(["sm-cli", "export", "customers"]).is_err());
    }

    #[test]
    fn test_parses_order_status() {
        let cli = Cli::try_parse_from(["sm-cli", "order-status", "65a1f0", "received"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::OrderStatus { ref id, ref status } if id == "65a1f0" && status == "received"
        ));
    }
}
