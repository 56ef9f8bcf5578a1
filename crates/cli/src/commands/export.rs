//! CSV exports, the same documents the admin panel downloads.
//!
//! ```bash
//! sm-cli export orders -q cubao -o orders.csv
//! sm-cli export collection --branch Cubao --date 2024-07-01
//! ```

use std::io::Write;
use std::path::Path;

use clap::ValueEnum;

use segunda_mana_core::{CollectionError, csv};
use segunda_mana_core::listing::search;

use super::{CliError, backend, token};

/// What to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
    Orders,
    Inventory,
    Products,
    Beneficiaries,
    Activity,
    /// Saved daily collection sheets for one branch and date.
    Collection,
}

/// Options shared by every export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions<'a> {
    /// List search, as typed in the admin search box.
    pub query: &'a str,
    pub branch: Option<&'a str>,
    pub date: Option<&'a str>,
}

/// Build the CSV for `kind` and write it to `output`, or stdout.
///
/// # Errors
///
/// Returns an error if the backend call fails, there is nothing to export
/// or the output cannot be written.
pub async fn export(
    kind: ExportKind,
    options: ExportOptions<'_>,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let client = backend()?;
    let token = token()?;
    let api = client.authed(&token);
    let query = options.query;

    let document = match kind {
        ExportKind::Orders => csv::orders(&search(api.orders().await?, query))?,
        ExportKind::Inventory => csv::inventory(&search(api.inventory().await?, query))?,
        ExportKind::Products => csv::products(&search(api.products().await?, query))?,
        ExportKind::Beneficiaries => {
            csv::beneficiaries(&search(api.beneficiaries().await?, query))?
        }
        ExportKind::Activity => csv::activity(&search(api.activity().await?, query))?,
        ExportKind::Collection => {
            let branch = options.branch.map(str::trim).unwrap_or_default();
            let date = options.date.map(str::trim).unwrap_or_default();
            if branch.is_empty() || date.is_empty() {
                return Err(CollectionError::MissingBranchOrDate.into());
            }
            csv::daily_collections(&api.collections_for(branch, date).await?)?
        }
    };

    match output {
        Some(path) => {
            tokio::fs::write(path, document.as_bytes()).await?;
            tracing::info!(path = %path.display(), "Export written");
        }
        None => std::io::stdout().lock().write_all(document.as_bytes())?,
    }
    Ok(())
}
