//! Log in and print a token for later commands.
//!
//! ```bash
//! export SM_ADMIN_TOKEN=$(sm-cli login -e ana@segundamana.org)
//! ```

use std::io::{BufRead, Write};

use secrecy::SecretString;

use segunda_mana_core::session::AdminSession;

use super::{CliError, backend};

/// Prompt for the password, log in and write the token to stdout.
///
/// The prompt goes to stderr so the token can be captured on its own.
///
/// # Errors
///
/// Returns an error if the backend rejects the credentials.
pub async fn login(email: &str) -> Result<(), CliError> {
    let client = backend()?;
    let password = read_password()?;

    let response = client.login(email.trim(), &password).await?;
    let session = AdminSession::from_login(response);
    tracing::info!(role = %session.role, "Logged in as {}", session.user.full_name);

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", session.token.expose())?;
    Ok(())
}

fn read_password() -> Result<SecretString, CliError> {
    let mut stderr = std::io::stderr().lock();
    write!(stderr, "Password: ")?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(SecretString::from(line.trim_end_matches(['\r', '\n']).to_owned()))
}
