//! Order fulfilment from the command line.

use segunda_mana_core::{OrderId, OrderStatus};

use super::{CliError, backend, token};

/// Move order `id` to `status` (`to-receive`, `received` or `cancelled`).
///
/// # Errors
///
/// Returns an error for an unknown status or if the backend refuses the
/// transition.
pub async fn set_status(id: &str, status: &str) -> Result<(), CliError> {
    let status: OrderStatus = status.parse()?;
    let id = OrderId::new(id.trim());

    let client = backend()?;
    let token = token()?;
    let message = client.authed(&token).set_order_status(&id, status).await?;

    tracing::info!(
        order = %id,
        "{}",
        message.unwrap_or_else(|| format!("Order updated to {}", status.label()))
    );
    Ok(())
}
