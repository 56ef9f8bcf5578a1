//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::Decimal;
use segunda_mana_core::format_peso;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an amount as pesos. Values that are not numbers pass through
/// with the sign prefixed.
///
/// Usage in templates: `{{ analytics.total_running_sales|peso }}`
#[askama::filter_fn]
pub fn peso(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    Ok(raw
        .parse::<Decimal>()
        .map_or_else(|_| format!("₱{raw}"), format_peso))
}
