//! Dashboard route handlers.
//!
//! The full page and the HTMX fragment share one loader. Each of the four
//! backend calls degrades on its own: a failed analytics call leaves the
//! counters blank but still shows recent orders.

use askama::Template;
use axum::{Router, extract::State, response::Html, routing::get};
use chrono::{DateTime, Utc, Weekday};
use rust_decimal::Decimal;
use tracing::instrument;

use segunda_mana_core::display::{capitalize, time_ago, weekday};
use segunda_mana_core::session::AdminSession;
use segunda_mana_core::{Analytics, CatalogItem, InventoryItem, Notice, Order, Product};

use crate::client::BackendError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Flash, RequireStaff};
use crate::state::AppState;

use super::render;

/// Rows shown in each recent-activity panel.
const RECENT_LIMIT: usize = 5;

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
    /// Capitalized role name ("Superadmin", "Staff").
    pub role: String,
    pub is_super_admin: bool,
}

impl From<&AdminSession> for AdminUserView {
    fn from(admin: &AdminSession) -> Self {
        Self {
            name: admin.user.display_name().to_string(),
            email: admin.user.email.clone(),
            role: capitalize(admin.role.as_str()),
            is_super_admin: admin.role.is_super_admin(),
        }
    }
}

/// One line in a recent-activity panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityView {
    pub text: String,
    pub time_ago: String,
}

/// Order total for one weekday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySales {
    pub day: &'static str,
    pub total: Decimal,
}

/// Everything the live panel shows.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub analytics: Option<Analytics>,
    pub notifications: Vec<ActivityView>,
    pub updates: Vec<ActivityView>,
    pub sales_by_day: Vec<DaySales>,
}

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard/index.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Notice>,
    pub data: DashboardData,
}

/// The polled fragment on its own.
#[derive(Template)]
#[template(path = "dashboard/live.html")]
pub struct LiveTemplate {
    pub data: DashboardData,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(index))
        .route("/dashboard/live", get(live))
}

// =============================================================================
// Pure builders
// =============================================================================

/// "New order from X" for the most recent orders.
#[must_use]
pub fn order_notifications(orders: &[Order], now: DateTime<Utc>) -> Vec<ActivityView> {
    let mut recent: Vec<&Order> = orders.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|order| ActivityView {
            text: format!("New order from {}", order.buyer_name),
            time_ago: order
                .created_at
                .map(|at| time_ago(at, now))
                .unwrap_or_default(),
        })
        .collect()
}

/// The most recently touched products and inventory items, merged.
#[must_use]
pub fn catalog_updates(
    products: &[Product],
    inventory: &[InventoryItem],
    now: DateTime<Utc>,
) -> Vec<ActivityView> {
    fn entries<'a, I>(
        items: &'a [CatalogItem<I>],
        kind: &'static str,
    ) -> impl Iterator<Item = (Option<DateTime<Utc>>, String)> + 'a {
        items.iter().map(move |item| {
            (
                item.last_touched(),
                format!("{kind} updated: {}", item.display_name()),
            )
        })
    }

    let mut merged: Vec<_> = entries(products, "Product")
        .chain(entries(inventory, "Inventory"))
        .collect();
    merged.sort_by(|a, b| b.0.cmp(&a.0));
    merged
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|(at, text)| ActivityView {
            text,
            time_ago: at.map(|at| time_ago(at, now)).unwrap_or_default(),
        })
        .collect()
}

/// Order totals per weekday, Sunday first.
#[must_use]
pub fn sales_by_weekday(orders: &[Order]) -> Vec<DaySales> {
    const DAYS: [(Weekday, &str); 7] = [
        (Weekday::Sun, "Sunday"),
        (Weekday::Mon, "Monday"),
        (Weekday::Tue, "Tuesday"),
        (Weekday::Wed, "Wednesday"),
        (Weekday::Thu, "Thursday"),
        (Weekday::Fri, "Friday"),
        (Weekday::Sat, "Saturday"),
    ];

    DAYS.iter()
        .map(|&(wd, day)| DaySales {
            day,
            total: orders
                .iter()
                .filter(|o| o.created_at.is_some_and(|at| weekday(at) == wd))
                .map(Order::total)
                .sum(),
        })
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

/// Log a failed panel and keep going, unless the login itself is gone.
fn degrade<T: Default>(
    result: std::result::Result<T, BackendError>,
    what: &str,
) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_unauthorized() => Err(AppError::from(e)),
        Err(e) => {
            tracing::error!("Failed to fetch {what}: {e}");
            Ok(T::default())
        }
    }
}

async fn load(state: &AppState, admin: &AdminSession) -> Result<DashboardData> {
    let api = state.client().authed(&admin.token);
    let (analytics, orders, products, inventory) = tokio::join!(
        api.analytics(),
        api.orders(),
        api.products(),
        api.inventory()
    );

    let analytics = degrade(analytics.map(Some), "analytics")?;
    let orders = degrade(orders, "orders")?;
    let products = degrade(products, "products")?;
    let inventory = degrade(inventory, "inventory")?;

    let now = Utc::now();
    Ok(DashboardData {
        analytics,
        notifications: order_notifications(&orders, now),
        updates: catalog_updates(&products, &inventory, now),
        sales_by_day: sales_by_weekday(&orders),
    })
}

/// Dashboard page handler.
#[instrument(skip_all)]
pub async fn index(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    Flash(flash): Flash,
) -> Result<Html<String>> {
    let data = load(&state, &admin).await?;
    Ok(render(&DashboardTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/dashboard",
        flash,
        data,
    }))
}

/// HTMX fragment refreshed every 30 seconds.
#[instrument(skip_all)]
pub async fn live(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let data = load(&state, &admin).await?;
    Ok(render(&LiveTemplate { data }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 5, 4, 0, 0).unwrap()
    }

    fn order(buyer: &str, minutes_ago: i64, total: i64) -> Order {
        let created = now() - Duration::minutes(minutes_ago);
        serde_json::from_value(json!({
            "_id": buyer, "buyerName": buyer, "status": "pending",
            "paymentStatus": "pending", "subtotal": total,
            "createdAt": created.to_rfc3339(),
        }))
        .unwrap()
    }

    #[test]
    fn test_notifications_are_newest_first_and_capped() {
        let orders: Vec<Order> = (0..7)
            .map(|i| order(&format!("Buyer {i}"), i * 10, 100))
            .collect();
        let notes = order_notifications(&orders, now());
        assert_eq!(notes.len(), 5);
        assert_eq!(notes[0].text, "New order from Buyer 0");
        assert_eq!(notes[0].time_ago, "Just now");
        assert_eq!(notes[1].time_ago, "10 minutes ago");
    }

    #[test]
    fn test_catalog_updates_merge_both_collections() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1", "itemName": "Denim Jacket",
            "updatedAt": (now() - Duration::hours(2)).to_rfc3339(),
        }))
        .unwrap();
        let item: InventoryItem = serde_json::from_value(json!({
            "_id": "i1", "itemName": "Rice Cooker",
            "updatedAt": (now() - Duration::minutes(5)).to_rfc3339(),
        }))
        .unwrap();

        let updates = catalog_updates(&[product], &[item], now());
        assert_eq!(updates[0].text, "Inventory updated: Rice Cooker");
        assert_eq!(updates[1].text, "Product updated: Denim Jacket");
        assert_eq!(updates[1].time_ago, "2 hours ago");
    }

    #[test]
    fn test_sales_by_weekday_sums_totals() {
        // 2024-06-05 04:00 UTC is Wednesday noon in Manila.
        let orders = vec![order("A", 0, 150), order("B", 30, 50)];
        let sales = sales_by_weekday(&orders);
        assert_eq!(sales.len(), 7);
        assert_eq!(sales[0].day, "Sunday");
        assert_eq!(sales[3].day, "Wednesday");
        assert_eq!(sales[3].total, Decimal::from(200));
        assert!(sales[4].total.is_zero());
    }

    #[test]
    fn test_admin_user_view_capitalizes_role() {
        let admin = AdminSession {
            token: segunda_mana_core::session::AuthToken::new("t"),
            role: segunda_mana_core::Role::Staff,
            user: segunda_mana_core::AdminProfile {
                email: "ana@example.org".to_string(),
                ..Default::default()
            },
        };
        let view = AdminUserView::from(&admin);
        assert_eq!(view.role, "Staff");
        assert!(!view.is_super_admin);
    }
}
