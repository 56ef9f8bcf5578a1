//! Order route handlers: list, export, status changes, delete and the
//! manual order form.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::display::{short_date, short_time};
use segunda_mana_core::listing::{Page, filter_by_status, paginate, search};
use segunda_mana_core::session::AdminSession;
use segunda_mana_core::{
    ManualOrderForm, Notice, Order, OrderId, OrderStatus, PaymentStatus, Product, csv, format_peso,
};

use crate::error::Result;
use crate::filters;
use crate::middleware::{Flash, RequireStaff};
use crate::state::AppState;

use super::dashboard::AdminUserView;
use super::{
    ListQuery, SelectOption, csv_response, failure_notice, flash_redirect, loaded, outcome, render,
};

const LIST_PATH: &str = "/orders";

/// Order row for the list template.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: String,
    pub no: usize,
    pub products: String,
    pub customer: String,
    pub email: String,
    pub date: String,
    pub time: String,
    pub total: Decimal,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub order_type: String,
    pub address: String,
    pub voucher: Option<String>,
    pub status_options: Vec<SelectOption>,
    pub payment_options: Vec<SelectOption>,
}

impl OrderRow {
    fn new(order: &Order, no: usize) -> Self {
        Self {
            id: order.id.to_string(),
            no,
            products: order.product_names().join(", "),
            customer: order.buyer_name.clone(),
            email: order.buyer_email.clone(),
            date: order.created_at.map(short_date).unwrap_or_default(),
            time: order.created_at.map(short_time).unwrap_or_default(),
            total: order.total(),
            status: order.status.label().to_string(),
            payment_status: order.payment_status.label().to_string(),
            payment_method: order
                .payment_method
                .map(|m| m.label().to_string())
                .unwrap_or_default(),
            order_type: order
                .order_type
                .map(|t| t.label().to_string())
                .unwrap_or_default(),
            address: order
                .address
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            voucher: order.ticket_voucher.as_ref().map(|v| v.code.clone()),
            status_options: status_options(Some(order.status)),
            payment_options: PaymentStatus::ALL
                .iter()
                .map(|s| SelectOption {
                    value: s.as_str().to_string(),
                    label: s.label().to_string(),
                    selected: *s == order.payment_status,
                })
                .collect(),
        }
    }
}

fn status_options(current: Option<OrderStatus>) -> Vec<SelectOption> {
    OrderStatus::ALL
        .iter()
        .map(|s| SelectOption {
            value: s.slug().to_string(),
            label: s.label().to_string(),
            selected: Some(*s) == current,
        })
        .collect()
}

/// Search, status-filter and page the order list.
#[must_use]
pub fn list_page(orders: Vec<Order>, query: &ListQuery) -> Page<OrderRow> {
    let status = query.status.parse::<OrderStatus>().ok();
    let page = paginate(
        filter_by_status(search(orders, &query.q), status),
        query.page(),
    );
    let mut no = page.first_row;
    page.map(|order| {
        let row = OrderRow::new(&order, no);
        no += 1;
        row
    })
}

/// Orders list page template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Notice>,
    pub page: Page<OrderRow>,
    pub query: ListQuery,
    pub filter_query: String,
    pub status_filter: Vec<SelectOption>,
}

/// A product the manual order form can sell.
#[derive(Debug, Clone)]
pub struct ProductChoice {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

/// Manual order form template.
#[derive(Template)]
#[template(path = "orders/add.html")]
pub struct AddOrderTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Notice>,
    pub form: ManualOrderForm,
    pub products: Vec<ProductChoice>,
    pub payment_methods: Vec<SelectOption>,
    pub shipping_methods: Vec<SelectOption>,
}

impl AddOrderTemplate {
    fn new(
        admin: AdminUserView,
        flash: Option<Notice>,
        form: ManualOrderForm,
        products: &[Product],
    ) -> Self {
        let products = products
            .iter()
            .map(|p| ProductChoice {
                id: p.id.to_string(),
                label: format!(
                    "{} ({}, {} in stock)",
                    p.display_name(),
                    format_peso(p.price),
                    p.quantity
                ),
                selected: p.id.as_str() == form.product.trim(),
            })
            .collect();
        let payment_methods =
            choices(&[("cash", "Cash"), ("gcash", "GCash")], &form.payment_method);
        let shipping_methods = choices(
            &[("pickup", "Pickup (free)"), ("delivery", "Delivery (₱150)")],
            &form.shipping_method,
        );
        Self {
            admin_user: admin,
            current_path: "/add-order",
            flash,
            form,
            products,
            payment_methods,
            shipping_methods,
        }
    }
}

fn choices(values: &[(&str, &str)], current: &str) -> Vec<SelectOption> {
    values
        .iter()
        .map(|(value, label)| SelectOption {
            value: (*value).to_string(),
            label: (*label).to_string(),
            selected: *value == current.trim(),
        })
        .collect()
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Payment status change form.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    pub payment_status: String,
}

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/export", get(export))
        .route("/orders/{id}/status", post(set_status))
        .route("/orders/{id}/payment", post(set_payment))
        .route("/orders/{id}/delete", post(delete))
        .route("/add-order", get(add_page).post(create))
}

/// Orders list page handler.
#[instrument(skip(admin, state, flash))]
pub async fn index(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    Flash(mut flash): Flash,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>> {
    let orders = loaded(
        state.client().authed(&admin.token).orders().await,
        &mut flash,
    )?;

    let mut status_filter = vec![SelectOption {
        value: String::new(),
        label: "All statuses".to_string(),
        selected: false,
    }];
    status_filter.extend(status_options(query.status.parse().ok()));
    if !status_filter.iter().any(|o| o.selected) {
        status_filter[0].selected = true;
    }

    Ok(render(&OrdersTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: LIST_PATH,
        flash,
        page: list_page(orders, &query),
        filter_query: query.without_page(),
        status_filter,
        query,
    }))
}

/// Download the filtered order list as CSV.
#[instrument(skip(admin, state, session))]
pub async fn export(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let orders = state.client().authed(&admin.token).orders().await?;
    let orders = filter_by_status(search(orders, &query.q), query.status.parse().ok());
    csv_response(&session, csv::orders(&orders), "orders.csv", LIST_PATH).await
}

/// Move an order to another fulfilment status.
#[instrument(skip(admin, state, session))]
pub async fn set_status(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let Ok(status) = form.status.parse::<OrderStatus>() else {
        return flash_redirect(&session, Notice::error("Unknown order status."), LIST_PATH).await;
    };
    let id = OrderId::new(id);
    let result = state
        .client()
        .authed(&admin.token)
        .set_order_status(&id, status)
        .await;
    let notice = match result {
        Ok(_) => {
            tracing::info!(order_id = %id, status = status.as_str(), "Order status changed");
            Notice::success(format!("Order updated to {}", status.label()))
        }
        Err(e) => failure_notice(e)?,
    };
    flash_redirect(&session, notice, LIST_PATH).await
}

/// Change an order's payment status.
#[instrument(skip(admin, state, session))]
pub async fn set_payment(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<PaymentForm>,
) -> Result<Redirect> {
    let Ok(status) = form.payment_status.parse::<PaymentStatus>() else {
        return flash_redirect(&session, Notice::error("Unknown payment status."), LIST_PATH).await;
    };
    let id = OrderId::new(id);
    let result = state
        .client()
        .authed(&admin.token)
        .set_payment_status(&id, status)
        .await;
    let notice = match result {
        Ok(_) => Notice::success(format!("Payment status updated to {}", status.label())),
        Err(e) => failure_notice(e)?,
    };
    flash_redirect(&session, notice, LIST_PATH).await
}

/// Delete an order.
#[instrument(skip(admin, state, session))]
pub async fn delete(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = OrderId::new(id);
    let result = state.client().authed(&admin.token).delete_order(&id).await;
    if result.is_ok() {
        tracing::info!(order_id = %id, "Order deleted");
    }
    let notice = outcome(result, "Order deleted successfully!")?;
    flash_redirect(&session, notice, LIST_PATH).await
}

/// Products with stock left.
async fn sellable(state: &AppState, admin: &AdminSession) -> Result<Vec<Product>> {
    let products = state.client().authed(&admin.token).products().await?;
    Ok(products
        .into_iter()
        .filter(|p| p.quantity > 0 && !p.is_archived)
        .collect())
}

/// Blank manual order form.
#[instrument(skip(admin, state, flash))]
pub async fn add_page(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    Flash(flash): Flash,
) -> Result<Html<String>> {
    let products = sellable(&state, &admin).await?;
    Ok(render(&AddOrderTemplate::new(
        AdminUserView::from(&admin),
        flash,
        ManualOrderForm::default(),
        &products,
    )))
}

/// Place a manual order.
#[instrument(skip(admin, state, session, form))]
pub async fn create(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ManualOrderForm>,
) -> Result<Response> {
    let products = sellable(&state, &admin).await?;
    let selected = products.iter().find(|p| p.id.as_str() == form.product.trim());

    let order = match form.build(selected) {
        Ok(order) => order,
        Err(e) => {
            let template = AddOrderTemplate::new(
                AdminUserView::from(&admin),
                Some(Notice::error(e.to_string())),
                form,
                &products,
            );
            return Ok(render(&template).into_response());
        }
    };

    match state
        .client()
        .authed(&admin.token)
        .create_manual_order(&order)
        .await
    {
        Ok(_) => {
            tracing::info!(total = %order.grand_total(), "Manual order placed");
            let notice = Notice::success(format!(
                "Order placed successfully! Total {}",
                format_peso(order.grand_total())
            ));
            Ok(flash_redirect(&session, notice, LIST_PATH)
                .await?
                .into_response())
        }
        Err(e) => {
            let template = AddOrderTemplate::new(
                AdminUserView::from(&admin),
                Some(failure_notice(e)?),
                form,
                &products,
            );
            Ok(render(&template).into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn order(id: &str, buyer: &str, status: &str) -> Order {
        serde_json::from_value(json!({
            "_id": id, "buyerName": buyer, "status": status,
            "paymentStatus": "paid",
            "items": [{
                "productId": { "_id": "p1", "itemName": "Denim Jacket" },
                "quantity": 2,
                "price": 120
            }],
            "createdAt": "2024-06-01T02:30:00.000Z",
        }))
        .unwrap()
    }

    #[test]
    fn test_row_formats_order() {
        let row = OrderRow::new(&order("o1", "Ana", "pending"), 1);
        assert_eq!(row.products, "Denim Jacket");
        assert_eq!(row.date, "06/01/2024");
        assert_eq!(row.time, "10:30 AM");
        assert_eq!(row.status, "To Receive");
        assert_eq!(row.payment_status, "Paid");
        assert_eq!(row.total, Decimal::from(240));
        let selected: Vec<&str> = row
            .status_options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, ["to-receive"]);
    }

    #[test]
    fn test_status_filter_uses_slug() {
        let orders = vec![
            order("o1", "Ana", "pending"),
            order("o2", "Ben", "received"),
            order("o3", "Cai", "Cancelled"),
        ];
        let query = ListQuery {
            status: "to-receive".to_string(),
            ..ListQuery::default()
        };
        let page = list_page(orders.clone(), &query);
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].customer, "Ana");

        let query = ListQuery {
            q: "ben".to_string(),
            ..ListQuery::default()
        };
        assert_eq!(list_page(orders, &query).items[0].id, "o2");
    }

    #[test]
    fn test_choices_mark_current() {
        let options = choices(&[("cash", "Cash"), ("gcash", "GCash")], "gcash");
        assert!(!options[0].selected);
        assert!(options[1].selected);
    }
}
