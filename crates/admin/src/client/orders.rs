//! Orders: listing, status transitions, payment status and manual entry.

use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use segunda_mana_core::{ManualOrder, Order, OrderId, OrderStatus, PaymentStatus};

use super::{Authed, BackendError};

const ORDERS: &str = "api/admin/orders";

impl Authed<'_> {
    /// # Errors
    ///
    /// Returns an error if the request fails or an order has an unknown
    /// status.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, BackendError> {
        self.get_list(ORDERS, "orders").await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails, including 404.
    #[instrument(skip(self))]
    pub async fn order(&self, id: &OrderId) -> Result<Order, BackendError> {
        self.get_one(&format!("{ORDERS}/{id}"), "order").await
    }

    /// Move an order to `status`.
    ///
    /// To-receive and received have dedicated endpoints; cancellation goes
    /// through the generic update.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the transition.
    #[instrument(skip(self))]
    pub async fn set_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Option<String>, BackendError> {
        match status {
            OrderStatus::ToReceive => {
                self.send_empty(Method::PUT, &format!("{ORDERS}/{id}/to-receive"))
                    .await
            }
            OrderStatus::Received => {
                self.send_empty(Method::PUT, &format!("{ORDERS}/{id}/received"))
                    .await
            }
            OrderStatus::Cancelled => {
                self.send_json(
                    Method::PUT,
                    &format!("{ORDERS}/{id}"),
                    &json!({ "status": status.as_str() }),
                )
                .await
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if the backend refuses the update.
    #[instrument(skip(self))]
    pub async fn set_payment_status(
        &self,
        id: &OrderId,
        status: PaymentStatus,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(
            Method::PUT,
            &format!("{ORDERS}/{id}"),
            &json!({ "paymentStatus": status.as_str() }),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: &OrderId) -> Result<Option<String>, BackendError> {
        self.send_empty(Method::DELETE, &format!("{ORDERS}/{id}"))
            .await
    }

    /// Record an order taken by staff.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order.
    #[instrument(skip(self, order), fields(buyer = %order.buyer_name))]
    pub async fn create_manual_order(
        &self,
        order: &ManualOrder,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(Method::POST, &format!("{ORDERS}/manual-order"), order)
            .await
    }
}
