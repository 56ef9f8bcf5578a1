//! Order placement, OTP confirmation, order lookup and the contact form.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use segunda_mana_core::api::{self, extract_one};
use segunda_mana_core::checkout::{PlaceOrderResponse, VerifyOtpResponse};
use segunda_mana_core::{Address, CartItem, Order, OrderId, OrderType, PaymentMethod};

use super::{BackendClient, BackendError, CartCookie, check, decode};

/// An uploaded proof-of-payment image.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Everything sent as multipart to `POST /api/admin/orders/order`.
#[derive(Debug, Clone)]
pub struct OrderSubmission {
    pub buyer_name: String,
    pub buyer_email: String,
    pub items: Vec<CartItem>,
    pub payment_method: PaymentMethod,
    pub order_type: OrderType,
    /// Sent only for deliveries.
    pub address: Option<Address>,
    pub receipt: Option<Receipt>,
}

impl OrderSubmission {
    fn into_form(self) -> Result<Form, BackendError> {
        let mut form = Form::new()
            .text("buyerName", self.buyer_name)
            .text("buyerEmail", self.buyer_email)
            .text("items", serde_json::to_string(&self.items)?)
            .text("paymentMethod", self.payment_method.as_str())
            .text("orderType", self.order_type.as_str());

        if let Some(address) = self.address.filter(|_| self.order_type == OrderType::Delivery) {
            form = form.text("address", serde_json::to_string(&address)?);
        }

        if let Some(receipt) = self.receipt {
            let part = Part::bytes(receipt.bytes)
                .file_name(receipt.file_name)
                .mime_str(&receipt.content_type)?;
            form = form.part("proofOfPayment", part);
        }

        Ok(form)
    }
}

/// Body of `POST /api/contact`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOtp<'a> {
    order_id: &'a OrderId,
    otp: &'a str,
}

impl BackendClient {
    /// Place an order from the visitor's cart.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Api`] with the server's message when the order
    /// is refused, or another error if the request fails.
    #[instrument(skip(self, jar, order), fields(items = order.items.len()))]
    pub async fn place_order(
        &self,
        jar: &mut CartCookie,
        order: OrderSubmission,
    ) -> Result<PlaceOrderResponse, BackendError> {
        let form = order.into_form()?;
        let request = jar.attach(self.post("api/admin/orders/order")?.multipart(form));
        let response = request.send().await?;
        jar.absorb(response.headers());
        decode(check(response).await?).await
    }

    /// Submit the OTP for a pending order.
    ///
    /// A non-2xx answer is not an error here: it becomes a rejected
    /// [`VerifyOtpResponse`] carrying the server's message.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request itself fails.
    #[instrument(skip(self, jar, otp))]
    pub async fn verify_otp(
        &self,
        jar: &mut CartCookie,
        order_id: &OrderId,
        otp: &str,
    ) -> Result<VerifyOtpResponse, BackendError> {
        let body = VerifyOtp {
            order_id,
            otp: otp.trim(),
        };
        let request = jar.attach(self.post("api/admin/orders/verify-otp")?.json(&body));
        let response = request.send().await?;
        jar.absorb(response.headers());

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Ok(VerifyOtpResponse::rejected(Some(api::error_message(&text))));
        }
        decode(response).await
    }

    /// One order, for the confirmation page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the order is unknown.
    #[instrument(skip(self))]
    pub async fn order(&self, id: &OrderId) -> Result<Order, BackendError> {
        let path = format!("api/admin/orders/{id}");
        let response = check(self.get(&path)?.send().await?).await?;
        let body: Value = decode(response).await?;
        Ok(extract_one(body, "order")?)
    }

    /// Send the contact form; returns the server's acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns an error with the server's message if the message is refused.
    #[instrument(skip(self, message))]
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<String, BackendError> {
        let response = check(self.post("api/contact")?.json(message).send().await?).await?;
        let body: Value = decode(response).await.unwrap_or_default();
        Ok(body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("Message sent successfully!")
            .to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_message_wire_names() {
        let message = ContactMessage {
            first_name: "Ana".to_string(),
            message: "Hello".to_string(),
            ..ContactMessage::default()
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["firstName"], "Ana");
        assert_eq!(json["lastName"], "");
    }

    #[test]
    fn test_submission_with_bad_mime_is_rejected() {
        let submission = OrderSubmission {
            buyer_name: "Ana Cruz".to_string(),
            buyer_email: "ana@example.org".to_string(),
            items: Vec::new(),
            payment_method: PaymentMethod::Gcash,
            order_type: OrderType::Pickup,
            address: None,
            receipt: Some(Receipt {
                file_name: "r.png".to_string(),
                content_type: "not a mime".to_string(),
                bytes: vec![1, 2, 3],
            }),
        };
        assert!(matches!(submission.into_form(), Err(BackendError::Http(_))));
    }
}
