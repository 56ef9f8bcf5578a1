//! Checkout: form validation, vouchers and the order-confirmation state machine.
//!
//! ```text
//! Idle ──submit──▶ Submitting ──requiresOtp──▶ AwaitingOtp ──otp ok──▶ Completed
//!   ▲                  │  ──voucherCode / neither──────────────────────▶ Completed
//!   └──── rejected ────┘                           otp bad: stay AwaitingOtp
//! ```
//!
//! The backend decides whether an order needs OTP confirmation; this module
//! only interprets its answers and says whether the cart should be cleared.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Address, Notice, OrderId, OrderType, PaymentMethod, TicketVoucher};

/// The one voucher code the storefront recognizes.
pub const VOUCHER_CODE: &str = "DISCOUNT50";

/// Flat discount granted by [`VOUCHER_CODE`], in pesos.
pub const VOUCHER_DISCOUNT: i64 = 50;

/// Result of applying a voucher code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoucherOutcome {
    Applied { code: String, discount: Decimal },
    Invalid,
}

impl VoucherOutcome {
    #[must_use]
    pub fn discount(&self) -> Decimal {
        match self {
            Self::Applied { discount, .. } => *discount,
            Self::Invalid => Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Applied { discount, .. } => Notice::success(format!(
                "Voucher applied: {} off.",
                crate::types::format_peso(*discount)
            )),
            Self::Invalid => Notice::error("Invalid voucher code"),
        }
    }
}

/// Trim and uppercase `code`, then look it up.
#[must_use]
pub fn apply_voucher(code: &str) -> VoucherOutcome {
    let code = code.trim().to_uppercase();
    if code == VOUCHER_CODE {
        VoucherOutcome::Applied {
            code,
            discount: Decimal::from(VOUCHER_DISCOUNT),
        }
    } else {
        VoucherOutcome::Invalid
    }
}

/// `subtotal − discount`, never below zero.
#[must_use]
pub fn order_total(subtotal: Decimal, discount: Decimal) -> Decimal {
    (subtotal - discount).max(Decimal::ZERO)
}

/// Reasons the checkout form is refused before anything is sent.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Please fill out all contact information.")]
    MissingContact,
    #[error("Please fill out your delivery address.")]
    MissingAddress,
    #[error("Please upload your GCash receipt.")]
    MissingReceipt,
    #[error("Your cart is empty.")]
    EmptyCart,
}

/// Checkout form fields. The receipt file itself is carried by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub order_type: OrderType,
    pub payment_method: PaymentMethod,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub has_receipt: bool,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            email: String::new(),
            order_type: OrderType::Delivery,
            payment_method: PaymentMethod::Gcash,
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            has_receipt: false,
        }
    }
}

impl CheckoutForm {
    /// Presence checks, in the order the buyer sees them.
    ///
    /// # Errors
    ///
    /// Returns the first [`CheckoutError`] that applies.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let blank = |s: &str| s.trim().is_empty();
        if [&self.first_name, &self.last_name, &self.phone, &self.email]
            .into_iter()
            .any(|s| blank(s))
        {
            return Err(CheckoutError::MissingContact);
        }
        if self.order_type == OrderType::Delivery && (blank(&self.street) || blank(&self.city)) {
            return Err(CheckoutError::MissingAddress);
        }
        if self.payment_method == PaymentMethod::Gcash && !self.has_receipt {
            return Err(CheckoutError::MissingReceipt);
        }
        Ok(())
    }

    /// `"first last"`.
    #[must_use]
    pub fn buyer_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Delivery address; pickups carry none.
    #[must_use]
    pub fn address(&self) -> Option<Address> {
        (self.order_type == OrderType::Delivery).then(|| Address {
            street: self.street.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            zip: self.zip.trim().to_owned(),
        })
    }
}

/// Body of a 2xx `POST /api/admin/orders/order`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    #[serde(default)]
    pub requires_otp: bool,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub voucher_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The confirmed order embedded in a verify-otp response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedOrder {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub ticket_voucher: Option<TicketVoucher>,
}

/// Body of `POST /api/admin/orders/verify-otp`, 2xx or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VerifyOtpResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub order: Option<VerifiedOrder>,
}

impl VerifyOtpResponse {
    /// A non-2xx answer, reduced to its message.
    #[must_use]
    pub const fn rejected(message: Option<String>) -> Self {
        Self {
            success: false,
            message,
            order: None,
        }
    }
}

/// Where the visitor is in checkout. Stored in the storefront session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckoutState {
    #[default]
    Idle,
    Submitting {
        email: String,
    },
    AwaitingOtp {
        order_id: OrderId,
        email: String,
    },
    Completed {
        order_id: Option<OrderId>,
        email: String,
        voucher_code: Option<String>,
    },
}

/// The next state plus the side effects the handler must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: CheckoutState,
    pub clear_cart: bool,
    pub notice: Option<Notice>,
}

impl CheckoutState {
    /// Validate and enter `Submitting`.
    ///
    /// # Errors
    ///
    /// Returns the form's [`CheckoutError`], or `EmptyCart` if there is
    /// nothing to order.
    pub fn submit(form: &CheckoutForm, cart_is_empty: bool) -> Result<Self, CheckoutError> {
        if cart_is_empty {
            return Err(CheckoutError::EmptyCart);
        }
        form.validate()?;
        Ok(Self::Submitting {
            email: form.email.trim().to_owned(),
        })
    }

    fn email(&self) -> String {
        match self {
            Self::Idle => String::new(),
            Self::Submitting { email }
            | Self::AwaitingOtp { email, .. }
            | Self::Completed { email, .. } => email.clone(),
        }
    }

    /// Interpret a 2xx order placement.
    #[must_use]
    pub fn order_placed(&self, response: PlaceOrderResponse) -> Transition {
        let email = self.email();
        if response.requires_otp {
            return match response.order_id {
                Some(order_id) => Transition {
                    state: Self::AwaitingOtp { order_id, email },
                    clear_cart: false,
                    notice: Some(Notice::info("OTP sent to your email. Please verify.")),
                },
                None => Self::order_rejected(response.message),
            };
        }

        if let Some(code) = response.voucher_code.filter(|c| !c.trim().is_empty()) {
            return Transition {
                state: Self::Completed {
                    order_id: response.order_id,
                    email,
                    voucher_code: Some(code),
                },
                clear_cart: true,
                notice: None,
            };
        }

        Transition {
            state: Self::Completed {
                order_id: response.order_id,
                email,
                voucher_code: None,
            },
            clear_cart: false,
            notice: Some(Notice::success("Order created successfully!")),
        }
    }

    /// A non-2xx placement: back to `Idle` with the server's message.
    #[must_use]
    pub fn order_rejected(message: Option<String>) -> Transition {
        Transition {
            state: Self::Idle,
            clear_cart: false,
            notice: Some(Notice::error(
                message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Failed to create order.".to_owned()),
            )),
        }
    }

    /// Interpret an OTP verification answer. Only valid in `AwaitingOtp`;
    /// any other state is returned unchanged.
    #[must_use]
    pub fn otp_verified(self, response: VerifyOtpResponse) -> Transition {
        let (order_id, email) = match self {
            Self::AwaitingOtp { order_id, email } => (order_id, email),
            other => {
                return Transition {
                    state: other,
                    clear_cart: false,
                    notice: None,
                };
            }
        };

        let confirmed = if response.success {
            response.order
        } else {
            None
        };
        match confirmed {
            Some(order) => Transition {
                state: Self::Completed {
                    order_id: Some(order.id),
                    email,
                    voucher_code: order.ticket_voucher.map(|v| v.code),
                },
                clear_cart: true,
                notice: Some(Notice::success("OTP verified!")),
            },
            None => Transition {
                state: Self::AwaitingOtp { order_id, email },
                clear_cart: false,
                notice: Some(Notice::error(
                    response
                        .message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| "Invalid OTP".to_owned()),
                )),
            },
        }
    }

    #[must_use]
    pub const fn is_awaiting_otp(&self) -> bool {
        matches!(self, Self::AwaitingOtp { .. })
    }
}

/// Everything the storefront keeps about a checkout in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub state: CheckoutState,
    #[serde(default)]
    pub voucher_code: Option<String>,
    #[serde(default)]
    pub discount: Decimal,
}

impl CheckoutSession {
    /// Apply a voucher; an invalid code resets the discount to zero.
    pub fn apply_voucher(&mut self, code: &str) -> VoucherOutcome {
        let outcome = apply_voucher(code);
        match &outcome {
            VoucherOutcome::Applied { code, discount } => {
                self.voucher_code = Some(code.clone());
                self.discount = *discount;
            }
            VoucherOutcome::Invalid => {
                self.voucher_code = None;
                self.discount = Decimal::ZERO;
            }
        }
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled_form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Ana".to_owned(),
            last_name: "Cruz".to_owned(),
            phone: "09171234567".to_owned(),
            email: "ana@example.ph".to_owned(),
            street: "12 Mabini St".to_owned(),
            city: "Quezon City".to_owned(),
            has_receipt: true,
            ..CheckoutForm::default()
        }
    }

    fn submitting() -> CheckoutState {
        CheckoutState::submit(&filled_form(), false).unwrap()
    }

    #[test]
    fn test_voucher_is_trimmed_and_uppercased() {
        let outcome = apply_voucher("  discount50 ");
        assert_eq!(outcome.discount(), Decimal::from(50));
    }

    #[test]
    fn test_other_voucher_is_invalid() {
        for code in ["DISCOUNT5", "FREE", "discount 50"] {
            let outcome = apply_voucher(code);
            assert_eq!(outcome, VoucherOutcome::Invalid);
            assert_eq!(outcome.discount(), Decimal::ZERO);
            assert_eq!(outcome.notice().message, "Invalid voucher code");
        }
    }

    #[test]
    fn test_session_voucher_reset_on_invalid() {
        let mut session = CheckoutSession::default();
        session.apply_voucher("DISCOUNT50");
        assert_eq!(session.discount, Decimal::from(50));
        session.apply_voucher("nope");
        assert_eq!(session.discount, Decimal::ZERO);
        assert!(session.voucher_code.is_none());
    }

    #[test]
    fn test_order_total_clamps_at_zero() {
        assert_eq!(
            order_total(Decimal::from(300), Decimal::from(50)),
            Decimal::from(250)
        );
        assert_eq!(order_total(Decimal::from(30), Decimal::from(50)), Decimal::ZERO);
    }

    #[test]
    fn test_validation_messages() {
        let mut form = filled_form();
        form.phone.clear();
        assert_eq!(form.validate(), Err(CheckoutError::MissingContact));

        let mut form = filled_form();
        form.city = "  ".to_owned();
        assert_eq!(form.validate(), Err(CheckoutError::MissingAddress));

        form.order_type = OrderType::Pickup;
        assert_eq!(form.validate(), Ok(()));
        assert_eq!(form.address(), None);

        let mut form = filled_form();
        form.has_receipt = false;
        assert_eq!(form.validate(), Err(CheckoutError::MissingReceipt));
        form.payment_method = PaymentMethod::Cash;
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn test_email_is_only_checked_for_presence() {
        let mut form = filled_form();
        form.email = "ana at example".to_owned();
        assert_eq!(form.validate(), Ok(()));
        form.email = " ".to_owned();
        assert_eq!(form.validate(), Err(CheckoutError::MissingContact));
    }

    #[test]
    fn test_empty_cart_refused() {
        assert_eq!(
            CheckoutState::submit(&filled_form(), true),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn test_requires_otp_waits_without_clearing_cart() {
        let response = PlaceOrderResponse {
            requires_otp: true,
            order_id: Some(OrderId::new("o1")),
            ..PlaceOrderResponse::default()
        };
        let t = submitting().order_placed(response);
        assert!(!t.clear_cart);
        assert_eq!(
            t.state,
            CheckoutState::AwaitingOtp {
                order_id: OrderId::new("o1"),
                email: "ana@example.ph".to_owned()
            }
        );
    }

    #[test]
    fn test_voucher_code_completes_and_clears_cart() {
        let response: PlaceOrderResponse =
            serde_json::from_str(r#"{"orderId":"o2","voucherCode":"SM-123"}"#).unwrap();
        let t = submitting().order_placed(response);
        assert!(t.clear_cart);
        assert_eq!(
            t.state,
            CheckoutState::Completed {
                order_id: Some(OrderId::new("o2")),
                email: "ana@example.ph".to_owned(),
                voucher_code: Some("SM-123".to_owned()),
            }
        );
    }

    #[test]
    fn test_fallback_completes_without_voucher() {
        let t = submitting().order_placed(PlaceOrderResponse {
            order_id: Some(OrderId::new("o3")),
            ..PlaceOrderResponse::default()
        });
        assert!(matches!(
            t.state,
            CheckoutState::Completed {
                voucher_code: None,
                ..
            }
        ));
        assert!(!t.clear_cart);
    }

    #[test]
    fn test_rejection_returns_to_idle_with_message() {
        let t = CheckoutState::order_rejected(Some("Out of stock".to_owned()));
        assert_eq!(t.state, CheckoutState::Idle);
        assert_eq!(t.notice.unwrap().message, "Out of stock");
        let t = CheckoutState::order_rejected(None);
        assert_eq!(t.notice.unwrap().message, "Failed to create order.");
    }

    fn awaiting() -> CheckoutState {
        CheckoutState::AwaitingOtp {
            order_id: OrderId::new("o1"),
            email: "ana@example.ph".to_owned(),
        }
    }

    #[test]
    fn test_otp_success_completes_with_ticket_voucher() {
        let response: VerifyOtpResponse = serde_json::from_str(
            r#"{"success":true,"order":{"_id":"o1","ticketVoucher":{"code":"TV-9"}}}"#,
        )
        .unwrap();
        let t = awaiting().otp_verified(response);
        assert!(t.clear_cart);
        assert_eq!(
            t.state,
            CheckoutState::Completed {
                order_id: Some(OrderId::new("o1")),
                email: "ana@example.ph".to_owned(),
                voucher_code: Some("TV-9".to_owned()),
            }
        );
    }

    #[test]
    fn test_otp_failure_stays_awaiting() {
        let t = awaiting().otp_verified(VerifyOtpResponse::rejected(None));
        assert!(t.state.is_awaiting_otp());
        assert!(!t.clear_cart);
        assert_eq!(t.notice.unwrap().message, "Invalid OTP");

        let unsuccessful: VerifyOtpResponse =
            serde_json::from_str(r#"{"success":false,"message":"OTP expired"}"#).unwrap();
        let t = awaiting().otp_verified(unsuccessful);
        assert_eq!(t.notice.unwrap().message, "OTP expired");
    }

    #[test]
    fn test_state_survives_session_roundtrip() {
        let json = serde_json::to_string(&awaiting()).unwrap();
        assert!(json.contains("awaiting_otp"));
        let back: CheckoutState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, awaiting());
    }
}
