//! Checkout route handlers.
//!
//! Checkout progress lives in the session as a [`CheckoutSession`], so a
//! reload keeps the OTP prompt open. Each handler loads it, applies one
//! transition from `segunda_mana_core::checkout`, performs the side effects
//! the transition asks for (clearing the backend cart, queuing a notice),
//! stores it back and redirects.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::checkout::{
    CheckoutForm, CheckoutSession, CheckoutState, Transition, order_total,
};
use segunda_mana_core::display::long_date;
use segunda_mana_core::{Notice, Order, OrderType, PaymentMethod};

use crate::backend::{BackendError, CartCookie, OrderSubmission, Receipt};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::Flash;
use crate::models::session;
use crate::routes::cart::{CartView, current_cart};
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub flash: Option<Notice>,
    pub cart: CartView,
    pub discount: Decimal,
    pub total: Decimal,
    pub voucher_code: String,
    pub form: CheckoutForm,
    pub awaiting_otp: bool,
    pub otp_email: String,
}

impl CheckoutTemplate {
    fn new(
        flash: Option<Notice>,
        cart: CartView,
        checkout: &CheckoutSession,
        form: CheckoutForm,
    ) -> Self {
        let total = order_total(cart.subtotal, checkout.discount);
        let otp_email = match &checkout.state {
            CheckoutState::AwaitingOtp { email, .. } => email.clone(),
            _ => String::new(),
        };
        Self {
            flash,
            cart,
            discount: checkout.discount,
            total,
            voucher_code: checkout.voucher_code.clone().unwrap_or_default(),
            form,
            awaiting_otp: checkout.state.is_awaiting_otp(),
            otp_email,
        }
    }

    fn is_delivery(&self) -> bool {
        self.form.order_type == OrderType::Delivery
    }

    fn is_gcash(&self) -> bool {
        self.form.payment_method == PaymentMethod::Gcash
    }
}

/// Display the checkout form, or the OTP prompt when an order awaits it.
#[instrument(skip(state, session, flash))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Flash(flash): Flash,
) -> Result<CheckoutTemplate> {
    let mut checkout = session::checkout(&session).await;
    if matches!(checkout.state, CheckoutState::Completed { .. }) {
        checkout = CheckoutSession::default();
        session::store_checkout(&session, &checkout).await?;
    }

    let cart = current_cart(&state, &session).await;
    Ok(CheckoutTemplate::new(
        flash,
        CartView::from(&cart),
        &checkout,
        CheckoutForm::default(),
    ))
}

/// Read the checkout multipart body: text fields plus the optional receipt.
async fn read_checkout_form(
    mut multipart: Multipart,
) -> Result<(CheckoutForm, Option<Receipt>)> {
    let mut form = CheckoutForm::default();
    let mut receipt = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "proofOfPayment" {
            let file_name = field.file_name().unwrap_or("receipt").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            if !bytes.is_empty() {
                receipt = Some(Receipt {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        match name.as_str() {
            "firstName" => form.first_name = value,
            "lastName" => form.last_name = value,
            "phone" => form.phone = value,
            "email" => form.email = value,
            "street" => form.street = value,
            "city" => form.city = value,
            "state" => form.state = value,
            "zip" => form.zip = value,
            "orderType" => {
                form.order_type = value
                    .parse()
                    .map_err(AppError::BadRequest)?;
            }
            "paymentMethod" => {
                form.payment_method = value
                    .parse()
                    .map_err(AppError::BadRequest)?;
            }
            _ => {}
        }
    }

    form.has_receipt = receipt.is_some();
    Ok((form, receipt))
}

/// Clear the backend cart if the transition asks for it, store the new
/// state and queue the transition's notice.
async fn apply_transition(
    state: &AppState,
    session: &Session,
    jar: &mut CartCookie,
    mut checkout: CheckoutSession,
    transition: Transition,
) -> Result<CheckoutState> {
    if transition.clear_cart {
        if let Err(e) = state.backend().clear_cart(jar).await {
            tracing::warn!("Failed to clear cart after order: {e}");
        }
    }
    session::store_cart_cookie(session, jar).await?;

    if matches!(transition.state, CheckoutState::Completed { .. }) {
        checkout = CheckoutSession::default();
    }
    checkout.state = transition.state;
    session::store_checkout(session, &checkout).await?;

    if let Some(notice) = transition.notice {
        session::flash(session, notice).await?;
    }
    Ok(checkout.state)
}

/// Where to send the visitor after a transition.
fn redirect_for(state: &CheckoutState) -> Redirect {
    match state {
        CheckoutState::Completed { .. } => Redirect::to("/thankyou"),
        _ => Redirect::to("/checkout"),
    }
}

/// Place an order.
///
/// Validation failures and backend refusals re-render the form with the
/// visitor's input; anything else redirects.
#[instrument(skip(state, session, multipart))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response> {
    let (form, receipt) = read_checkout_form(multipart).await?;
    let mut checkout = session::checkout(&session).await;

    let mut jar = session::cart_cookie(&session).await;
    let cart = match state.backend().get_cart(&mut jar).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!("Failed to fetch cart for checkout: {e}");
            Default::default()
        }
    };

    let submitting = match CheckoutState::submit(&form, cart.is_empty()) {
        Ok(submitting) => submitting,
        Err(e) => {
            session::store_cart_cookie(&session, &jar).await?;
            let page = CheckoutTemplate::new(
                Some(Notice::error(e.to_string())),
                CartView::from(&cart),
                &checkout,
                form,
            );
            return Ok(page.into_response());
        }
    };

    checkout.state = submitting;
    session::store_checkout(&session, &checkout).await?;

    let submission = OrderSubmission {
        buyer_name: form.buyer_name(),
        buyer_email: form.email.trim().to_string(),
        items: cart.cart.clone(),
        payment_method: form.payment_method,
        order_type: form.order_type,
        address: form.address(),
        receipt,
    };

    let transition = match state.backend().place_order(&mut jar, submission).await {
        Ok(response) => checkout.state.order_placed(response),
        Err(BackendError::Api { message, .. } | BackendError::Unauthorized(message)) => {
            CheckoutState::order_rejected(Some(message))
        }
        Err(e) => {
            tracing::error!("Order placement failed: {e}");
            CheckoutState::order_rejected(Some("Server error while creating order.".to_string()))
        }
    };

    if matches!(transition.state, CheckoutState::Idle) {
        checkout.state = CheckoutState::Idle;
        session::store_checkout(&session, &checkout).await?;
        session::store_cart_cookie(&session, &jar).await?;
        let page = CheckoutTemplate::new(transition.notice, CartView::from(&cart), &checkout, form);
        return Ok(page.into_response());
    }

    add_breadcrumb("checkout", "Order placed", None);
    let next = apply_transition(&state, &session, &mut jar, checkout, transition).await?;
    Ok(redirect_for(&next).into_response())
}

/// Voucher form data.
#[derive(Debug, Deserialize)]
pub struct VoucherForm {
    #[serde(default)]
    pub code: String,
}

/// Apply a voucher code to the checkout.
#[instrument(skip(session, form))]
pub async fn apply_voucher(session: Session, Form(form): Form<VoucherForm>) -> Result<Redirect> {
    let mut checkout = session::checkout(&session).await;
    let outcome = checkout.apply_voucher(&form.code);
    session::store_checkout(&session, &checkout).await?;
    session::flash(&session, outcome.notice()).await?;
    Ok(Redirect::to("/checkout"))
}

/// OTP form data.
#[derive(Debug, Deserialize)]
pub struct OtpForm {
    #[serde(default)]
    pub otp: String,
}

/// Confirm a pending order with its OTP.
#[instrument(skip(state, session, form))]
pub async fn verify_otp(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<OtpForm>,
) -> Result<Redirect> {
    let checkout = session::checkout(&session).await;
    let CheckoutState::AwaitingOtp { order_id, .. } = &checkout.state else {
        session::flash(&session, Notice::error("No order is waiting for verification.")).await?;
        return Ok(Redirect::to("/checkout"));
    };

    let mut jar = session::cart_cookie(&session).await;
    let response = match state.backend().verify_otp(&mut jar, order_id, &form.otp).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("OTP verification request failed: {e}");
            session::store_cart_cookie(&session, &jar).await?;
            session::flash(&session, Notice::error("OTP verification failed.")).await?;
            return Ok(Redirect::to("/checkout"));
        }
    };

    let transition = checkout.state.clone().otp_verified(response);
    let next = apply_transition(&state, &session, &mut jar, checkout, transition).await?;
    Ok(redirect_for(&next))
}

/// Close the OTP prompt and return to the form.
#[instrument(skip(session))]
pub async fn cancel_otp(session: Session) -> Result<Redirect> {
    let mut checkout = session::checkout(&session).await;
    checkout.state = CheckoutState::Idle;
    session::store_checkout(&session, &checkout).await?;
    Ok(Redirect::to("/checkout"))
}

/// Order details shown on the confirmation page.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub items: Vec<String>,
    pub total: Decimal,
    pub date: String,
    pub order_type: String,
    pub address: String,
    pub meals: u32,
    pub donor_name: String,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            items: order.product_names().into_iter().map(String::from).collect(),
            total: order.total(),
            date: order.created_at.map(long_date).unwrap_or_default(),
            order_type: order.order_type.map(|t| t.label().to_string()).unwrap_or_default(),
            address: order.address.as_ref().map(ToString::to_string).unwrap_or_default(),
            meals: order.meals(),
            donor_name: order.donor_name().to_string(),
        }
    }
}

/// Confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/thankyou.html")]
pub struct ThankYouTemplate {
    pub flash: Option<Notice>,
    pub order_id: String,
    pub email: String,
    pub voucher_code: Option<String>,
    pub order: Option<OrderSummary>,
}

/// Display the confirmation for the visitor's last completed order.
#[instrument(skip(state, session, flash))]
pub async fn thank_you(
    State(state): State<AppState>,
    session: Session,
    Flash(flash): Flash,
) -> Response {
    let CheckoutState::Completed {
        order_id,
        email,
        voucher_code,
    } = session::checkout(&session).await.state
    else {
        return Redirect::to("/").into_response();
    };

    let order = match &order_id {
        Some(id) => match state.backend().order(id).await {
            Ok(order) => Some(OrderSummary::from(&order)),
            Err(e) => {
                tracing::warn!("Failed to fetch order details: {e}");
                None
            }
        },
        None => None,
    };

    ThankYouTemplate {
        flash,
        order_id: order_id.map(|id| id.to_string()).unwrap_or_default(),
        email,
        voucher_code,
        order,
    }
    .into_response()
}

/// The certificate of donation handed out for completed orders.
const CERTIFICATE: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/static/certificate/Segunda-Mana-Certificate-of-Donation.pdf"
));

/// Download filename for an order's certificate, keyed by its code.
fn certificate_filename(code: &str) -> String {
    let code: String = code
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("Donation-Certificate-{code}.pdf")
}

/// Download the certificate of donation for the last completed order.
#[instrument(skip(session))]
pub async fn certificate(session: Session) -> Response {
    let CheckoutState::Completed {
        order_id,
        voucher_code,
        ..
    } = session::checkout(&session).await.state
    else {
        return Redirect::to("/").into_response();
    };

    let code = voucher_code
        .filter(|code| !code.trim().is_empty())
        .or_else(|| order_id.map(|id| id.to_string()))
        .unwrap_or_default();
    let disposition = format!("attachment; filename=\"{}\"", certificate_filename(&code));

    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        CERTIFICATE,
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use segunda_mana_core::OrderId;

    #[test]
    fn test_redirect_targets() {
        let done = CheckoutState::Completed {
            order_id: Some(OrderId::new("o1")),
            email: "ana@example.org".to_string(),
            voucher_code: None,
        };
        let done = redirect_for(&done).into_response();
        assert_eq!(done.headers().get("location").unwrap(), "/thankyou");

        let waiting = CheckoutState::AwaitingOtp {
            order_id: OrderId::new("o1"),
            email: String::new(),
        };
        let waiting = redirect_for(&waiting).into_response();
        assert_eq!(waiting.headers().get("location").unwrap(), "/checkout");
    }

    #[test]
    fn test_order_summary() {
        let order: Order = serde_json::from_str(
            r#"{"_id":"o1","orderType":"delivery","subtotal":300,
                "address":{"street":"1 Rizal St","city":"Quezon City"},
                "items":[{"productId":{"_id":"p1","itemName":"Lamp"},"quantity":1,"price":300}]}"#,
        )
        .unwrap();
        let summary = OrderSummary::from(&order);
        assert_eq!(summary.items, vec!["Lamp".to_string()]);
        assert_eq!(summary.order_type, "Delivery");
        assert_eq!(summary.address, "1 Rizal St, Quezon City");
        assert_eq!(summary.meals, 0);
        assert_eq!(summary.donor_name, "Valued Donor");
    }

    #[test]
    fn test_certificate_filename() {
        assert_eq!(
            certificate_filename("TV-0001"),
            "Donation-Certificate-TV-0001.pdf"
        );
        assert_eq!(
            certificate_filename("a\"b c"),
            "Donation-Certificate-a_b_c.pdf"
        );
    }

    #[test]
    fn test_certificate_is_a_pdf() {
        assert!(CERTIFICATE.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_template_totals_apply_discount() {
        let cart = CartView {
            lines: Vec::new(),
            subtotal: Decimal::from(30),
            item_count: 1,
        };
        let mut checkout = CheckoutSession::default();
        checkout.apply_voucher("discount50");
        let page = CheckoutTemplate::new(None, cart, &checkout, CheckoutForm::default());
        assert_eq!(page.total, Decimal::ZERO);
        assert_eq!(page.voucher_code, "DISCOUNT50");
        assert!(page.is_delivery());
        assert!(page.is_gcash());
    }
}
