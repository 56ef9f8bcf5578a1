//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page (announcements, featured products)
//! GET  /about                  - About page
//! GET  /shop                   - Product listing (q, category, min, max)
//! GET  /product/{id}           - Product detail
//!
//! # Cart
//! GET  /mycart                 - Cart page with suggestions
//! POST /cart/add               - Add one unit, flash, redirect to the product
//! POST /cart/remove            - Remove a line, redirect to the cart
//!
//! # Checkout
//! GET  /checkout               - Checkout form, or the OTP prompt
//! POST /checkout               - Place order (multipart, receipt upload)
//! POST /checkout/voucher       - Apply a voucher code
//! POST /checkout/verify-otp    - Confirm a pending order
//! POST /checkout/cancel-otp    - Abandon the OTP prompt
//! GET  /thankyou               - Order confirmation
//! GET  /thankyou/certificate   - Certificate of donation (PDF)
//!
//! # Contact
//! GET  /contact                - Contact form
//! POST /contact                - Send message
//! ```

pub mod cart;
pub mod checkout;
pub mod home;
pub mod pages;
pub mod shop;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Largest accepted checkout upload (receipt image plus form fields).
const CHECKOUT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/checkout",
            get(checkout::show)
                .post(checkout::place_order)
                .layer(DefaultBodyLimit::max(CHECKOUT_BODY_LIMIT)),
        )
        .route("/checkout/voucher", post(checkout::apply_voucher))
        .route("/checkout/verify-otp", post(checkout::verify_otp))
        .route("/checkout/cancel-otp", post(checkout::cancel_otp))
        .route("/thankyou", get(checkout::thank_you))
        .route("/thankyou/certificate", get(checkout::certificate))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact_page).post(pages::send_contact))
        .route("/shop", get(shop::index))
        .route("/product/{id}", get(shop::show))
        .route("/mycart", get(cart::show))
        .nest("/cart", cart_routes())
        .merge(checkout_routes())
}
