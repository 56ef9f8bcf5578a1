//! Integration test harness for Segunda Mana.
//!
//! Each test starts a [`FakeBackend`] (an axum router standing in for the
//! REST API) and the real storefront or admin router on ephemeral ports,
//! then drives them with a cookie-keeping [`browser`].
//!
//! ```rust,ignore
//! let backend = FakeBackend::start().await;
//! let admin = spawn_admin(&backend).await;
//! let resp = browser().get(format!("{admin}/orders")).send().await.unwrap();
//! assert_eq!(location(&resp), "/login");
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// Password every fake account accepts.
pub const PASSWORD: &str = "correct-horse";

/// A superadmin login.
pub const SUPERADMIN_EMAIL: &str = "ana@segundamana.org";

/// A staff login.
pub const STAFF_EMAIL: &str = "ben@segundamana.org";

/// The OTP the fake backend accepts.
pub const VALID_OTP: &str = "123456";

const SUPERADMIN_TOKEN: &str = "superadmin-token";
const STAFF_TOKEN: &str = "staff-token";

/// What the fake backend holds and how it answers.
#[derive(Debug, Default)]
pub struct BackendState {
    /// Order placement answers `requiresOtp: true`.
    pub requires_otp: bool,
    /// Voucher code returned by a direct (no OTP) order placement.
    pub voucher_code: Option<String>,
    /// Order placement is refused with 400 and this message.
    pub order_rejection: Option<String>,
    pub cart: Vec<Value>,
    /// Times `POST /api/cart/clear` was called.
    pub cart_clears: usize,
    pub orders: Vec<Value>,
    pub activity: Vec<Value>,
    /// Every admin token is refused with 401.
    pub tokens_revoked: bool,
}

/// A running fake REST backend.
#[derive(Clone)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
    url: Url,
}

impl FakeBackend {
    /// Start an empty backend.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(BackendState::default()));
        let addr = serve(router(state.clone())).await;
        let url = Url::parse(&format!("http://{addr}/")).expect("valid backend URL");
        Self { state, url }
    }

    #[must_use]
    pub fn url(&self) -> Url {
        self.url.clone()
    }

    /// Lock the state to seed or inspect it.
    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("backend state poisoned")
    }
}

/// Serve `router` on an ephemeral local port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener has an address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });
    addr
}

/// Start the storefront against `backend` and return its base URL.
pub async fn spawn_storefront(backend: &FakeBackend) -> String {
    use segunda_mana_storefront::config::StorefrontConfig;

    let config = StorefrontConfig::for_backend(backend.url());
    let state = segunda_mana_storefront::AppState::new(config).expect("storefront state");
    let addr = serve(segunda_mana_storefront::app(state)).await;
    format!("http://{addr}")
}

/// Start the admin panel against `backend` and return its base URL.
pub async fn spawn_admin(backend: &FakeBackend) -> String {
    use segunda_mana_admin::config::AdminConfig;

    let config = AdminConfig::for_backend(backend.url());
    let state = segunda_mana_admin::AppState::new(config).expect("admin state");
    let addr = serve(segunda_mana_admin::app(state)).await;
    format!("http://{addr}")
}

/// A client that keeps cookies and does not follow redirects.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// The `Location` header of a redirect, or an empty string.
#[must_use]
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Log `browser` into the admin at `base` and return the redirect target.
pub async fn admin_login(browser: &reqwest::Client, base: &str, email: &str) -> String {
    let response = browser
        .post(format!("{base}/login"))
        .form(&[("email", email), ("password", PASSWORD)])
        .send()
        .await
        .expect("login request");
    location(&response)
}

/// A cart line as the backend stores it.
#[must_use]
pub fn cart_item(id: &str, title: &str, price: u32) -> Value {
    json!({ "productId": id, "title": title, "price": price, "quantity": 1 })
}

/// An order document as the backend returns it.
#[must_use]
pub fn order_doc(id: &str, buyer: &str) -> Value {
    json!({
        "_id": id,
        "buyerName": buyer,
        "buyerEmail": "ana@example.ph",
        "items": [],
        "status": "pending",
        "paymentStatus": "pending",
        "paymentMethod": "cash",
        "orderType": "pickup",
        "subtotal": 350,
        "impact": { "meals": 3 },
        "shippingAddress": { "name": buyer },
        "createdAt": "2024-06-01T02:30:00Z"
    })
}

// =============================================================================
// Fake backend routes
// =============================================================================

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().expect("backend state poisoned")
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/admin/auth/login", post(login))
        .route("/api/admin/auth/me", get(me))
        .route("/api/admin/orders", get(orders))
        .route("/api/admin/orders/order", post(place_order))
        .route("/api/admin/orders/verify-otp", post(verify_otp))
        .route("/api/admin/orders/{id}", get(order))
        .route("/api/admin/activity", get(activity))
        .route("/api/cart/get", get(cart))
        .route("/api/cart/clear", post(clear_cart))
        .with_state(state)
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn profile(email: &str) -> Option<Value> {
    match email {
        SUPERADMIN_EMAIL => Some(json!({
            "fullName": "Ana Reyes", "email": email, "role": "superadmin"
        })),
        STAFF_EMAIL => Some(json!({
            "fullName": "Ben Santos", "email": email, "role": "staff"
        })),
        _ => None,
    }
}

/// The email behind a valid bearer token.
fn authorize(state: &Shared, headers: &HeaderMap) -> Result<&'static str, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    let email = match token {
        SUPERADMIN_TOKEN => SUPERADMIN_EMAIL,
        STAFF_TOKEN => STAFF_EMAIL,
        _ => return Err(failure(StatusCode::UNAUTHORIZED, "Not authorized")),
    };
    if lock(state).tokens_revoked {
        return Err(failure(StatusCode::UNAUTHORIZED, "Token expired"));
    }
    Ok(email)
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match profile(email) {
        Some(user) if password == PASSWORD => {
            let token = if email == SUPERADMIN_EMAIL {
                SUPERADMIN_TOKEN
            } else {
                STAFF_TOKEN
            };
            Json(json!({ "token": token, "user": user })).into_response()
        }
        _ => failure(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    }
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    match authorize(&state, &headers) {
        Ok(email) => Json(json!({ "user": profile(email) })).into_response(),
        Err(rejection) => rejection,
    }
}

async fn orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    Json(json!({ "orders": lock(&state).orders })).into_response()
}

async fn order(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let found = lock(&state)
        .orders
        .iter()
        .find(|o| o["_id"] == id.as_str())
        .cloned();
    match found {
        Some(order) => Json(json!({ "order": order })).into_response(),
        None => failure(StatusCode::NOT_FOUND, "Order not found"),
    }
}

async fn activity(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    Json(json!({ "logs": lock(&state).activity })).into_response()
}

async fn cart(State(state): State<Shared>) -> Json<Value> {
    Json(json!({ "success": true, "cart": lock(&state).cart }))
}

async fn clear_cart(State(state): State<Shared>) -> Json<Value> {
    let mut state = lock(&state);
    state.cart.clear();
    state.cart_clears += 1;
    Json(json!({ "success": true, "cart": [] }))
}

/// Accepts any multipart body; the answer depends on the seeded state.
async fn place_order(State(state): State<Shared>) -> Response {
    let mut state = lock(&state);
    if let Some(message) = &state.order_rejection {
        return failure(StatusCode::BAD_REQUEST, message);
    }
    let id = format!("o{}", state.orders.len() + 1);
    state.orders.push(order_doc(&id, "Ana Cruz"));

    if state.requires_otp {
        Json(json!({ "requiresOtp": true, "orderId": id })).into_response()
    } else {
        Json(json!({ "orderId": id, "voucherCode": state.voucher_code })).into_response()
    }
}

async fn verify_otp(Json(body): Json<Value>) -> Response {
    if body["otp"].as_str() != Some(VALID_OTP) {
        return failure(StatusCode::BAD_REQUEST, "Invalid or expired OTP");
    }
    Json(json!({
        "success": true,
        "order": { "_id": body["orderId"], "ticketVoucher": { "code": "TV-0001" } }
    }))
    .into_response()
}
