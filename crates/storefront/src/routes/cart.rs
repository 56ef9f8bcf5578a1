//! Cart route handlers.
//!
//! The backend holds the cart; these handlers relay the visitor's backend
//! cookie, render the returned snapshot and report failures as flash
//! notices.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::{CartItem, CartSnapshot, Notice, ProductId, stock};

use crate::backend::AddToCart;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::Flash;
use crate::models::session;
use crate::routes::shop::ProductCard;
use crate::state::AppState;

/// Suggestions shown under the cart.
const SUGGESTION_LIMIT: usize = 3;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub title: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
    pub line_total: Decimal,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            title: item.title.clone(),
            image: item.image.clone().filter(|i| !i.is_empty()),
            quantity: item.quantity(),
            price: item.unit_price(),
            line_total: item.line_total(),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: Decimal,
    pub item_count: u32,
}

impl From<&CartSnapshot> for CartView {
    fn from(cart: &CartSnapshot) -> Self {
        Self {
            lines: cart.cart.iter().map(CartLineView::from).collect(),
            subtotal: cart.subtotal(),
            item_count: cart.item_count(),
        }
    }
}

/// Fetch the visitor's cart, treating any failure as an empty cart.
pub(crate) async fn current_cart(state: &AppState, session: &Session) -> CartSnapshot {
    let mut jar = session::cart_cookie(session).await;
    let cart = match state.backend().get_cart(&mut jar).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            CartSnapshot::default()
        }
    };
    if let Err(e) = session::store_cart_cookie(session, &jar).await {
        tracing::warn!("Failed to store backend cookie: {e}");
    }
    cart
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub flash: Option<Notice>,
    pub cart: CartView,
    pub suggestions: Vec<ProductCard>,
}

/// Display cart page with suggestions.
#[instrument(skip(state, session, flash))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Flash(flash): Flash,
) -> CartShowTemplate {
    let cart = current_cart(&state, &session).await;
    let suggestions = suggestions(&state, &cart).await;

    CartShowTemplate {
        flash,
        cart: CartView::from(&cart),
        suggestions,
    }
}

/// Random in-stock products; falls back to the whole catalog when the
/// random endpoint fails or comes back empty.
async fn suggestions(state: &AppState, cart: &CartSnapshot) -> Vec<ProductCard> {
    let random = match state.backend().random_products(SUGGESTION_LIMIT).await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!("Failed to fetch random products: {e}");
            Vec::new()
        }
    };

    let candidates = if random.is_empty() {
        state
            .backend()
            .customer_products()
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to fetch suggestion fallback: {e}");
                Vec::new()
            })
    } else {
        random
    };

    stock::in_stock(candidates, &cart.cart)
        .iter()
        .take(SUGGESTION_LIMIT)
        .map(ProductCard::from)
        .collect()
}

/// Add one unit of a product to the cart.
///
/// The product is refetched so title, price and image come from the
/// backend rather than the form.
#[instrument(skip(state, session, form), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(form.product_id);
    let back = format!("/product/{id}");

    let product = match state.backend().product(&id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::warn!("Failed to load product for cart add: {e}");
            session::flash(&session, Notice::error(e.user_message())).await?;
            return Ok(Redirect::to(&back));
        }
    };

    let item = AddToCart {
        product_id: id,
        quantity: 1,
        title: product.display_name().to_string(),
        price: product.price,
        image: product.primary_image().unwrap_or_default().to_string(),
    };

    let mut jar = session::cart_cookie(&session).await;
    let result = state.backend().add_to_cart(&mut jar, &item).await;
    session::store_cart_cookie(&session, &jar).await?;

    let notice = match result {
        Ok(_) => {
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("product_id", item.product_id.as_str())]),
            );
            Notice::success(format!("{} added to cart!", item.title))
        }
        Err(e) => {
            tracing::warn!("Failed to add to cart: {e}");
            Notice::error(e.user_message())
        }
    };
    session::flash(&session, notice).await?;

    Ok(Redirect::to(&back))
}

/// Remove a product from the cart.
#[instrument(skip(state, session, form), fields(product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(form.product_id);

    let mut jar = session::cart_cookie(&session).await;
    let result = state.backend().remove_from_cart(&mut jar, &id).await;
    session::store_cart_cookie(&session, &jar).await?;

    if let Err(e) = result {
        tracing::warn!("Failed to remove from cart: {e}");
        session::flash(&session, Notice::error(e.user_message())).await?;
    }

    Ok(Redirect::to("/mycart"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_view_uses_aliases_and_defaults() {
        let cart: CartSnapshot = serde_json::from_str(
            r#"{"success":true,"cart":[
                {"productId":"p1","title":"Mug","unitPrice":45,"qty":2,"image":""},
                {"productId":"p2","title":"Lamp","price":150}
            ]}"#,
        )
        .unwrap();
        let view = CartView::from(&cart);

        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, Decimal::from(240));
        let first = view.lines.first().unwrap();
        assert_eq!(first.line_total, Decimal::from(90));
        assert!(first.image.is_none());
    }
}
