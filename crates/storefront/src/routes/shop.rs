//! Shop listing and product detail.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::{CATEGORIES, Notice, Product, ProductId, stock};

use crate::error::Result;
use crate::filters;
use crate::middleware::Flash;
use crate::routes::cart::current_cart;
use crate::state::AppState;

/// Product display data for cards and grids.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub category: String,
    pub size: String,
    pub price: Decimal,
    pub image: Option<String>,
    /// Stock left after what the visitor already holds in the cart.
    pub available: i64,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.display_name().to_string(),
            category: product.category.clone(),
            size: product.size.clone(),
            price: product.price,
            image: product.primary_image().map(String::from),
            available: product.quantity,
        }
    }
}

/// Shop filters from the query string. Blank inputs mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub min: String,
    #[serde(default)]
    pub max: String,
}

impl ShopQuery {
    fn bound(raw: &str) -> Option<Decimal> {
        raw.trim().parse::<Decimal>().ok()
    }

    /// Price range, category and free-text search, all conjunctive.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if Self::bound(&self.min).is_some_and(|min| product.price < min)
            || Self::bound(&self.max).is_some_and(|max| product.price > max)
        {
            return false;
        }

        let category = self.category.trim();
        if !category.is_empty() && product.category != category {
            return false;
        }

        let q = self.q.trim().to_lowercase();
        q.is_empty()
            || [
                product.display_name(),
                product.category.as_str(),
                product.size.as_str(),
                product.description.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&q))
            || product.price.to_string().contains(&q)
    }
}

/// One entry of the category dropdown.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub name: &'static str,
    pub selected: bool,
}

/// Shop page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopTemplate {
    pub flash: Option<Notice>,
    pub products: Vec<ProductCard>,
    pub categories: Vec<CategoryOption>,
    pub query: ShopQuery,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/product.html")]
pub struct ProductTemplate {
    pub flash: Option<Notice>,
    pub product: ProductCard,
    pub description: String,
    pub status: String,
    pub images: Vec<String>,
}

/// Display the shop with filters applied.
#[instrument(skip(state, session, flash))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Flash(flash): Flash,
    Query(query): Query<ShopQuery>,
) -> Result<ShopTemplate> {
    let (products, cart) = tokio::join!(
        state.backend().customer_products(),
        current_cart(&state, &session)
    );
    let products = products.unwrap_or_else(|e| {
        tracing::warn!("Failed to load products: {e}");
        Vec::new()
    });

    let products = stock::in_stock(products, &cart.cart)
        .iter()
        .filter(|p| query.matches(p))
        .map(ProductCard::from)
        .collect();

    let categories = CATEGORIES
        .iter()
        .map(|&name| CategoryOption {
            name,
            selected: query.category.trim() == name,
        })
        .collect();

    Ok(ShopTemplate {
        flash,
        products,
        categories,
        query,
    })
}

/// Display one product with stock adjusted for the visitor's cart.
#[instrument(skip(state, session, flash))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Flash(flash): Flash,
    Path(id): Path<String>,
) -> Result<ProductTemplate> {
    let id = ProductId::new(id);
    let (product, cart) = tokio::join!(
        state.backend().product(&id),
        current_cart(&state, &session)
    );
    let mut product = product?;
    stock::adjust_for_cart(std::slice::from_mut(&mut product), &cart.cart);

    let mut images = product.images.clone();
    if let Some(single) = product.image.as_ref().filter(|i| !images.contains(i)) {
        images.push(single.clone());
    }

    Ok(ProductTemplate {
        flash,
        product: ProductCard::from(&product),
        description: product.description.clone(),
        status: product.status_label().to_string(),
        images,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(name: &str, category: &str, price: i64) -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": name, "itemName": name, "category": category,
            "size": "M", "price": price, "quantity": 1
        }))
        .unwrap()
    }

    fn query(q: &str, category: &str, min: &str, max: &str) -> ShopQuery {
        ShopQuery {
            q: q.to_string(),
            category: category.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    #[test]
    fn test_blank_query_matches_everything() {
        assert!(ShopQuery::default().matches(&product("Lamp", "Furniture", 100)));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let lamp = product("Lamp", "Furniture", 100);
        assert!(query("", "", "100", "100").matches(&lamp));
        assert!(!query("", "", "101", "").matches(&lamp));
        assert!(!query("", "", "", "99.99").matches(&lamp));
        assert!(query("", "", "abc", "").matches(&lamp));
    }

    #[test]
    fn test_category_and_search() {
        let tote = product("Leather Tote", "Bags", 450);
        assert!(query("tote", "Bags", "", "").matches(&tote));
        assert!(!query("tote", "Toys", "", "").matches(&tote));
        assert!(query("bags", "", "", "").matches(&tote));
        assert!(!query("lamp", "", "", "").matches(&tote));
    }
}
