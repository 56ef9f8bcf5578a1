//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use rand::seq::SliceRandom;
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::display::long_date;
use segunda_mana_core::{Announcement, Notice, stock};

use crate::filters;
use crate::middleware::Flash;
use crate::routes::cart::current_cart;
use crate::routes::shop::ProductCard;
use crate::state::AppState;

/// Products featured on the landing page.
const FEATURED_LIMIT: usize = 8;

/// Announcement display data for templates.
#[derive(Debug, Clone)]
pub struct AnnouncementView {
    pub title: String,
    pub label: String,
    /// Trusted HTML authored in admin.
    pub body: String,
    pub cover: Option<String>,
    pub date: String,
}

impl From<&Announcement> for AnnouncementView {
    fn from(a: &Announcement) -> Self {
        Self {
            title: a.title.clone(),
            label: a.label.clone(),
            body: a.body.clone(),
            cover: a.cover().map(String::from),
            date: a.created_at.map(long_date).unwrap_or_default(),
        }
    }
}

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub flash: Option<Notice>,
    pub announcements: Vec<AnnouncementView>,
    pub products: Vec<ProductCard>,
}

/// Display the landing page: active announcements and in-stock products,
/// each in random order.
#[instrument(skip(state, session, flash))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    Flash(flash): Flash,
) -> HomeTemplate {
    let (announcements, products, cart) = tokio::join!(
        state.backend().public_announcements(),
        state.backend().customer_products(),
        current_cart(&state, &session),
    );

    let mut announcements: Vec<AnnouncementView> = announcements
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to fetch announcements: {e}");
            Vec::new()
        })
        .iter()
        .filter(|a| a.active)
        .map(AnnouncementView::from)
        .collect();

    let mut products = stock::in_stock(
        products.unwrap_or_else(|e| {
            tracing::warn!("Failed to fetch products: {e}");
            Vec::new()
        }),
        &cart.cart,
    );

    let mut rng = rand::rng();
    announcements.shuffle(&mut rng);
    products.shuffle(&mut rng);

    HomeTemplate {
        flash,
        announcements,
        products: products
            .iter()
            .take(FEATURED_LIMIT)
            .map(ProductCard::from)
            .collect(),
    }
}
