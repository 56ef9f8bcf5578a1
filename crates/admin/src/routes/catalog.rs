//! Views and templates shared by the product and inventory pages.
//!
//! Both collections have the same document shape, so one list template and
//! one form template serve both; each page module supplies its own paths
//! and headings.

use askama::Template;
use rust_decimal::Decimal;

use segunda_mana_core::display::capitalize;
use segunda_mana_core::listing::{ArchiveFilter, Page, paginate, search};
use segunda_mana_core::{CATEGORIES, CatalogForm, CatalogItem, Notice, SIZES, STOCK_STATUSES};

use crate::filters;

use super::dashboard::AdminUserView;
use super::{ListQuery, SelectOption};

/// Catalog row for list templates.
#[derive(Debug, Clone)]
pub struct CatalogRow {
    pub id: String,
    pub no: usize,
    pub ar_ref: String,
    pub name: String,
    pub category: String,
    pub size: String,
    pub price: Decimal,
    pub quantity: i64,
    pub description: String,
    pub status: String,
    pub image: Option<String>,
    pub is_archived: bool,
}

impl CatalogRow {
    /// Build a row; `no` is the 1-based position across all pages.
    pub fn new<I: std::fmt::Display>(item: &CatalogItem<I>, no: usize) -> Self {
        Self {
            id: item.id.to_string(),
            no,
            ar_ref: item.ar_ref.clone(),
            name: item.display_name().to_string(),
            category: item.category.clone(),
            size: item.size.clone(),
            price: item.price,
            quantity: item.quantity,
            description: item.description.clone(),
            status: item.status_label().to_string(),
            image: item.primary_image().map(String::from),
            is_archived: item.is_archived,
        }
    }
}

/// Paths and wording that differ between products and inventory.
#[derive(Debug, Clone, Copy)]
pub struct CatalogPage {
    /// Singular noun for headings: "Product", "Inventory item".
    pub noun: &'static str,
    /// List heading.
    pub heading: &'static str,
    pub list_path: &'static str,
    pub add_path: &'static str,
}

/// Search, archive-filter and page a catalog list.
pub fn list_page<I: std::fmt::Display>(
    items: Vec<CatalogItem<I>>,
    query: &ListQuery,
) -> Page<CatalogRow> {
    let filter: ArchiveFilter = query.archive.parse().unwrap_or_default();
    let page = paginate(filter.apply(search(items, &query.q)), query.page());
    let mut no = page.first_row;
    page.map(|item| {
        let row = CatalogRow::new(&item, no);
        no += 1;
        row
    })
}

/// Options for the archive dropdown.
pub fn archive_options(query: &ListQuery) -> Vec<SelectOption> {
    let current: ArchiveFilter = query.archive.parse().unwrap_or_default();
    ArchiveFilter::ALL
        .iter()
        .map(|f| SelectOption {
            value: f.as_str().to_string(),
            label: capitalize(f.as_str()),
            selected: *f == current,
        })
        .collect()
}

/// Catalog list template.
#[derive(Template)]
#[template(path = "catalog/index.html")]
pub struct CatalogListTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Notice>,
    pub catalog: CatalogPage,
    pub page: Page<CatalogRow>,
    pub query: ListQuery,
    pub filter_query: String,
    pub archive_options: Vec<SelectOption>,
}

/// Add/edit form template.
#[derive(Template)]
#[template(path = "catalog/form.html")]
pub struct CatalogFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Notice>,
    pub heading: String,
    pub action: String,
    pub cancel_path: &'static str,
    pub form: CatalogForm,
    pub categories: Vec<SelectOption>,
    pub sizes: Vec<SelectOption>,
    pub statuses: Vec<SelectOption>,
}

impl CatalogFormTemplate {
    /// Fill the dropdowns from the form's current values.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        admin_user: AdminUserView,
        current_path: &'static str,
        flash: Option<Notice>,
        heading: String,
        action: String,
        cancel_path: &'static str,
        form: CatalogForm,
    ) -> Self {
        let status = if form.status.trim().is_empty() {
            segunda_mana_core::DEFAULT_STOCK_STATUS
        } else {
            form.status.as_str()
        };
        Self {
            categories: SelectOption::plain(CATEGORIES, &form.category),
            sizes: SelectOption::plain(SIZES, &form.size),
            statuses: SelectOption::plain(STOCK_STATUSES, status),
            admin_user,
            current_path,
            flash,
            heading,
            action,
            cancel_path,
            form,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use segunda_mana_core::Product;
    use serde_json::json;

    use super::*;

    fn products(n: usize) -> Vec<Product> {
        (0..n)
            .map(|i| {
                serde_json::from_value(json!({
                    "_id": format!("p{i}"),
                    "itemName": format!("Item {i}"),
                    "category": if i % 2 == 0 { "Shoes" } else { "Bags" },
                    "price": 100,
                    "isArchived": i == 3,
                }))
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_rows_are_numbered_across_pages() {
        let query = ListQuery {
            page: "2".to_string(),
            ..ListQuery::default()
        };
        let page = list_page(products(15), &query);
        assert_eq!(page.current, 2);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].no, 11);
        assert_eq!(page.items[0].id, "p10");
    }

    #[test]
    fn test_search_and_archive_filter_combine() {
        let query = ListQuery {
            q: "bags".to_string(),
            archive: "active".to_string(),
            ..ListQuery::default()
        };
        let page = list_page(products(6), &query);
        let ids: Vec<&str> = page.items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p5"]);
    }

    #[test]
    fn test_unknown_archive_filter_shows_all() {
        let query = ListQuery {
            archive: "bogus".to_string(),
            ..ListQuery::default()
        };
        assert_eq!(list_page(products(4), &query).total_items, 4);
        assert!(archive_options(&query)[0].selected);
    }

    #[test]
    fn test_form_defaults_status() {
        let template = CatalogFormTemplate::new(
            AdminUserView {
                name: "Ana".to_string(),
                email: String::new(),
                role: "Staff".to_string(),
                is_super_admin: false,
            },
            "/add-product",
            None,
            "Add Product".to_string(),
            "/add-product".to_string(),
            "/admin-product",
            CatalogForm::default(),
        );
        let selected: Vec<&str> = template
            .statuses
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, ["Available"]);
    }
}
