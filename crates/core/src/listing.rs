//! Search, archive filtering and pagination shared by every admin list.
//!
//! Each list page fetches everything, then narrows it here: case-insensitive
//! substring search over a fixed field list per entity, an optional archive
//! filter, and 10-row pages with a 3-number page window.

use std::str::FromStr;

use serde::Deserialize;

use crate::display::short_date;
use crate::types::{
    ActivityLog, Announcement, Beneficiary, CatalogItem, Order, OrderStatus, Staff,
};

/// Rows per admin page.
pub const PAGE_SIZE: usize = 10;

/// Page numbers shown at once.
pub const PAGE_WINDOW: usize = 3;

/// An entity that can be matched against the list search box.
pub trait Searchable {
    /// The strings the search box looks at.
    fn search_fields(&self) -> Vec<String>;

    /// Case-insensitive substring match; an empty query matches everything.
    fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
    }
}

impl<I> Searchable for CatalogItem<I> {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.ar_ref.clone(),
            self.display_name().to_owned(),
            self.category.clone(),
            self.size.clone(),
            self.price.to_string(),
            self.quantity.to_string(),
        ]
    }
}

impl Searchable for Order {
    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.id.to_string(),
            self.buyer_name.clone(),
            self.product_names().join(" "),
            self.payment_status.to_string(),
        ];
        if let Some(created) = self.created_at {
            fields.push(short_date(created));
            fields.push(created.format("%Y-%m-%d").to_string());
        }
        fields
    }
}

impl Searchable for Beneficiary {
    fn search_fields(&self) -> Vec<String> {
        vec![self.full_name()]
    }
}

impl Searchable for Staff {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.full_name.clone(),
            self.email.clone(),
            self.username.clone(),
        ]
    }
}

impl Searchable for Announcement {
    fn search_fields(&self) -> Vec<String> {
        vec![self.title.clone(), self.label.clone(), self.body.clone()]
    }
}

impl Searchable for ActivityLog {
    fn search_fields(&self) -> Vec<String> {
        vec![self.admin_name.clone(), self.action.clone()]
    }
}

/// Keep the items matching `query`, preserving order.
#[must_use]
pub fn search<T: Searchable>(items: Vec<T>, query: &str) -> Vec<T> {
    items.into_iter().filter(|item| item.matches(query)).collect()
}

/// Archive filter for product and inventory lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFilter {
    #[default]
    All,
    Active,
    Archived,
}

impl ArchiveFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Archived];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub const fn admits(self, archived: bool) -> bool {
        match self {
            Self::All => true,
            Self::Active => !archived,
            Self::Archived => archived,
        }
    }

    /// Keep catalog items whose archive flag passes the filter.
    #[must_use]
    pub fn apply<I>(self, items: Vec<CatalogItem<I>>) -> Vec<CatalogItem<I>> {
        items
            .into_iter()
            .filter(|item| self.admits(item.is_archived))
            .collect()
    }
}

impl FromStr for ArchiveFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            other => Err(format!("invalid archive filter: {other}")),
        }
    }
}

/// Keep orders in the given status, or all of them.
#[must_use]
pub fn filter_by_status(orders: Vec<Order>, status: Option<OrderStatus>) -> Vec<Order> {
    match status {
        Some(status) => orders.into_iter().filter(|o| o.status == status).collect(),
        None => orders,
    }
}

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number, clamped to the available range.
    pub current: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// Page numbers to render as links.
    pub window: Vec<usize>,
    /// 1-based index of the first row on this page, for "No" columns.
    pub first_row: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.current > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current < self.total_pages
    }

    #[must_use]
    pub const fn prev(&self) -> usize {
        self.current.saturating_sub(1)
    }

    #[must_use]
    pub const fn next(&self) -> usize {
        self.current + 1
    }

    /// Transform the rows, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current: self.current,
            total_pages: self.total_pages,
            total_items: self.total_items,
            window: self.window,
            first_row: self.first_row,
        }
    }
}

/// Page numbers around `current`: start at `current − 1`, take up to
/// [`PAGE_WINDOW`], and shift back when the end runs out.
#[must_use]
pub fn page_window(current: usize, total_pages: usize) -> Vec<usize> {
    if total_pages == 0 {
        return Vec::new();
    }
    let mut start = current.saturating_sub(1).max(1);
    let end = (start + PAGE_WINDOW - 1).min(total_pages);
    if end + 1 - start < PAGE_WINDOW {
        start = (end + 1).saturating_sub(PAGE_WINDOW).max(1);
    }
    (start..=end).collect()
}

/// Slice out page `requested` (1-based) of [`PAGE_SIZE`] rows.
#[must_use]
pub fn paginate<T>(items: Vec<T>, requested: usize) -> Page<T> {
    let total_items = items.len();
    let total_pages = total_items.div_ceil(PAGE_SIZE);
    let current = requested.clamp(1, total_pages.max(1));
    let skip = (current - 1) * PAGE_SIZE;

    Page {
        items: items.into_iter().skip(skip).take(PAGE_SIZE).collect(),
        current,
        total_pages,
        total_items,
        window: page_window(current, total_pages),
        first_row: skip + 1,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Product;

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(1, 0), Vec::<usize>::new());
        assert_eq!(page_window(1, 1), vec![1]);
        assert_eq!(page_window(1, 5), vec![1, 2, 3]);
        assert_eq!(page_window(2, 5), vec![1, 2, 3]);
        assert_eq!(page_window(3, 5), vec![2, 3, 4]);
        assert_eq!(page_window(5, 5), vec![3, 4, 5]);
        assert_eq!(page_window(2, 2), vec![1, 2]);
    }

    #[test]
    fn test_paginate_slices_and_clamps() {
        let items: Vec<u32> = (1..=23).collect();
        let page = paginate(items.clone(), 3);
        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.first_row, 21);
        assert!(page.has_prev());
        assert!(!page.has_next());

        let clamped = paginate(items, 99);
        assert_eq!(clamped.current, 3);

        let empty = paginate(Vec::<u32>::new(), 1);
        assert_eq!(empty.current, 1);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.items.is_empty());
        assert!(empty.window.is_empty());
    }

    fn product(name: &str, archived: bool) -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": name, "itemName": name, "category": "Bags", "arRef": "AR-7",
            "price": 99, "isArchived": archived
        }))
        .unwrap()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let items = vec![product("Leather Tote", false), product("Rain boots", false)];
        let found = search(items.clone(), "tOtE");
        assert_eq!(found.len(), 1);
        assert_eq!(search(items.clone(), "ar-7").len(), 2);
        assert_eq!(search(items, "  ").len(), 2);
    }

    #[test]
    fn test_archive_filter() {
        let items = vec![product("a", false), product("b", true)];
        assert_eq!(ArchiveFilter::All.apply(items.clone()).len(), 2);
        assert_eq!(ArchiveFilter::Active.apply(items.clone()).len(), 1);
        let archived = ArchiveFilter::Archived.apply(items);
        assert_eq!(archived.first().unwrap().item_name, "b");
        assert_eq!("".parse::<ArchiveFilter>().unwrap(), ArchiveFilter::All);
    }

    #[test]
    fn test_order_search_fields() {
        let order: Order = serde_json::from_str(
            r#"{"_id":"abc123","buyerName":"Ana Cruz","paymentStatus":"paid",
                "items":[{"productId":{"_id":"p1","title":"Rain boots"}}]}"#,
        )
        .unwrap();
        assert!(order.matches("ABC1"));
        assert!(order.matches("rain"));
        assert!(order.matches("paid"));
        assert!(!order.matches("lamp"));
    }
}
