//! CSV export of admin lists.
//!
//! Every field is wrapped in double quotes with embedded quotes doubled;
//! fields are comma-joined and lines `\n`-joined. Embedded newlines are left
//! as they are. An empty list is an error so the caller can show a notice
//! instead of sending an empty file.

use crate::display::{short_date, short_time};
use crate::types::{ActivityLog, Beneficiary, CatalogItem, DailyCollection, Order};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("No {0} data to export.")]
    Empty(&'static str),
    #[error("No records found for this branch and date")]
    NoRecords,
}

/// Quote one field.
#[must_use]
pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Join a header row and data rows into a document.
fn document(headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut out = headers
        .iter()
        .map(|h| quote(h))
        .collect::<Vec<_>>()
        .join(",");
    for row in rows {
        let line = row.iter().map(|f| quote(f)).collect::<Vec<_>>().join(",");
        out.push('\n');
        out.push_str(&line);
    }
    out
}

fn date_parts(at: Option<chrono::DateTime<chrono::Utc>>) -> (String, String) {
    at.map_or_else(
        || (String::new(), String::new()),
        |at| (short_date(at), short_time(at)),
    )
}

pub const ORDER_HEADERS: [&str; 9] = [
    "No",
    "Order ID",
    "Product IDs",
    "Product Names",
    "Customer",
    "Date",
    "Time",
    "Status",
    "Payment Status",
];

/// # Errors
///
/// Returns [`ExportError::Empty`] for an empty list.
pub fn orders(orders: &[Order]) -> Result<String, ExportError> {
    if orders.is_empty() {
        return Err(ExportError::Empty("order"));
    }
    Ok(document(
        &ORDER_HEADERS,
        orders.iter().enumerate().map(|(i, o)| {
            let (date, time) = date_parts(o.created_at);
            vec![
                (i + 1).to_string(),
                o.id.to_string(),
                o.product_ids().join(", "),
                o.product_names().join(", "),
                o.buyer_name.clone(),
                date,
                time,
                o.status.label().to_owned(),
                o.payment_status.label().to_owned(),
            ]
        }),
    ))
}

pub const INVENTORY_HEADERS: [&str; 7] = [
    "ID",
    "AR Ref No.",
    "Item Name",
    "Category",
    "Size",
    "Price",
    "Description",
];

/// # Errors
///
/// Returns [`ExportError::Empty`] for an empty list.
pub fn inventory<I: std::fmt::Display>(items: &[CatalogItem<I>]) -> Result<String, ExportError> {
    if items.is_empty() {
        return Err(ExportError::Empty("inventory"));
    }
    Ok(document(
        &INVENTORY_HEADERS,
        items.iter().map(|item| {
            vec![
                item.id.to_string(),
                item.ar_ref.clone(),
                item.display_name().to_owned(),
                item.category.clone(),
                item.size.clone(),
                item.price.to_string(),
                item.description.clone(),
            ]
        }),
    ))
}

pub const PRODUCT_HEADERS: [&str; 8] = [
    "No",
    "AR Ref No.",
    "Item Name",
    "Category",
    "Size",
    "Price",
    "Quantity",
    "Description",
];

/// # Errors
///
/// Returns [`ExportError::Empty`] for an empty list.
pub fn products<I>(items: &[CatalogItem<I>]) -> Result<String, ExportError> {
    if items.is_empty() {
        return Err(ExportError::Empty("product"));
    }
    Ok(document(
        &PRODUCT_HEADERS,
        items.iter().enumerate().map(|(i, item)| {
            vec![
                (i + 1).to_string(),
                item.ar_ref.clone(),
                item.display_name().to_owned(),
                item.category.clone(),
                item.size.clone(),
                item.price.to_string(),
                item.quantity.to_string(),
                item.description.clone(),
            ]
        }),
    ))
}

pub const BENEFICIARY_HEADERS: [&str; 5] = ["No", "Name", "Age", "Status", "Date Registered"];

/// # Errors
///
/// Returns [`ExportError::Empty`] for an empty list.
pub fn beneficiaries(items: &[Beneficiary]) -> Result<String, ExportError> {
    if items.is_empty() {
        return Err(ExportError::Empty("beneficiary"));
    }
    Ok(document(
        &BENEFICIARY_HEADERS,
        items.iter().enumerate().map(|(i, b)| {
            vec![
                (i + 1).to_string(),
                b.full_name(),
                b.age.map(|a| a.to_string()).unwrap_or_default(),
                b.status.to_string(),
                b.registered_on(),
            ]
        }),
    ))
}

pub const ACTIVITY_HEADERS: [&str; 5] = ["Date", "Time", "User", "Activity Type", "Changes"];

/// # Errors
///
/// Returns [`ExportError::Empty`] for an empty list.
pub fn activity(logs: &[ActivityLog]) -> Result<String, ExportError> {
    if logs.is_empty() {
        return Err(ExportError::Empty("activity"));
    }
    Ok(document(
        &ACTIVITY_HEADERS,
        logs.iter().map(|log| {
            vec![
                log.formatted_date.clone(),
                log.formatted_time.clone(),
                log.admin_name.clone(),
                log.action.clone(),
                log.changes(),
            ]
        }),
    ))
}

pub const COLLECTION_HEADERS: [&str; 16] = [
    "Branch",
    "Date",
    "No",
    "AR Ref",
    "Item",
    "Qty",
    "Amount",
    "Total",
    "Cash",
    "Gcash",
    "Discount",
    "Reason",
    "Approver",
    "PreparedBy",
    "NotedBy",
    "ValidatedBy",
];

/// Flatten past collection sheets, one line per row.
///
/// # Errors
///
/// Returns [`ExportError::NoRecords`] when no sheet has rows.
pub fn daily_collections(sheets: &[DailyCollection]) -> Result<String, ExportError> {
    if sheets.iter().all(|s| s.rows.is_empty()) {
        return Err(ExportError::NoRecords);
    }
    Ok(document(
        &COLLECTION_HEADERS,
        sheets.iter().flat_map(|sheet| {
            sheet.rows.iter().enumerate().map(move |(i, r)| {
                vec![
                    sheet.branch.clone(),
                    sheet.date.clone(),
                    (i + 1).to_string(),
                    r.ar_ref.clone(),
                    r.item.clone(),
                    r.qty.to_string(),
                    r.amount.to_string(),
                    r.computed_total().unwrap_or(r.total).to_string(),
                    r.cash.to_string(),
                    r.gcash.to_string(),
                    r.discount.to_string(),
                    r.reason.clone(),
                    r.approver.clone(),
                    sheet.prepared_by.clone(),
                    sheet.noted_by.clone(),
                    sheet.validated_by.clone(),
                ]
            })
        }),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{InventoryItem, Product};

    #[test]
    fn test_quote_doubles_quotes() {
        assert_eq!(quote(r#"12" boots"#), r#""12"" boots""#);
        assert_eq!(quote("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_empty_lists_report_no_data() {
        assert_eq!(orders(&[]), Err(ExportError::Empty("order")));
        assert_eq!(
            products::<crate::types::ProductId>(&[]),
            Err(ExportError::Empty("product"))
        );
        assert_eq!(
            ExportError::Empty("inventory").to_string(),
            "No inventory data to export."
        );
        assert_eq!(daily_collections(&[]), Err(ExportError::NoRecords));
    }

    #[test]
    fn test_orders_document() {
        let order: Order = serde_json::from_str(
            r#"{"_id":"o1","buyerName":"Ana \"Annie\" Cruz","status":"received",
                "items":[{"productId":{"_id":"p1","title":"Rain boots"}},{"productId":"p2"}],
                "createdAt":"2024-06-01T02:30:00.000Z"}"#,
        )
        .unwrap();
        let csv = orders(&[order]).unwrap();
        let mut lines = csv.split('\n');
        assert_eq!(
            lines.next().unwrap(),
            r#""No","Order ID","Product IDs","Product Names","Customer","Date","Time","Status","Payment Status""#
        );
        assert_eq!(
            lines.next().unwrap(),
            r#""1","o1","p1, p2","Rain boots","Ana ""Annie"" Cruz","06/01/2024","10:30 AM","Received","Pending""#
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_inventory_and_products_headers() {
        let item: InventoryItem = serde_json::from_str(
            r#"{"_id":"i1","arRef":"AR-1","itemName":"Lamp","price":"150.00","quantity":2}"#,
        )
        .unwrap();
        let csv = inventory(&[item]).unwrap();
        assert!(csv.starts_with(r#""ID","AR Ref No.","Item Name""#));
        assert!(csv.ends_with(r#""i1","AR-1","Lamp","","","150.00","""#));

        let product: Product =
            serde_json::from_str(r#"{"_id":"p1","itemName":"Mug","price":45,"quantity":3}"#)
                .unwrap();
        let csv = products(&[product]).unwrap();
        assert!(csv.ends_with(r#""1","","Mug","","","45","3","""#));
    }

    #[test]
    fn test_collection_document() {
        let sheet: DailyCollection = serde_json::from_str(
            r#"{"branch":"Cubao","date":"2024-07-01","preparedBy":"Mila",
                "rows":[{"arRef":"AR-9","item":"Shirt","qty":2,"amount":75}]}"#,
        )
        .unwrap();
        let csv = daily_collections(&[sheet]).unwrap();
        let last = csv.lines().last().unwrap();
        assert!(last.starts_with(r#""Cubao","2024-07-01","1","AR-9","Shirt","2","75","150""#));
        assert!(last.ends_with(r#""Mila","","""#));
    }

    #[test]
    fn test_collection_document_keeps_stored_total_on_overflow() {
        let sheet: DailyCollection = serde_json::from_str(
            r#"{"branch":"Cubao","date":"2024-07-01",
                "rows":[{"item":"Shirt","qty":"99999999999999999999",
                         "amount":"99999999999999999999","total":"12"}]}"#,
        )
        .unwrap();
        let csv = daily_collections(&[sheet]).unwrap();
        let last = csv.lines().last().unwrap();
        assert!(last.contains(r#""99999999999999999999","12","#));
    }
}
