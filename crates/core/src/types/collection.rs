//! Daily collection sheets recorded per branch.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Sheet numbers arrive as numbers, numeric strings or empty strings.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.to_string().parse().unwrap_or_default(),
        serde_json::Value::String(s) => parse_amount(&s),
        _ => Decimal::ZERO,
    })
}

/// Parse a typed-in amount; blanks and garbage count as zero.
#[must_use]
pub fn parse_amount(raw: &str) -> Decimal {
    raw.trim().replace(',', "").parse().unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRow {
    #[serde(default)]
    pub ar_ref: String,
    #[serde(default)]
    pub item: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub qty: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub cash: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub gcash: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub discount: Decimal,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub approver: String,
}

impl CollectionRow {
    /// `qty × amount`, or `None` when the product does not fit a decimal.
    #[must_use]
    pub fn computed_total(&self) -> Option<Decimal> {
        self.qty.checked_mul(self.amount)
    }

    fn is_blank(&self) -> bool {
        self.ar_ref.trim().is_empty()
            && self.item.trim().is_empty()
            && self.qty.is_zero()
            && self.amount.is_zero()
            && self.cash.is_zero()
            && self.gcash.is_zero()
            && self.discount.is_zero()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCollection {
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub rows: Vec<CollectionRow>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub grand_total: Decimal,
    #[serde(default)]
    pub prepared_by: String,
    #[serde(default)]
    pub noted_by: String,
    #[serde(default)]
    pub validated_by: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("Please select branch and date")]
    MissingBranchOrDate,
    #[error("Please add at least one collection row.")]
    NoRows,
    #[error("Amounts are too large to total.")]
    AmountTooLarge,
}

/// Number of blank rows the sheet starts with.
pub const DEFAULT_ROWS: usize = 1;

/// Upper bound on rows accepted from one form post.
pub const MAX_ROWS: usize = 200;

impl DailyCollection {
    /// Recompute every row total and the grand total.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::AmountTooLarge`] when a row total or the
    /// grand total overflows.
    pub fn with_totals(mut self) -> Result<Self, CollectionError> {
        let mut grand_total = Decimal::ZERO;
        for row in &mut self.rows {
            row.total = row
                .computed_total()
                .ok_or(CollectionError::AmountTooLarge)?;
            grand_total = grand_total
                .checked_add(row.total)
                .ok_or(CollectionError::AmountTooLarge)?;
        }
        self.grand_total = grand_total;
        Ok(self)
    }

    /// Build a sheet from flat form pairs such as `branch`, `qty_0`, `item_3`.
    ///
    /// Rows are keyed by their numeric suffix; rows left completely blank are
    /// dropped. Totals are recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::AmountTooLarge`] when the typed numbers
    /// cannot be totalled.
    pub fn from_form_pairs(pairs: &[(String, String)]) -> Result<Self, CollectionError> {
        let mut sheet = Self::default();
        let mut rows: Vec<CollectionRow> = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "branch" => sheet.branch = value.trim().to_owned(),
                "date" => sheet.date = value.trim().to_owned(),
                "prepared_by" => sheet.prepared_by = value.trim().to_owned(),
                "noted_by" => sheet.noted_by = value.trim().to_owned(),
                "validated_by" => sheet.validated_by = value.trim().to_owned(),
                _ => {
                    let Some((field, index)) = key.rsplit_once('_') else {
                        continue;
                    };
                    let Ok(index) = index.parse::<usize>() else {
                        continue;
                    };
                    if index >= MAX_ROWS {
                        continue;
                    }
                    if rows.len() <= index {
                        rows.resize_with(index + 1, CollectionRow::default);
                    }
                    let Some(row) = rows.get_mut(index) else {
                        continue;
                    };
                    match field {
                        "ar_ref" => row.ar_ref = value.trim().to_owned(),
                        "item" => row.item = value.trim().to_owned(),
                        "qty" => row.qty = parse_amount(value),
                        "amount" => row.amount = parse_amount(value),
                        "cash" => row.cash = parse_amount(value),
                        "gcash" => row.gcash = parse_amount(value),
                        "discount" => row.discount = parse_amount(value),
                        "reason" => row.reason = value.trim().to_owned(),
                        "approver" => row.approver = value.trim().to_owned(),
                        _ => {}
                    }
                }
            }
        }

        sheet.rows = rows.into_iter().filter(|r| !r.is_blank()).collect();
        sheet.with_totals()
    }

    /// Check the fields the backend needs before saving.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError`] when branch or date is missing or no row
    /// has data.
    pub fn validate(&self) -> Result<(), CollectionError> {
        if self.branch.is_empty() || self.date.is_empty() {
            return Err(CollectionError::MissingBranchOrDate);
        }
        if self.rows.is_empty() {
            return Err(CollectionError::NoRows);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_totals_are_qty_times_amount_summed() {
        let sheet = DailyCollection::from_form_pairs(&pairs(&[
            ("branch", "Cubao"),
            ("date", "2024-07-01"),
            ("item_0", "Shirt"),
            ("qty_0", "2"),
            ("amount_0", "75.50"),
            ("item_1", "Bag"),
            ("qty_1", "1"),
            ("amount_1", "1,200"),
            ("item_2", ""),
            ("qty_2", ""),
        ]))
        .unwrap();
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows.first().unwrap().total, Decimal::new(151, 0));
        assert_eq!(sheet.grand_total, Decimal::new(1351, 0));
        assert!(sheet.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_branch_and_date() {
        let sheet = DailyCollection::from_form_pairs(&pairs(&[("item_0", "Shirt")])).unwrap();
        assert_eq!(sheet.validate(), Err(CollectionError::MissingBranchOrDate));
    }

    #[test]
    fn test_lenient_numbers_from_backend() {
        let sheet: DailyCollection = serde_json::from_str(
            r#"{"branch":"Cubao","date":"2024-07-01","grandTotal":"",
                "rows":[{"item":"Shirt","qty":"2","amount":75.5,"cash":""}]}"#,
        )
        .unwrap();
        let row = sheet.rows.first().unwrap();
        assert_eq!(row.qty, Decimal::new(2, 0));
        assert_eq!(row.cash, Decimal::ZERO);
        assert_eq!(sheet.with_totals().unwrap().grand_total, Decimal::new(151, 0));
    }

    #[test]
    fn test_oversized_amounts_are_rejected() {
        let result = DailyCollection::from_form_pairs(&pairs(&[
            ("branch", "Cubao"),
            ("date", "2024-07-01"),
            ("item_0", "Shirt"),
            ("qty_0", "99999999999999999999"),
            ("amount_0", "99999999999999999999"),
        ]));
        assert_eq!(result, Err(CollectionError::AmountTooLarge));

        let huge = "79228162514264337593543950335";
        let result = DailyCollection::from_form_pairs(&pairs(&[
            ("qty_0", "1"),
            ("amount_0", huge),
            ("qty_1", "1"),
            ("amount_1", huge),
        ]));
        assert_eq!(result, Err(CollectionError::AmountTooLarge));
    }
}
