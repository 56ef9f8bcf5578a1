//! Dashboard counters from `GET /api/admin/analytics`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Analytics {
    pub total_orders: u64,
    pub total_inventory: u64,
    pub pending_orders: u64,
    pub total_sold: u64,
    pub total_running_sales: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_zero() {
        let a: Analytics = serde_json::from_str(r#"{"totalOrders":12,"totalRunningSales":1520.5}"#)
            .unwrap();
        assert_eq!(a.total_orders, 12);
        assert_eq!(a.pending_orders, 0);
        assert_eq!(a.total_running_sales, Decimal::new(15_205, 1));
    }
}
