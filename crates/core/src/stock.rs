//! Cart-reserved stock adjustment.
//!
//! Displayed stock is `max(stock − reserved_in_cart, 0)`. This is cosmetic:
//! the backend decrements real stock and may disagree by the time an order
//! lands.

use crate::types::{CartItem, Product, ProductId};

/// Units of `product` already sitting in the visitor's cart.
#[must_use]
pub fn reserved(cart: &[CartItem], product: &ProductId) -> u32 {
    cart.iter()
        .filter(|line| &line.product_id == product)
        .map(CartItem::quantity)
        .sum()
}

/// `max(stock − reserved, 0)`.
#[must_use]
pub fn available(stock: i64, reserved: u32) -> i64 {
    (stock - i64::from(reserved)).max(0)
}

/// Rewrite each product's quantity to what the visitor can still add.
pub fn adjust_for_cart(products: &mut [Product], cart: &[CartItem]) {
    for product in products {
        product.quantity = available(product.quantity, reserved(cart, &product.id));
    }
}

/// Adjust for the cart, then drop anything with nothing left.
#[must_use]
pub fn in_stock(mut products: Vec<Product>, cart: &[CartItem]) -> Vec<Product> {
    adjust_for_cart(&mut products, cart);
    products.retain(|p| p.quantity > 0);
    products
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, stock: i64) -> Product {
        serde_json::from_value(serde_json::json!({"_id": id, "quantity": stock})).unwrap()
    }

    fn line(id: &str, qty: u32) -> CartItem {
        serde_json::from_value(serde_json::json!({"productId": id, "quantity": qty})).unwrap()
    }

    #[test]
    fn test_available_clamps_at_zero() {
        assert_eq!(available(5, 2), 3);
        assert_eq!(available(2, 5), 0);
        assert_eq!(available(-1, 0), 0);
    }

    #[test]
    fn test_reserved_sums_lines_for_product() {
        let cart = vec![line("p1", 2), line("p2", 1), line("p1", 1)];
        assert_eq!(reserved(&cart, &ProductId::new("p1")), 3);
        assert_eq!(reserved(&cart, &ProductId::new("p9")), 0);
    }

    #[test]
    fn test_in_stock_hides_fully_reserved() {
        let cart = vec![line("p1", 2)];
        let left = in_stock(vec![product("p1", 2), product("p2", 4)], &cart);
        assert_eq!(left.len(), 1);
        assert_eq!(left.first().unwrap().quantity, 4);
    }
}
