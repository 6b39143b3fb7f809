//! Cart type conversion functions.

use crate::shopify::types::{
    Attribute, Cart, CartCost, CartDiscountCode, CartLine, CartLineCost, CartMerchandise,
    CartMerchandiseProduct,
};

use super::super::queries::{CartLineNode, CartNode};
use super::{convert_image, convert_money};

pub fn convert_cart(cart: CartNode) -> Cart {
    Cart {
        id: cart.id,
        checkout_url: cart.checkout_url,
        note: cart.note,
        total_quantity: cart.total_quantity,
        cost: CartCost {
            subtotal: convert_money(cart.cost.subtotal_amount),
            total: convert_money(cart.cost.total_amount),
            total_tax: cart.cost.total_tax_amount.map(convert_money),
        },
        discount_codes: cart
            .discount_codes
            .into_iter()
            .map(|d| CartDiscountCode {
                code: d.code,
                applicable: d.applicable,
            })
            .collect(),
        lines: cart.lines.nodes.into_iter().map(convert_line).collect(),
    }
}

fn convert_line(line: CartLineNode) -> CartLine {
    let merchandise = line.merchandise;
    CartLine {
        id: line.id,
        quantity: line.quantity,
        attributes: line
            .attributes
            .into_iter()
            .map(|a| Attribute {
                key: a.key,
                value: a.value,
            })
            .collect(),
        cost: CartLineCost {
            amount_per_quantity: convert_money(line.cost.amount_per_quantity),
            subtotal_amount: convert_money(line.cost.subtotal_amount),
            total_amount: convert_money(line.cost.total_amount),
        },
        merchandise: CartMerchandise {
            id: merchandise.id,
            title: merchandise.title,
            price: convert_money(merchandise.price),
            image: merchandise.image.map(convert_image),
            product: CartMerchandiseProduct {
                id: merchandise.product.id,
                handle: merchandise.product.handle,
                title: merchandise.product.title,
                vendor: merchandise.product.vendor,
            },
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cart_with_bundle_line() {
        let node: CartNode = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Cart/abc",
            "checkoutUrl": "https://shop.example/checkouts/abc",
            "totalQuantity": 2,
            "cost": {
                "subtotalAmount": {"amount": "40.0", "currencyCode": "USD"},
                "totalAmount": {"amount": "40.0", "currencyCode": "USD"}
            },
            "lines": {"nodes": [{
                "id": "gid://shopify/CartLine/1",
                "quantity": 2,
                "attributes": [{"key": "_bundle_role", "value": "box"}],
                "cost": {"amountPerQuantity": {"amount": "20.0", "currencyCode": "USD"}},
                "merchandise": {
                    "id": "gid://shopify/ProductVariant/9",
                    "title": "Default Title",
                    "product": {"handle": "kraft-box", "title": "Kraft Box"}
                }
            }]}
        }))
        .unwrap();

        let cart = convert_cart(node);
        assert_eq!(cart.total_quantity, 2);
        assert!(cart.cost.total_tax.is_none());
        assert_eq!(cart.lines[0].attribute("_bundle_role"), Some("box"));
        assert_eq!(cart.lines[0].merchandise.product.handle, "kraft-box");
        assert!(cart.lines[0].cost.total_amount.amount.is_empty());
    }
}
