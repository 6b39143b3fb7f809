//! Customer and order conversions.

use boxcraft_core::{FulfillmentStatus, LoyaltyStatus};

use crate::shopify::types::{Customer, CustomerAccessToken, CustomerOrder, OrderTracking};

use super::super::queries::{AccessTokenNode, CustomerNode, OrderNode};
use super::convert_money;

pub fn convert_access_token(token: AccessTokenNode) -> CustomerAccessToken {
    CustomerAccessToken {
        access_token: token.access_token,
        expires_at: token.expires_at,
    }
}

pub fn convert_customer(customer: CustomerNode) -> Customer {
    let loyalty = LoyaltyStatus::from_metafields(
        customer.points.as_ref().and_then(|m| m.value.as_deref()),
        customer.tier.as_ref().and_then(|m| m.value.as_deref()),
    );

    Customer {
        id: customer.id,
        email: customer.email,
        first_name: customer.first_name,
        last_name: customer.last_name,
        phone: customer.phone,
        accepts_marketing: customer.accepts_marketing,
        loyalty,
        orders: customer
            .orders
            .nodes
            .into_iter()
            .map(convert_order)
            .collect(),
    }
}

fn convert_order(order: OrderNode) -> CustomerOrder {
    let tracking = order
        .successful_fulfillments
        .unwrap_or_default()
        .into_iter()
        .flat_map(|f| {
            let company = f.tracking_company;
            f.tracking_info.into_iter().filter_map(move |info| {
                info.number
                    .filter(|n| !n.trim().is_empty())
                    .map(|number| OrderTracking {
                        number,
                        company: company.clone(),
                        url: info.url,
                    })
            })
        })
        .collect();

    CustomerOrder {
        id: order.id,
        name: order.name,
        order_number: order.order_number,
        processed_at: order.processed_at,
        financial_status: order.financial_status,
        fulfillment_status: FulfillmentStatus::parse(&order.fulfillment_status),
        total_price: convert_money(order.total_price),
        tracking,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use boxcraft_core::LoyaltyTier;

    use super::*;

    #[test]
    fn test_customer_with_loyalty_and_tracking() {
        let node: CustomerNode = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Customer/7",
            "email": "ada@example.com",
            "points": {"value": "720"},
            "tier": null,
            "orders": {"nodes": [{
                "id": "gid://shopify/Order/1",
                "name": "#1001",
                "orderNumber": 1001,
                "processedAt": "2026-01-05T10:00:00Z",
                "fulfillmentStatus": "FULFILLED",
                "totalPrice": {"amount": "64.0", "currencyCode": "USD"},
                "successfulFulfillments": [{
                    "trackingCompany": "UPS",
                    "trackingInfo": [{"number": "1Z999AA10123456784", "url": null}, {"number": ""}]
                }]
            }]}
        }))
        .unwrap();

        let customer = convert_customer(node);
        assert_eq!(customer.loyalty.points, 720);
        assert_eq!(customer.loyalty.tier, LoyaltyTier::Silver);
        assert_eq!(customer.orders[0].fulfillment_status, FulfillmentStatus::Fulfilled);
        assert_eq!(customer.orders[0].tracking.len(), 1);
        assert_eq!(customer.orders[0].tracking[0].company.as_deref(), Some("UPS"));
    }

    #[test]
    fn test_customer_without_metafields() {
        let node: CustomerNode = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Customer/8"
        }))
        .unwrap();

        let customer = convert_customer(node);
        assert_eq!(customer.loyalty.points, 0);
        assert_eq!(customer.loyalty.tier, LoyaltyTier::Bronze);
        assert!(customer.orders.is_empty());
    }
}
