//! Wire DTOs for the intake channels.
//!
//! Both the HTTP endpoint and the queue consumers accept the same camelCase JSON payload, so a
//! producer can switch channels without changing its serializer.

use oig_common::Money;
use order_engine::db_types::{NewOrder, NewOrderItem, OrderId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// The producer-assigned external id. Must be unique across all submissions.
    pub external_id: String,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_code: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl From<OrderRequest> for NewOrder {
    fn from(req: OrderRequest) -> Self {
        let items = req
            .items
            .into_iter()
            .map(|i| NewOrderItem::new(i.product_code, i.quantity, i.unit_price))
            .collect();
        NewOrder::new(OrderId(req.external_id), items)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_request_deserializes_camel_case() {
        let json = r#"{
            "externalId": "ORDER-001",
            "items": [
                { "productCode": "PROD-001", "quantity": 2, "unitPrice": 50.0 },
                { "productCode": "PROD-002", "quantity": 1, "unitPrice": "19.99" }
            ]
        }"#;
        let req: OrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.external_id, "ORDER-001");
        assert_eq!(req.items.len(), 2);
        assert_eq!(req.items[0].unit_price, Money::from_cents(5_000));
        assert_eq!(req.items[1].unit_price, Money::from_cents(1_999));
        let order = NewOrder::from(req);
        assert_eq!(order.order_id, OrderId::from("ORDER-001"));
        assert!(order.is_processable());
    }

    #[test]
    fn items_default_to_empty() {
        let req: OrderRequest = serde_json::from_str(r#"{"externalId": "ORDER-002"}"#).unwrap();
        let order = NewOrder::from(req);
        assert!(!order.is_processable());
    }
}
