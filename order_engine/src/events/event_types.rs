use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// Emitted once an order has reached `Completed` and been durably stored. Carries the full
/// stored record, items included, so that subscribers never need to read the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCompletedEvent {
    pub order: Order,
}

impl OrderCompletedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
