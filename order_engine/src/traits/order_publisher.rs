use thiserror::Error;

use crate::db_types::{Order, OrderId};

#[derive(Debug, Clone, Error)]
#[error("Could not publish order {order_id}: {reason}")]
pub struct PublicationError {
    pub order_id: OrderId,
    pub reason: String,
}

/// The outbound edge of the pipeline. Completed orders are handed to an `OrderPublisher` for
/// downstream consumers; failures here never affect the stored order.
#[allow(async_fn_in_trait)]
pub trait OrderPublisher {
    async fn publish_order(&self, order: &Order) -> Result<(), PublicationError>;
}
