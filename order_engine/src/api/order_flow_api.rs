use log::*;

use crate::{
    api::errors::OrderApiError,
    db_types::{NewOrder, Order, OrderStatusType, OrderValidationError},
    dedup::{DedupConfig, DuplicateGuard},
    traits::{DuplicateCache, OrderPublisher, OrderRepository},
};

/// The write path of the order intake engine.
///
/// `OrderFlowApi` drives every accepted order through the same pipeline, regardless of which
/// channel delivered it:
///
/// 1. Reject submissions without an external id. The id is the deduplication key; nothing can
///    be done without it.
/// 2. Screen the external id for duplicates (cache first, durable store as fallback). This
///    happens before item validation, so a resubmission always reads as a duplicate no matter
///    how mangled its payload is.
/// 3. Validate the items (at least one, each well-formed).
/// 4. Compute the line totals and the order total.
/// 5. Move the order to `Processing` and store it durably. The store's uniqueness constraint is
///    the authoritative duplicate check; a constraint violation here is reported exactly like a
///    cache hit.
/// 6. Record the external id in the duplicate cache (best-effort).
/// 7. Move the order to `Completed` and store the final state.
/// 8. Hand the completed order to the publisher. Publication failures are logged, never
///    propagated: the order is already durably `Completed`.
#[derive(Clone)]
pub struct OrderFlowApi<B, C, P> {
    db: B,
    guard: DuplicateGuard<C>,
    publisher: P,
}

impl<B, C, P> OrderFlowApi<B, C, P>
where
    B: OrderRepository,
    C: DuplicateCache,
    P: OrderPublisher,
{
    pub fn new(db: B, cache: C, publisher: P, config: DedupConfig) -> Self {
        Self { db, guard: DuplicateGuard::new(cache, config), publisher }
    }

    /// Runs a new order submission through the full intake pipeline and returns the stored,
    /// completed order.
    pub async fn create_order(&self, mut order: NewOrder) -> Result<Order, OrderApiError> {
        let order_id = order.order_id.clone();
        info!("🔄️📦️ Order {order_id} received with {} item(s)", order.items.len());
        if order_id.is_blank() {
            return Err(OrderValidationError::MissingOrderId.into());
        }
        if self.guard.is_duplicate(&self.db, &order_id).await? {
            info!("🔄️📦️ Order {order_id} is a duplicate submission. Ignoring.");
            return Err(OrderApiError::DuplicateOrder(order_id));
        }
        order.validate()?;
        order.compute_totals();
        debug!("🔄️📦️ Order {order_id} total calculated as {}", order.total_amount);
        order
            .transition(OrderStatusType::Processing)
            .map_err(|e| OrderApiError::PersistenceFailure(e.to_string()))?;
        let stored = self.db.insert_order(order).await?;
        debug!("🔄️📦️ Order {order_id} stored as record {} in status {}", stored.id, stored.status);
        self.guard.mark_seen(&order_id).await;
        let completed = match self.db.update_order_status(stored.id, OrderStatusType::Completed).await {
            Ok(order) => order,
            Err(e) => {
                // The order is stranded in Processing. It will not be re-accepted (the id is
                // already stored), so it needs manual reconciliation.
                error!("🔄️📦️ Order {order_id} was stored but could not be finalized: {e}");
                return Err(OrderApiError::PersistenceFailure(e.to_string()));
            },
        };
        info!("🔄️📦️ Order {order_id} completed. Total: {}", completed.total_amount);
        if let Err(e) = self.publisher.publish_order(&completed).await {
            warn!("🔄️📦️ Completed order {order_id} could not be republished downstream: {e}");
        }
        Ok(completed)
    }
}
