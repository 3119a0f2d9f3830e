use log::*;

use crate::{
    db_types::Order,
    events::{EventProducers, OrderCompletedEvent},
    traits::{OrderPublisher, PublicationError},
};

/// Bridges the pipeline's outbound edge onto the event system: each completed order becomes an
/// [`OrderCompletedEvent`] delivered to every registered subscriber.
#[derive(Clone, Default)]
pub struct EventPublisher {
    producers: EventProducers,
}

impl EventPublisher {
    pub fn new(producers: EventProducers) -> Self {
        Self { producers }
    }

    pub fn subscriber_count(&self) -> usize {
        self.producers.order_completed_producer.len()
    }
}

impl OrderPublisher for EventPublisher {
    async fn publish_order(&self, order: &Order) -> Result<(), PublicationError> {
        if self.producers.order_completed_producer.is_empty() {
            debug!("📬️ No subscribers for completed orders. Order {} goes unannounced.", order.order_id);
            return Ok(());
        }
        let mut failures = 0usize;
        for producer in &self.producers.order_completed_producer {
            let event = OrderCompletedEvent::new(order.clone());
            if let Err(e) = producer.publish_event(event).await {
                warn!("📬️ Could not deliver completed-order event for {}: {e}", order.order_id);
                failures += 1;
            }
        }
        if failures == self.producers.order_completed_producer.len() {
            return Err(PublicationError {
                order_id: order.order_id.clone(),
                reason: "no subscriber accepted the event".to_string(),
            });
        }
        Ok(())
    }
}
