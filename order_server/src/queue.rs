//! The queue intake channel and the outbound bridge.
//!
//! Queued submissions carry the same payload as the HTTP endpoint and run through the same
//! pipeline. The queue is an in-process bounded channel: producers block once `prefetch`
//! submissions are waiting, and a pool of consumers drains it with bounded concurrency.
//! Completed orders leave through the engine's event system; [`attach_outbound_bridge`]
//! registers the hook that republishes them for downstream consumers.

use std::sync::Arc;

use log::*;
use order_engine::{
    cache::MemoryCache,
    db_types::NewOrder,
    events::{EventHooks, EventPublisher},
    OrderApiError,
    OrderFlowApi,
    SqliteDatabase,
};
use tokio::{
    sync::{mpsc, Semaphore},
    task::JoinHandle,
};

use crate::{config::QueueConfig, data_objects::OrderRequest};

/// The concrete pipeline instantiation shared by the queue consumers.
pub type QueueOrderApi = OrderFlowApi<SqliteDatabase, MemoryCache, EventPublisher>;

pub struct IntakeQueue {
    sender: mpsc::Sender<OrderRequest>,
}

impl IntakeQueue {
    pub fn new(prefetch: usize) -> (Self, mpsc::Receiver<OrderRequest>) {
        let (sender, receiver) = mpsc::channel(prefetch);
        (Self { sender }, receiver)
    }

    pub fn producer(&self) -> QueueProducer {
        QueueProducer { sender: self.sender.clone() }
    }
}

/// A cloneable handle for submitting orders onto the intake queue.
#[derive(Clone)]
pub struct QueueProducer {
    sender: mpsc::Sender<OrderRequest>,
}

impl QueueProducer {
    /// Enqueues a submission, waiting if the queue is at capacity. Fails only once the consumer
    /// pool has shut down.
    pub async fn submit(&self, request: OrderRequest) -> Result<(), OrderRequest> {
        self.sender.send(request).await.map_err(|e| e.0)
    }
}

/// Starts the consumer pool. At most `config.consumers` submissions are processed concurrently;
/// the pool runs until every producer handle (and the owning [`IntakeQueue`]) has been dropped,
/// then drains its in-flight work before the returned handle resolves.
pub fn start_consumers(
    api: QueueOrderApi,
    mut receiver: mpsc::Receiver<OrderRequest>,
    config: QueueConfig,
) -> JoinHandle<()> {
    let api = Arc::new(api);
    let concurrency = config.consumers;
    tokio::spawn(async move {
        info!("📨️ Queue consumer pool started with {concurrency} consumer(s)");
        let semaphore = Arc::new(Semaphore::new(concurrency));
        while let Some(request) = receiver.recv().await {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let api = Arc::clone(&api);
            tokio::spawn(async move {
                process_submission(&api, request).await;
                drop(permit);
            });
        }
        // wait for in-flight submissions before reporting shutdown
        let _ = semaphore.acquire_many(concurrency as u32).await;
        info!("📨️ Queue consumer pool has shut down");
    })
}

async fn process_submission(api: &QueueOrderApi, request: OrderRequest) {
    let order = NewOrder::from(request);
    let order_id = order.order_id.clone();
    trace!("📨️ Processing queued submission {order_id}");
    match api.create_order(order).await {
        Ok(order) => info!("📨️ Queued order {} completed", order.order_id),
        Err(OrderApiError::DuplicateOrder(id)) => info!("📨️ Queued order {id} was a duplicate. Dropped."),
        Err(e) => warn!("📨️ Queued order {order_id} could not be processed. {e}"),
    }
}

/// Registers the hook that carries completed orders out of the gateway. The payload is the full
/// stored order as JSON, so downstream consumers never need to read the store.
pub fn attach_outbound_bridge(hooks: &mut EventHooks) {
    hooks.on_order_completed(|event| {
        Box::pin(async move {
            let payload = serde_json::to_string(&event.order).unwrap_or_else(|e| format!("{e}"));
            info!("📨️ Order {} republished downstream: {payload}", event.order.order_id);
        })
    });
}

#[cfg(test)]
mod test {
    use oig_common::Money;
    use order_engine::{
        api::{order_objects::Pagination, OrderQueryApi},
        db_types::OrderStatusType,
        events::EventProducers,
        test_utils::{prepare_test_env, random_db_path},
        DedupConfig,
    };

    use super::*;
    use crate::data_objects::OrderItemRequest;

    fn request(id: &str) -> OrderRequest {
        OrderRequest {
            external_id: id.to_string(),
            items: vec![OrderItemRequest {
                product_code: "PROD-001".to_string(),
                quantity: 1,
                unit_price: Money::from_cents(1_000),
            }],
        }
    }

    #[tokio::test]
    async fn queued_submissions_run_through_the_pipeline() {
        let db = prepare_test_env(&random_db_path()).await;
        let publisher = EventPublisher::new(EventProducers::default());
        let api = OrderFlowApi::new(db.clone(), MemoryCache::new(), publisher, DedupConfig::default());

        let (intake, receiver) = IntakeQueue::new(8);
        let pool = start_consumers(api, receiver, QueueConfig { consumers: 4, prefetch: 8 });
        let producer = intake.producer();
        for id in ["Q-001", "Q-002", "Q-002", "Q-003"] {
            producer.submit(request(id)).await.expect("queue closed early");
        }
        // bad submission is dropped without poisoning the pool
        producer.submit(OrderRequest { external_id: "Q-004".to_string(), items: vec![] }).await.unwrap();
        drop(producer);
        drop(intake);
        pool.await.unwrap();

        let queries = OrderQueryApi::new(db);
        let orders =
            queries.fetch_orders_by_status(OrderStatusType::Completed, &Pagination::default()).await.unwrap();
        let mut ids = orders.iter().map(|o| o.order_id.as_str()).collect::<Vec<_>>();
        ids.sort_unstable();
        assert_eq!(ids, vec!["Q-001", "Q-002", "Q-003"]);
    }
}
