//! Simple stateless pub-sub event plumbing.
//!
//! Each registered hook gets its own bounded channel and handler task. Handlers are stateless:
//! all they receive is the event itself, but they can be async, so a hook is free to make
//! network calls (deliver to a queue, call a webhook) without blocking intake.
use std::{
    future::Future,
    pin::Pin,
    sync::{atomic::AtomicI64, Arc},
    time::Duration,
};

use log::*;
use thiserror::Error;
use tokio::sync::mpsc;

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

#[derive(Debug, Clone, Error)]
pub enum EventSendError {
    #[error("The event channel is closed")]
    Closed,
    #[error("The event channel is full and did not drain in time")]
    Timeout,
}

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // drop the internal sender so that the loop ends once the last producer is dropped
        drop(self.sender);
        let jobs = Arc::new(AtomicI64::new(0));
        while let Some(ev) = self.listener.recv().await {
            trace!("📬️ Handling event");
            let handler = Arc::clone(&self.handler);
            jobs.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let job = jobs.clone();
            tokio::spawn(async move {
                (handler)(ev).await;
                job.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
                trace!("📬️ Event handled");
            });
        }
        while jobs.load(std::sync::atomic::Ordering::SeqCst) > 0 {
            debug!("📬️ Waiting for in-flight handlers to complete");
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
    send_timeout: Duration,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender, send_timeout: Duration::from_secs(5) }
    }

    /// Delivers `event` to the handler's channel, waiting up to the send timeout if the channel
    /// is full.
    pub async fn publish_event(&self, event: E) -> Result<(), EventSendError> {
        self.sender.send_timeout(event, self.send_timeout).await.map_err(|e| match e {
            mpsc::error::SendTimeoutError::Closed(_) => EventSendError::Closed,
            mpsc::error::SendTimeoutError::Timeout(_) => EventSendError::Timeout,
        })
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::AtomicU64;

    use super::*;

    #[tokio::test]
    async fn events_reach_the_handler() {
        let _ = env_logger::try_init();
        let count = Arc::new(AtomicU64::new(0));
        let c2 = count.clone();
        let handler = Arc::new(move |v| {
            let count = count.clone();
            Box::pin(async move {
                let _ = count.fetch_add(v, std::sync::atomic::Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let event_handler = EventHandler::new(1, handler);
        let producer_1 = event_handler.subscribe();
        let producer_2 = event_handler.subscribe();
        tokio::spawn(async move {
            for i in 0..5u64 {
                producer_1.publish_event(i * 2 + 1).await.unwrap();
            }
        });
        tokio::spawn(async move {
            for i in 0..5u64 {
                producer_2.publish_event(i * 2).await.unwrap();
            }
        });

        event_handler.start_handler().await;
        assert_eq!(c2.load(std::sync::atomic::Ordering::SeqCst), 45);
    }

    #[tokio::test]
    async fn publishing_to_a_dead_handler_errors() {
        let handler =
            Arc::new(|_: u64| Box::pin(async {}) as Pin<Box<dyn Future<Output = ()> + Send>>);
        let event_handler = EventHandler::new(1, handler);
        let producer = event_handler.subscribe();
        drop(event_handler);
        assert!(matches!(producer.publish_event(1).await, Err(EventSendError::Closed)));
    }
}
