use thiserror::Error;

use crate::{
    api::order_objects::{OrderQueryFilter, Pagination},
    db_types::{InvalidStatusTransition, NewOrder, Order, OrderId, OrderStatusType},
};

#[derive(Debug, Clone, Error)]
pub enum OrderRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("An order with id {0} already exists")]
    DuplicateOrder(OrderId),
    #[error("No order with database id {0}")]
    OrderIdNotFound(i64),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidStatusTransition),
}

impl From<sqlx::Error> for OrderRepositoryError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// The durable order store.
///
/// Implementations are the source of truth for orders and must enforce the uniqueness of
/// [`OrderId`] with a constraint, since cache-based duplicate screening is only best-effort.
#[allow(async_fn_in_trait)]
pub trait OrderRepository {
    /// Inserts a new order together with its items and returns the stored record.
    ///
    /// Returns [`OrderRepositoryError::DuplicateOrder`] if an order with the same external id
    /// has already been stored.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderRepositoryError>;

    /// Moves the order with database id `id` to `new_status` and returns the updated record,
    /// items included. The transition must be legal for the order's current status.
    async fn update_order_status(&self, id: i64, new_status: OrderStatusType) -> Result<Order, OrderRepositoryError>;

    /// Fetches an order (with its items) by database id.
    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderRepositoryError>;

    /// Fetches an order (with its items) by the producer-assigned external id.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderRepositoryError>;

    /// Returns whether an order with the given external id has been stored. Used as the durable
    /// fallback when the duplicate cache cannot answer.
    async fn order_exists(&self, order_id: &OrderId) -> Result<bool, OrderRepositoryError>;

    /// Returns the orders matching `filter`, windowed and sorted by `pagination`.
    async fn fetch_orders(
        &self,
        filter: OrderQueryFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Order>, OrderRepositoryError>;
}
