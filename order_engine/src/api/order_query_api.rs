use crate::{
    api::{
        errors::OrderApiError,
        order_objects::{OrderQueryFilter, Pagination},
    },
    db_types::{Order, OrderId, OrderStatusType},
    traits::OrderRepository,
};

/// The read path of the order intake engine.
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B: OrderRepository> OrderQueryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn fetch_order_by_id(&self, id: i64) -> Result<Order, OrderApiError> {
        self.db.fetch_order_by_id(id).await?.ok_or(OrderApiError::NotFound)
    }

    pub async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Order, OrderApiError> {
        self.db.fetch_order_by_order_id(order_id).await?.ok_or(OrderApiError::NotFound)
    }

    pub async fn search_orders(
        &self,
        filter: OrderQueryFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Order>, OrderApiError> {
        Ok(self.db.fetch_orders(filter, pagination).await?)
    }

    pub async fn fetch_orders_by_status(
        &self,
        status: OrderStatusType,
        pagination: &Pagination,
    ) -> Result<Vec<Order>, OrderApiError> {
        self.search_orders(OrderQueryFilter::with_status(status), pagination).await
    }
}
