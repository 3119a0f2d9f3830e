use mockall::mock;
use order_engine::{
    api::order_objects::{OrderQueryFilter, Pagination},
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    traits::{OrderRepository, OrderRepositoryError},
};

mock! {
    pub OrderStore {}
    impl OrderRepository for OrderStore {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderRepositoryError>;
        async fn update_order_status(&self, id: i64, new_status: OrderStatusType) -> Result<Order, OrderRepositoryError>;
        async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderRepositoryError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderRepositoryError>;
        async fn order_exists(&self, order_id: &OrderId) -> Result<bool, OrderRepositoryError>;
        async fn fetch_orders(&self, filter: OrderQueryFilter, pagination: &Pagination) -> Result<Vec<Order>, OrderRepositoryError>;
    }
}
