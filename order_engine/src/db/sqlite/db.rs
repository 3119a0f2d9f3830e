use std::fmt::Debug;

use sqlx::SqlitePool;

use crate::{
    api::order_objects::{OrderQueryFilter, Pagination},
    db::sqlite::{db_url, new_pool, orders, SqliteDatabaseError},
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    traits::{OrderRepository, OrderRepositoryError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object against the configured database url.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl OrderRepository for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderRepositoryError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn update_order_status(&self, id: i64, new_status: OrderStatusType) -> Result<Order, OrderRepositoryError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::update_order_status(id, new_status, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_id(id, &mut conn).await?)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_order_id(order_id, &mut conn).await?)
    }

    async fn order_exists(&self, order_id: &OrderId) -> Result<bool, OrderRepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::order_exists(order_id, &mut conn).await?)
    }

    async fn fetch_orders(
        &self,
        filter: OrderQueryFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_orders(filter, pagination, &mut conn).await?)
    }
}
