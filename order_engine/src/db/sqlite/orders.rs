use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    api::order_objects::{OrderQueryFilter, Pagination, SortOrder},
    db::sqlite::SqliteDatabaseError,
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatusType},
};

const ORDER_COLUMNS: &str = "id, order_id, status, total_amount, created_at, updated_at";

/// Inserts a new order and its items using the given connection. Not atomic on its own; embed
/// the call inside a transaction and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, SqliteDatabaseError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
            INSERT INTO orders (order_id, status, total_amount)
            VALUES ($1, $2, $3)
            RETURNING id;
        "#,
    )
    .bind(order.order_id.as_str())
    .bind(order.status)
    .bind(order.total_amount)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(de) if de.is_unique_violation() => {
            SqliteDatabaseError::DuplicateOrder(order.order_id.clone())
        },
        _ => SqliteDatabaseError::from(e),
    })?;
    for item in &order.items {
        sqlx::query(
            r#"
                INSERT INTO order_items (order_id, product_code, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5);
            "#,
        )
        .bind(id)
        .bind(&item.product_code)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.total_price)
        .execute(&mut *conn)
        .await?;
    }
    fetch_order_by_id(id, conn).await?.ok_or(SqliteDatabaseError::OrderNotFound(id))
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, SqliteDatabaseError> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 LIMIT 1;"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    attach_items(order, conn).await
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let order =
        sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1 LIMIT 1;"))
            .bind(order_id.as_str())
            .fetch_optional(&mut *conn)
            .await?;
    attach_items(order, conn).await
}

async fn attach_items(
    order: Option<Order>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    match order {
        Some(mut order) => {
            order.items = fetch_items(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

async fn fetch_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, SqliteDatabaseError> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, product_code, quantity, unit_price, total_price FROM order_items WHERE order_id = $1 ORDER BY id;",
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(items)
}

pub async fn order_exists(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT EXISTS (SELECT 1 FROM orders WHERE order_id = $1);")
        .bind(order_id.as_str())
        .fetch_one(conn)
        .await?;
    Ok(exists != 0)
}

/// Moves the order to `new_status` and returns the updated record. The current status is read
/// first so that illegal lifecycle edges are rejected before anything is written.
pub async fn update_order_status(
    id: i64,
    new_status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, SqliteDatabaseError> {
    let order = fetch_order_by_id(id, &mut *conn).await?.ok_or(SqliteDatabaseError::OrderNotFound(id))?;
    if !order.status.can_transition_to(new_status) {
        return Err(crate::db_types::InvalidStatusTransition { from: order.status, to: new_status }.into());
    }
    sqlx::query("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2;")
        .bind(new_status)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    fetch_order_by_id(id, conn).await?.ok_or(SqliteDatabaseError::OrderNotFound(id))
}

/// Fetches orders matching the criteria in the `OrderQueryFilter`, windowed and sorted (by
/// creation time) according to `pagination`.
pub async fn fetch_orders(
    filter: OrderQueryFilter,
    pagination: &Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders "));
    if !filter.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(order_id) = filter.order_id {
        where_clause.push("order_id = ");
        where_clause.push_bind_unseparated(order_id.0);
    }
    if let Some(status) = filter.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status);
    }
    // id breaks ties within CURRENT_TIMESTAMP's one-second resolution
    let dir = match pagination.sort() {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    builder.push(format!(" ORDER BY created_at {dir}, id {dir} LIMIT "));
    builder.push_bind(pagination.limit());
    builder.push(" OFFSET ");
    builder.push_bind(pagination.offset());

    trace!("🗃️ Executing query: {}", builder.sql());
    let mut orders = builder.build_query_as::<Order>().fetch_all(&mut *conn).await?;
    for order in &mut orders {
        order.items = fetch_items(order.id, conn).await?;
    }
    trace!("🗃️ fetch_orders returned {} row(s)", orders.len());
    Ok(orders)
}
