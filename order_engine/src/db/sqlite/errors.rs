use thiserror::Error;

use crate::{
    db_types::{InvalidStatusTransition, OrderId},
    traits::OrderRepositoryError,
};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Cannot process duplicate order {0}")]
    DuplicateOrder(OrderId),
    #[error("No order with id {0}")]
    OrderNotFound(i64),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidStatusTransition),
}

impl From<SqliteDatabaseError> for OrderRepositoryError {
    fn from(e: SqliteDatabaseError) -> Self {
        match e {
            SqliteDatabaseError::DuplicateOrder(id) => Self::DuplicateOrder(id),
            SqliteDatabaseError::OrderNotFound(id) => Self::OrderIdNotFound(id),
            SqliteDatabaseError::InvalidTransition(e) => Self::InvalidTransition(e),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}
