use thiserror::Error;

use crate::{
    db_types::{OrderId, OrderValidationError},
    traits::OrderRepositoryError,
};

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("The order is invalid: {0}")]
    InvalidInput(#[from] OrderValidationError),
    #[error("Order {0} has already been processed")]
    DuplicateOrder(OrderId),
    #[error("The requested order does not exist")]
    NotFound,
    #[error("The order could not be stored: {0}")]
    PersistenceFailure(String),
}

impl From<OrderRepositoryError> for OrderApiError {
    fn from(e: OrderRepositoryError) -> Self {
        match e {
            OrderRepositoryError::DuplicateOrder(id) => Self::DuplicateOrder(id),
            e => Self::PersistenceFailure(e.to_string()),
        }
    }
}
