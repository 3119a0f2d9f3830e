use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use oig_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        OrderId        -------------------------------------------------------
/// The producer-assigned external identifier of an order. This is the deduplication key; the
/// order store enforces a uniqueness constraint over it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatusType {
    /// The order has been received from a producer but not yet accepted by the pipeline.
    Received,
    /// The order passed validation and deduplication and has been durably stored.
    Processing,
    /// The order has been fully processed and republished downstream.
    Completed,
    /// The order could not be processed. No pipeline path currently drives this status, but the
    /// transition table admits it so that future paths cannot corrupt state silently.
    Failed,
}

impl OrderStatusType {
    /// The status lifecycle admits exactly three edges. Everything else is rejected.
    pub fn can_transition_to(self, new_status: OrderStatusType) -> bool {
        use OrderStatusType::*;
        matches!((self, new_status), (Received, Processing) | (Processing, Completed) | (Processing, Failed))
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Received => write!(f, "Received"),
            OrderStatusType::Processing => write!(f, "Processing"),
            OrderStatusType::Completed => write!(f, "Completed"),
            OrderStatusType::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct StatusConversionError(pub String);

impl FromStr for OrderStatusType {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "received" => Ok(Self::Received),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Order status cannot change from {from} to {to}")]
pub struct InvalidStatusTransition {
    pub from: OrderStatusType,
    pub to: OrderStatusType,
}

//--------------------------------------  OrderValidationError -------------------------------------------------------
#[derive(Debug, Clone, Error)]
pub enum OrderValidationError {
    #[error("Order has no external id")]
    MissingOrderId,
    #[error("Order has no items")]
    NoItems,
    #[error("Item {index} ({product_code:?}) is invalid: {reason}")]
    InvalidItem { index: usize, product_code: String, reason: &'static str },
}

//--------------------------------------        Order        ---------------------------------------------------------
/// A durably stored order. Instances only exist after the first persistence write; use
/// [`NewOrder`] for orders that have not been accepted yet.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub status: OrderStatusType,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Advance the order to `new_status`, refreshing `updated_at`. Illegal edges are rejected
    /// and leave the order untouched.
    pub fn transition(&mut self, new_status: OrderStatusType) -> Result<(), InvalidStatusTransition> {
        if !self.status.can_transition_to(new_status) {
            return Err(InvalidStatusTransition { from: self.status, to: new_status });
        }
        self.status = new_status;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub product_code: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
/// An order as received from a producer, before it has been accepted and persisted. Constructed
/// in `Received` status with zeroed totals; the intake pipeline validates it, computes its
/// totals and advances it to `Processing` before the first durable write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// The external id assigned by the producer
    pub order_id: OrderId,
    pub status: OrderStatusType,
    /// Derived: the sum of the item line totals. Zero until [`NewOrder::compute_totals`] runs.
    pub total_amount: Money,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new(order_id: OrderId, items: Vec<NewOrderItem>) -> Self {
        Self { order_id, status: OrderStatusType::Received, total_amount: Money::default(), items }
    }

    /// Checks the processing invariants: a non-blank external id, at least one item, and every
    /// item carries a product code, a positive quantity and a positive unit price. The error
    /// names the first failing item.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.order_id.is_blank() {
            return Err(OrderValidationError::MissingOrderId);
        }
        if self.items.is_empty() {
            return Err(OrderValidationError::NoItems);
        }
        for (index, item) in self.items.iter().enumerate() {
            if let Some(reason) = item.invalid_reason() {
                return Err(OrderValidationError::InvalidItem {
                    index,
                    product_code: item.product_code.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }

    pub fn is_processable(&self) -> bool {
        self.validate().is_ok()
    }

    /// Recompute every line total and the order total. Idempotent.
    pub fn compute_totals(&mut self) {
        for item in &mut self.items {
            item.compute_total();
        }
        self.total_amount = self.items.iter().map(|i| i.total_price).sum();
    }

    pub fn transition(&mut self, new_status: OrderStatusType) -> Result<(), InvalidStatusTransition> {
        if !self.status.can_transition_to(new_status) {
            return Err(InvalidStatusTransition { from: self.status, to: new_status });
        }
        self.status = new_status;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_code: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// Derived = `quantity × unit_price`. Zero until [`NewOrderItem::compute_total`] runs.
    pub total_price: Money,
}

impl NewOrderItem {
    pub fn new<S: Into<String>>(product_code: S, quantity: i64, unit_price: Money) -> Self {
        Self { product_code: product_code.into(), quantity, unit_price, total_price: Money::default() }
    }

    pub fn compute_total(&mut self) {
        // validate() rejects quantities whose line total cannot be represented
        self.total_price = self.unit_price.checked_mul(self.quantity).unwrap_or(Money::MAX);
    }

    fn invalid_reason(&self) -> Option<&'static str> {
        if self.product_code.trim().is_empty() {
            Some("product code must not be empty")
        } else if self.quantity < 1 {
            Some("quantity must be at least 1")
        } else if self.unit_price.value() <= 0 {
            Some("unit price must be positive")
        } else if self.unit_price.checked_mul(self.quantity).is_none() {
            Some("line total is too large to represent")
        } else {
            None
        }
    }
}
