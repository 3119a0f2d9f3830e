//! The public API of the order intake engine.
//!
//! [`OrderFlowApi`] owns the write path: every intake channel (HTTP, queue consumers) funnels
//! into [`OrderFlowApi::create_order`], so validation, deduplication and the status lifecycle
//! behave identically no matter where an order came from. [`OrderQueryApi`] owns the read path.

mod errors;
mod order_flow_api;
mod order_query_api;

pub mod order_objects;

pub use errors::OrderApiError;
pub use order_flow_api::OrderFlowApi;
pub use order_query_api::OrderQueryApi;
