//! Order Intake Engine
//!
//! The order intake engine is the core of the order intake gateway. It accepts purchase orders
//! from any number of boundary adapters, suppresses duplicate submissions, computes derived
//! totals, drives each order through its status lifecycle, persists it, and republishes the
//! finalized order for downstream consumers.
//!
//! The library is divided into three main sections:
//! 1. The port traits ([`mod@traits`]). The pipeline talks to a durable order store, a fast
//!    key/value cache and a publication transport exclusively through these traits. Backends
//!    (e.g. the bundled SQLite store in [`mod@db`]) implement them.
//! 2. The public API ([`mod@api`]). [`OrderFlowApi`] is the single entry point for order
//!    creation, shared by every intake channel; [`OrderQueryApi`] serves the read path.
//! 3. The event system ([`mod@events`]). Completed orders are emitted as events through a
//!    simple channel-based hook system so that boundary crates can bridge them onto an
//!    outbound transport.
pub mod api;
pub mod cache;
#[cfg(feature = "sqlite")]
pub mod db;
pub mod db_types;
pub mod dedup;
pub mod events;
pub mod test_utils;
pub mod traits;

pub use api::{order_objects, OrderApiError, OrderFlowApi, OrderQueryApi};
#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use dedup::{DedupConfig, DuplicateGuard};
