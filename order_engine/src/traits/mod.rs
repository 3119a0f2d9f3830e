//! The ports of the order intake engine.
//!
//! The pipeline never talks to a concrete database, cache or transport. Everything outside the
//! engine is reached through the traits in this module, so that backends can be swapped out (or
//! mocked in tests) without touching the pipeline itself.

mod duplicate_cache;
mod order_publisher;
mod order_repository;

pub use duplicate_cache::{CacheError, DuplicateCache};
pub use order_publisher::{OrderPublisher, PublicationError};
pub use order_repository::{OrderRepository, OrderRepositoryError};
