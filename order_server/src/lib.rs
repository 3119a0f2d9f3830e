//! # Order intake gateway server
//!
//! This crate hosts the boundary of the order intake gateway. It is responsible for:
//! * Listening for incoming order submissions over HTTP.
//! * Consuming order submissions from the intake queue.
//! * Funnelling both channels into the engine's single intake pipeline.
//! * Bridging completed orders onto the outbound queue for downstream consumers.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /orders`: Submit a new order and wait for the outcome.
//! * `POST /orders/enqueue`: Submit a new order for asynchronous processing (`202 Accepted`).
//! * `GET /orders`: Search stored orders, with optional filters and pagination.
//! * `GET /orders/id/{id}`: Fetch an order by its database id.
//! * `GET /orders/external/{order_id}`: Fetch an order by its producer-assigned id.
//! * `GET /orders/status/{status}`: List orders in a given status.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod queue;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
