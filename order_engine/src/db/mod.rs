//! Storage backends for the order intake engine.

pub mod sqlite;
