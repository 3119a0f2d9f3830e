//! Helpers for exercising the pipeline in tests. Not part of the public API proper, but exposed
//! so that boundary crates and integration tests can share them.

#[cfg(feature = "sqlite")]
mod prepare_env;

mod doubles;

pub use doubles::{FailingCache, RecordingPublisher};
#[cfg(feature = "sqlite")]
pub use prepare_env::{prepare_test_env, random_db_path};
