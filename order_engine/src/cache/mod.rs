//! Cache backends for duplicate screening.

mod memory;

pub use memory::MemoryCache;
