pub mod bcb;
pub mod live;
pub mod yahoo;

// Re-export for providers to easily use cache
pub use crate::core::cache::Cache;
