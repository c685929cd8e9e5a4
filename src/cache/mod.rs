//! Cache module for upstream API responses
//!
//! This module provides a process-lifetime cache keyed by (catalog page, league)
//! with a fixed time-to-live. Nothing is persisted across restarts.

mod manager;

pub use manager::{CacheManager, DEFAULT_TTL_SECS};
