//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a cache.
//!
//! # Tasks
//! - Expiration sweeper: removes expired cache entries at a fixed interval

mod sweeper;

pub use sweeper::Sweeper;
