//! Models Module
//!
//! Payload types cached by the ingestion pipeline.

mod netface;

pub use netface::NetFace;
