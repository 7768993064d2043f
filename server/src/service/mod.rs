//! Services

pub mod executor;
