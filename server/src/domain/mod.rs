//! Domain types

pub mod scan;
