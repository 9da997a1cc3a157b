//! Numeric utilities shared by the swirl crates.

pub mod filter;
