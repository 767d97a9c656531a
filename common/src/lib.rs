//! CrossRate Common Types
//!
//! This crate contains the shared vocabulary types used across the
//! CrossRate engine: currency codes and ordered currency pairs.

pub mod currency;

pub use currency::*;
