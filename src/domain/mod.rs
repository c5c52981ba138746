//! Core domain types and logic.

pub mod assets;
pub mod assistant;
pub mod currency;
pub mod error;
pub mod risk;
pub mod stats;
pub mod trade;
pub mod validation;
