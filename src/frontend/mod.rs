//! Metagen Frontend
//!
//! This module contains all frontend components:
//! - `analysis`: repository method classification, validation and planning
//! - `query`: query text lexing, parsing and checking
//! - `diagnostics`: diagnostics and their sinks

pub mod analysis;
pub mod diagnostics;
pub mod query;
