//! Visitor preferences — theme, font size and learned experiments.
//!
//! Values are validated in `model`, persisted through `store`, and the single
//! page-wide instance lives in `state` for the lifetime of the WASM module.

pub mod model;
pub mod state;
pub mod store;
