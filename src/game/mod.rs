//! Step-ordering game — state machine, revert timers and per-page sessions.
//!
//! State lives in WASM memory (thread_local) for the lifetime of the page;
//! nothing here is persisted.

pub mod reverts;
pub mod session;
pub mod step_order;
