//! Route handlers, one module per `/api/*` area.

pub mod config;
pub mod learned;
pub mod prefs;
pub mod step_order;
pub mod study;
pub mod util;
