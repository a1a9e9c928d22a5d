//! Per-page study modes: quiz (self-test) mode and equation practice.

pub mod equation;
pub mod quiz;
