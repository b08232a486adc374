//! # krok-std
//!
//! Standard implementations for the Krok hook dispatch framework.
//!
//! This crate provides:
//! - **Per-tag dispatch**: [`hook::Hook`] with priority buckets, FIFO
//!   order within a priority, and reentrancy-safe traversal
//! - **The registry facade**: [`registry::Registry`] mapping tag names to
//!   hooks, plus the `"all"` observation tag, dispatch-stack
//!   introspection, and action fire counts
//! - **Observation**: cross-cutting `"all"`-hook callbacks in [`observe`]
//! - **Testing**: [`testing`] utilities

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use krok_core;

// Modules
pub mod hook;
pub mod observe;
pub mod registry;
pub mod testing;
