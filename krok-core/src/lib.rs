//! # krok-core
//!
//! Core types for the Krok hook dispatch framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! plugins and extensions that don't need the full `krok-std`
//! implementation.
//!
//! # Two-Layer Architecture
//!
//! Krok splits hook dispatch into two layers:
//!
//! ## Layer 1: Callbacks (this crate)
//!
//! The vocabulary shared by everything that registers or publishes hooks:
//!
//! - [`Value`]: the opaque argument cell threaded through dispatch. The
//!   engine never looks inside; handlers downcast.
//! - [`Callback`]: a handler reduced to one mechanical shape
//!   (`Fn(&[Value]) -> Result<Value, BoxError>`) plus a [`CallbackId`],
//!   the stable identity that makes duplicate detection and removal
//!   possible for otherwise-incomparable closures.
//!
//! ## Layer 2: Dispatch (`krok-std`)
//!
//! The per-tag `Hook` dispatcher (priority buckets, reentrancy-safe
//! traversal) and the string-keyed `Registry` facade build on these types.
//!
//! # Error Types
//!
//! - [`KrokError`] - Top-level error type
//! - [`RegistrationError`] - Contract violations rejected at registration
//! - [`DispatchError`] - Handler failures surfaced during dispatch

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod callback;
mod error;
mod value;

// Re-exports
pub use callback::{Callback, CallbackId, InvokeFn};
pub use error::{BoxError, DispatchError, KrokError, RegistrationError};
pub use value::Value;
