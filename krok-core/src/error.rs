//! Error types for Krok.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`KrokError`] - Top-level error type for all Krok operations
//! - [`RegistrationError`] - Contract violations rejected at registration time
//! - [`DispatchError`] - Errors surfaced while dispatching a hook

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Krok operations.
#[derive(Error, Debug)]
pub enum KrokError {
    /// A registration was rejected before it entered the registry.
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// An error occurred while dispatching a hook.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Contract violations detected when a callback is registered.
///
/// These are rejected synchronously; an invalid registration never enters
/// the registry.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// The hook tag was empty.
    #[error("hook tag must not be empty")]
    EmptyTag,
}

/// Errors surfaced while dispatching a hook.
///
/// The engine never catches or logs a handler failure; the pass is aborted
/// and the handler's error is handed back to the dispatching caller
/// unchanged. Value transformations already applied by earlier callbacks in
/// the chain are not rolled back.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A handler returned an error, aborting the remainder of the pass.
    #[error("handler failed while dispatching '{tag}'")]
    Handler {
        /// The tag that was being dispatched.
        tag: String,
        /// The handler's error.
        #[source]
        source: BoxError,
    },
}

// Convenience conversions
impl From<BoxError> for KrokError {
    fn from(err: BoxError) -> Self {
        KrokError::Custom(err)
    }
}
