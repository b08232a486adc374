//! # krok - Priority-Ordered Hook Dispatch
//!
//! `krok` is an in-process extensibility runtime: independent pieces of
//! code register priority-ordered callbacks against string-named hook
//! points, and publisher sites invoke every callback for a point, either
//! threading a value through the chain (**filters**) or fanning out side
//! effects (**actions**). It is the seam that lets unrelated subsystems
//! interoperate without calling each other directly.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use krok::{Callback, DEFAULT_PRIORITY, Registry, Value};
//!
//! let registry = Registry::new();
//!
//! registry.add_filter(
//!     "the_title",
//!     Callback::new(|args| {
//!         let title = args[0].downcast_ref::<String>().unwrap();
//!         Ok(Value::from(title.to_uppercase()))
//!     }),
//!     DEFAULT_PRIORITY,
//!     1,
//! )?;
//!
//! let title = registry.apply_filters("the_title", Value::from("hello"), &[])?;
//! ```
//!
//! ## Ordering
//!
//! Callbacks run in ascending priority order; within a priority they run
//! in registration order, and that FIFO order survives removals and
//! re-insertions. Those are the only ordering guarantees; nothing is
//! promised across different tags.
//!
//! ## Reentrancy
//!
//! A callback may register, remove, or dispatch hooks (including the very
//! tag it is running under) to unbounded depth. Each in-progress pass
//! pins the set of priority buckets it will visit at entry while reading
//! bucket contents live: additions at a later priority join the current
//! pass, additions at an earlier priority wait for the next one, and
//! removals take effect immediately for anything not yet run.
//!
//! ## Threading
//!
//! Dispatch is synchronous and designed for single-threaded use per
//! registry. Registration is safe from any thread, but dispatching one tag
//! concurrently from multiple threads is unsupported.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use krok_core::{
    // Errors
    BoxError,
    // Callback
    Callback,
    CallbackId,
    DispatchError,
    InvokeFn,
    KrokError,
    RegistrationError,
    // Value
    Value,
};

pub use krok_std::{
    hook::{DEFAULT_PRIORITY, Hook},
    registry::{ALL, Registry},
};

/// Cross-cutting observation callbacks.
pub mod observe {
    pub use krok_std::observe::trace_all;
}

/// Testing utilities.
pub mod testing {
    pub use krok_std::testing::{CountingCallback, RecordingCallback};
}

/// Prelude module - common imports for Krok.
///
/// # Usage
///
/// ```rust,ignore
/// use krok::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ALL, Callback, CallbackId, DEFAULT_PRIORITY, DispatchError, Registry, RegistrationError,
        Value,
    };
}
