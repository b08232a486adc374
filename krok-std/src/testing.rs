//! Testing utilities for Krok.
//!
//! This module provides utilities to make testing hook registrations and
//! publisher sites easier.
//!
//! # Features
//!
//! - [`RecordingCallback`]: records every argument list it receives
//! - [`CountingCallback`]: counts invocations

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use krok_core::{Callback, Value};

// ============================================================================
// Recording Callback
// ============================================================================

/// Records the argument lists it receives and passes the leading value
/// through unchanged.
///
/// Useful for verifying what a publisher site actually hands to handlers.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingCallback::new();
/// registry.add_action("boot", recorder.callback(), DEFAULT_PRIORITY, 2)?;
///
/// registry.do_action("boot", &[Value::from(42i64)])?;
///
/// assert_eq!(recorder.count(), 1);
/// ```
pub struct RecordingCallback {
    calls: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl RecordingCallback {
    /// Creates a new recorder.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Builds a registerable callback wired to this recorder.
    ///
    /// Each call constructs a distinct identity, so one recorder can sit at
    /// several priorities (or on several tags) at once.
    pub fn callback(&self) -> Callback {
        let calls = Arc::clone(&self.calls);
        Callback::new(move |args| {
            calls.lock().unwrap().push(args.to_vec());
            Ok(args.first().cloned().unwrap_or_else(Value::unit))
        })
    }

    /// The argument lists seen so far.
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded invocations.
    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Clears all recorded invocations.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Default for RecordingCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RecordingCallback {
    fn clone(&self) -> Self {
        Self {
            calls: self.calls.clone(),
        }
    }
}

// ============================================================================
// Counting Callback
// ============================================================================

/// Counts invocations.
///
/// # Example
///
/// ```rust,ignore
/// let counter = CountingCallback::new();
/// registry.add_action("tick", counter.callback(), DEFAULT_PRIORITY, 0)?;
///
/// registry.do_action("tick", &[])?;
///
/// assert_eq!(counter.count(), 1);
/// ```
pub struct CountingCallback {
    count: Arc<AtomicUsize>,
}

impl CountingCallback {
    /// Creates a new counting callback.
    pub fn new() -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Builds a registerable callback wired to this counter. Each call
    /// constructs a distinct identity.
    pub fn callback(&self) -> Callback {
        let count = Arc::clone(&self.count);
        Callback::action(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    /// The current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Resets the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Default for CountingCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CountingCallback {
    fn clone(&self) -> Self {
        Self {
            count: self.count.clone(),
        }
    }
}
