// Not every test binary exercises every fixture.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use krok::{Callback, Value};

// ============================================================================
// Payload Shorthands
// ============================================================================

pub fn str_of(value: &Value) -> String {
    value
        .downcast_ref::<String>()
        .cloned()
        .expect("string value")
}

pub fn int_of(value: &Value) -> i64 {
    value.downcast_ref::<i64>().copied().expect("int value")
}

// ============================================================================
// Callback Builders
// ============================================================================

/// A filter over string values.
pub fn string_filter(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Callback {
    Callback::new(move |args| Ok(Value::from(f(&str_of(&args[0])))))
}

/// A filter over integer values.
pub fn int_filter(f: impl Fn(i64) -> i64 + Send + Sync + 'static) -> Callback {
    Callback::new(move |args| Ok(Value::from(f(int_of(&args[0])))))
}

/// A pass-through filter that logs `id` when it runs.
pub fn recorder(log: &Arc<Mutex<Vec<i64>>>, id: i64) -> Callback {
    let log = Arc::clone(log);
    Callback::new(move |args| {
        log.lock().unwrap().push(id);
        Ok(args.first().cloned().unwrap_or_else(Value::unit))
    })
}
