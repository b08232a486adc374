//! Opaque argument values threaded through dispatch.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An opaque, cheaply clonable argument value.
///
/// The engine never inspects a `Value`; it only threads values through
/// callbacks, so any `Send + Sync` payload can ride along: domain objects,
/// scalars, shared state. Callbacks that care about the contents downcast
/// with [`Value::downcast_ref`].
///
/// # Example
///
/// ```rust,ignore
/// let title = Value::from("hello world");
/// assert_eq!(title.downcast_ref::<String>().unwrap(), "hello world");
/// ```
#[derive(Clone)]
pub struct Value(Arc<dyn Any + Send + Sync>);

impl Value {
    /// Wraps an arbitrary payload.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// The unit value, used where no meaningful value exists (action
    /// callbacks, empty argument slots).
    pub fn unit() -> Self {
        Self::new(())
    }

    /// Whether the payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Borrows the payload as a `T`, if that is what it is.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Recovers shared ownership of the payload as a `T`, or hands the
    /// value back untouched.
    pub fn downcast_arc<T: Any + Send + Sync>(self) -> Result<Arc<T>, Self> {
        self.0.downcast::<T>().map_err(Self)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value").finish_non_exhaustive()
    }
}

// Conversions for common scalar payloads
impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::new(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::unit()
    }
}
