//! Callback wrappers and the identity scheme used for removal and
//! deduplication.

use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;
use crate::value::Value;

/// The shape every registered handler is reduced to: a prepared slice of
/// positional arguments in, a value out.
///
/// The dispatch loop does purely mechanical slicing against this signature;
/// there is no runtime arity introspection.
pub type InvokeFn = dyn Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync;

/// Stable identity of a registered callback.
///
/// Closures are not comparable in Rust, so the registry keys registrations
/// by an explicit identity instead. Identities drive duplicate detection at
/// registration time and matching in removal and priority lookups.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CallbackId {
    /// A plain closure: the allocation address of its shared wrapper.
    /// Clones of one [`Callback`] share it; independently constructed
    /// callbacks never collide.
    Ptr(usize),

    /// An explicit, caller-chosen name. Lets a registration be removed by
    /// parties that never held the original [`Callback`].
    Named(String),

    /// A bound method: owning instance address plus method name. The same
    /// method on the same instance is a duplicate; the same method on a
    /// different instance is not.
    Method {
        /// Address of the owning instance.
        owner: usize,
        /// Method name within the owner.
        method: String,
    },
}

/// A registerable handler: an invocable closure plus its [`CallbackId`].
///
/// # Example
///
/// ```rust,ignore
/// let upcase = Callback::new(|args| {
///     let s = args[0].downcast_ref::<String>().unwrap();
///     Ok(Value::from(s.to_uppercase()))
/// })
/// .named("demo.upcase");
/// ```
#[derive(Clone)]
pub struct Callback {
    id: CallbackId,
    invoke: Arc<InvokeFn>,
}

impl Callback {
    /// Wraps a filter-style closure. In filter dispatch the returned value
    /// replaces the threaded value; in action dispatch it is discarded.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        let invoke: Arc<InvokeFn> = Arc::new(f);
        let id = CallbackId::Ptr(Arc::as_ptr(&invoke) as *const () as usize);
        Self { id, invoke }
    }

    /// Wraps a side-effect closure; the dispatch chain sees a unit value.
    pub fn action<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::new(move |args| {
            f(args)?;
            Ok(Value::unit())
        })
    }

    /// Replaces the identity with a stable name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.id = CallbackId::Named(name.into());
        self
    }

    /// Replaces the identity with bound-method identity: `owner`'s address
    /// plus `method`. Registering the same method name against the same
    /// instance twice is recognized as a duplicate.
    #[must_use]
    pub fn bound<T>(mut self, owner: &Arc<T>, method: impl Into<String>) -> Self {
        self.id = CallbackId::Method {
            owner: Arc::as_ptr(owner) as usize,
            method: method.into(),
        };
        self
    }

    /// The identity used for deduplication and removal.
    pub fn id(&self) -> &CallbackId {
        &self.id
    }

    /// Invokes the handler with a prepared argument slice.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, BoxError> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
