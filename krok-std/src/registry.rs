//! String-keyed registry facade.
//!
//! The [`Registry`] maps tag names to [`Hook`]s, created lazily on first
//! registration, and carries the cross-cutting bookkeeping publishers rely
//! on: the reserved `"all"` observation tag, the stack of tags currently
//! dispatching, and per-tag action fire counts.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use krok_core::{Callback, CallbackId, DispatchError, RegistrationError, Value};

use crate::hook::Hook;

/// Reserved tag whose callbacks observe every dispatch of any tag.
///
/// They run with action semantics (return values discarded) before the
/// dispatched tag's own callbacks, receiving the tag name as the first
/// positional argument followed by the dispatch's full argument list.
/// Intended for cross-cutting observation: logging, tracing, metrics.
pub const ALL: &str = "all";

/// The public registration and invocation surface: a process-wide mapping
/// from tag name to [`Hook`].
///
/// A `Registry` is an explicit value: construct one at the application's
/// composition root and hand it (typically as `Arc<Registry>`) to every
/// component that registers or publishes hooks. Tags are free-form strings
/// the registry treats as opaque keys; a tag nobody registered against is
/// simply absent, and dispatching it is a pass-through.
///
/// # Example
///
/// ```rust,ignore
/// let registry = Arc::new(Registry::new());
/// registry.add_filter("the_title", upcase, DEFAULT_PRIORITY, 1)?;
/// let title = registry.apply_filters("the_title", Value::from("hello"), &[])?;
/// ```
pub struct Registry {
    hooks: Mutex<HashMap<String, Arc<Hook>>>,
    current: Mutex<Vec<String>>,
    actions: Mutex<HashMap<String, u64>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            hooks: Mutex::new(HashMap::new()),
            current: Mutex::new(Vec::new()),
            actions: Mutex::new(HashMap::new()),
        }
    }

    /// Registers `callback` on `tag`.
    ///
    /// Lower priorities run earlier; callbacks sharing a priority run in
    /// registration order. `accepted_args` bounds how many leading
    /// positional arguments the callback receives at dispatch time.
    /// Re-registering an identity already present at the same priority
    /// replaces it in place.
    ///
    /// Registering against a tag that is mid-dispatch is allowed; see
    /// [`Hook`] for how the in-progress pass treats the newcomer.
    pub fn add_filter(
        &self,
        tag: &str,
        callback: Callback,
        priority: i64,
        accepted_args: usize,
    ) -> Result<(), RegistrationError> {
        if tag.is_empty() {
            return Err(RegistrationError::EmptyTag);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(tag, priority, id = ?callback.id(), "callback registered");
        self.hook_entry(tag).add(callback, priority, accepted_args);
        Ok(())
    }

    /// Registers a side-effect callback; semantic alias of
    /// [`Registry::add_filter`].
    pub fn add_action(
        &self,
        tag: &str,
        callback: Callback,
        priority: i64,
        accepted_args: usize,
    ) -> Result<(), RegistrationError> {
        self.add_filter(tag, callback, priority, accepted_args)
    }

    /// Whether `tag` has any live registrations.
    pub fn has_filter(&self, tag: &str) -> bool {
        self.hook(tag).is_some_and(|hook| !hook.is_empty())
    }

    /// Action-flavored alias of [`Registry::has_filter`].
    pub fn has_action(&self, tag: &str) -> bool {
        self.has_filter(tag)
    }

    /// Priority at which `id` is registered on `tag`, if it is.
    pub fn filter_priority(&self, tag: &str, id: &CallbackId) -> Option<i64> {
        self.hook(tag)?.priority_of(id)
    }

    /// Removes the registration matching `id` at `priority` on `tag`,
    /// reporting whether one was found.
    ///
    /// If a dispatch of `tag` is active the callback is suppressed for the
    /// remainder of the pass and deleted when the dispatch unwinds;
    /// callbacks the pass already ran keep their effect.
    pub fn remove_filter(&self, tag: &str, id: &CallbackId, priority: i64) -> bool {
        let Some(hook) = self.hook(tag) else {
            return false;
        };
        let removed = hook.remove(id, priority);
        #[cfg(feature = "tracing")]
        if removed {
            tracing::debug!(tag, priority, ?id, "callback removed");
        }
        removed
    }

    /// Action-flavored alias of [`Registry::remove_filter`].
    pub fn remove_action(&self, tag: &str, id: &CallbackId, priority: i64) -> bool {
        self.remove_filter(tag, id, priority)
    }

    /// Removes every registration on `tag`, or only those at one priority.
    pub fn remove_all_filters(&self, tag: &str, priority: Option<i64>) {
        if let Some(hook) = self.hook(tag) {
            hook.remove_all(priority);
        }
    }

    /// Action-flavored alias of [`Registry::remove_all_filters`].
    pub fn remove_all_actions(&self, tag: &str, priority: Option<i64>) {
        self.remove_all_filters(tag, priority);
    }

    /// Threads `value` through every callback registered on `tag` and
    /// returns the final value.
    ///
    /// An unregistered tag is a pure pass-through: `value` comes back
    /// unchanged and nothing runs. When the [`ALL`] tag has registrations
    /// its callbacks observe the dispatch first, receiving
    /// `[tag, value, args...]` with their return values discarded.
    pub fn apply_filters(
        &self,
        tag: &str,
        value: Value,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        self.current.lock().unwrap().push(tag.to_string());
        let result = self.filter_pass(tag, value, args);
        self.current.lock().unwrap().pop();
        result
    }

    /// Invokes every callback registered on `tag` with the same `args`;
    /// no value is threaded and return values are discarded.
    ///
    /// The fire is counted for [`Registry::did_action`] even when nothing
    /// is registered. The [`ALL`] tag observes the dispatch first,
    /// receiving `[tag, args...]`.
    pub fn do_action(&self, tag: &str, args: &[Value]) -> Result<(), DispatchError> {
        *self
            .actions
            .lock()
            .unwrap()
            .entry(tag.to_string())
            .or_insert(0) += 1;
        self.current.lock().unwrap().push(tag.to_string());
        let result = self.action_pass(tag, args);
        self.current.lock().unwrap().pop();
        result
    }

    /// Number of times `tag` has been fired through [`Registry::do_action`].
    pub fn did_action(&self, tag: &str) -> u64 {
        self.actions.lock().unwrap().get(tag).copied().unwrap_or(0)
    }

    /// Innermost tag currently being dispatched, if any.
    pub fn current_filter(&self) -> Option<String> {
        self.current.lock().unwrap().last().cloned()
    }

    /// With `None`, whether any dispatch is in progress; with a tag,
    /// whether that tag is anywhere on the dispatch stack.
    pub fn doing_filter(&self, tag: Option<&str>) -> bool {
        let current = self.current.lock().unwrap();
        match tag {
            Some(tag) => current.iter().any(|t| t == tag),
            None => !current.is_empty(),
        }
    }

    /// Action-flavored alias of [`Registry::doing_filter`].
    pub fn doing_action(&self, tag: Option<&str>) -> bool {
        self.doing_filter(tag)
    }

    /// Tags that currently have a hook, in no particular order.
    pub fn tags(&self) -> Vec<String> {
        self.hooks.lock().unwrap().keys().cloned().collect()
    }

    /// The hook registered under `tag`, if one exists.
    pub fn hook(&self, tag: &str) -> Option<Arc<Hook>> {
        self.hooks.lock().unwrap().get(tag).cloned()
    }

    fn hook_entry(&self, tag: &str) -> Arc<Hook> {
        Arc::clone(
            self.hooks
                .lock()
                .unwrap()
                .entry(tag.to_string())
                .or_default(),
        )
    }

    fn filter_pass(
        &self,
        tag: &str,
        value: Value,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        self.notify_all_hook(tag, Some(&value), args)?;
        let Some(hook) = self.hook(tag) else {
            return Ok(value);
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(tag, "dispatching filter");
        hook.apply_filters(value, args)
            .map_err(|source| DispatchError::Handler {
                tag: tag.to_string(),
                source,
            })
    }

    fn action_pass(&self, tag: &str, args: &[Value]) -> Result<(), DispatchError> {
        self.notify_all_hook(tag, None, args)?;
        let Some(hook) = self.hook(tag) else {
            return Ok(());
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(tag, "dispatching action");
        hook.do_action(args)
            .map_err(|source| DispatchError::Handler {
                tag: tag.to_string(),
                source,
            })
    }

    /// Feeds the [`ALL`] hook before `tag` itself is dispatched. Side
    /// effect only; the threaded value (when present) rides along read-only
    /// as the second positional argument.
    fn notify_all_hook(
        &self,
        tag: &str,
        value: Option<&Value>,
        args: &[Value],
    ) -> Result<(), DispatchError> {
        let Some(all) = self.hook(ALL) else {
            return Ok(());
        };
        let mut full = Vec::with_capacity(args.len() + 2);
        full.push(Value::from(tag));
        if let Some(value) = value {
            full.push(value.clone());
        }
        full.extend_from_slice(args);
        all.do_action(&full)
            .map_err(|source| DispatchError::Handler {
                tag: ALL.to_string(),
                source,
            })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("tags", &self.tags())
            .field("current", &*self.current.lock().unwrap())
            .finish_non_exhaustive()
    }
}
