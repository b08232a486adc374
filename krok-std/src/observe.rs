//! Cross-cutting observation callbacks for the reserved `"all"` tag.

use krok_core::Callback;

/// Builds a callback for the `"all"` tag that logs every dispatch it
/// observes.
///
/// The first positional argument on the `"all"` hook is the tag being
/// dispatched; the remainder is the dispatch's own argument list. Emits
/// `tracing` events when the `tracing` feature is enabled and compiles to
/// a no-op otherwise.
pub fn trace_all() -> Callback {
    Callback::action(|args| {
        #[cfg(feature = "tracing")]
        if let Some(tag) = args.first().and_then(|v| v.downcast_ref::<String>()) {
            tracing::trace!(%tag, argc = args.len().saturating_sub(1), "hook dispatched");
        }
        #[cfg(not(feature = "tracing"))]
        let _ = args;
        Ok(())
    })
}
