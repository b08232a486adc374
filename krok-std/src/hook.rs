//! # Per-Tag Dispatcher (Hook)
//!
//! A [`Hook`] owns the callback registry for a single tag: the priority
//! buckets, the dispatch traversal, and the bookkeeping that keeps an
//! in-progress pass coherent while its own handlers add callbacks, remove
//! callbacks, or dispatch the tag again recursively.
//!
//! # Traversal Model
//!
//! Dispatch walks priority buckets in ascending numeric order, and each
//! bucket in registration (FIFO) order. Every pass pins the *list of
//! priority keys* it will visit at entry, while bucket *contents* are read
//! live:
//!
//! - An append to a bucket the pass has not finished is still visited.
//! - A brand-new priority created mid-pass is folded into the pass only
//!   when it sorts after the bucket currently executing; otherwise it waits
//!   for the next pass.
//! - A removal marks the entry skipped; physical deletion waits until the
//!   hook is idle, so no live cursor is ever invalidated.
//!
//! Each nesting depth owns its own snapshot and cursors, which is what
//! makes recursive dispatch of the same tag safe.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use krok_core::{BoxError, Callback, CallbackId, Value};

/// Default registration priority. Lower priorities run earlier.
pub const DEFAULT_PRIORITY: i64 = 10;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Filter,
    Action,
}

struct Registration {
    callback: Callback,
    accepted_args: usize,
    seq: u64,
    removed: bool,
}

/// One in-progress dispatch pass: the priority keys pinned at entry plus
/// the pass's position in them.
struct Frame {
    priorities: Vec<i64>,
    /// Cursor into `priorities`.
    index: usize,
    /// Cursor into the bucket currently executing.
    entry: usize,
}

#[derive(Default)]
struct State {
    buckets: BTreeMap<i64, Vec<Registration>>,
    frames: Vec<Frame>,
    next_seq: u64,
    doing_action: bool,
}

impl State {
    fn dispatching(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Merges a freshly created priority key into every active frame whose
    /// cursor has not yet passed it numerically. Frames already executing a
    /// later bucket (or finished) are left alone; the new bucket runs on
    /// their next pass instead.
    fn reconcile_new_priority(&mut self, priority: i64) {
        for frame in &mut self.frames {
            let Some(&current) = frame.priorities.get(frame.index) else {
                continue;
            };
            if priority > current {
                let tail = &frame.priorities[frame.index + 1..];
                let offset = tail.partition_point(|&p| p < priority);
                frame.priorities.insert(frame.index + 1 + offset, priority);
            }
        }
    }

    /// Physically drops entries marked removed during a pass. Runs only
    /// once nesting is back to zero, so no live cursor can be invalidated.
    fn sweep(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.retain(|r| !r.removed);
        }
        self.buckets.retain(|_, bucket| !bucket.is_empty());
    }
}

/// The callback registry and dispatcher for a single tag.
///
/// All mutable state sits behind one mutex that is never held while a
/// handler runs, so handlers can re-enter the hook to register, remove, or
/// dispatch again without deadlocking. That also makes
/// registration thread-safe, but concurrent dispatch of the *same* hook
/// from multiple threads is unsupported: the per-depth pass bookkeeping
/// assumes call-stack nesting.
pub struct Hook {
    state: Mutex<State>,
}

impl Hook {
    /// Creates an empty hook.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Inserts `callback` at `priority`, receiving at most `accepted_args`
    /// leading positional arguments at dispatch time.
    ///
    /// Re-registering an identity already present at this priority replaces
    /// the stored closure and `accepted_args` in place, keeping the
    /// original bucket position.
    pub fn add(&self, callback: Callback, priority: i64, accepted_args: usize) {
        let mut st = self.state.lock().unwrap();
        let new_priority = !st.buckets.contains_key(&priority);
        let seq = st.next_seq;
        let bucket = st.buckets.entry(priority).or_default();
        if let Some(existing) = bucket
            .iter_mut()
            .find(|r| !r.removed && r.callback.id() == callback.id())
        {
            existing.callback = callback;
            existing.accepted_args = accepted_args;
            return;
        }
        bucket.push(Registration {
            callback,
            accepted_args,
            seq,
            removed: false,
        });
        st.next_seq += 1;
        if new_priority && st.dispatching() {
            st.reconcile_new_priority(priority);
        }
    }

    /// Removes the registration matching `id` at `priority`, reporting
    /// whether one was found.
    ///
    /// While a dispatch of this hook is active the entry is only marked
    /// removed (live cursors skip it from then on) and physical deletion
    /// waits until nesting returns to zero. Callbacks the pass has already
    /// run are unaffected.
    pub fn remove(&self, id: &CallbackId, priority: i64) -> bool {
        let mut st = self.state.lock().unwrap();
        let dispatching = st.dispatching();
        let Some(bucket) = st.buckets.get_mut(&priority) else {
            return false;
        };
        let mut found = false;
        if dispatching {
            for r in bucket
                .iter_mut()
                .filter(|r| !r.removed && r.callback.id() == id)
            {
                r.removed = true;
                found = true;
            }
        } else {
            let before = bucket.len();
            bucket.retain(|r| r.callback.id() != id);
            found = bucket.len() < before;
            if bucket.is_empty() {
                st.buckets.remove(&priority);
            }
        }
        found
    }

    /// Removes every registration, or every registration at one priority.
    /// The same mark-and-skip rule as [`Hook::remove`] applies while a
    /// dispatch is active.
    pub fn remove_all(&self, priority: Option<i64>) {
        let mut st = self.state.lock().unwrap();
        if st.dispatching() {
            match priority {
                Some(p) => {
                    if let Some(bucket) = st.buckets.get_mut(&p) {
                        for r in bucket.iter_mut() {
                            r.removed = true;
                        }
                    }
                }
                None => {
                    for bucket in st.buckets.values_mut() {
                        for r in bucket.iter_mut() {
                            r.removed = true;
                        }
                    }
                }
            }
        } else {
            match priority {
                Some(p) => {
                    st.buckets.remove(&p);
                }
                None => st.buckets.clear(),
            }
        }
    }

    /// Priority of the live registration matching `id`, if any.
    pub fn priority_of(&self, id: &CallbackId) -> Option<i64> {
        let st = self.state.lock().unwrap();
        st.buckets.iter().find_map(|(priority, bucket)| {
            bucket
                .iter()
                .any(|r| !r.removed && r.callback.id() == id)
                .then_some(*priority)
        })
    }

    /// Number of live registrations across all priorities.
    pub fn len(&self) -> usize {
        let st = self.state.lock().unwrap();
        st.buckets
            .values()
            .map(|bucket| bucket.iter().filter(|r| !r.removed).count())
            .sum()
    }

    /// Whether no live registrations exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth of in-progress dispatch passes; zero when idle.
    pub fn nesting_level(&self) -> usize {
        self.state.lock().unwrap().frames.len()
    }

    /// Whether the current call chain entered through action dispatch.
    /// Cleared when nesting unwinds to zero.
    pub fn doing_action(&self) -> bool {
        self.state.lock().unwrap().doing_action
    }

    /// Threads a value through every live callback in ascending priority
    /// order, FIFO within a priority.
    ///
    /// Each callback receives the leading `accepted_args` slice of
    /// `[value, args...]`; its return value becomes the value for the next
    /// callback. A handler error aborts the pass immediately.
    pub fn apply_filters(&self, value: Value, args: &[Value]) -> Result<Value, BoxError> {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(value);
        argv.extend_from_slice(args);
        let depth = self.begin(Mode::Filter);
        let outcome = self.run(Mode::Filter, &mut argv, depth);
        self.finish(depth);
        outcome?;
        Ok(argv.swap_remove(0))
    }

    /// Invokes every live callback with the same `args`; no value is
    /// threaded and return values are discarded. Shares the traversal and
    /// reentrancy machinery with [`Hook::apply_filters`].
    pub fn do_action(&self, args: &[Value]) -> Result<(), BoxError> {
        let mut argv = args.to_vec();
        let depth = self.begin(Mode::Action);
        let outcome = self.run(Mode::Action, &mut argv, depth);
        self.finish(depth);
        outcome
    }

    fn begin(&self, mode: Mode) -> usize {
        let mut st = self.state.lock().unwrap();
        let priorities: Vec<i64> = st.buckets.keys().copied().collect();
        let depth = st.frames.len();
        st.frames.push(Frame {
            priorities,
            index: 0,
            entry: 0,
        });
        if mode == Mode::Action {
            st.doing_action = true;
        }
        depth
    }

    /// Exit bookkeeping runs on the error path too, so a failed pass still
    /// leaves the hook dispatchable.
    fn finish(&self, depth: usize) {
        let mut st = self.state.lock().unwrap();
        debug_assert_eq!(
            st.frames.len(),
            depth + 1,
            "dispatch frames must unwind in call-stack order"
        );
        st.frames.pop();
        if st.frames.is_empty() {
            st.sweep();
            st.doing_action = false;
        }
    }

    fn run(&self, mode: Mode, argv: &mut [Value], depth: usize) -> Result<(), BoxError> {
        while let Some((callback, accepted_args)) = self.next_entry(depth) {
            let take = accepted_args.min(argv.len());
            let returned = callback.invoke(&argv[..take])?;
            if mode == Mode::Filter {
                argv[0] = returned;
            }
        }
        Ok(())
    }

    /// Advances this pass's cursors to the next live registration and hands
    /// back a clone of its callback. The state lock is released before the
    /// caller invokes the handler, so handlers may re-enter the hook.
    fn next_entry(&self, depth: usize) -> Option<(Callback, usize)> {
        let mut st = self.state.lock().unwrap();
        let State {
            buckets, frames, ..
        } = &mut *st;
        let frame = &mut frames[depth];
        loop {
            let priority = *frame.priorities.get(frame.index)?;
            match buckets.get(&priority).and_then(|b| b.get(frame.entry)) {
                Some(r) => {
                    frame.entry += 1;
                    if r.removed {
                        continue;
                    }
                    return Some((r.callback.clone(), r.accepted_args));
                }
                None => {
                    frame.index += 1;
                    frame.entry = 0;
                }
            }
        }
    }
}

impl Default for Hook {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.state.lock().unwrap();
        let mut map = f.debug_map();
        for (priority, bucket) in &st.buckets {
            let entries: Vec<_> = bucket
                .iter()
                .map(|r| (r.seq, r.callback.id().clone(), r.removed))
                .collect();
            map.entry(priority, &entries);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn probe(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Callback {
        let log = Arc::clone(log);
        Callback::action(move |_| {
            log.lock().unwrap().push(name);
            Ok(())
        })
    }

    #[test]
    fn replacing_a_registration_keeps_its_bucket_position() {
        let hook = Hook::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        hook.add(probe(&log, "first-old").named("first"), 10, 0);
        hook.add(probe(&log, "second"), 10, 0);
        hook.add(probe(&log, "first-new").named("first"), 10, 0);

        hook.do_action(&[]).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first-new", "second"]);
        assert_eq!(hook.len(), 2);
    }

    #[test]
    fn removal_during_a_pass_is_swept_at_exit() {
        let hook = Arc::new(Hook::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let target = probe(&log, "target");
        let target_id = target.id().clone();
        hook.add(target, 20, 0);
        {
            let hook2 = Arc::clone(&hook);
            let log = Arc::clone(&log);
            hook.add(
                Callback::action(move |_| {
                    log.lock().unwrap().push("remover");
                    hook2.remove(&target_id, 20);
                    Ok(())
                }),
                10,
                0,
            );
        }

        hook.do_action(&[]).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["remover"]);
        assert_eq!(hook.len(), 1);
        assert_eq!(hook.nesting_level(), 0);
    }

    #[test]
    fn doing_action_clears_when_nesting_unwinds() {
        let hook = Arc::new(Hook::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let hook2 = Arc::clone(&hook);
            let seen = Arc::clone(&seen);
            hook.add(
                Callback::action(move |_| {
                    seen.lock().unwrap().push(hook2.doing_action());
                    Ok(())
                }),
                10,
                0,
            );
        }

        hook.do_action(&[]).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![true]);
        assert!(!hook.doing_action());
    }
}
