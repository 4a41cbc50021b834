//! The sole diagnostic surface this engine exposes. No renderer ships with
//! it — see the crate-level docs for why that's deliberate, not missing.

use flowsim_core::Tick;

/// Invoked at the end of every tick, after events have been collected for
/// the next one. The default no-op implementation lets callers who only
/// care about one callback skip implementing the rest (there's only one
/// here, but the shape matches the teacher's `SimObserver` on purpose).
pub trait ViewHook {
    fn render_tick(&mut self, tick: Tick);
}

/// A [`ViewHook`] that does nothing. Used when `run`/`tick` is called
/// without a real hook supplied.
pub struct NoopViewHook;

impl ViewHook for NoopViewHook {
    fn render_tick(&mut self, _tick: Tick) {}
}
