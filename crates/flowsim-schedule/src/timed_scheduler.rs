//! `TimedScheduler` — tick-bucketed callback queue.
//!
//! # Why this exists
//!
//! Generalizes the teacher framework's `WakeQueue` (a `BTreeMap<Tick, Vec<_>>`
//! of sparse per-tick work) from "wake this agent" to "run this arbitrary
//! callback" — the reference implementation's `Simulator.schedule_event`
//! used by blocks like `Delay` to eject an agent at a precise future tick
//! with no per-tick polling. `O(log W)` insert/fire where `W` is the number
//! of distinct future ticks with pending work, same as `WakeQueue`.
//!
//! `Ctx` is deliberately generic: this crate has no notion of what a
//! "simulator" is. The consumer crate instantiates `TimedScheduler<Simulator>`
//! and hands it `&mut Simulator` at fire time, which keeps this crate (and
//! anything that needs to schedule callbacks, like `flowsim-block`) free of a
//! dependency on the top-level simulation crate.

use std::collections::BTreeMap;

use flowsim_core::{SimRng, Tick};

use crate::error::{SchedulerError, SchedulerResult};

type Callback<Ctx> = Box<dyn FnMut(Tick, &mut Ctx) + Send>;

struct ScheduledEvent<Ctx> {
    callback: Callback<Ctx>,
    recurring_interval: Option<u64>,
}

pub struct TimedScheduler<Ctx> {
    buckets: BTreeMap<Tick, Vec<ScheduledEvent<Ctx>>>,
    locked: bool,
}

impl<Ctx> Default for TimedScheduler<Ctx> {
    fn default() -> Self {
        Self { buckets: BTreeMap::new(), locked: false }
    }
}

impl<Ctx> TimedScheduler<Ctx> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `callback` to run at `now + delay_ticks`. `delay_ticks = 0`
    /// fires in the current tick's bucket — used by `Delay` blocks configured
    /// with zero hold time, which still need to go through the scheduler so
    /// ejection happens at a consistent pipeline phase rather than inline.
    ///
    /// If `recurring` is `Some(interval)`, the callback re-arms itself after
    /// each firing at `fire_tick + max(1, interval)` — a zero interval is
    /// promoted to 1 so a recurring event can never re-fire in its own fire
    /// pass and busy-loop. This promotion applies only to the recurring
    /// interval, not to the initial `delay_ticks`, so a one-shot zero-delay
    /// schedule still fires this tick.
    ///
    /// Fails with [`SchedulerError::Locked`] if called while `fire` is
    /// currently draining a bucket (a callback trying to schedule more work
    /// reentrantly) — the scheduler settles until the current tick's due
    /// events have all run.
    pub fn schedule(
        &mut self,
        now: Tick,
        delay_ticks: u64,
        recurring: Option<u64>,
        callback: Callback<Ctx>,
    ) -> SchedulerResult<()> {
        if self.locked {
            return Err(SchedulerError::Locked);
        }
        let fire_at = now.offset(delay_ticks);
        let recurring_interval = recurring.map(|interval| interval.max(1));
        self.buckets.entry(fire_at).or_default().push(ScheduledEvent { callback, recurring_interval });
        Ok(())
    }

    /// Fires every event due at exactly `now`. The due bucket is shuffled
    /// with the simulator's single RNG stream first, so same-tick firing
    /// order is a documented tie-break rather than an insertion-order
    /// artifact. Recurring events are re-armed for their next tick before
    /// `fire` returns. Returns the number of callbacks invoked.
    pub fn fire(&mut self, now: Tick, rng: &mut SimRng, ctx: &mut Ctx) -> SchedulerResult<usize> {
        let Some(mut due) = self.buckets.remove(&now) else { return Ok(0) };
        rng.shuffle(&mut due);
        let count = due.len();

        self.locked = true;
        let mut rearm = Vec::new();
        for mut event in due {
            (event.callback)(now, ctx);
            if let Some(interval) = event.recurring_interval {
                rearm.push((now.offset(interval), event));
            }
        }
        self.locked = false;

        for (fire_at, event) in rearm {
            self.buckets.entry(fire_at).or_default().push(event);
        }
        Ok(count)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn pending_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn next_fire_tick(&self) -> Option<Tick> {
        self.buckets.keys().next().copied()
    }
}
