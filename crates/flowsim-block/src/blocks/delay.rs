//! `Delay` — holds an agent for a fixed number of ticks, then ejects it.
//!
//! `delay_ticks = 0` performs an immediate same-tick ejection (the
//! scheduler fires its tick-0 bucket within the same `fire` pass) — the
//! recurring-event 0→1 promotion rule in `TimedScheduler` does not apply
//! here, since a `Delay`'s scheduled ejection is never recurring.

use std::any::Any;
use std::collections::HashMap;

use flowsim_core::{AgentId, BlockId, Tick};

use crate::behavior::BlockBehavior;
use crate::block::BlockShell;
use crate::context::TickCtx;
use crate::error::BlockResult;

pub struct Delay {
    delay_ticks: u64,
    pending: HashMap<AgentId, Tick>,
}

impl Delay {
    pub fn new(delay_ticks: u64) -> Self {
        Self { delay_ticks, pending: HashMap::new() }
    }

    /// Number of agents currently held, awaiting their scheduled ejection.
    pub fn size(&self) -> usize {
        self.pending.len()
    }

    /// Called by the scheduled callback once it fires, to keep the
    /// inspection table in sync with reality.
    pub fn forget(&mut self, agent: AgentId) {
        self.pending.remove(&agent);
    }
}

impl BlockBehavior for Delay {
    fn take(&mut self, agent: AgentId, _previous_block: Option<BlockId>, _slot: usize, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        let target = shell.slot(0)?;
        ctx.delay.schedule_ejection(self.delay_ticks, agent, shell.id(), target)?;
        self.pending.insert(agent, ctx.tick + self.delay_ticks);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
