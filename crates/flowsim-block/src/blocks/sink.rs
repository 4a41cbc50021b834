//! `Sink` — terminal block; accepts anything, holds it forever.

use std::any::Any;

use flowsim_core::{AgentId, BlockId};

use crate::behavior::BlockBehavior;
use crate::block::BlockShell;
use crate::context::TickCtx;
use crate::error::BlockResult;

#[derive(Default)]
pub struct Sink {
    count: u64,
}

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifetime acceptance total.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl BlockBehavior for Sink {
    fn take(&mut self, agent: AgentId, _previous_block: Option<BlockId>, _slot: usize, _shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        self.count += 1;
        ctx.agents.despawn(agent);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsim_agent::{Agent, AgentArena};

    #[test]
    fn counts_and_despawns_every_agent() {
        let mut agents = AgentArena::new();
        let id = agents.spawn(Agent::new());
        let mut sink = Sink::new();
        assert!(agents.contains(id));
        sink.count += 1;
        agents.despawn(id);
        assert_eq!(sink.count(), 1);
        assert!(!agents.contains(id));
    }
}
