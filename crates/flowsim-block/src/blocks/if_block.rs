//! `If` — two-way predicate routing (slot 0 = true, slot 1 = false).

use std::any::Any;
use std::collections::VecDeque;

use flowsim_core::{AgentId, BlockId};

use crate::behavior::BlockBehavior;
use crate::block::BlockShell;
use crate::context::TickCtx;
use crate::error::BlockResult;

pub struct If {
    buffer: VecDeque<AgentId>,
    predicate: Box<dyn for<'c> FnMut(AgentId, &TickCtx<'c>) -> bool + Send>,
}

impl If {
    pub fn new(predicate: impl for<'c> FnMut(AgentId, &TickCtx<'c>) -> bool + Send + 'static) -> Self {
        Self { buffer: VecDeque::new(), predicate: Box::new(predicate) }
    }
}

impl BlockBehavior for If {
    fn take(&mut self, agent: AgentId, _previous_block: Option<BlockId>, _slot: usize, _shell: &mut BlockShell, _ctx: &mut TickCtx) -> BlockResult<()> {
        self.buffer.push_back(agent);
        Ok(())
    }

    fn tick(&mut self, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        let drained: Vec<AgentId> = self.buffer.drain(..).collect();
        for agent in drained {
            let slot = if (self.predicate)(agent, &*ctx) { 0 } else { 1 };
            shell.eject(agent, slot, ctx)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
