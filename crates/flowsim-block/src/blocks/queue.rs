//! `Queue` — unbounded FIFO buffer that retries downstream pushes in order.

use std::any::Any;
use std::collections::VecDeque;

use flowsim_core::{AgentId, BlockId};

use crate::behavior::BlockBehavior;
use crate::block::BlockShell;
use crate::context::TickCtx;
use crate::error::BlockResult;

#[derive(Default)]
pub struct Queue {
    buffer: VecDeque<AgentId>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }
}

impl BlockBehavior for Queue {
    fn take(&mut self, agent: AgentId, _previous_block: Option<BlockId>, _slot: usize, _shell: &mut BlockShell, _ctx: &mut TickCtx) -> BlockResult<()> {
        self.buffer.push_back(agent);
        Ok(())
    }

    /// Tries to push every queued agent downstream in FIFO order. The first
    /// push that fails leaves its agent at the head and halts the rest of
    /// the pass — preserving order instead of letting a later agent cut in
    /// line ahead of one still stuck on a full downstream block.
    fn tick(&mut self, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        while let Some(&agent) = self.buffer.front() {
            if shell.eject(agent, 0, ctx).is_err() {
                break;
            }
            self.buffer.pop_front();
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_in_fifo_order() {
        let mut q = Queue::new();
        use flowsim_core::SlotId;
        let a = AgentId::from_raw(0, 0);
        let b = AgentId::from_raw(1, 0);
        q.buffer.push_back(a);
        q.buffer.push_back(b);
        assert_eq!(q.size(), 2);
        assert_eq!(q.buffer.front(), Some(&a));
    }
}
