//! `Gate` — open/closed barrier fed exclusively by a `Queue`.

use std::any::Any;
use std::collections::VecDeque;

use flowsim_core::{AgentId, BlockId};

use crate::behavior::BlockBehavior;
use crate::block::BlockShell;
use crate::blocks::queue::Queue;
use crate::context::TickCtx;
use crate::error::{BlockError, BlockResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    One,
    All,
}

pub struct Gate {
    state: GateState,
    mode: GateMode,
    waiting: VecDeque<AgentId>,
}

impl Gate {
    pub fn new(state: GateState, mode: GateMode) -> Self {
        Self { state, mode, waiting: VecDeque::new() }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn open(&mut self) {
        self.state = GateState::Open;
    }

    pub fn close(&mut self) {
        self.state = GateState::Closed;
    }

    pub fn toggle(&mut self) {
        self.state = match self.state {
            GateState::Open => GateState::Closed,
            GateState::Closed => GateState::Open,
        };
    }
}

impl BlockBehavior for Gate {
    fn take(&mut self, agent: AgentId, previous_block: Option<BlockId>, _slot: usize, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        let upstream_is_queue = previous_block.is_some_and(|b| ctx.is_kind::<Queue>(b));
        if !upstream_is_queue {
            return Err(BlockError::NotAdmissible { agent, block: shell.id(), reason: "Gate requires an upstream Queue".into() });
        }
        self.waiting.push_back(agent);
        Ok(())
    }

    fn tick(&mut self, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        if self.state != GateState::Open {
            return Ok(());
        }
        match self.mode {
            GateMode::One => {
                if let Some(agent) = self.waiting.pop_front() {
                    shell.eject(agent, 0, ctx)?;
                }
            }
            GateMode::All => {
                let drained: Vec<AgentId> = self.waiting.drain(..).collect();
                for agent in drained {
                    shell.eject(agent, 0, ctx)?;
                }
            }
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
