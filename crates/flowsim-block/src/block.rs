//! `Block` — the common wrapper every block primitive shares.
//!
//! Split into a [`BlockShell`] (output slots, `on_enter`/`on_exit` hooks —
//! the state generic to every block) and a `Box<dyn BlockBehavior>` (the
//! kind-specific logic). The split lets a behavior's `take`/`tick` borrow
//! the shell mutably (to `eject`) while the behavior itself is also
//! borrowed mutably — two disjoint fields of `Block`, not one aliased
//! borrow of it.

use std::any::Any;

use flowsim_core::{AgentId, BlockId, SlotId};

use crate::behavior::BlockBehavior;
use crate::context::TickCtx;
use crate::error::{BlockError, BlockResult};

pub struct BlockShell {
    pub id: BlockId,
    outputs: Vec<Option<BlockId>>,
    on_enter: Option<Box<dyn FnMut(AgentId, &mut TickCtx) + Send>>,
    on_exit: Option<Box<dyn FnMut(AgentId, &mut TickCtx) + Send>>,
}

impl BlockShell {
    fn new(num_slots: usize) -> Self {
        Self { id: BlockId::from_raw(0, 0), outputs: vec![None; num_slots.max(1)], on_enter: None, on_exit: None }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn connect(&mut self, slot: usize, target: BlockId) {
        if slot >= self.outputs.len() {
            self.outputs.resize(slot + 1, None);
        }
        self.outputs[slot] = Some(target);
    }

    pub fn slot(&self, index: usize) -> BlockResult<BlockId> {
        self.outputs
            .get(index)
            .copied()
            .flatten()
            .ok_or_else(|| BlockError::MissingRoute { block: self.id, slot: index.to_string() })
    }

    pub fn slot_opt(&self, index: usize) -> Option<BlockId> {
        self.outputs.get(index).copied().flatten()
    }

    /// Runs `on_exit` (if any), then dispatches `agent` to the block
    /// connected at `slot`. Fails with `MissingRoute` if nothing is
    /// connected there. The target block's `take` sees this same `slot`
    /// number, so a sender that needs to reach a specific named input on
    /// the receiver (e.g. `Combine`'s container vs. pickup ports) picks the
    /// output slot accordingly.
    pub fn eject(&mut self, agent: AgentId, slot: usize, ctx: &mut TickCtx) -> BlockResult<()> {
        let target = self.slot(slot)?;
        self.eject_to(agent, target, slot, ctx)
    }

    /// Same as [`eject`](Self::eject) but with an already-resolved target,
    /// for blocks (Switch, RestrictedAreaEnd) that route by something other
    /// than a numbered slot.
    pub fn eject_to(&mut self, agent: AgentId, target: BlockId, slot: usize, ctx: &mut TickCtx) -> BlockResult<()> {
        if let Some(hook) = self.on_exit.as_mut() {
            hook(agent, ctx);
        }
        ctx.dispatch(target, agent, slot)
    }
}

pub struct Block {
    shell: BlockShell,
    kind: Box<dyn BlockBehavior>,
}

impl Block {
    pub fn new(kind: Box<dyn BlockBehavior>, num_slots: usize) -> Self {
        Self { shell: BlockShell::new(num_slots), kind }
    }

    pub fn with_hooks(
        kind: Box<dyn BlockBehavior>,
        num_slots: usize,
        on_enter: Option<Box<dyn FnMut(AgentId, &mut TickCtx) + Send>>,
        on_exit: Option<Box<dyn FnMut(AgentId, &mut TickCtx) + Send>>,
    ) -> Self {
        let mut shell = BlockShell::new(num_slots);
        shell.on_enter = on_enter;
        shell.on_exit = on_exit;
        Self { shell, kind }
    }

    /// Back-fills the id a `Slab<Block, BlockId>` just handed out. Callers
    /// insert first (the id doesn't exist until then), then call this once
    /// before the block is used.
    pub fn set_id(&mut self, id: BlockId) {
        self.shell.id = id;
    }

    pub fn id(&self) -> BlockId {
        self.shell.id
    }

    pub fn connect(&mut self, slot: usize, target: BlockId) {
        self.shell.connect(slot, target);
    }

    pub fn output(&self, slot: usize) -> Option<BlockId> {
        self.shell.slot_opt(slot)
    }

    pub fn kind(&self) -> &dyn Any {
        self.kind.as_any()
    }

    pub fn kind_as<T: 'static>(&self) -> Option<&T> {
        self.kind.as_any().downcast_ref()
    }

    pub fn kind_as_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.kind.as_any_mut().downcast_mut()
    }

    /// Admits `agent`: records `current_block`, runs `on_enter`, then
    /// delegates to the behavior's `take`. The one entry point every
    /// downstream `eject`/`dispatch` call resolves to. `slot` is the output
    /// slot the sender ejected through (see `BlockShell::eject`).
    pub fn take_agent(&mut self, agent: AgentId, slot: usize, ctx: &mut TickCtx) -> BlockResult<()> {
        let previous = ctx.agents.get(agent).and_then(|a| a.current_block);
        if let Some(a) = ctx.agents.get_mut(agent) {
            a.current_block = Some(self.shell.id);
        }
        if let Some(hook) = self.shell.on_enter.as_mut() {
            hook(agent, ctx);
        }
        self.kind.take(agent, previous, slot, &mut self.shell, ctx)
    }

    pub fn tick(&mut self, ctx: &mut TickCtx) -> BlockResult<()> {
        self.kind.tick(&mut self.shell, ctx)
    }
}
