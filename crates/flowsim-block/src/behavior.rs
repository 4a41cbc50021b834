//! The `BlockBehavior` trait — the extension point for block-specific logic.

use std::any::Any;

use flowsim_core::{AgentId, BlockId};

use crate::block::BlockShell;
use crate::context::TickCtx;
use crate::error::BlockResult;

/// Per-kind block logic. `Block` (see [`crate::block::Block`]) owns one of
/// these behind a `Box<dyn BlockBehavior>` plus a [`BlockShell`] (output
/// slots and `on_enter`/`on_exit` hooks) — the split exists so a behavior's
/// `take`/`tick` can reach the shell's `eject` helper without borrowing
/// `self` twice.
pub trait BlockBehavior: Send {
    /// Admits `agent`. Called by `Block::take_agent` after the shell has
    /// already recorded `agent.current_block` and run `on_enter`.
    /// `previous_block` is whatever `agent.current_block` held just before
    /// this call overwrote it — the only way a behavior can validate "my
    /// upstream must be a Queue" contracts after the fact. `slot` is the
    /// output slot the sender ejected through (the same number passed to
    /// `BlockShell::eject`/`eject_to`), letting a block with multiple named
    /// input ports (e.g. `Combine`'s container/pickup split) tell them apart
    /// instead of guessing from current state.
    fn take(&mut self, agent: AgentId, previous_block: Option<BlockId>, slot: usize, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()>;

    /// Per-tick hook. Most blocks that act only on `take` (Switch, Gate's
    /// admission side) leave this at its no-op default.
    fn tick(&mut self, _shell: &mut BlockShell, _ctx: &mut TickCtx) -> BlockResult<()> {
        Ok(())
    }

    /// Lets callers downcast to a concrete block kind for the
    /// introspection surface §6 requires (`Sink::count`, `Queue::size`, …).
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
