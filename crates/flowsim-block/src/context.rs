//! The mutable per-tick context every block operation runs inside.
//!
//! Unlike the teacher's read-only `SimContext` (built once per tick and
//! shared immutably across a parallel intent phase), block logic here
//! mutates agents, routes agents into other blocks, seizes resources, and
//! steps spatial managers — the tick loop in this engine is sequential, not
//! fanned out over Rayon, so there's no data race to guard against and
//! `TickCtx` is simply the bundle of `&mut` borrows a block needs for one
//! call. It is assembled fresh by `Simulator` for each block invocation.

use std::collections::HashMap;

use flowsim_agent::AgentArena;
use flowsim_core::{AgentId, BlockId, PoolId, SimRng, Slab, Tick};
use flowsim_resource::ResourcePool;
use flowsim_spatial::SpatialManager;

use crate::block::Block;
use crate::error::{BlockError, BlockResult};

/// Lets a block (namely `Delay`) schedule a future ejection without
/// `flowsim-block` depending on `flowsim-schedule` or `flowsim-sim`
/// directly — `Simulator` is the only implementer, threading the call
/// through to its own `TimedScheduler`.
pub trait DelayPort {
    /// Schedules `agent` to be ejected to `target` after `delay_ticks` ticks.
    /// `delay_ticks == 0` fires in the current tick's bucket (immediate
    /// same-tick ejection, per `Delay`'s contract). `from` is the `Delay`
    /// block itself, so the fired callback can clear its inspection table.
    fn schedule_ejection(&mut self, delay_ticks: u64, agent: AgentId, from: BlockId, target: BlockId) -> BlockResult<()>;
}

pub struct TickCtx<'a> {
    pub tick: Tick,
    pub rng: &'a mut SimRng,
    pub agents: &'a mut AgentArena,
    pub blocks: &'a mut Slab<Block, BlockId>,
    pub resources: &'a mut Slab<ResourcePool, PoolId>,
    pub spaces: &'a mut HashMap<String, Box<dyn SpatialManager>>,
    pub delay: &'a mut dyn DelayPort,
}

impl<'a> TickCtx<'a> {
    /// Routes `agent` into `target` by calling its `take`. This is the only
    /// way one block's logic pushes an agent into another — `target` is
    /// detached from the block arena for the duration of the call so the
    /// borrow checker never sees two live `&mut Block`s for the same slot,
    /// then restored into the exact same slot (same id, same generation).
    /// `slot` is the sender's output slot, forwarded to `target`'s `take` so
    /// a multi-port receiver can tell which input `agent` arrived on.
    pub fn dispatch(&mut self, target: BlockId, agent: AgentId, slot: usize) -> BlockResult<()> {
        let mut block = self.blocks.take(target).ok_or(BlockError::MissingRoute { block: target, slot: "<detached>".into() })?;
        let result = block.take_agent(agent, slot, self);
        self.blocks.put_back(target, block);
        result
    }

    pub fn resource_pool(&self, pool: PoolId) -> Option<&ResourcePool> {
        self.resources.get(pool)
    }

    pub fn resource_pool_mut(&mut self, pool: PoolId) -> Option<&mut ResourcePool> {
        self.resources.get_mut(pool)
    }

    pub fn space(&self, name: &str) -> Option<&dyn SpatialManager> {
        self.spaces.get(name).map(|b| b.as_ref())
    }

    pub fn space_mut(&mut self, name: &str) -> Option<&mut (dyn SpatialManager + 'static)> {
        self.spaces.get_mut(name).map(|b| b.as_mut())
    }

    /// True if `block` is currently registered and its behavior downcasts to
    /// `T`. Used by blocks whose admission contract requires a specific
    /// upstream kind (Gate, RestrictedAreaStart, Combine, Split all require
    /// a `Queue` immediately upstream).
    pub fn is_kind<T: 'static>(&self, block: BlockId) -> bool {
        self.blocks.get(block).is_some_and(|b| b.kind_as::<T>().is_some())
    }
}
