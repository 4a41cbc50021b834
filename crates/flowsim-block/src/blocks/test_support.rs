//! Shared scaffolding for block `take`/`tick` contract tests — assembles a
//! `TickCtx` the same way `Simulator` does, without pulling in `flowsim-sim`.

use std::collections::HashMap;

use flowsim_agent::{Agent, AgentArena};
use flowsim_core::{AgentId, BlockId, PoolId, SimRng, Slab, Tick};
use flowsim_resource::ResourcePool;
use flowsim_spatial::SpatialManager;

use crate::behavior::BlockBehavior;
use crate::block::Block;
use crate::blocks::sink::Sink;
use crate::context::{DelayPort, TickCtx};
use crate::error::BlockResult;

/// Records every `schedule_ejection` call instead of actually scheduling
/// one — `Delay`'s own tests fire the recorded ejection manually instead of
/// pulling in `flowsim-sim`'s `TimedScheduler`.
#[derive(Default)]
pub struct RecordingDelayPort {
    pub scheduled: Vec<(u64, AgentId, BlockId, BlockId)>,
}

impl DelayPort for RecordingDelayPort {
    fn schedule_ejection(&mut self, delay_ticks: u64, agent: AgentId, from: BlockId, target: BlockId) -> BlockResult<()> {
        self.scheduled.push((delay_ticks, agent, from, target));
        Ok(())
    }
}

pub struct Harness {
    pub tick: Tick,
    pub rng: SimRng,
    pub agents: AgentArena,
    pub blocks: Slab<Block, BlockId>,
    pub resources: Slab<ResourcePool, PoolId>,
    pub spaces: HashMap<String, Box<dyn SpatialManager>>,
    pub delay: RecordingDelayPort,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            tick: Tick(0),
            rng: SimRng::new(1),
            agents: AgentArena::new(),
            blocks: Slab::new(),
            resources: Slab::new(),
            spaces: HashMap::new(),
            delay: RecordingDelayPort::default(),
        }
    }

    pub fn add(&mut self, kind: Box<dyn BlockBehavior>, num_slots: usize) -> BlockId {
        let id = self.blocks.insert(Block::new(kind, num_slots));
        self.blocks.get_mut(id).unwrap().set_id(id);
        id
    }

    pub fn add_sink(&mut self) -> BlockId {
        self.add(Box::new(Sink::new()), 1)
    }

    pub fn connect(&mut self, from: BlockId, slot: usize, to: BlockId) {
        self.blocks.get_mut(from).unwrap().connect(slot, to);
    }

    pub fn add_pool(&mut self, name: impl Into<String>, kind: impl Into<String>, count: usize) -> PoolId {
        let mut pool = ResourcePool::new(name, kind);
        pool.add_resources(count);
        self.resources.insert(pool)
    }

    pub fn add_space(&mut self, name: impl Into<String>, space: Box<dyn SpatialManager>) {
        self.spaces.insert(name.into(), space);
    }

    pub fn spawn(&mut self) -> AgentId {
        self.agents.spawn(Agent::new())
    }

    fn ctx(&mut self) -> TickCtx<'_> {
        TickCtx {
            tick: self.tick,
            rng: &mut self.rng,
            agents: &mut self.agents,
            blocks: &mut self.blocks,
            resources: &mut self.resources,
            spaces: &mut self.spaces,
            delay: &mut self.delay,
        }
    }

    /// Routes `agent` directly into `target`, as if ejected there by
    /// whatever currently holds it — mirrors `Simulator::dispatch_agent`.
    pub fn dispatch(&mut self, target: BlockId, agent: AgentId) -> BlockResult<()> {
        let mut ctx = self.ctx();
        ctx.dispatch(target, agent, 0)
    }

    /// Same as [`dispatch`](Self::dispatch) but through a specific input
    /// slot, for blocks (`Combine`) whose `take` routes by slot identity.
    pub fn dispatch_slot(&mut self, target: BlockId, agent: AgentId, slot: usize) -> BlockResult<()> {
        let mut ctx = self.ctx();
        ctx.dispatch(target, agent, slot)
    }

    pub fn tick(&mut self, id: BlockId) -> BlockResult<()> {
        let mut ctx = self.ctx();
        let mut block = ctx.blocks.take(id).unwrap();
        let result = block.tick(&mut ctx);
        ctx.blocks.put_back(id, block);
        result
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        self.blocks.get_mut(id).unwrap()
    }

    pub fn sink_count(&self, id: BlockId) -> u64 {
        self.blocks.get(id).unwrap().kind_as::<Sink>().unwrap().count()
    }
}
