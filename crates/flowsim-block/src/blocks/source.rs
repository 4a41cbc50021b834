//! `Source` — spawns agents on a schedule, never accepts incoming ones.

use std::any::Any;

use flowsim_agent::Agent;
use flowsim_core::{AgentId, BlockId, Tick};

use crate::behavior::BlockBehavior;
use crate::block::BlockShell;
use crate::context::TickCtx;
use crate::error::{BlockError, BlockResult};

pub struct Source {
    spawn_schedule: Box<dyn FnMut(Tick) -> u32 + Send>,
    factory: Box<dyn FnMut() -> Agent + Send>,
}

impl Source {
    pub fn new(spawn_schedule: impl FnMut(Tick) -> u32 + Send + 'static, factory: impl FnMut() -> Agent + Send + 'static) -> Self {
        Self { spawn_schedule: Box::new(spawn_schedule), factory: Box::new(factory) }
    }
}

impl BlockBehavior for Source {
    fn take(&mut self, agent: AgentId, _previous_block: Option<BlockId>, _slot: usize, shell: &mut BlockShell, _ctx: &mut TickCtx) -> BlockResult<()> {
        Err(BlockError::NotAdmissible { agent, block: shell.id(), reason: "Source never accepts incoming agents".into() })
    }

    fn tick(&mut self, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        let count = (self.spawn_schedule)(ctx.tick);
        for _ in 0..count {
            let spawned = (self.factory)();
            let id = ctx.agents.spawn(spawned);
            shell.eject(id, 0, ctx)?;
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
    use crate::block::Block;
    use flowsim_agent::AgentArena;
    use flowsim_core::{SimRng, Slab};
    use flowsim_resource::ResourcePool;
    use std::collections::HashMap;

    struct NullDelay;
    impl crate::context::DelayPort for NullDelay {
        fn schedule_ejection(&mut self, _d: u64, _a: AgentId, _f: BlockId, _t: BlockId) -> BlockResult<()> {
            Ok(())
        }
    }

    #[test]
    fn spawns_agents_only_on_scheduled_ticks() {
        let mut blocks: Slab<Block, BlockId> = Slab::new();
        let sink_id = blocks.insert(Block::new(Box::new(super::super::sink::Sink::new()), 1));
        blocks.get_mut(sink_id).unwrap().set_id(sink_id);

        let source = Source::new(|tick: Tick| if tick == Tick(1) { 3 } else { 0 }, Agent::new);
        let mut source_block = Block::new(Box::new(source), 1);
        source_block.connect(0, sink_id);
        let source_id = blocks.insert(source_block);
        blocks.get_mut(source_id).unwrap().set_id(source_id);

        let mut agents = AgentArena::new();
        let mut rng = SimRng::new(1);
        let mut resources: Slab<ResourcePool, flowsim_core::PoolId> = Slab::new();
        let mut spaces = HashMap::new();
        let mut delay = NullDelay;

        for tick in 0..3u64 {
            let mut ctx = TickCtx {
                tick: Tick(tick),
                rng: &mut rng,
                agents: &mut agents,
                blocks: &mut blocks,
                resources: &mut resources,
                spaces: &mut spaces,
                delay: &mut delay,
            };
            let mut source_block = ctx.blocks.take(source_id).unwrap();
            source_block.tick(&mut ctx).unwrap();
            ctx.blocks.put_back(source_id, source_block);
        }

        let sink = blocks.get(sink_id).unwrap().kind_as::<super::super::sink::Sink>().unwrap();
        assert_eq!(sink.count(), 3);
    }
}
