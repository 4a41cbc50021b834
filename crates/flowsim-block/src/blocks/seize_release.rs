//! `SeizeBlock` / `ReleaseBlock` — claim and return resources from a pool.
//!
//! The resources an agent is holding are a typed component
//! (`ResourceClaim`), not a string-keyed attribute bag — the same pattern
//! `RestrictedAreaTag` uses for the occupancy cap.

use std::any::Any;
use std::collections::VecDeque;

use flowsim_core::{AgentId, BlockId, PoolId, ResourceId};

use crate::behavior::BlockBehavior;
use crate::block::BlockShell;
use crate::context::TickCtx;
use crate::error::{BlockError, BlockResult};

#[derive(Debug, Clone, Default)]
pub struct ResourceClaim {
    pub pool: Option<PoolId>,
    pub resources: Vec<ResourceId>,
}

pub struct SeizeBlock {
    pool: PoolId,
    count: usize,
    /// When `true`, the agent is held one extra tick after seizing (models
    /// the time it takes resources to travel to a work site) instead of
    /// ejecting immediately.
    holds_for_travel: bool,
    holding: VecDeque<AgentId>,
}

impl SeizeBlock {
    pub fn new(pool: PoolId, count: usize, holds_for_travel: bool) -> Self {
        Self { pool, count, holds_for_travel, holding: VecDeque::new() }
    }
}

impl BlockBehavior for SeizeBlock {
    fn take(&mut self, agent: AgentId, _previous_block: Option<BlockId>, _slot: usize, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        let tick = ctx.tick;
        let pool = ctx
            .resource_pool_mut(self.pool)
            .ok_or_else(|| BlockError::InvalidArgument(format!("unknown resource pool {:?}", self.pool)))?;
        let resources = pool.seize(self.count, agent, tick).map_err(|e| BlockError::CapacityViolation { block: shell.id(), reason: e.to_string() })?;

        ctx.agents.register_component::<ResourceClaim>();
        ctx.agents.set_component(agent, ResourceClaim { pool: Some(self.pool), resources });

        if self.holds_for_travel {
            self.holding.push_back(agent);
            return Ok(());
        }
        shell.eject(agent, 0, ctx)
    }

    fn tick(&mut self, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        while let Some(agent) = self.holding.pop_front() {
            shell.eject(agent, 0, ctx)?;
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


pub struct ReleaseBlock;

impl ReleaseBlock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReleaseBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockBehavior for ReleaseBlock {
    fn take(&mut self, agent: AgentId, _previous_block: Option<BlockId>, _slot: usize, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        let claim = ctx.agents.component_mut::<ResourceClaim>(agent).map(|c| std::mem::take(c));
        if let Some(ResourceClaim { pool: Some(pool_id), resources }) = claim {
            if let Some(pool) = ctx.resource_pool_mut(pool_id) {
                pool.release(&resources);
            }
        }
        shell.eject(agent, 0, ctx)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod release_tests {
    use super::*;
    use crate::blocks::test_support::Harness;

    #[test]
    fn releases_the_claimed_resources_back_to_the_pool_and_ejects() {
        let mut h = Harness::new();
        let pool_id = h.add_pool("forklifts", "forklift", 1);
        let seize = h.add(Box::new(SeizeBlock::new(pool_id, 1, false)), 1);
        let release = h.add(Box::new(ReleaseBlock::new()), 1);
        let sink = h.add_sink();
        h.connect(seize, 0, release);
        h.connect(release, 0, sink);

        let agent = h.spawn();
        h.dispatch(seize, agent).unwrap();
        h.dispatch(release, agent).unwrap();

        assert_eq!(h.sink_count(sink), 1);
        assert!(h.agents.component::<ResourceClaim>(agent).unwrap().resources.is_empty(), "the claim is taken, not just read");

        // the pool's single resource must be available again
        let second = h.spawn();
        h.dispatch(seize, second).unwrap();
        assert_eq!(h.sink_count(sink), 2);
    }
}
