//! `RestrictedAreaStart` / `RestrictedAreaEnd` — paired occupancy cap.
//!
//! `current_inside` lives on `Start`; `End` decrements it by reading a
//! per-agent tag set at admission time rather than a raw string key, per
//! the ban on key/value attribute bags (see `ResourceClaim` in
//! `seize_release.rs` for the same pattern applied to resources).

use std::any::Any;
use std::collections::VecDeque;

use flowsim_agent::AgentArena;
use flowsim_core::{AgentId, BlockId};

use crate::behavior::BlockBehavior;
use crate::block::BlockShell;
use crate::blocks::queue::Queue;
use crate::context::TickCtx;
use crate::error::{BlockError, BlockResult};

/// Tag attached to an agent admitted into a restricted area, naming the
/// `RestrictedAreaStart` it must report back to on exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestrictedAreaTag(pub Option<BlockId>);

pub struct RestrictedAreaStart {
    limit: usize,
    current_inside: usize,
    waiting: VecDeque<AgentId>,
}

impl RestrictedAreaStart {
    pub fn new(limit: usize) -> Self {
        Self { limit, current_inside: 0, waiting: VecDeque::new() }
    }

    pub fn active_agents(&self) -> usize {
        self.current_inside
    }

    fn release_one(&mut self) {
        self.current_inside = self.current_inside.saturating_sub(1);
    }
}

impl BlockBehavior for RestrictedAreaStart {
    fn take(&mut self, agent: AgentId, previous_block: Option<BlockId>, _slot: usize, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        let upstream_is_queue = previous_block.is_some_and(|b| ctx.is_kind::<Queue>(b));
        if !upstream_is_queue {
            return Err(BlockError::NotAdmissible { agent, block: shell.id(), reason: "RestrictedAreaStart requires an upstream Queue".into() });
        }
        self.waiting.push_back(agent);
        Ok(())
    }

    fn tick(&mut self, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        let id = shell.id();
        while self.current_inside < self.limit {
            let Some(agent) = self.waiting.pop_front() else { break };
            ctx.agents.register_component::<RestrictedAreaTag>();
            ctx.agents.set_component(agent, RestrictedAreaTag(Some(id)));
            self.current_inside += 1;
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

pub struct RestrictedAreaEnd;

impl RestrictedAreaEnd {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RestrictedAreaEnd {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockBehavior for RestrictedAreaEnd {
    fn take(&mut self, agent: AgentId, _previous_block: Option<BlockId>, _slot: usize, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        let start_id = agent_start_tag(ctx.agents, agent);
        if let Some(start_id) = start_id {
            ctx.agents.set_component(agent, RestrictedAreaTag(None));
            if let Some(mut start_block) = ctx.blocks.take(start_id) {
                if let Some(start) = start_block.kind_as_mut::<RestrictedAreaStart>() {
                    start.release_one();
                }
                ctx.blocks.put_back(start_id, start_block);
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

fn agent_start_tag(agents: &AgentArena, agent: AgentId) -> Option<BlockId> {
    agents.component::<RestrictedAreaTag>(agent).and_then(|tag| tag.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::queue::Queue;
    use crate::blocks::test_support::Harness;

    #[test]
    fn caps_concurrent_occupancy_and_releases_on_exit() {
        // queue_in -> start -> queue_inside -> end -> sink. `queue_inside`
        // stands in for however long an agent actually spends inside the
        // restricted area, so the test controls exactly when it leaves.
        let mut h = Harness::new();
        let queue_in = h.add(Box::new(Queue::new()), 1);
        let start = h.add(Box::new(RestrictedAreaStart::new(1)), 1);
        let queue_inside = h.add(Box::new(Queue::new()), 1);
        let end = h.add(Box::new(RestrictedAreaEnd::new()), 1);
        let sink = h.add_sink();
        h.connect(queue_in, 0, start);
        h.connect(start, 0, queue_inside);
        h.connect(queue_inside, 0, end);
        h.connect(end, 0, sink);

        let a = h.spawn();
        let b = h.spawn();
        h.dispatch(queue_in, a).unwrap();
        h.tick(queue_in).unwrap();
        h.dispatch(queue_in, b).unwrap();
        h.tick(queue_in).unwrap();

        h.tick(start).unwrap();
        assert_eq!(h.block_mut(start).kind_as::<RestrictedAreaStart>().unwrap().active_agents(), 1);
        assert_eq!(h.sink_count(sink), 0);

        h.tick(start).unwrap();
        assert_eq!(h.block_mut(start).kind_as::<RestrictedAreaStart>().unwrap().active_agents(), 1, "b must wait, limit already reached");

        h.tick(queue_inside).unwrap();
        assert_eq!(h.block_mut(start).kind_as::<RestrictedAreaStart>().unwrap().active_agents(), 0, "a's exit releases the slot");
        assert_eq!(h.sink_count(sink), 1);

        h.tick(start).unwrap();
        assert_eq!(h.block_mut(start).kind_as::<RestrictedAreaStart>().unwrap().active_agents(), 1, "b is admitted now that a slot is free");

        h.tick(queue_inside).unwrap();
        assert_eq!(h.sink_count(sink), 2);
    }
}
