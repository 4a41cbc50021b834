//! `Combine` — attaches pickups to a held container until it's full.

use std::any::Any;
use std::collections::VecDeque;

use flowsim_core::{AgentId, BlockId};

use crate::behavior::BlockBehavior;
use crate::block::BlockShell;
use crate::blocks::queue::Queue;
use crate::context::TickCtx;
use crate::error::{BlockError, BlockResult};

/// Input slot indices. A sender must `eject`/`eject_to` using the matching
/// value to reach the right port — anything else is rejected by `take`.
pub const CONTAINER_SLOT: usize = 0;
pub const PICKUP_SLOT: usize = 1;

/// Children currently attached to a held container, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct ChildrenAgents(pub Vec<AgentId>);

pub struct Combine {
    max_pickups: usize,
    container: Option<AgentId>,
    pickups: VecDeque<AgentId>,
}

impl Combine {
    pub fn new(max_pickups: usize) -> Self {
        Self { max_pickups, container: None, pickups: VecDeque::new() }
    }

    fn attach(&mut self, container: AgentId, pickup: AgentId, ctx: &mut TickCtx) {
        ctx.agents.register_component::<ChildrenAgents>();
        if let Some(children) = ctx.agents.component_mut::<ChildrenAgents>(container) {
            children.0.push(pickup);
        }
    }

    fn child_count(&self, ctx: &TickCtx, container: AgentId) -> usize {
        ctx.agents.component::<ChildrenAgents>(container).map(|c| c.0.len()).unwrap_or(0)
    }
}

impl BlockBehavior for Combine {
    fn take(&mut self, agent: AgentId, previous_block: Option<BlockId>, slot: usize, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        let upstream_is_queue = previous_block.is_some_and(|b| ctx.is_kind::<Queue>(b));

        match slot {
            CONTAINER_SLOT => {
                if !upstream_is_queue {
                    return Err(BlockError::CapacityViolation { block: shell.id(), reason: "Combine container input requires an upstream Queue".into() });
                }
                if self.container.is_some() {
                    return Err(BlockError::CapacityViolation { block: shell.id(), reason: "Combine is already holding a container".into() });
                }
                self.container = Some(agent);
                ctx.agents.register_component::<ChildrenAgents>();
                ctx.agents.set_component(agent, ChildrenAgents::default());
                while let Some(pickup) = self.pickups.pop_front() {
                    self.attach(agent, pickup, ctx);
                    if self.child_count(ctx, agent) >= self.max_pickups {
                        break;
                    }
                }
                if self.child_count(ctx, agent) >= self.max_pickups {
                    let container = self.container.take().unwrap();
                    return shell.eject(container, CONTAINER_SLOT, ctx);
                }
                Ok(())
            }
            PICKUP_SLOT => {
                if !upstream_is_queue {
                    return Err(BlockError::CapacityViolation { block: shell.id(), reason: "Combine pickup input requires an upstream Queue".into() });
                }
                match self.container {
                    Some(container) => {
                        self.attach(container, agent, ctx);
                        if self.child_count(ctx, container) >= self.max_pickups {
                            self.container = None;
                            shell.eject(container, CONTAINER_SLOT, ctx)?;
                        }
                    }
                    None => {
                        if self.pickups.len() >= self.max_pickups {
                            return Err(BlockError::CapacityViolation { block: shell.id(), reason: "Combine pickup queue is full".into() });
                        }
                        self.pickups.push_back(agent);
                    }
                }
                Ok(())
            }
            other => Err(BlockError::InvalidArgument(format!("Combine has no input slot {other}"))),
        }
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
    use crate::blocks::test_support::Harness;

    /// Marks `agent` as having arrived from a `Queue`, the way a real
    /// pipeline would after routing through one, without wiring up a full
    /// queue-to-combine connection for every slot under test.
    fn arrive_from_queue(h: &mut Harness, queue: BlockId, agent: AgentId) {
        h.agents.get_mut(agent).unwrap().current_block = Some(queue);
    }

    #[test]
    fn pickup_arriving_before_any_container_is_queued_not_misread_as_a_container() {
        let mut h = Harness::new();
        let queue = h.add(Box::new(Queue::new()), 1);
        let combine = h.add(Box::new(Combine::new(1)), 2);
        let sink = h.add_sink();
        h.connect(combine, CONTAINER_SLOT, sink);

        let pickup = h.spawn();
        arrive_from_queue(&mut h, queue, pickup);
        h.dispatch_slot(combine, pickup, PICKUP_SLOT).unwrap();
        assert_eq!(h.sink_count(sink), 0, "no container has arrived, nothing should eject yet");

        let container = h.spawn();
        arrive_from_queue(&mut h, queue, container);
        h.dispatch_slot(combine, container, CONTAINER_SLOT).unwrap();

        assert_eq!(h.sink_count(sink), 1, "the queued pickup fills the container to capacity, ejecting it immediately");
    }

    #[test]
    fn rejects_a_second_container_while_one_is_held() {
        let mut h = Harness::new();
        let queue = h.add(Box::new(Queue::new()), 1);
        let combine = h.add(Box::new(Combine::new(2)), 2);
        let sink = h.add_sink();
        h.connect(combine, CONTAINER_SLOT, sink);

        let first = h.spawn();
        arrive_from_queue(&mut h, queue, first);
        h.dispatch_slot(combine, first, CONTAINER_SLOT).unwrap();

        let second = h.spawn();
        arrive_from_queue(&mut h, queue, second);
        let err = h.dispatch_slot(combine, second, CONTAINER_SLOT).unwrap_err();
        assert!(matches!(err, BlockError::CapacityViolation { .. }));
        assert_eq!(h.sink_count(sink), 0);
    }

    #[test]
    fn rejects_pickups_past_max_pickups_while_no_container_is_held() {
        let mut h = Harness::new();
        let queue = h.add(Box::new(Queue::new()), 1);
        let combine = h.add(Box::new(Combine::new(1)), 2);
        h.add_sink();

        let first = h.spawn();
        arrive_from_queue(&mut h, queue, first);
        h.dispatch_slot(combine, first, PICKUP_SLOT).unwrap();

        let second = h.spawn();
        arrive_from_queue(&mut h, queue, second);
        let err = h.dispatch_slot(combine, second, PICKUP_SLOT).unwrap_err();
        assert!(matches!(err, BlockError::CapacityViolation { .. }));
    }

    #[test]
    fn rejects_arrival_without_an_upstream_queue() {
        let mut h = Harness::new();
        let combine = h.add(Box::new(Combine::new(1)), 2);
        let agent = h.spawn();
        let err = h.dispatch_slot(combine, agent, CONTAINER_SLOT).unwrap_err();
        assert!(matches!(err, BlockError::CapacityViolation { .. }));
    }

    #[test]
    fn rejects_an_unknown_input_slot() {
        let mut h = Harness::new();
        let queue = h.add(Box::new(Queue::new()), 1);
        let combine = h.add(Box::new(Combine::new(1)), 2);
        let agent = h.spawn();
        arrive_from_queue(&mut h, queue, agent);
        let err = h.dispatch_slot(combine, agent, 2).unwrap_err();
        assert!(matches!(err, BlockError::InvalidArgument(_)));
    }
}
