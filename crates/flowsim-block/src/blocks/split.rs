//! `Split` — inverse of `Combine`: ejects children to slot 1, the emptied
//! container to slot 0.

use std::any::Any;

use flowsim_core::{AgentId, BlockId};

use crate::behavior::BlockBehavior;
use crate::block::BlockShell;
use crate::blocks::combine::ChildrenAgents;
use crate::context::TickCtx;
use crate::error::{BlockError, BlockResult};

pub const CONTAINER_OUT: usize = 0;
pub const CHILD_OUT: usize = 1;

#[derive(Default)]
pub struct Split;

impl Split {
    pub fn new() -> Self {
        Self
    }
}

impl BlockBehavior for Split {
    fn take(&mut self, agent: AgentId, _previous_block: Option<BlockId>, _slot: usize, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        let children = ctx
            .agents
            .component_mut::<ChildrenAgents>(agent)
            .map(|c| std::mem::take(&mut c.0))
            .ok_or_else(|| BlockError::InvalidArgument("Split requires an agent carrying children_agents".into()))?;

        for child in children {
            shell.eject(child, CHILD_OUT, ctx)?;
        }
        shell.eject(agent, CONTAINER_OUT, ctx)
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

    #[test]
    fn ejects_children_to_child_out_and_container_to_container_out() {
        let mut h = Harness::new();
        let split = h.add(Box::new(Split::new()), 2);
        let container_sink = h.add_sink();
        let child_sink = h.add_sink();
        h.connect(split, CONTAINER_OUT, container_sink);
        h.connect(split, CHILD_OUT, child_sink);

        let container = h.spawn();
        let child_a = h.spawn();
        let child_b = h.spawn();
        h.agents.register_component::<ChildrenAgents>();
        h.agents.set_component(container, ChildrenAgents(vec![child_a, child_b]));

        h.dispatch(split, container).unwrap();

        assert_eq!(h.sink_count(container_sink), 1);
        assert_eq!(h.sink_count(child_sink), 2);
    }

    #[test]
    fn rejects_an_agent_with_no_children_component() {
        let mut h = Harness::new();
        let split = h.add(Box::new(Split::new()), 2);
        h.add_sink();
        let agent = h.spawn();
        let err = h.dispatch(split, agent).unwrap_err();
        assert!(matches!(err, BlockError::InvalidArgument(_)));
    }
}
