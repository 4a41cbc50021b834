//! Spatial entry block — registers an agent with a named spatial manager
//! and holds it until the manager reports the movement complete.

use std::any::Any;
use std::collections::VecDeque;

use flowsim_core::{AgentId, BlockId, Point3};
use flowsim_spatial::RegisterRequest;

use crate::behavior::BlockBehavior;
use crate::block::BlockShell;
use crate::context::TickCtx;
use crate::error::{BlockError, BlockResult};

pub struct SpatialEntry {
    space_name: String,
    start: Point3,
    target: Point3,
    speed: f32,
    path: Option<Vec<Point3>>,
    /// When set, at most one admission happens per tick (reset in `tick`).
    single_entry: bool,
    admitted_this_tick: bool,
    holding: VecDeque<AgentId>,
}

impl SpatialEntry {
    pub fn new(space_name: impl Into<String>, start: Point3, target: Point3, speed: f32, single_entry: bool) -> Self {
        Self { space_name: space_name.into(), start, target, speed, path: None, single_entry, admitted_this_tick: false, holding: VecDeque::new() }
    }

    pub fn with_path(mut self, path: Vec<Point3>) -> Self {
        self.path = Some(path);
        self
    }
}

impl BlockBehavior for SpatialEntry {
    fn take(&mut self, agent: AgentId, _previous_block: Option<BlockId>, _slot: usize, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        if self.single_entry && self.admitted_this_tick {
            return Err(BlockError::NotAdmissible { agent, block: shell.id(), reason: "single-entry gate already admitted this tick".into() });
        }
        let mut request = RegisterRequest::new(self.start, self.target, self.speed);
        if let Some(path) = self.path.clone() {
            request = request.with_path(path);
        }
        // Disjoint field access (not `ctx.space_mut`) so `ctx.agents` stays
        // free to pass into `register` alongside the borrowed space.
        let space = ctx
            .spaces
            .get_mut(&self.space_name)
            .ok_or_else(|| BlockError::InvalidArgument(format!("unknown space {:?}", self.space_name)))?;
        space
            .register(agent, request, ctx.agents)
            .map_err(|e| BlockError::NotAdmissible { agent, block: shell.id(), reason: e.to_string() })?;
        self.admitted_this_tick = true;
        self.holding.push_back(agent);
        Ok(())
    }

    fn tick(&mut self, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        self.admitted_this_tick = false;
        let space_name = self.space_name.clone();
        let mut still_holding = VecDeque::new();
        while let Some(agent) = self.holding.pop_front() {
            let complete = ctx.space(&space_name).is_some_and(|space| space.is_movement_complete(agent, ctx.agents));
            if complete {
                shell.eject(agent, 0, ctx)?;
            } else {
                still_holding.push_back(agent);
            }
        }
        self.holding = still_holding;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
