//! `NoCollisionSpace` — straight-line movement, no obstacles.
//!
//! Grounded directly on the reference implementation's
//! `NoCollisionSpace.update`: agents move toward their target at constant
//! speed with no pathfinding and no collision checks whatsoever.

use std::collections::HashSet;

use flowsim_agent::AgentArena;
use flowsim_core::AgentId;

use crate::error::{SpatialError, SpatialResult};
use crate::manager::{RegisterRequest, SpatialManager};
use crate::movement::{accumulate_progress, step_toward};

#[derive(Default)]
pub struct NoCollisionSpace {
    order: Vec<AgentId>,
    registered: HashSet<AgentId>,
}

impl NoCollisionSpace {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialManager for NoCollisionSpace {
    fn register(&mut self, agent: AgentId, request: RegisterRequest, agents: &mut AgentArena) -> SpatialResult<()> {
        if request.speed <= 0.0 {
            return Err(SpatialError::InvalidRegistration("speed must be positive".into()));
        }
        if self.registered.contains(&agent) {
            return Err(SpatialError::AlreadyRegistered(agent));
        }
        if let Some(a) = agents.get_mut(agent) {
            a.space_state.position = Some(request.start);
            a.space_state.target = Some(request.target);
            a.space_state.speed = request.speed;
            a.space_state.progress = 0.0;
            a.space_state.path.clear();
        }
        self.registered.insert(agent);
        self.order.push(agent);
        Ok(())
    }

    fn unregister(&mut self, agent: AgentId, agents: &mut AgentArena) -> bool {
        if !self.registered.remove(&agent) {
            return false;
        }
        self.order.retain(|&id| id != agent);
        if let Some(a) = agents.get_mut(agent) {
            a.space_state = Default::default();
        }
        true
    }

    fn update(&mut self, delta_time: f32, agents: &mut AgentArena) -> SpatialResult<()> {
        for &id in &self.order {
            let Some(agent) = agents.get_mut(id) else { continue };
            let state = &mut agent.space_state;
            if state.progress >= 1.0 {
                continue;
            }
            let (Some(position), Some(target)) = (state.position, state.target) else { continue };
            let remaining = position.distance(target);
            let step = step_toward(position, target, state.speed, delta_time);
            if step.reached_waypoint {
                state.position = Some(step.position);
                state.progress = 1.0;
            } else {
                let moved = position.distance(step.position);
                state.progress = accumulate_progress(state.progress, remaining, moved);
                state.position = Some(step.position);
            }
        }
        Ok(())
    }

    fn is_registered(&self, agent: AgentId) -> bool {
        self.registered.contains(&agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsim_agent::Agent;
    use flowsim_core::Point3;

    #[test]
    fn registration_rejects_nonpositive_speed() {
        let mut space = NoCollisionSpace::new();
        let mut agents = AgentArena::new();
        let id = agents.spawn(Agent::new());
        let err = space
            .register(id, RegisterRequest::new(Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0), 0.0), &mut agents)
            .unwrap_err();
        assert!(matches!(err, SpatialError::InvalidRegistration(_)));
    }

    #[test]
    fn agent_reaches_target_over_several_ticks() {
        let mut space = NoCollisionSpace::new();
        let mut agents = AgentArena::new();
        let id = agents.spawn(Agent::new());
        space.register(id, RegisterRequest::new(Point3::ORIGIN, Point3::new(10.0, 0.0, 0.0), 2.0), &mut agents).unwrap();

        for _ in 0..4 {
            space.update(1.0, &mut agents).unwrap();
        }
        assert!(!space.is_movement_complete(id, &agents));
        space.update(1.0, &mut agents).unwrap();
        space.update(1.0, &mut agents).unwrap();
        assert!(space.is_movement_complete(id, &agents));
        assert_eq!(agents.get(id).unwrap().space_state.position, Some(Point3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn unregister_clears_space_state() {
        let mut space = NoCollisionSpace::new();
        let mut agents = AgentArena::new();
        let id = agents.spawn(Agent::new());
        space.register(id, RegisterRequest::new(Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0), 1.0), &mut agents).unwrap();
        assert!(space.unregister(id, &mut agents));
        assert!(!agents.get(id).unwrap().space_state.is_registered());
        assert!(!space.is_registered(id));
    }
}
