//! The `SpatialManager` contract every spatial implementation satisfies.
//!
//! Grounded on the reference implementation's `SpaceManager` protocol
//! (`register`/`unregister`/`update`/`get_state`/`is_movement_complete`).
//! Rather than returning a copy of a string-keyed state dict the way the
//! Python `get_state` does, every implementation here writes its result
//! directly onto `Agent::space_state` as part of `update`, so block logic
//! reads `agent.space_state` instead of calling back into the manager.

use flowsim_agent::AgentArena;
use flowsim_core::{AgentId, Point3};

use crate::error::SpatialResult;

/// Parameters an agent is registered with. Every field mirrors a key the
/// Python `initial_state` dict expects, but typed instead of stringly keyed.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub start: Point3,
    pub target: Point3,
    pub speed: f32,
    /// A pre-supplied path of waypoints. If `None`, the manager computes one
    /// (direct line, A*, or entity-graph shortest path, depending on impl).
    pub path: Option<Vec<Point3>>,
}

impl RegisterRequest {
    pub fn new(start: Point3, target: Point3, speed: f32) -> Self {
        Self { start, target, speed, path: None }
    }

    pub fn with_path(mut self, path: Vec<Point3>) -> Self {
        self.path = Some(path);
        self
    }
}

/// A pluggable spatial movement model.
///
/// `dt-sim`'s tick loop calls `update` once per tick for every registered
/// space, after timed events fire and before blocks run their own tick
/// logic — mirroring the reference implementation's `Simulator.tick()`
/// ordering (spatial advancement happens before block logic reads the
/// result).
pub trait SpatialManager {
    /// Registers `agent` with this space. Fails validation (non-positive
    /// speed, start/target inside an obstacle, unknown entity) without
    /// mutating anything.
    fn register(&mut self, agent: AgentId, request: RegisterRequest, agents: &mut AgentArena) -> SpatialResult<()>;

    /// Unregisters `agent`. Returns `false` if it was not registered.
    fn unregister(&mut self, agent: AgentId, agents: &mut AgentArena) -> bool;

    /// Advances every registered agent by one tick and writes the result
    /// onto each agent's `space_state`. Fails with
    /// [`SpatialError::InvariantViolation`] if an implementation detects its
    /// own movement put an agent somewhere the space considers impossible
    /// (e.g. off the walkable grid).
    fn update(&mut self, delta_time: f32, agents: &mut AgentArena) -> SpatialResult<()>;

    fn is_movement_complete(&self, agent: AgentId, agents: &AgentArena) -> bool {
        agents.get(agent).is_some_and(|a| a.space_state.progress >= 1.0)
    }

    fn is_registered(&self, agent: AgentId) -> bool;
}
