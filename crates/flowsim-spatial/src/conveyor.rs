//! `ConveyorSpace` — agents riding a graph of conveyors and turntables.
//!
//! Grounded on the reference implementation's `ConveyorSpace`: entities form
//! a graph via `connections`, the route between two entities is the
//! shortest-time path found by Dijkstra (`_find_shortest_path`), and an
//! agent advances along its current entity by elapsed-time fraction before
//! crossing to the next entity in the path. `_can_place_agent`'s collision
//! check — an occupant blocks placement if its progress window on the
//! conveyor overlaps the incoming agent's required clearance — is ported
//! directly as [`ConveyorSpace::can_place_agent`].
//!
//! Unlike the reference implementation, a missing path is a
//! [`SpatialError::NoRoute`] rather than a hard `sys.exit(1)` — letting the
//! caller decide how to handle an unreachable destination is the only
//! sensible behavior for a library.
//!
//! An agent's progress along its route doesn't fit the Cartesian
//! `SpaceState::position` the other spatial managers share — "where" an
//! agent is here is "how far along this entity, on this path", not a
//! point in space — so this manager keeps its own per-agent routing table
//! and only mirrors the overall path completion fraction onto
//! `space_state.progress`, which is all [`SpatialManager::is_movement_complete`]
//! needs.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use flowsim_agent::AgentArena;
use flowsim_core::{AgentId, EntityId, Slab};

use crate::error::{SpatialError, SpatialResult};

#[derive(Debug, Clone, Copy)]
pub enum EntityKind {
    Conveyor { length: f32, speed: f32 },
    TurnTable { angular_speed: f32 },
}

pub struct Entity {
    pub kind: EntityKind,
    pub connections: Vec<EntityId>,
}

struct AgentRoute {
    current_entity: EntityId,
    remaining_path: Vec<EntityId>,
    progress_on_entity: f32,
    elapsed_on_entity: f32,
    elapsed_total: f32,
    total_time: f32,
}

pub struct ConveyorSpace {
    entities: Slab<Entity, EntityId>,
    entity_agents: HashMap<EntityId, Vec<AgentId>>,
    routes: HashMap<AgentId, AgentRoute>,
}

impl ConveyorSpace {
    pub fn new() -> Self {
        Self { entities: Slab::new(), entity_agents: HashMap::new(), routes: HashMap::new() }
    }

    pub fn add_entity(&mut self, kind: EntityKind) -> EntityId {
        let id = self.entities.insert(Entity { kind, connections: Vec::new() });
        self.entity_agents.entry(id).or_default();
        id
    }

    /// Connects two entities bidirectionally. The reference implementation
    /// leaves `connections` to be wired up by whatever code assembles the
    /// network; a symmetric helper is the common case for conveyor layouts
    /// and is what every example network in the reference source actually
    /// builds.
    pub fn connect(&mut self, a: EntityId, b: EntityId) {
        if let Some(entity) = self.entities.get_mut(a) {
            entity.connections.push(b);
        }
        if let Some(entity) = self.entities.get_mut(b) {
            entity.connections.push(a);
        }
    }

    pub fn is_entity_registered(&self, entity: EntityId) -> bool {
        self.entities.contains(entity)
    }

    fn entity_time(&self, entity: EntityId) -> f32 {
        match self.entities.get(entity).map(|e| e.kind) {
            Some(EntityKind::Conveyor { length, speed }) if length > 0.0 && speed > 0.0 => length / speed,
            Some(EntityKind::TurnTable { angular_speed }) if angular_speed > 0.0 => std::f32::consts::TAU / angular_speed,
            Some(_) => f32::INFINITY,
            None => f32::INFINITY,
        }
    }

    fn shortest_path(&self, start: EntityId, end: EntityId) -> Option<Vec<EntityId>> {
        if start == end {
            return Some(vec![start]);
        }

        #[derive(PartialEq)]
        struct QueueItem {
            cost: f32,
            entity: EntityId,
        }
        impl Eq for QueueItem {}
        impl Ord for QueueItem {
            fn cmp(&self, other: &Self) -> Ordering {
                other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
            }
        }
        impl PartialOrd for QueueItem {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        let mut visited = std::collections::HashSet::new();
        let mut came_from: HashMap<EntityId, EntityId> = HashMap::new();
        let mut heap = BinaryHeap::new();
        heap.push(QueueItem { cost: 0.0, entity: start });
        let mut best_cost: HashMap<EntityId, f32> = HashMap::from([(start, 0.0)]);

        while let Some(QueueItem { cost, entity }) = heap.pop() {
            if entity == end {
                let mut path = vec![entity];
                let mut cur = entity;
                while let Some(&prev) = came_from.get(&cur) {
                    path.push(prev);
                    cur = prev;
                }
                path.reverse();
                return Some(path);
            }
            if !visited.insert(entity) {
                continue;
            }
            let Some(live) = self.entities.get(entity) else { continue };
            for &neighbor in &live.connections {
                if visited.contains(&neighbor) {
                    continue;
                }
                let edge_cost = self.entity_time(neighbor);
                if !edge_cost.is_finite() {
                    continue;
                }
                let new_cost = cost + edge_cost;
                if new_cost < *best_cost.get(&neighbor).unwrap_or(&f32::INFINITY) {
                    best_cost.insert(neighbor, new_cost);
                    came_from.insert(neighbor, entity);
                    heap.push(QueueItem { cost: new_cost, entity: neighbor });
                }
            }
        }
        None
    }

    /// Ported from `_can_place_agent`: an occupant on `entity` blocks a new
    /// arrival if the occupant's trailing edge (`progress_on_entity -
    /// occupant_length / conveyor_length`) hasn't yet cleared the space the
    /// new agent needs at the entry point. Only `Conveyor` entities are
    /// checked — turntables have no meaningful "length" to collide over.
    pub fn can_place_agent(&self, entity: EntityId, agent_length: f32, agents: &AgentArena) -> bool {
        let Some(occupants) = self.entity_agents.get(&entity) else { return true };
        let Some(EntityKind::Conveyor { length, .. }) = self.entities.get(entity).map(|e| e.kind) else {
            return true;
        };
        if length <= 0.0 {
            return false;
        }
        let required_progress = agent_length / length;
        for &occupant in occupants {
            let Some(route) = self.routes.get(&occupant) else { continue };
            let Some(occupant_agent) = agents.get(occupant) else { continue };
            let occupant_start = route.progress_on_entity - occupant_agent.length / length;
            let occupant_end = route.progress_on_entity;
            if occupant_start < required_progress && occupant_end > 0.0 {
                return false;
            }
        }
        true
    }

    pub fn register(
        &mut self,
        agent: AgentId,
        start: EntityId,
        end: EntityId,
        agents: &mut AgentArena,
    ) -> SpatialResult<()> {
        if !self.is_entity_registered(start) || !self.is_entity_registered(end) {
            return Err(SpatialError::EntityNotRegistered(start));
        }
        let path = self.shortest_path(start, end).ok_or(SpatialError::NoRoute { from: start, to: end })?;
        let total_time: f32 = path.iter().map(|&e| self.entity_time(e)).sum();
        let total_time = if total_time <= 0.0 { 1.0 } else { total_time };

        let agent_length = agents.get(agent).map(|a| a.length).unwrap_or(0.0);
        if !self.can_place_agent(start, agent_length, agents) {
            return Err(SpatialError::InvalidRegistration("entry conveyor has no clearance".into()));
        }

        self.routes.insert(
            agent,
            AgentRoute {
                current_entity: start,
                remaining_path: path,
                progress_on_entity: 0.0,
                elapsed_on_entity: 0.0,
                elapsed_total: 0.0,
                total_time,
            },
        );
        self.entity_agents.entry(start).or_default().push(agent);
        if let Some(a) = agents.get_mut(agent) {
            a.space_state.position = None;
            a.space_state.target = None;
            a.space_state.progress = 0.0;
        }
        Ok(())
    }

    pub fn unregister(&mut self, agent: AgentId, agents: &mut AgentArena) -> bool {
        let Some(route) = self.routes.remove(&agent) else { return false };
        if let Some(v) = self.entity_agents.get_mut(&route.current_entity) {
            v.retain(|&a| a != agent);
        }
        if let Some(a) = agents.get_mut(agent) {
            a.space_state = Default::default();
        }
        true
    }

    pub fn update(&mut self, delta_time: f32, agents: &mut AgentArena) {
        let agent_ids: Vec<AgentId> = self.routes.keys().copied().collect();
        for agent in agent_ids {
            let entity_time = {
                let route = &self.routes[&agent];
                self.entity_time(route.current_entity)
            };

            let (progress_on_entity, progress_on_path, advance) = {
                let route = self.routes.get_mut(&agent).unwrap();
                route.elapsed_on_entity += delta_time;
                route.elapsed_total += delta_time;
                route.progress_on_entity =
                    if entity_time > 0.0 { (route.elapsed_on_entity / entity_time).min(1.0) } else { 1.0 };
                let progress_on_path =
                    if route.total_time > 0.0 { (route.elapsed_total / route.total_time).min(1.0) } else { 1.0 };
                (route.progress_on_entity, progress_on_path, route.progress_on_entity >= 1.0 && route.remaining_path.len() > 1)
            };

            if let Some(a) = agents.get_mut(agent) {
                a.space_state.progress = progress_on_path;
            }

            if advance {
                let route = self.routes.get_mut(&agent).unwrap();
                let old_entity = route.current_entity;
                route.remaining_path.remove(0);
                let next_entity = route.remaining_path[0];
                route.current_entity = next_entity;
                route.elapsed_on_entity = 0.0;
                route.progress_on_entity = 0.0;
                if let Some(v) = self.entity_agents.get_mut(&old_entity) {
                    v.retain(|&a| a != agent);
                }
                self.entity_agents.entry(next_entity).or_default().push(agent);
            }
            let _ = progress_on_entity;
        }
    }

    pub fn is_movement_complete(&self, agent: AgentId, agents: &AgentArena) -> bool {
        agents.get(agent).is_some_and(|a| a.space_state.progress >= 1.0)
    }

    pub fn is_registered(&self, agent: AgentId) -> bool {
        self.routes.contains_key(&agent)
    }
}

impl Default for ConveyorSpace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsim_agent::Agent;

    #[test]
    fn shortest_path_picks_cheaper_branch() {
        let mut space = ConveyorSpace::new();
        let a = space.add_entity(EntityKind::Conveyor { length: 10.0, speed: 1.0 });
        let slow = space.add_entity(EntityKind::Conveyor { length: 100.0, speed: 1.0 });
        let fast = space.add_entity(EntityKind::Conveyor { length: 10.0, speed: 1.0 });
        let d = space.add_entity(EntityKind::Conveyor { length: 10.0, speed: 1.0 });
        space.connect(a, slow);
        space.connect(a, fast);
        space.connect(slow, d);
        space.connect(fast, d);

        let path = space.shortest_path(a, d).unwrap();
        assert!(path.contains(&fast));
        assert!(!path.contains(&slow));
    }

    #[test]
    fn unreachable_target_is_no_route_error() {
        let mut space = ConveyorSpace::new();
        let a = space.add_entity(EntityKind::Conveyor { length: 10.0, speed: 1.0 });
        let b = space.add_entity(EntityKind::Conveyor { length: 10.0, speed: 1.0 });
        let mut agents = AgentArena::new();
        let agent = agents.spawn(Agent::new());
        let err = space.register(agent, a, b, &mut agents).unwrap_err();
        assert!(matches!(err, SpatialError::NoRoute { .. }));
    }

    #[test]
    fn agent_advances_through_entities_and_completes() {
        let mut space = ConveyorSpace::new();
        let a = space.add_entity(EntityKind::Conveyor { length: 2.0, speed: 1.0 });
        let b = space.add_entity(EntityKind::Conveyor { length: 2.0, speed: 1.0 });
        space.connect(a, b);
        let mut agents = AgentArena::new();
        let agent = agents.spawn(Agent::new());
        space.register(agent, a, b, &mut agents).unwrap();

        for _ in 0..10 {
            space.update(1.0, &mut agents);
        }
        assert!(space.is_movement_complete(agent, &agents));
    }

    #[test]
    fn overlapping_occupant_blocks_entry() {
        let mut space = ConveyorSpace::new();
        let a = space.add_entity(EntityKind::Conveyor { length: 1.0, speed: 1.0 });
        let b = space.add_entity(EntityKind::Conveyor { length: 1.0, speed: 1.0 });
        space.connect(a, b);
        let mut agents = AgentArena::new();
        let first = agents.spawn(Agent::with_extent(1.0, 1.0));
        space.register(first, a, b, &mut agents).unwrap();

        let second = agents.spawn(Agent::with_extent(1.0, 1.0));
        let err = space.register(second, a, b, &mut agents).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidRegistration(_)));
    }
}
