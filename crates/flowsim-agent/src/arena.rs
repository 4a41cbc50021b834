//! The dynamic agent arena.
//!
//! The teacher framework's `AgentStore` is a fixed-population
//! structure-of-arrays sized once at construction. This engine's agents are
//! created by `Source` blocks and destroyed by terminal blocks at arbitrary
//! ticks, so the population has to grow and shrink while the simulation
//! runs. `AgentArena` keeps the teacher's idioms — typed ids, a type-erased
//! component map for ad hoc per-agent state — but replaces the backing
//! storage with [`flowsim_core::Slab`], a generational arena that reuses
//! freed slots instead of assuming the population never changes.

use flowsim_core::{AgentId, Slab};

use crate::agent::Agent;
use crate::component::ComponentMap;

#[derive(Default)]
pub struct AgentArena {
    agents: Slab<Agent, AgentId>,
    components: ComponentMap,
}

impl AgentArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user component type so it can be attached to agents.
    /// Idempotent; safe to call again with the same type.
    pub fn register_component<T: Default + Send + Sync + 'static>(&mut self) {
        self.components.register::<T>();
    }

    /// Creates a new agent and returns its id. Reuses a freed slot when one
    /// is available, resetting any leftover component state on that slot
    /// first so the new agent never inherits a despawned one's data.
    pub fn spawn(&mut self, agent: Agent) -> AgentId {
        let slots_before = self.agents.slot_count();
        let id = self.agents.insert(agent);
        if self.agents.slot_count() > slots_before {
            self.components.grow();
        } else {
            self.components.reset_slot(id.index());
        }
        id
    }

    /// Removes an agent permanently. Returns the removed record, or `None`
    /// if `id` is stale (already despawned, or never existed).
    pub fn despawn(&mut self, id: AgentId) -> Option<Agent> {
        self.agents.remove(id)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains(id)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.ids()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &Agent)> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (AgentId, &mut Agent)> {
        self.agents.iter_mut()
    }

    pub fn component<T: 'static>(&self, id: AgentId) -> Option<&T> {
        self.components.get::<T>().and_then(|slice| slice.get(id.index()))
    }

    pub fn component_mut<T: 'static>(&mut self, id: AgentId) -> Option<&mut T> {
        self.components.get_mut::<T>().and_then(|vec| vec.get_mut(id.index()))
    }

    pub fn set_component<T: Default + Send + Sync + 'static>(&mut self, id: AgentId, value: T) {
        if !self.components.contains::<T>() {
            self.components.register::<T>();
        }
        if let Some(slot) = self.component_mut::<T>(id) {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Clone, Copy, PartialEq, Debug)]
    struct Wealth(f64);

    #[test]
    fn spawn_and_despawn_roundtrip() {
        let mut arena = AgentArena::new();
        let id = arena.spawn(Agent::new());
        assert!(arena.contains(id));
        assert_eq!(arena.len(), 1);
        let removed = arena.despawn(id);
        assert!(removed.is_some());
        assert!(!arena.contains(id));
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn despawned_slot_reused_with_fresh_generation() {
        let mut arena = AgentArena::new();
        let a = arena.spawn(Agent::new());
        arena.set_component(a, Wealth(50.0));
        arena.despawn(a);

        let b = arena.spawn(Agent::new());
        assert_eq!(a.index(), b.index());
        assert!(!arena.contains(a));
        assert_eq!(arena.component::<Wealth>(b), Some(&Wealth(0.0)));
    }

    #[test]
    fn component_roundtrip() {
        let mut arena = AgentArena::new();
        arena.register_component::<Wealth>();
        let id = arena.spawn(Agent::new());
        arena.set_component(id, Wealth(10.0));
        assert_eq!(arena.component::<Wealth>(id), Some(&Wealth(10.0)));
    }

    #[test]
    fn stale_id_after_despawn_returns_none() {
        let mut arena = AgentArena::new();
        let id = arena.spawn(Agent::new());
        arena.despawn(id);
        assert!(arena.get(id).is_none());
        assert!(arena.get_mut(id).is_none());
    }

    #[test]
    fn many_agents_independent_components() {
        let mut arena = AgentArena::new();
        let ids: Vec<_> = (0..5).map(|_| arena.spawn(Agent::new())).collect();
        for (i, id) in ids.iter().enumerate() {
            arena.set_component(*id, Wealth(i as f64));
        }
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(arena.component::<Wealth>(*id), Some(&Wealth(i as f64)));
        }
    }
}
