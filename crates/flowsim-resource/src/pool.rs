//! `ResourcePool` — a single named pool of same-kind [`ResourceAgent`]s.
//!
//! Grounded on the reference implementation's `ResourcePool`: resources are
//! tracked as two ordered lists (available, occupied) rather than a bitset,
//! so seizing `count` units always hands out the longest-idle resources
//! first — the same "take the first N available" order the Python source
//! uses. The Python version also accepts `on_acquire`/`on_release` callable
//! hooks; this port drops them; Rust callers branch on the `Result` a seize
//! or release call returns instead of registering a closure (see
//! DESIGN.md).

use flowsim_core::{AgentId, ResourceId, Slab, Tick};

use crate::error::{ResourceError, ResourceResult};
use crate::resource::ResourceAgent;

pub struct ResourcePool {
    pub name: String,
    pub kind: String,
    resources: Slab<ResourceAgent, ResourceId>,
    available: Vec<ResourceId>,
    occupied: Vec<ResourceId>,
}

impl ResourcePool {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            resources: Slab::new(),
            available: Vec::new(),
            occupied: Vec::new(),
        }
    }

    /// Adds `count` freshly available resources of this pool's kind.
    pub fn add_resources(&mut self, count: usize) -> Vec<ResourceId> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let id = self.resources.insert(ResourceAgent::new(self.kind.clone()));
            self.available.push(id);
            ids.push(id);
        }
        ids
    }

    /// Seizes `count` resources on behalf of `by`, or fails with
    /// [`ResourceError::CapacityViolation`] if fewer than `count` are
    /// available — it never partially seizes.
    pub fn seize(&mut self, count: usize, by: AgentId, now: Tick) -> ResourceResult<Vec<ResourceId>> {
        if self.available.len() < count {
            return Err(ResourceError::CapacityViolation { requested: count, available: self.available.len() });
        }
        let taken: Vec<ResourceId> = self.available.drain(..count).collect();
        for &id in &taken {
            let resource = self.resources.get_mut(id).expect("available list tracks live ids only");
            resource.occupied_by = Some(by);
            resource.occupied_since = Some(now);
            self.occupied.push(id);
        }
        Ok(taken)
    }

    /// Releases every resource in `ids` that is currently occupied in this
    /// pool. Ids not held by this pool are silently skipped, mirroring the
    /// reference implementation's `if resource in occupied_resources`.
    /// Returns how many were actually released.
    pub fn release(&mut self, ids: &[ResourceId]) -> usize {
        let mut released = 0;
        for &id in ids {
            let Some(pos) = self.occupied.iter().position(|&o| o == id) else { continue };
            self.occupied.remove(pos);
            if let Some(resource) = self.resources.get_mut(id) {
                resource.occupied_by = None;
                resource.occupied_since = None;
            }
            self.available.push(id);
            released += 1;
        }
        released
    }

    pub fn get(&self, id: ResourceId) -> Option<&ResourceAgent> {
        self.resources.get(id)
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    pub fn has_any_available(&self) -> bool {
        !self.available.is_empty()
    }

    pub fn total_count(&self) -> usize {
        self.resources.len()
    }
}
