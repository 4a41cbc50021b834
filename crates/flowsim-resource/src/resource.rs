//! A single seizable unit inside a [`crate::ResourcePool`].

use std::collections::HashMap;

use flowsim_core::{AgentId, Tick};

/// A resource instance: a forklift, a loading dock, a machine slot. The
/// pool owns it; agents only ever hold its id.
#[derive(Debug, Clone)]
pub struct ResourceAgent {
    pub kind: String,
    pub occupied_by: Option<AgentId>,
    pub occupied_since: Option<Tick>,
    /// Static metadata tags (e.g. `"station" -> "A"`), set at construction
    /// and never touched by seize/release.
    pub tags: HashMap<String, String>,
}

impl ResourceAgent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), occupied_by: None, occupied_since: None, tags: HashMap::new() }
    }

    pub fn is_available(&self) -> bool {
        self.occupied_by.is_none()
    }
}
