//! The agent record and its spatial-state mirror.

use flowsim_core::{BlockId, Point3};

/// A spatial manager's per-agent state, mirrored onto the agent after every
/// spatial step so block logic can read it without reaching into whichever
/// `SpatialManager` the agent happens to be registered with.
///
/// This is a typed extension record rather than a string-keyed bag — the
/// distilled spec's data model describes `space_state` as "a mapping", but
/// the design notes are explicit that runtime attribute storage should be a
/// typed extension map, not a raw key/value bag, and this is the one place
/// in the engine where that distinction actually bites.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpaceState {
    pub position: Option<Point3>,
    pub target: Option<Point3>,
    pub speed: f32,
    pub progress: f32,
    pub path: Vec<Point3>,
}

impl SpaceState {
    pub fn is_registered(&self) -> bool {
        self.position.is_some()
    }
}

/// A passive token flowing through the block graph.
///
/// Agents influence the simulation only by carrying user-defined component
/// state and by emitting events; the engine never branches on agent
/// identity, only on block logic reading that state.
#[derive(Debug, Clone)]
pub struct Agent {
    pub current_block: Option<BlockId>,
    pub space_state: SpaceState,
    pub pending_events: Vec<String>,
    pub emitted_events: Vec<String>,
    pub length: f32,
    pub width: f32,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            current_block: None,
            space_state: SpaceState::default(),
            pending_events: Vec::new(),
            emitted_events: Vec::new(),
            length: 0.0,
            width: 0.0,
        }
    }
}

impl Agent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extent(length: f32, width: f32) -> Self {
        Self { length, width, ..Self::default() }
    }

    /// Stage an event for delivery to subscribers at the start of next
    /// tick. Called from block `on_enter`/`on_exit` hooks or user code.
    pub fn emit(&mut self, event: impl Into<String>) {
        self.emitted_events.push(event.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_agent_has_no_extent() {
        let a = Agent::new();
        assert_eq!(a.length, 0.0);
        assert_eq!(a.width, 0.0);
        assert!(a.current_block.is_none());
    }

    #[test]
    fn emit_stages_event() {
        let mut a = Agent::new();
        a.emit("order_complete");
        assert_eq!(a.emitted_events, vec!["order_complete".to_string()]);
    }

    #[test]
    fn space_state_unregistered_by_default() {
        let a = Agent::new();
        assert!(!a.space_state.is_registered());
    }
}
