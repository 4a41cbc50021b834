//! The agent event pub/sub bus.
//!
//! Adapted from the teacher framework's `EventBus`-less event handling (the
//! teacher has no direct analogue) and grounded instead on the reference
//! implementation's `Simulator._event_subscriptions` / `_pending_events`
//! staging buffers: events emitted during a tick are staged by subscriber,
//! then delivered into the subscriber's mailbox at the *start* of the next
//! tick — one tick of delay, every time, so a delivered event can never
//! trigger another delivery in the same pass and recurse.
//!
//! Subscriptions are exact-string matches and are **not** automatically
//! removed when an agent is despawned (see DESIGN.md); callers that want
//! that behavior must unsubscribe explicitly before despawning.

use std::collections::HashMap;

use flowsim_agent::AgentArena;
use flowsim_core::AgentId;

#[derive(Default)]
pub struct EventBus {
    subscriptions: HashMap<String, Vec<AgentId>>,
    staged: HashMap<AgentId, Vec<String>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, agent: AgentId, tag: impl Into<String>) {
        let subs = self.subscriptions.entry(tag.into()).or_default();
        if !subs.contains(&agent) {
            subs.push(agent);
        }
    }

    /// Removes `agent`'s subscription to `tag`. Returns `true` if it had
    /// been subscribed.
    pub fn unsubscribe(&mut self, agent: AgentId, tag: &str) -> bool {
        match self.subscriptions.get_mut(tag) {
            Some(subs) => {
                let before = subs.len();
                subs.retain(|&id| id != agent);
                subs.len() != before
            }
            None => false,
        }
    }

    pub fn is_subscribed(&self, agent: AgentId, tag: &str) -> bool {
        self.subscriptions.get(tag).is_some_and(|subs| subs.contains(&agent))
    }

    /// Tick phase: deliver events staged during the *previous* tick's
    /// collection step into each subscriber's `pending_events`, replacing
    /// whatever was delivered last tick (a mailbox is for "this tick" only).
    pub fn deliver(&mut self, agents: &mut AgentArena) {
        for (_, agent) in agents.iter_mut() {
            agent.pending_events.clear();
        }
        for (agent_id, events) in self.staged.drain() {
            if let Some(agent) = agents.get_mut(agent_id) {
                agent.pending_events = events;
            }
        }
    }

    /// Tick phase: gather every agent's freshly emitted events and stage
    /// them, by subscriber, for delivery at the start of the next tick.
    pub fn collect_and_stage(&mut self, agents: &mut AgentArena) {
        let mut emitted: Vec<(AgentId, String)> = Vec::new();
        for (id, agent) in agents.iter_mut() {
            if agent.emitted_events.is_empty() {
                continue;
            }
            for tag in agent.emitted_events.drain(..) {
                emitted.push((id, tag));
            }
        }
        for (_emitter, tag) in emitted {
            if let Some(subs) = self.subscriptions.get(&tag) {
                for &sub in subs {
                    self.staged.entry(sub).or_default().push(tag.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsim_agent::Agent;

    #[test]
    fn subscriber_receives_event_one_tick_later() {
        let mut agents = AgentArena::new();
        let emitter = agents.spawn(Agent::new());
        let subscriber = agents.spawn(Agent::new());

        let mut bus = EventBus::new();
        bus.subscribe(subscriber, "order_complete");

        agents.get_mut(emitter).unwrap().emit("order_complete");

        // Collected this tick, not yet visible.
        bus.collect_and_stage(&mut agents);
        assert!(agents.get(subscriber).unwrap().pending_events.is_empty());

        // Delivered at the start of the next tick.
        bus.deliver(&mut agents);
        assert_eq!(agents.get(subscriber).unwrap().pending_events, vec!["order_complete"]);
    }

    #[test]
    fn mailbox_does_not_accumulate_across_ticks() {
        let mut agents = AgentArena::new();
        let emitter = agents.spawn(Agent::new());
        let subscriber = agents.spawn(Agent::new());
        let mut bus = EventBus::new();
        bus.subscribe(subscriber, "ping");

        agents.get_mut(emitter).unwrap().emit("ping");
        bus.collect_and_stage(&mut agents);
        bus.deliver(&mut agents);
        assert_eq!(agents.get(subscriber).unwrap().pending_events.len(), 1);

        // No new emission this tick: the next delivery should clear, not add.
        bus.collect_and_stage(&mut agents);
        bus.deliver(&mut agents);
        assert!(agents.get(subscriber).unwrap().pending_events.is_empty());
    }

    #[test]
    fn unsubscribed_agent_gets_nothing() {
        let mut agents = AgentArena::new();
        let emitter = agents.spawn(Agent::new());
        let bystander = agents.spawn(Agent::new());
        let mut bus = EventBus::new();

        agents.get_mut(emitter).unwrap().emit("ping");
        bus.collect_and_stage(&mut agents);
        bus.deliver(&mut agents);
        assert!(agents.get(bystander).unwrap().pending_events.is_empty());
    }

    #[test]
    fn unsubscribe_stops_future_delivery() {
        let mut agents = AgentArena::new();
        let emitter = agents.spawn(Agent::new());
        let subscriber = agents.spawn(Agent::new());
        let mut bus = EventBus::new();
        bus.subscribe(subscriber, "ping");
        assert!(bus.unsubscribe(subscriber, "ping"));

        agents.get_mut(emitter).unwrap().emit("ping");
        bus.collect_and_stage(&mut agents);
        bus.deliver(&mut agents);
        assert!(agents.get(subscriber).unwrap().pending_events.is_empty());
    }

    #[test]
    fn despawned_subscriber_is_skipped_not_panicking() {
        let mut agents = AgentArena::new();
        let emitter = agents.spawn(Agent::new());
        let subscriber = agents.spawn(Agent::new());
        let mut bus = EventBus::new();
        bus.subscribe(subscriber, "ping");
        agents.despawn(subscriber);

        agents.get_mut(emitter).unwrap().emit("ping");
        bus.collect_and_stage(&mut agents);
        bus.deliver(&mut agents);
        // No panic; the stale id in `staged` is simply dropped on delivery.
    }
}
