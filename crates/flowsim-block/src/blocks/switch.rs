//! `Switch` — keyed routing, no buffering.

use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;

use flowsim_core::{AgentId, BlockId};

use crate::behavior::BlockBehavior;
use crate::block::BlockShell;
use crate::context::TickCtx;
use crate::error::{BlockError, BlockResult};

pub struct Switch<K> {
    key_func: Box<dyn for<'c> FnMut(AgentId, &TickCtx<'c>) -> K + Send>,
    routes: HashMap<K, BlockId>,
}

impl<K: Eq + Hash + std::fmt::Debug> Switch<K> {
    pub fn new(key_func: impl for<'c> FnMut(AgentId, &TickCtx<'c>) -> K + Send + 'static) -> Self {
        Self { key_func: Box::new(key_func), routes: HashMap::new() }
    }

    pub fn connect_key(&mut self, key: K, target: BlockId) {
        self.routes.insert(key, target);
    }
}

impl<K: Eq + Hash + std::fmt::Debug + Send + 'static> BlockBehavior for Switch<K> {
    fn take(&mut self, agent: AgentId, _previous_block: Option<BlockId>, _slot: usize, shell: &mut BlockShell, ctx: &mut TickCtx) -> BlockResult<()> {
        let key = (self.key_func)(agent, &*ctx);
        let target = *self
            .routes
            .get(&key)
            .ok_or_else(|| BlockError::MissingRoute { block: shell.id(), slot: format!("{key:?}") })?;
        shell.eject_to(agent, target, 0, ctx)
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
    fn routes_by_key_and_fails_fatally_on_unknown_key() {
        let mut h = Harness::new();
        let mut switch = Switch::new(|agent: AgentId, _ctx: &TickCtx| agent.index() % 2 == 0);
        let even_sink = h.add_sink();
        switch.connect_key(true, even_sink);
        let switch_id = h.add(Box::new(switch), 1);

        let even = h.spawn();
        assert_eq!(even.index(), 0);
        h.dispatch(switch_id, even).unwrap();
        assert_eq!(h.sink_count(even_sink), 1);

        let odd = h.spawn();
        assert_eq!(odd.index(), 1);
        let err = h.dispatch(switch_id, odd).unwrap_err();
        assert!(matches!(err, BlockError::MissingRoute { .. }));
    }
}
