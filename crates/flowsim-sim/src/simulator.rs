//! `Simulator` — owns every subsystem and drives the fixed five-phase tick
//! pipeline described in the crate-level docs.

use std::collections::HashMap;

use flowsim_agent::{Agent, AgentArena};
use flowsim_block::{Block, BlockError, BlockResult, Delay, DelayPort, TickCtx};
use flowsim_core::{AgentId, BlockId, PoolId, SimRng, Slab, Tick};
use flowsim_events::EventBus;
use flowsim_resource::ResourcePool;
use flowsim_schedule::{SchedulerError, TimedScheduler};
use flowsim_spatial::SpatialManager;

use crate::error::{SimError, SimResult};
use crate::view_hook::{NoopViewHook, ViewHook};

/// Threads a live `&mut TimedScheduler<Simulator>` through to `Delay`
/// blocks during the (unlocked) block-tick phase.
struct SchedulerPort<'a> {
    scheduler: &'a mut TimedScheduler<Simulator>,
    now: Tick,
}

impl<'a> DelayPort for SchedulerPort<'a> {
    fn schedule_ejection(&mut self, delay_ticks: u64, agent: AgentId, from: BlockId, target: BlockId) -> BlockResult<()> {
        self.scheduler
            .schedule(
                self.now,
                delay_ticks,
                None,
                Box::new(move |_tick, sim: &mut Simulator| sim.complete_delay(from, target, agent)),
            )
            .map_err(|_| BlockError::SchedulingLocked)
    }
}

/// Handed to block logic only while a timed-event callback is firing.
/// Every attempt to schedule more work through it fails hard, exactly as
/// the scheduling-locked critical section requires.
struct LockedDelayPort;

impl DelayPort for LockedDelayPort {
    fn schedule_ejection(&mut self, _delay_ticks: u64, _agent: AgentId, _from: BlockId, _target: BlockId) -> BlockResult<()> {
        Err(BlockError::SchedulingLocked)
    }
}

pub struct Simulator {
    current_tick: Tick,
    max_ticks: u64,
    rng: SimRng,
    agents: AgentArena,
    blocks: Slab<Block, BlockId>,
    resources: Slab<ResourcePool, PoolId>,
    spaces: HashMap<String, Box<dyn SpatialManager>>,
    space_order: Vec<String>,
    events: EventBus,
    scheduler: TimedScheduler<Simulator>,
    view_hook: Box<dyn ViewHook>,
    /// Set only for the duration of phase 1; callbacks that reach back into
    /// `schedule_event` through a captured `Simulator` see it and fail
    /// instead of silently scheduling against a detached scheduler.
    firing: bool,
    /// A block dispatch failed inside a timed-event callback. The callback
    /// signature has no `Result`, so the failure is stashed here and raised
    /// by `tick()` once `fire` returns.
    pending_error: Option<SimError>,
}

impl Simulator {
    pub(crate) fn new(max_ticks: u64, seed: u64) -> Self {
        Self {
            current_tick: Tick::ZERO,
            max_ticks,
            rng: SimRng::new(seed),
            agents: AgentArena::new(),
            blocks: Slab::new(),
            resources: Slab::new(),
            spaces: HashMap::new(),
            space_order: Vec::new(),
            events: EventBus::new(),
            scheduler: TimedScheduler::new(),
            view_hook: Box::new(NoopViewHook),
            firing: false,
            pending_error: None,
        }
    }

    pub(crate) fn set_view_hook(&mut self, hook: Box<dyn ViewHook>) {
        self.view_hook = hook;
    }

    // ── Assembly ───────────────────────────────────────────────────────────

    /// Registers `block` and back-fills its id. Returns the id to connect
    /// other blocks' output slots to.
    pub fn add_block(&mut self, block: Block) -> BlockId {
        let id = self.blocks.insert(block);
        self.blocks.get_mut(id).expect("just inserted").set_id(id);
        id
    }

    pub fn add_agent(&mut self, agent: Agent) -> AgentId {
        self.agents.spawn(agent)
    }

    pub fn remove_agent(&mut self, agent: AgentId) -> bool {
        self.agents.despawn(agent).is_some()
    }

    pub fn subscribe(&mut self, agent: AgentId, tag: impl Into<String>) {
        self.events.subscribe(agent, tag);
    }

    pub fn add_space(&mut self, name: impl Into<String>, space: Box<dyn SpatialManager>) {
        let name = name.into();
        if !self.spaces.contains_key(&name) {
            self.space_order.push(name.clone());
        }
        self.spaces.insert(name, space);
    }

    pub fn get_space(&self, name: &str) -> Option<&dyn SpatialManager> {
        self.spaces.get(name).map(|b| b.as_ref())
    }

    pub fn get_space_mut(&mut self, name: &str) -> Option<&mut (dyn SpatialManager + 'static)> {
        self.spaces.get_mut(name).map(|b| b.as_mut())
    }

    pub fn add_resource_pool(&mut self, pool: ResourcePool) -> PoolId {
        self.resources.insert(pool)
    }

    pub fn get_resource_pool(&self, id: PoolId) -> Option<&ResourcePool> {
        self.resources.get(id)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// Mutable access to a block from outside the tick pipeline — lets a
    /// timed-event callback reach into a block's own state (e.g. toggling a
    /// `Gate`) the same way `agents_mut`/`rng_mut` let it touch agents and
    /// randomness.
    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    pub fn agents(&self) -> &AgentArena {
        &self.agents
    }

    /// Mutable access to agent state from outside the tick pipeline — the
    /// escape hatch timed-event callbacks use to read/write user-defined
    /// components directly (e.g. a recurring wealth-transfer event), since
    /// their signature has no `TickCtx` to borrow from.
    pub fn agents_mut(&mut self) -> &mut AgentArena {
        &mut self.agents
    }

    /// The simulator's single PRNG stream, for timed-event callbacks that
    /// need randomness outside of block logic (which reads `TickCtx::rng`
    /// instead).
    pub fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Schedules `callback` to run `delay_ticks` after the current tick,
    /// optionally re-arming every `recurring` ticks thereafter. Fails with
    /// `SchedulingLocked` if called while a timed event is currently firing
    /// (a callback trying to schedule more work reentrantly).
    pub fn schedule_event(
        &mut self,
        delay_ticks: u64,
        recurring: Option<u64>,
        callback: impl FnMut(Tick, &mut Simulator) + Send + 'static,
    ) -> SimResult<()> {
        if self.firing {
            return Err(SimError::Scheduler(SchedulerError::Locked));
        }
        self.scheduler.schedule(self.current_tick, delay_ticks, recurring, Box::new(callback))?;
        Ok(())
    }

    /// Routes `agent` directly into `target`, as if ejected there by
    /// whatever currently holds it. Used to seed the graph with agents that
    /// didn't arrive via a `Source`.
    pub fn dispatch_agent(&mut self, target: BlockId, agent: AgentId) -> SimResult<()> {
        let now = self.current_tick;
        let mut port = SchedulerPort { scheduler: &mut self.scheduler, now };
        let mut ctx = TickCtx {
            tick: now,
            rng: &mut self.rng,
            agents: &mut self.agents,
            blocks: &mut self.blocks,
            resources: &mut self.resources,
            spaces: &mut self.spaces,
            delay: &mut port,
        };
        ctx.dispatch(target, agent, 0)?;
        Ok(())
    }

    // ── Execution ────────────────────────────────────────────────────────

    /// Advances `current_tick` from 0 while `current_tick < max_ticks`,
    /// running the tick pipeline and incrementing afterward.
    pub fn run(&mut self) -> SimResult<()> {
        while self.current_tick.0 < self.max_ticks {
            self.tick()?;
        }
        Ok(())
    }

    /// Terminates the run after the tick currently in progress completes.
    pub fn stop(&mut self) {
        self.max_ticks = 0;
    }

    /// Runs exactly one tick of the fixed five-phase pipeline:
    /// fire timed events, step spatial managers, deliver agent events,
    /// tick every block, collect emitted events and invoke the view hook.
    pub fn tick(&mut self) -> SimResult<()> {
        let now = self.current_tick;

        // Phase 1: fire timed events due at `now`, scheduling-locked.
        let mut scheduler = std::mem::take(&mut self.scheduler);
        let mut rng = self.rng.clone();
        self.firing = true;
        let fire_result = scheduler.fire(now, &mut rng, self);
        self.firing = false;
        self.scheduler = scheduler;
        self.rng = rng;
        fire_result?;
        if let Some(err) = self.pending_error.take() {
            return Err(err);
        }

        // Phase 2: step every spatial manager in registration order.
        for name in &self.space_order {
            if let Some(space) = self.spaces.get_mut(name) {
                space.update(1.0, &mut self.agents)?;
            }
        }

        // Phase 3: deliver events staged during the previous tick's
        // collection step.
        self.events.deliver(&mut self.agents);

        // Phase 4: tick every block in registration order. Each block is
        // detached from the arena for the duration of its own tick so its
        // logic can dispatch into siblings without aliasing itself.
        let block_ids: Vec<BlockId> = self.blocks.ids().collect();
        for id in block_ids {
            let Some(mut block) = self.blocks.take(id) else { continue };
            let mut port = SchedulerPort { scheduler: &mut self.scheduler, now };
            let mut ctx = TickCtx {
                tick: now,
                rng: &mut self.rng,
                agents: &mut self.agents,
                blocks: &mut self.blocks,
                resources: &mut self.resources,
                spaces: &mut self.spaces,
                delay: &mut port,
            };
            let result = block.tick(&mut ctx);
            self.blocks.put_back(id, block);
            result?;
        }

        // Phase 5: collect emitted events for next-tick delivery, then
        // invoke the external view hook last.
        self.events.collect_and_stage(&mut self.agents);
        self.view_hook.render_tick(now);

        self.current_tick = now.offset(1);
        Ok(())
    }

    /// Fired by the scheduler once a `Delay`'s hold time elapses: dispatches
    /// the agent downstream and clears the originating `Delay`'s inspection
    /// entry. Any dispatch failure is stashed in `pending_error` since this
    /// runs inside the scheduling-locked firing pass.
    fn complete_delay(&mut self, from: BlockId, target: BlockId, agent: AgentId) {
        let now = self.current_tick;
        let mut locked = LockedDelayPort;
        let mut ctx = TickCtx {
            tick: now,
            rng: &mut self.rng,
            agents: &mut self.agents,
            blocks: &mut self.blocks,
            resources: &mut self.resources,
            spaces: &mut self.spaces,
            delay: &mut locked,
        };
        if let Err(e) = ctx.dispatch(target, agent, 0) {
            self.pending_error = Some(e.into());
            return;
        }
        if let Some(mut origin) = self.blocks.take(from) {
            if let Some(delay) = origin.kind_as_mut::<Delay>() {
                delay.forget(agent);
            }
            self.blocks.put_back(from, origin);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsim_block::{Queue, Sink, Source};

    fn source_sink_sim(spawn_on_tick: u64, count: u32) -> (Simulator, BlockId) {
        let mut sim = Simulator::new(10, 1);
        let sink_id = sim.add_block(Block::new(Box::new(Sink::new()), 1));
        let source = Source::new(
            move |tick: Tick| if tick.0 == spawn_on_tick { count } else { 0 },
            Agent::new,
        );
        let mut source_block = Block::new(Box::new(source), 1);
        source_block.connect(0, sink_id);
        sim.add_block(source_block);
        (sim, sink_id)
    }

    #[test]
    fn run_advances_until_max_ticks_then_stops() {
        let (mut sim, sink_id) = source_sink_sim(0, 4);
        sim.run().unwrap();
        assert_eq!(sim.current_tick(), Tick(10));
        let sink = sim.block(sink_id).unwrap().kind_as::<Sink>().unwrap();
        assert_eq!(sink.count(), 4);
    }

    #[test]
    fn stop_ends_run_after_current_tick() {
        let (mut sim, _sink_id) = source_sink_sim(0, 1);
        sim.schedule_event(2, None, |_tick, s: &mut Simulator| s.stop()).unwrap();
        sim.run().unwrap();
        assert_eq!(sim.current_tick(), Tick(3));
    }

    #[test]
    fn queue_drains_to_sink_over_two_ticks() {
        let mut sim = Simulator::new(5, 1);
        let sink_id = sim.add_block(Block::new(Box::new(Sink::new()), 1));
        let mut queue_block = Block::new(Box::new(Queue::new()), 1);
        queue_block.connect(0, sink_id);
        let queue_id = sim.add_block(queue_block);

        let agent = sim.add_agent(Agent::new());
        sim.dispatch_agent(queue_id, agent).unwrap();
        sim.tick().unwrap();

        let sink = sim.block(sink_id).unwrap().kind_as::<Sink>().unwrap();
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn schedule_during_firing_is_rejected() {
        let mut sim = Simulator::new(5, 1);
        sim.schedule_event(0, None, |_tick, s: &mut Simulator| {
            let err = s.schedule_event(1, None, |_, _| {});
            assert!(err.is_err());
        })
        .unwrap();
        sim.tick().unwrap();
    }
}
