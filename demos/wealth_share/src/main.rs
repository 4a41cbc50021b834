//! A hundred agents repeatedly hand a random fraction of their wealth to a
//! random partner. No block graph at all — just a recurring timed event
//! reading and writing a user-defined component directly on the arena.

use anyhow::Result;
use flowsim_agent::Agent;
use flowsim_core::AgentId;
use flowsim_sim::Simulator;

const AGENT_COUNT: usize = 100;
const STARTING_WEALTH: f64 = 100.0;
const ROUNDS: u64 = 100;

#[derive(Debug, Default, Clone, Copy)]
struct Wealth(f64);

fn main() -> Result<()> {
    let mut sim = Simulator::builder(ROUNDS, 42).build();

    sim.agents_mut().register_component::<Wealth>();
    let ids: Vec<AgentId> = (0..AGENT_COUNT)
        .map(|_| {
            let id = sim.add_agent(Agent::new());
            sim.agents_mut().set_component(id, Wealth(STARTING_WEALTH));
            id
        })
        .collect();

    let event_ids = ids.clone();
    sim.schedule_event(0, Some(1), move |_tick, sim: &mut Simulator| {
        let mut shuffled = event_ids.clone();
        sim.rng_mut().shuffle(&mut shuffled);
        for pair in shuffled.chunks_exact(2) {
            let (giver, receiver) = (pair[0], pair[1]);
            let fraction = sim.rng_mut().gen_range(0.0f64..1.0);
            let amount = sim.agents().component::<Wealth>(giver).map(|w| w.0 * fraction).unwrap_or(0.0);
            if let Some(w) = sim.agents_mut().component_mut::<Wealth>(giver) {
                w.0 -= amount;
            }
            if let Some(w) = sim.agents_mut().component_mut::<Wealth>(receiver) {
                w.0 += amount;
            }
        }
    })?;

    sim.run()?;

    let total: f64 = ids.iter().map(|&id| sim.agents().component::<Wealth>(id).map(|w| w.0).unwrap_or(0.0)).sum();
    let expected = AGENT_COUNT as f64 * STARTING_WEALTH;
    println!("total wealth after {ROUNDS} rounds: {total:.6} (started at {expected:.6})");
    anyhow::ensure!((total - expected).abs() < 1e-6, "wealth was not conserved: drifted by {}", total - expected);

    let richest = ids
        .iter()
        .map(|&id| sim.agents().component::<Wealth>(id).map(|w| w.0).unwrap_or(0.0))
        .fold(f64::MIN, f64::max);
    let poorest = ids
        .iter()
        .map(|&id| sim.agents().component::<Wealth>(id).map(|w| w.0).unwrap_or(0.0))
        .fold(f64::MAX, f64::min);
    println!("spread after redistribution: richest={richest:.2}, poorest={poorest:.2}");
    Ok(())
}
