//! A line that never lets more than two agents occupy a restricted area at
//! once, even though agents arrive every tick and dwell there for 5 ticks.

use anyhow::Result;
use flowsim_agent::Agent;
use flowsim_block::{Block, Delay, Queue, RestrictedAreaEnd, RestrictedAreaStart, Sink, Source};
use flowsim_core::Tick;
use flowsim_sim::Simulator;

const OCCUPANCY_LIMIT: usize = 2;
const DWELL_TICKS: u64 = 5;
const MAX_TICKS: u64 = 100;

fn main() -> Result<()> {
    let mut sim = Simulator::builder(MAX_TICKS, 7).build();

    let sink_id = sim.add_block(Block::new(Box::new(Sink::new()), 1));
    let mut end_block = Block::new(Box::new(RestrictedAreaEnd::new()), 1);
    end_block.connect(0, sink_id);
    let end_id = sim.add_block(end_block);
    let mut delay_block = Block::new(Box::new(Delay::new(DWELL_TICKS)), 1);
    delay_block.connect(0, end_id);
    let delay_id = sim.add_block(delay_block);
    let mut start_block = Block::new(Box::new(RestrictedAreaStart::new(OCCUPANCY_LIMIT)), 1);
    start_block.connect(0, delay_id);
    let start_id = sim.add_block(start_block);
    let mut queue_block = Block::new(Box::new(Queue::new()), 1);
    queue_block.connect(0, start_id);
    let queue_id = sim.add_block(queue_block);
    let mut source_block = Block::new(Box::new(Source::new(|_tick: Tick| 1, Agent::new)), 1);
    source_block.connect(0, queue_id);
    sim.add_block(source_block);

    for tick in 0..MAX_TICKS {
        sim.tick()?;
        let active = sim.block(start_id).unwrap().kind_as::<RestrictedAreaStart>().unwrap().active_agents();
        anyhow::ensure!(active <= OCCUPANCY_LIMIT, "occupancy cap violated at tick {tick}: {active} agents inside");
        if tick % 20 == 0 {
            println!("tick {tick:>3}: {active} agent(s) inside the restricted area");
        }
    }

    let sink = sim.block(sink_id).unwrap().kind_as::<Sink>().unwrap();
    println!("after {MAX_TICKS} ticks, {} agent(s) made it through the restricted area", sink.count());
    anyhow::ensure!(sink.count() > 0, "nothing ever made it through");
    Ok(())
}
