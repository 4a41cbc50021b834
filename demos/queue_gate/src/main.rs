//! Three small block-graph scenarios: a straight queue/delay pipeline, a
//! predicate fork, and a periodically-toggled gate.

use anyhow::Result;
use flowsim_agent::Agent;
use flowsim_block::{Block, Delay, Gate, GateMode, GateState, If, Queue, Sink, Source};
use flowsim_core::Tick;
use flowsim_sim::Simulator;

fn main() -> Result<()> {
    println!("1. source -> queue -> delay -> sink");
    scenario_queue_delay()?;

    println!("\n2. source -> if(predicate) -> {{sink_true, sink_false}}");
    scenario_conditional_routing()?;

    println!("\n3. source -> queue -> gate (toggled every 5 ticks) -> sink");
    scenario_gate_toggle()?;

    Ok(())
}

fn scenario_queue_delay() -> Result<()> {
    let mut sim = Simulator::builder(10, 1).build();

    let sink_id = sim.add_block(Block::new(Box::new(Sink::new()), 1));
    let mut delay_block = Block::new(Box::new(Delay::new(1)), 1);
    delay_block.connect(0, sink_id);
    let delay_id = sim.add_block(delay_block);
    let mut queue_block = Block::new(Box::new(Queue::new()), 1);
    queue_block.connect(0, delay_id);
    let queue_id = sim.add_block(queue_block);
    let mut source_block = Block::new(Box::new(Source::new(|tick: Tick| if tick.0 == 1 { 1 } else { 0 }, Agent::new)), 1);
    source_block.connect(0, queue_id);
    sim.add_block(source_block);

    sim.run()?;

    let sink = sim.block(sink_id).unwrap().kind_as::<Sink>().unwrap();
    println!("   sink accepted {} agent(s) after {} ticks", sink.count(), sim.current_tick());
    anyhow::ensure!(sink.count() == 1, "expected exactly one agent to reach the sink");
    Ok(())
}

fn scenario_conditional_routing() -> Result<()> {
    let mut sim = Simulator::builder(5, 1).build();

    let sink_true = sim.add_block(Block::new(Box::new(Sink::new()), 1));
    let sink_false = sim.add_block(Block::new(Box::new(Sink::new()), 1));

    // Routes every even-indexed agent true, every odd-indexed agent false.
    let mut if_block = Block::new(Box::new(If::new(|agent, _ctx| agent.index() % 2 == 0)), 2);
    if_block.connect(0, sink_true);
    if_block.connect(1, sink_false);
    let if_id = sim.add_block(if_block);

    let mut source_block = Block::new(Box::new(Source::new(|tick: Tick| if tick.0 == 1 { 4 } else { 0 }, Agent::new)), 1);
    source_block.connect(0, if_id);
    sim.add_block(source_block);

    sim.run()?;

    let true_count = sim.block(sink_true).unwrap().kind_as::<Sink>().unwrap().count();
    let false_count = sim.block(sink_false).unwrap().kind_as::<Sink>().unwrap().count();
    println!("   true={true_count} false={false_count}");
    anyhow::ensure!(true_count + false_count == 4, "every spawned agent should have been routed somewhere");
    Ok(())
}

fn scenario_gate_toggle() -> Result<()> {
    let mut sim = Simulator::builder(30, 0).build();

    let sink_id = sim.add_block(Block::new(Box::new(Sink::new()), 1));
    let mut gate_block = Block::new(Box::new(Gate::new(GateState::Closed, GateMode::One)), 1);
    gate_block.connect(0, sink_id);
    let gate_id = sim.add_block(gate_block);
    let mut queue_block = Block::new(Box::new(Queue::new()), 1);
    queue_block.connect(0, gate_id);
    let queue_id = sim.add_block(queue_block);
    let mut source_block = Block::new(Box::new(Source::new(|_tick: Tick| 1, Agent::new)), 1);
    source_block.connect(0, queue_id);
    sim.add_block(source_block);

    sim.schedule_event(5, Some(5), move |_tick, sim: &mut Simulator| {
        if let Some(gate) = sim.block_mut(gate_id).and_then(|b| b.kind_as_mut::<Gate>()) {
            gate.toggle();
        }
    })?;

    sim.run()?;

    let sink = sim.block(sink_id).unwrap().kind_as::<Sink>().unwrap();
    println!("   sink accepted {} agent(s) after {} ticks of a gate toggling every 5 ticks", sink.count(), sim.current_tick());
    Ok(())
}
