//! `flowsim-sim` — the simulator: tick pipeline, builder, `ViewHook`.
//!
//! # Five-phase tick loop
//!
//! ```text
//! for tick in 0..max_ticks:
//!   ① Fire       — timed events due at `tick` (scheduling-locked).
//!   ② Step       — every spatial manager, in registration order, dt=1.
//!   ③ Deliver    — agent events staged during the previous tick.
//!   ④ Tick       — every block, in registration order.
//!   ⑤ Collect    — emitted events staged for next tick; ViewHook fires last.
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use flowsim_sim::Simulator;
//! use flowsim_block::{Block, Sink};
//!
//! let mut sim = Simulator::builder(100, 42).build();
//! let sink = sim.add_block(Block::new(Box::new(Sink::new()), 1));
//! sim.run()?;
//! ```

mod builder;
mod error;
mod simulator;
mod view_hook;

pub use builder::SimulatorBuilder;
pub use error::{SimError, SimResult};
pub use simulator::Simulator;
pub use view_hook::{NoopViewHook, ViewHook};
