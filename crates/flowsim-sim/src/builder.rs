//! Fluent builder for constructing a [`Simulator`].

use crate::simulator::Simulator;
use crate::view_hook::ViewHook;

/// Builds a [`Simulator`] from its two required inputs (`max_ticks`, `seed`)
/// plus an optional [`ViewHook`].
///
/// ```rust,ignore
/// let mut sim = Simulator::builder(1_000, 42)
///     .view_hook(MyProgressPrinter::default())
///     .build();
/// sim.run()?;
/// ```
pub struct SimulatorBuilder {
    max_ticks: u64,
    seed: u64,
    view_hook: Option<Box<dyn ViewHook>>,
}

impl SimulatorBuilder {
    pub(crate) fn new(max_ticks: u64, seed: u64) -> Self {
        Self { max_ticks, seed, view_hook: None }
    }

    pub fn view_hook(mut self, hook: impl ViewHook + 'static) -> Self {
        self.view_hook = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Simulator {
        let mut sim = Simulator::new(self.max_ticks, self.seed);
        if let Some(hook) = self.view_hook {
            sim.set_view_hook(hook);
        }
        sim
    }
}

impl Simulator {
    pub fn builder(max_ticks: u64, seed: u64) -> SimulatorBuilder {
        SimulatorBuilder::new(max_ticks, seed)
    }
}
