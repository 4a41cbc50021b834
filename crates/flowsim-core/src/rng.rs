//! The simulator's single seeded PRNG stream.
//!
//! The distilled spec is explicit that randomness in this engine has
//! exactly one source: the simulator's own PRNG, used to break same-tick
//! ties in the timed-event scheduler and made available to user-supplied
//! block callbacks (stochastic spawn schedules, probabilistic routing,
//! etc). There is deliberately no per-agent RNG stream the way the teacher
//! framework has one — the distilled spec does not model per-agent
//! behavioural replanning, so that extra entropy source has no consumer
//! here.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.gen()
    }

    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p)
    }

    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.0);
    }

    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(&mut self.0)
    }
}
