use crate::{rng, AgentId, SplitMix64};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-tick inputs shared by everything that runs inside one simulation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    pub seed: u64,
}

impl TickContext {
    pub fn new(tick: u64, dt_seconds: f32, seed: u64) -> Self {
        Self {
            tick,
            dt_seconds,
            seed,
        }
    }

    /// Context for the following frame, same step and seed.
    pub fn next(self) -> Self {
        Self {
            tick: self.tick.wrapping_add(1),
            ..self
        }
    }

    /// RNG for one agent and stream, reseeded every tick.
    ///
    /// Two calls with the same tick, seed, agent and stream yield identical sequences.
    pub fn rng_for_agent<A: AgentId>(&self, agent: A, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed ^ rng::mix64(self.tick), agent.stable_id(), stream);
        SplitMix64::new(seed)
    }
}
