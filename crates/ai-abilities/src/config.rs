use ai_core::AgentId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decision cadence of an [`crate::AbilityController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Ask the decision source for a new vector every this many ticks (0 behaves as 1).
    pub decision_period: u32,
    /// Phase shift so agents sharing a period do not all decide on the same tick.
    pub decision_offset: u32,
    /// On ticks without a decision, dispatch the last decision again instead of idling.
    pub repeat_between_decisions: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            decision_period: 1,
            decision_offset: 0,
            repeat_between_decisions: true,
        }
    }
}

impl ControllerConfig {
    /// Config whose offset is derived from the agent's stable id.
    pub fn deterministic(agent: impl AgentId, decision_period: u32) -> Self {
        let period = decision_period.max(1);
        let offset = (agent.stable_id() % (period as u64)) as u32;
        Self {
            decision_period: period,
            decision_offset: offset,
            ..Self::default()
        }
    }

    pub fn should_decide(&self, tick: u64) -> bool {
        let period = self.decision_period.max(1) as u64;
        (tick.wrapping_add(self.decision_offset as u64) % period) == 0
    }
}
