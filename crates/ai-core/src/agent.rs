use core::fmt::Debug;

/// Stable identifier for the entity that owns a set of abilities.
///
/// Deterministic routing requires:
/// - stable ordering (`Ord`) when several controllers are ticked together
/// - a stable numeric ID (`stable_id`) for RNG stream derivation and logs
pub trait AgentId: Copy + Ord + Eq + Debug {
    fn stable_id(self) -> u64;

    /// Short label used in log lines and error reports.
    fn label(self) -> String {
        format!("agent#{}", self.stable_id())
    }
}

impl AgentId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}

impl AgentId for u32 {
    fn stable_id(self) -> u64 {
        self as u64
    }
}

impl AgentId for usize {
    fn stable_id(self) -> u64 {
        self as u64
    }
}
