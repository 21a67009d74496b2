use crate::AgentId;

/// Read-only world access.
///
/// The core crate does not prescribe which queries a world must expose beyond
/// what the ability router needs to gate activations. Specific subsystems should
/// define extension traits.
pub trait WorldView {
    type Agent: AgentId;

    /// Whether the agent's physical substrate (body, rig, collider) exists and can
    /// receive activations this tick.
    ///
    /// Worlds without a notion of spawning can keep the default.
    fn body_ready(&self, _agent: Self::Agent) -> bool {
        true
    }
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {}
