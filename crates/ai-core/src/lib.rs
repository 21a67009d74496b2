//! Deterministic, engine-agnostic AI kernel primitives.
//!
//! Shared by the ability router and its tooling: agent identity, per-tick context,
//! seeded RNG streams, world access traits and the per-agent blackboard.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod blackboard;
pub mod rng;
pub mod tick;
pub mod world;

pub use agent::AgentId;
pub use blackboard::{BbKey, Blackboard, TypeMismatch};
pub use rng::{DeterministicRng, SplitMix64};
pub use tick::TickContext;
pub use world::{WorldMut, WorldView};
