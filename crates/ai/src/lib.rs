//! Umbrella crate that re-exports the `ai-*` building blocks.
//!
//! This crate is intended as a convenient entrypoint for users; [`prelude`] pulls in
//! what a typical host needs to attach abilities and dispatch decision vectors.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use ai_core as core;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use ai_tools as tools;

#[cfg(feature = "abilities")]
#[cfg_attr(docsrs, doc(cfg(feature = "abilities")))]
pub use ai_abilities as abilities;

#[cfg(feature = "abilities")]
#[cfg_attr(docsrs, doc(cfg(feature = "abilities")))]
pub mod prelude {
    pub use ai_abilities::{
        Ability, AbilityController, AbilityId, ActionShape, BufferType, ControllerConfig,
        DecisionSource, DecisionVector, DispatchFlags, MultiAbilityInfo,
    };
    pub use ai_core::{AgentId, Blackboard, TickContext, WorldMut, WorldView};
    pub use ai_tools::{TraceLog, TRACE_LOG};
}
