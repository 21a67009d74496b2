//! Tooling primitives for deterministic game AI.
//!
//! Records what the ability router activated each tick. Engine-agnostic; inspectors
//! and debug drawing belong in adapter crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{
    emit, is_enabled, ActivationKind, NullTraceSink, SkipReason, TraceEvent, TraceLog, TraceSink,
    VecTraceSink, TRACE_LOG, TRACE_SINK,
};
