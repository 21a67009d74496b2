#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Why a composite ability consumed its slots without being activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SkipReason {
    Disabled,
    BodyNotReady,
}

/// What the router handed to an ability.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActivationKind {
    Discrete(i32),
    Continuous(f32),
    Batch {
        discrete: Vec<i32>,
        continuous: Vec<f32>,
    },
    Skipped(SkipReason),
}

/// One activation (or skipped activation) recorded during a dispatch.
///
/// Plain data so it can be recorded during simulation and rendered later by tooling.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    /// Stable id of the ability inside its registry.
    pub ability: u64,
    pub name: Cow<'static, str>,
    pub kind: ActivationKind,
}

impl TraceEvent {
    pub fn new(
        tick: u64,
        ability: u64,
        name: impl Into<Cow<'static, str>>,
        kind: ActivationKind,
    ) -> Self {
        Self {
            tick,
            ability,
            name: name.into(),
            kind,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self.kind, ActivationKind::Skipped(_))
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn for_tick(&self, tick: u64) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.tick == tick)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

use ai_core::{BbKey, Blackboard};

/// Blackboard key for collecting events in-memory.
pub const TRACE_LOG: BbKey<TraceLog> = BbKey::new(0xA11D_7ACE_0000_0001);
/// Blackboard key for streaming events into a user-provided sink.
pub const TRACE_SINK: BbKey<Box<dyn TraceSink>> = BbKey::new(0xA11D_7ACE_0000_0002);

/// Whether anything on this blackboard would receive an event.
///
/// Lets callers skip building events (and their allocations) when tracing is off.
pub fn is_enabled(blackboard: &Blackboard) -> bool {
    blackboard.contains(TRACE_LOG) || blackboard.contains(TRACE_SINK)
}

pub fn emit(blackboard: &mut Blackboard, event: TraceEvent) {
    if let Some(log) = blackboard.get_mut(TRACE_LOG) {
        log.push(event.clone());
    }
    if let Some(sink) = blackboard.get_mut(TRACE_SINK) {
        sink.emit(event);
    }
}
