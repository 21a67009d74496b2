//! Decision vectors and the sources that produce them.

use ai_core::TickContext;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::layout::ActionShape;

/// One tick's numeric input: a discrete-slot array and a continuous-slot array.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecisionVector {
    pub discrete: Vec<i32>,
    pub continuous: Vec<f32>,
}

impl DecisionVector {
    pub fn new(discrete: impl Into<Vec<i32>>, continuous: impl Into<Vec<f32>>) -> Self {
        Self {
            discrete: discrete.into(),
            continuous: continuous.into(),
        }
    }

    /// All-zero vector with the given shape.
    pub fn zeros(shape: &ActionShape) -> Self {
        Self {
            discrete: vec![0; shape.discrete_len()],
            continuous: vec![0.0; shape.continuous_count],
        }
    }

    /// Whether both arrays have the lengths `shape` asks for.
    pub fn fits(&self, shape: &ActionShape) -> bool {
        self.discrete.len() == shape.discrete_len()
            && self.continuous.len() == shape.continuous_count
    }
}

/// The external decision process, seen from the controller.
///
/// It is handed the shape published for the agent and must return a vector that
/// fits it; the router rejects anything else.
pub trait DecisionSource<A> {
    fn decide(&mut self, ctx: &TickContext, agent: A, shape: &ActionShape) -> DecisionVector;
}

/// Always answers with zeros.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroDecisionSource;

impl<A> DecisionSource<A> for ZeroDecisionSource {
    fn decide(&mut self, _ctx: &TickContext, _agent: A, shape: &ActionShape) -> DecisionVector {
        DecisionVector::zeros(shape)
    }
}

/// Closure-backed source for scripted heuristics and manual control.
pub struct FnDecisionSource<A> {
    decide_fn: Box<dyn FnMut(&TickContext, A, &ActionShape) -> DecisionVector>,
}

impl<A> FnDecisionSource<A> {
    pub fn new(
        decide_fn: impl FnMut(&TickContext, A, &ActionShape) -> DecisionVector + 'static,
    ) -> Self {
        Self {
            decide_fn: Box::new(decide_fn),
        }
    }
}

impl<A> DecisionSource<A> for FnDecisionSource<A> {
    fn decide(&mut self, ctx: &TickContext, agent: A, shape: &ActionShape) -> DecisionVector {
        (self.decide_fn)(ctx, agent, shape)
    }
}

/// Replays recorded vectors in order, holding the last one once exhausted.
///
/// Answers with zeros if nothing was recorded.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisionSource {
    frames: Vec<DecisionVector>,
    cursor: usize,
}

impl ScriptedDecisionSource {
    pub fn new(frames: Vec<DecisionVector>) -> Self {
        Self { frames, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.cursor)
    }
}

impl<A> DecisionSource<A> for ScriptedDecisionSource {
    fn decide(&mut self, _ctx: &TickContext, _agent: A, shape: &ActionShape) -> DecisionVector {
        let frame = self
            .frames
            .get(self.cursor)
            .or_else(|| self.frames.last())
            .cloned()
            .unwrap_or_else(|| DecisionVector::zeros(shape));
        self.cursor = (self.cursor + 1).min(self.frames.len());
        frame
    }
}
