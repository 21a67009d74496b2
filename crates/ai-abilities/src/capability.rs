//! The contract every pluggable ability implements.

use std::any::{type_name, Any};
use std::fmt;

use ai_core::{Blackboard, TickContext, WorldMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::mediator::{AbilityLookup, Mediator};

/// Which part of the decision vector an ability reads.
///
/// The variant order is the link sort order: discrete links first, composites last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BufferType {
    Discrete,
    Continuous,
    Composite,
}

impl BufferType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discrete => "discrete",
            Self::Continuous => "continuous",
            Self::Composite => "composite",
        }
    }

    /// Simple (single-slot) abilities are laid out before composites.
    pub const fn is_regular(self) -> bool {
        matches!(self, Self::Discrete | Self::Continuous)
    }
}

impl fmt::Display for BufferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of decision-vector slots an ability consumes per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotUsage {
    pub discrete: usize,
    pub continuous: usize,
}

impl SlotUsage {
    /// Usage implied by a buffer role; composites report their own sub-layout.
    pub fn for_role(buffer_type: BufferType, multi: Option<&MultiAbilityInfo>) -> Self {
        match buffer_type {
            BufferType::Discrete => Self {
                discrete: 1,
                continuous: 0,
            },
            BufferType::Continuous => Self {
                discrete: 0,
                continuous: 1,
            },
            BufferType::Composite => multi.map(MultiAbilityInfo::slot_usage).unwrap_or_default(),
        }
    }
}

impl core::ops::AddAssign for SlotUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.discrete += rhs.discrete;
        self.continuous += rhs.continuous;
    }
}

/// Sub-layout of a composite ability and its place in the global buffer.
///
/// Branch sizes and the continuous count are declared by the ability; the start
/// offsets are written by the layout planner every time links are reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiAbilityInfo {
    discrete_branches: Vec<u32>,
    continuous_count: usize,
    discrete_start_offset: usize,
    continuous_start_offset: usize,
}

impl MultiAbilityInfo {
    pub fn new(discrete_branches: impl Into<Vec<u32>>, continuous_count: usize) -> Self {
        Self {
            discrete_branches: discrete_branches.into(),
            continuous_count,
            discrete_start_offset: 0,
            continuous_start_offset: 0,
        }
    }

    /// Appends a discrete branch; declaration order is consumption order.
    pub fn with_branch(mut self, size: u32) -> Self {
        self.discrete_branches.push(size);
        self
    }

    pub fn discrete_branches(&self) -> &[u32] {
        &self.discrete_branches
    }

    pub fn continuous_count(&self) -> usize {
        self.continuous_count
    }

    pub fn discrete_start_offset(&self) -> usize {
        self.discrete_start_offset
    }

    pub fn continuous_start_offset(&self) -> usize {
        self.continuous_start_offset
    }

    pub fn slot_usage(&self) -> SlotUsage {
        SlotUsage {
            discrete: self.discrete_branches.len(),
            continuous: self.continuous_count,
        }
    }

    pub(crate) fn set_offsets(&mut self, discrete_start: usize, continuous_start: usize) {
        self.discrete_start_offset = discrete_start;
        self.continuous_start_offset = continuous_start;
    }
}

/// What an ability sees during its one-time setup.
pub struct SetupContext<'a, A> {
    pub owner: A,
    pub lookup: &'a dyn AbilityLookup,
}

/// Type-erased access used for registry lookups by concrete ability type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn concrete_type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn concrete_type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// A pluggable unit that consumes a slice of the decision vector.
///
/// `buffer_type` is the discriminator the router switches on; only the entry
/// points matching it are ever called:
/// - [`BufferType::Discrete`]: [`Ability::activate_discrete`] with a value in `[0, branch_size)`
/// - [`BufferType::Continuous`]: [`Ability::activate_continuous`]
/// - [`BufferType::Composite`]: [`Ability::activate_discrete_batch`] then
///   [`Ability::activate_continuous_batch`], once per tick, with the slices described by
///   [`Ability::multi_info`]
///
/// Abilities never hold a reference to the router or to each other. They coordinate
/// through the agent's [`Blackboard`] and find peers through the [`Mediator`] handed to
/// [`Ability::bind`].
pub trait Ability<W>: AsAny
where
    W: WorldMut + 'static,
{
    /// Stable name used in logs and error reports.
    fn name(&self) -> &str;

    fn buffer_type(&self) -> BufferType;

    /// Distinct values of the single discrete slot. Only read for discrete abilities.
    fn branch_size(&self) -> u32 {
        2
    }

    fn multi_info(&self) -> Option<&MultiAbilityInfo> {
        None
    }

    fn multi_info_mut(&mut self) -> Option<&mut MultiAbilityInfo> {
        None
    }

    fn slot_usage(&self) -> SlotUsage {
        SlotUsage::for_role(self.buffer_type(), self.multi_info())
    }

    /// Composite activations are skipped (slots still consumed) while this is false.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Receives the owning agent and the shared mediator, immediately before [`Ability::setup`].
    fn bind(&mut self, _owner: W::Agent, _mediator: Mediator) {}

    /// One-time setup, run right after this ability's own [`Ability::bind`].
    ///
    /// Abilities are bound and set up one at a time in link order, so peers later in
    /// that order are not bound yet. Use `ctx.lookup` (complete from the start) to find
    /// them rather than expecting their state to be initialized.
    fn setup(&mut self, _ctx: &SetupContext<'_, W::Agent>) -> Result<(), SetupError> {
        Ok(())
    }

    fn activate_discrete(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
        _value: i32,
    ) {
    }

    fn activate_continuous(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
        _value: f32,
    ) {
    }

    fn activate_discrete_batch(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
        _values: &[i32],
    ) {
    }

    fn activate_continuous_batch(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
        _values: &[f32],
    ) {
    }
}

/// Owner and mediator fields an ability can embed and fill from [`Ability::bind`].
#[derive(Debug, Clone)]
pub struct AbilityBinding<A> {
    owner: Option<A>,
    mediator: Option<Mediator>,
}

impl<A> Default for AbilityBinding<A> {
    fn default() -> Self {
        Self {
            owner: None,
            mediator: None,
        }
    }
}

impl<A: Copy> AbilityBinding<A> {
    pub fn bind(&mut self, owner: A, mediator: Mediator) {
        self.owner = Some(owner);
        self.mediator = Some(mediator);
    }

    pub fn owner(&self) -> Option<A> {
        self.owner
    }

    pub fn mediator(&self) -> Option<&Mediator> {
        self.mediator.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.owner.is_some()
    }
}
