//! Per-tick dispatch of a decision vector to the linked abilities.
//!
//! Composite sub-layouts are only known at runtime, so slots cannot be addressed by
//! a static schema. The router replays the traversal the layout planner used (regular
//! links, then composites, sibling order within each) with one cursor per array.

use ai_core::{AgentId, Blackboard, DeterministicRng, TickContext, WorldMut};
use ai_tools::{ActivationKind, SkipReason, TraceEvent};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::capability::{Ability, BufferType, SlotUsage};
use crate::decision::DecisionVector;
use crate::error::DispatchError;
use crate::layout::MAX_BRANCH_SIZE;
use crate::link::{composite_links, regular_links, slot_order, AbilityId, AbilityLink};
use crate::registry::AbilityRegistry;

/// RNG stream used for randomized dispatch.
pub const DISPATCH_RNG_STREAM: u64 = 0xAB11_D15B;

/// Control flags for one dispatch. `suppressed` wins over `randomized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DispatchFlags {
    pub suppressed: bool,
    pub randomized: bool,
}

impl DispatchFlags {
    pub const NORMAL: Self = Self {
        suppressed: false,
        randomized: false,
    };

    pub const SUPPRESSED: Self = Self {
        suppressed: true,
        randomized: false,
    };

    pub const RANDOMIZED: Self = Self {
        suppressed: false,
        randomized: true,
    };
}

/// What one dispatch consumed and activated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub tick: u64,
    pub discrete_consumed: usize,
    pub continuous_consumed: usize,
    /// Abilities that received an activation call, in call order.
    pub activated: Vec<AbilityId>,
    /// Composites whose slots were consumed without activation.
    pub skipped: Vec<(AbilityId, SkipReason)>,
}

/// Inputs of one dispatch that are only read.
#[derive(Debug, Clone, Copy)]
pub struct DispatchRequest<'a> {
    pub ctx: &'a TickContext,
    pub links: &'a [AbilityLink],
    pub vector: &'a DecisionVector,
    pub flags: DispatchFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotPolicy {
    Suppressed,
    Randomized,
    Buffer,
}

impl SlotPolicy {
    fn from_flags(flags: DispatchFlags) -> Self {
        if flags.suppressed {
            Self::Suppressed
        } else if flags.randomized {
            Self::Randomized
        } else {
            Self::Buffer
        }
    }
}

/// Resolves slot values in consumption order. Lengths are validated up front.
struct SlotReader<'v, R> {
    vector: &'v DecisionVector,
    policy: SlotPolicy,
    rng: &'v mut R,
    discrete_cursor: usize,
    continuous_cursor: usize,
}

impl<R: DeterministicRng> SlotReader<'_, R> {
    fn discrete(&mut self, branch_size: u32) -> i32 {
        let raw = self.vector.discrete[self.discrete_cursor];
        self.discrete_cursor += 1;
        match self.policy {
            SlotPolicy::Suppressed => 0,
            SlotPolicy::Randomized => {
                self.rng.next_below(branch_size.min(MAX_BRANCH_SIZE)) as i32
            }
            SlotPolicy::Buffer => raw,
        }
    }

    fn continuous(&mut self) -> f32 {
        let raw = self.vector.continuous[self.continuous_cursor];
        self.continuous_cursor += 1;
        match self.policy {
            SlotPolicy::Suppressed => 0.0,
            SlotPolicy::Randomized => self.rng.next_f32_signed(),
            SlotPolicy::Buffer => raw,
        }
    }
}

pub struct BufferRouter;

impl BufferRouter {
    /// Slots the links will consume, resolving every link on the way.
    pub fn expected_slots<W>(
        ctx: &TickContext,
        links: &[AbilityLink],
        registry: &AbilityRegistry<W>,
    ) -> Result<SlotUsage, DispatchError>
    where
        W: WorldMut + 'static,
    {
        let mut total = SlotUsage::default();
        for link in slot_order(links) {
            total += link_usage(ctx, link, registry)?;
        }
        Ok(total)
    }

    /// Slices `request.vector` and forwards each slice to its ability.
    ///
    /// The vector is checked against the links before anything is activated; on
    /// mismatch no ability sees a call. Disabled composites, and composites whose
    /// owner's body is not ready, still consume their slots.
    pub fn dispatch<W, R>(
        request: DispatchRequest<'_>,
        registry: &mut AbilityRegistry<W>,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
        rng: &mut R,
    ) -> Result<DispatchReport, DispatchError>
    where
        W: WorldMut + 'static,
        R: DeterministicRng,
    {
        let DispatchRequest {
            ctx,
            links,
            vector,
            flags,
        } = request;

        check_shape(ctx, links, registry, vector)?;

        let mut reader = SlotReader {
            vector,
            policy: SlotPolicy::from_flags(flags),
            rng,
            discrete_cursor: 0,
            continuous_cursor: 0,
        };
        let mut report = DispatchReport {
            tick: ctx.tick,
            ..DispatchReport::default()
        };

        for link in regular_links(links) {
            let Some(ability) = registry.get_mut(link.id) else {
                continue;
            };
            let kind = match link.buffer_type {
                BufferType::Discrete => {
                    let value = reader.discrete(ability.branch_size());
                    ability.activate_discrete(ctx, agent, world, blackboard, value);
                    ActivationKind::Discrete(value)
                }
                BufferType::Continuous => {
                    let value = reader.continuous();
                    ability.activate_continuous(ctx, agent, world, blackboard, value);
                    ActivationKind::Continuous(value)
                }
                BufferType::Composite => continue,
            };
            report.activated.push(link.id);
            trace(ctx, blackboard, link.id, ability, kind);
        }

        for link in composite_links(links) {
            let Some(ability) = registry.get_mut(link.id) else {
                continue;
            };
            let (discrete, continuous) = match ability.multi_info() {
                Some(info) => {
                    let discrete: Vec<i32> = info
                        .discrete_branches()
                        .iter()
                        .map(|size| reader.discrete(*size))
                        .collect();
                    let continuous: Vec<f32> = (0..info.continuous_count())
                        .map(|_| reader.continuous())
                        .collect();
                    (discrete, continuous)
                }
                None => (Vec::new(), Vec::new()),
            };

            let skip = if !ability.is_enabled() {
                Some(SkipReason::Disabled)
            } else if !world.body_ready(agent) {
                Some(SkipReason::BodyNotReady)
            } else {
                None
            };

            let kind = match skip {
                Some(reason) => {
                    tracing::debug!(
                        tick = ctx.tick,
                        id = %link.id,
                        ability = ability.name(),
                        ?reason,
                        "composite activation skipped"
                    );
                    report.skipped.push((link.id, reason));
                    ActivationKind::Skipped(reason)
                }
                None => {
                    ability.activate_discrete_batch(ctx, agent, world, blackboard, &discrete);
                    ability.activate_continuous_batch(ctx, agent, world, blackboard, &continuous);
                    report.activated.push(link.id);
                    ActivationKind::Batch {
                        discrete,
                        continuous,
                    }
                }
            };
            trace(ctx, blackboard, link.id, ability, kind);
        }

        report.discrete_consumed = reader.discrete_cursor;
        report.continuous_consumed = reader.continuous_cursor;
        debug_assert_eq!(report.discrete_consumed, vector.discrete.len());
        debug_assert_eq!(report.continuous_consumed, vector.continuous.len());

        tracing::trace!(
            tick = ctx.tick,
            agent = %agent.label(),
            activated = report.activated.len(),
            skipped = report.skipped.len(),
            ?flags,
            "decision vector dispatched"
        );
        Ok(report)
    }
}

fn link_usage<W>(
    ctx: &TickContext,
    link: &AbilityLink,
    registry: &AbilityRegistry<W>,
) -> Result<SlotUsage, DispatchError>
where
    W: WorldMut + 'static,
{
    let ability = registry.get(link.id).ok_or(DispatchError::DanglingLink {
        tick: ctx.tick,
        id: link.id,
    })?;
    Ok(SlotUsage::for_role(link.buffer_type, ability.multi_info()))
}

fn check_shape<W>(
    ctx: &TickContext,
    links: &[AbilityLink],
    registry: &AbilityRegistry<W>,
    vector: &DecisionVector,
) -> Result<(), DispatchError>
where
    W: WorldMut + 'static,
{
    let mut expected = SlotUsage::default();
    let mut first_affected = None;
    for link in slot_order(links) {
        expected += link_usage(ctx, link, registry)?;
        if first_affected.is_none()
            && (expected.discrete > vector.discrete.len()
                || expected.continuous > vector.continuous.len())
        {
            first_affected = registry.get(link.id).map(|a| a.name().to_owned());
        }
    }

    if expected.discrete == vector.discrete.len() && expected.continuous == vector.continuous.len()
    {
        return Ok(());
    }

    let err = DispatchError::BufferShapeMismatch {
        tick: ctx.tick,
        expected_discrete: expected.discrete,
        actual_discrete: vector.discrete.len(),
        expected_continuous: expected.continuous,
        actual_continuous: vector.continuous.len(),
        first_affected,
    };
    tracing::warn!(%err, "decision vector rejected");
    Err(err)
}

fn trace<W>(
    ctx: &TickContext,
    blackboard: &mut Blackboard,
    id: AbilityId,
    ability: &dyn Ability<W>,
    kind: ActivationKind,
) where
    W: WorldMut + 'static,
{
    if !ai_tools::is_enabled(blackboard) {
        return;
    }
    ai_tools::emit(
        blackboard,
        TraceEvent::new(ctx.tick, id.0, ability.name().to_owned(), kind),
    );
}
