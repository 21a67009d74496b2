//! Computing the decision-vector shape from the ordered links.
//!
//! The slot order is the wire contract with the decision process: every regular
//! ability in sibling order (one discrete branch or one continuous channel each),
//! then every composite ability in sibling order with its branches and channels in
//! declared order. Changing it breaks any policy trained against the old order.

use ai_core::WorldMut;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::capability::{Ability, BufferType};
use crate::error::{LayoutError, LayoutFault};
use crate::link::{composite_links, regular_links, slot_order, AbilityId, AbilityLink};
use crate::registry::AbilityRegistry;

/// Dimensions a decision vector must have.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActionShape {
    /// Size of every discrete branch, in slot order.
    pub discrete_branches: Vec<u32>,
    pub continuous_count: usize,
}

impl ActionShape {
    pub fn discrete_len(&self) -> usize {
        self.discrete_branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discrete_branches.is_empty() && self.continuous_count == 0
    }
}

/// Where a composite ability's slices start in the global buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeOffsets {
    pub discrete_start: usize,
    pub continuous_start: usize,
}

/// A validated layout, not yet written back to the abilities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutPlan {
    pub shape: ActionShape,
    pub offsets: Vec<(AbilityId, CompositeOffsets)>,
}

impl LayoutPlan {
    /// Writes composite offsets into each ability's [`crate::MultiAbilityInfo`].
    pub fn apply<W>(&self, registry: &mut AbilityRegistry<W>)
    where
        W: WorldMut + 'static,
    {
        for (id, offsets) in &self.offsets {
            if let Some(info) = registry.get_mut(*id).and_then(|a| a.multi_info_mut()) {
                info.set_offsets(offsets.discrete_start, offsets.continuous_start);
            }
        }
    }
}

/// Largest branch whose values all fit the `i32` discrete buffer.
pub const MAX_BRANCH_SIZE: u32 = i32::MAX as u32;

pub struct LayoutPlanner;

impl LayoutPlanner {
    /// Validates every linked ability and computes shape and composite offsets.
    ///
    /// Nothing is written; see [`LayoutPlan::apply`].
    pub fn plan<W>(
        links: &[AbilityLink],
        registry: &AbilityRegistry<W>,
    ) -> Result<LayoutPlan, LayoutError>
    where
        W: WorldMut + 'static,
    {
        let mut plan = LayoutPlan::default();

        for link in regular_links(links) {
            let ability = resolve(link, registry)?;
            match link.buffer_type {
                BufferType::Discrete => {
                    let size = ability.branch_size();
                    if size < 2 {
                        return Err(invalid(link, ability, LayoutFault::BranchTooSmall { size }));
                    }
                    if size > MAX_BRANCH_SIZE {
                        return Err(invalid(link, ability, LayoutFault::BranchTooLarge { size }));
                    }
                    plan.shape.discrete_branches.push(size);
                }
                BufferType::Continuous => plan.shape.continuous_count += 1,
                BufferType::Composite => {}
            }
        }

        for link in composite_links(links) {
            let ability = resolve(link, registry)?;
            let Some(info) = ability.multi_info() else {
                return Err(invalid(link, ability, LayoutFault::MissingSubLayout));
            };
            if let Some(index) = info.discrete_branches().iter().position(|size| *size == 0) {
                return Err(invalid(link, ability, LayoutFault::EmptyBranch { index }));
            }
            if let Some(size) = info
                .discrete_branches()
                .iter()
                .copied()
                .find(|size| *size > MAX_BRANCH_SIZE)
            {
                return Err(invalid(link, ability, LayoutFault::BranchTooLarge { size }));
            }

            plan.offsets.push((
                link.id,
                CompositeOffsets {
                    discrete_start: plan.shape.discrete_branches.len(),
                    continuous_start: plan.shape.continuous_count,
                },
            ));
            plan.shape
                .discrete_branches
                .extend_from_slice(info.discrete_branches());
            plan.shape.continuous_count += info.continuous_count();
        }

        Ok(plan)
    }

    /// Plans and, if valid, applies the layout. On error no ability is touched.
    pub fn compute<W>(
        links: &[AbilityLink],
        registry: &mut AbilityRegistry<W>,
    ) -> Result<ActionShape, LayoutError>
    where
        W: WorldMut + 'static,
    {
        let plan = Self::plan(links, registry)?;
        plan.apply(registry);
        tracing::debug!(
            branches = ?plan.shape.discrete_branches,
            continuous = plan.shape.continuous_count,
            composites = plan.offsets.len(),
            "ability layout computed"
        );
        Ok(plan.shape)
    }

    /// Continuous channels summed over every linked ability's own slot usage.
    ///
    /// Agrees with [`ActionShape::continuous_count`] for any valid layout.
    pub fn total_continuous_slots<W>(
        links: &[AbilityLink],
        registry: &AbilityRegistry<W>,
    ) -> Result<usize, LayoutError>
    where
        W: WorldMut + 'static,
    {
        slot_order(links).try_fold(0, |total, link| {
            Ok(total + resolve(link, registry)?.slot_usage().continuous)
        })
    }
}

fn resolve<'r, W>(
    link: &AbilityLink,
    registry: &'r AbilityRegistry<W>,
) -> Result<&'r dyn Ability<W>, LayoutError>
where
    W: WorldMut + 'static,
{
    let ability = registry
        .get(link.id)
        .ok_or(LayoutError::DanglingLink(link.id))?;
    let actual = ability.buffer_type();
    if actual != link.buffer_type {
        return Err(invalid(
            link,
            ability,
            LayoutFault::TypeChanged {
                cached: link.buffer_type,
                actual,
            },
        ));
    }
    Ok(ability)
}

fn invalid<W>(link: &AbilityLink, ability: &dyn Ability<W>, fault: LayoutFault) -> LayoutError
where
    W: WorldMut + 'static,
{
    LayoutError::InvalidLayout {
        id: link.id,
        ability: ability.name().to_owned(),
        fault,
    }
}
