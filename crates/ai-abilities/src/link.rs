//! Bindings between abilities and their buffer role.

use std::collections::BTreeSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::capability::BufferType;

/// Stable identity of an ability inside its registry. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AbilityId(pub u64);

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability#{}", self.0)
    }
}

/// One ability bound to a buffer role and its position among same-role siblings.
///
/// `buffer_type` caches the ability's own discriminator so links can be sorted and
/// partitioned without touching the abilities. `buffer_index` is owned by
/// [`crate::reconcile`]; do not maintain it by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AbilityLink {
    pub id: AbilityId,
    pub buffer_type: BufferType,
    pub buffer_index: usize,
}

impl AbilityLink {
    pub fn new(id: AbilityId, buffer_type: BufferType, buffer_index: usize) -> Self {
        Self {
            id,
            buffer_type,
            buffer_index,
        }
    }

    pub fn sort_key(&self) -> (BufferType, usize) {
        (self.buffer_type, self.buffer_index)
    }
}

/// Stable sort by `(buffer_type, buffer_index)`.
pub fn sort_links(links: &mut [AbilityLink]) {
    links.sort_by_key(AbilityLink::sort_key);
}

/// Rewrites indices to `0..n` per buffer type, keeping the current order.
pub fn renumber(links: &mut [AbilityLink]) {
    let mut next = [0usize; 3];
    for link in links.iter_mut() {
        let slot = &mut next[link.buffer_type as usize];
        link.buffer_index = *slot;
        *slot += 1;
    }
}

/// Discrete and continuous links, in sibling order.
pub fn regular_links(links: &[AbilityLink]) -> impl Iterator<Item = &AbilityLink> {
    links.iter().filter(|l| l.buffer_type.is_regular())
}

pub fn composite_links(links: &[AbilityLink]) -> impl Iterator<Item = &AbilityLink> {
    links
        .iter()
        .filter(|l| l.buffer_type == BufferType::Composite)
}

/// Links in the order the router consumes slots: regular first, then composite.
pub fn slot_order(links: &[AbilityLink]) -> impl Iterator<Item = &AbilityLink> {
    regular_links(links).chain(composite_links(links))
}

/// Whether `links` satisfies the ordering invariants reconciliation establishes:
/// sorted, indices dense from 0 per type, each ability linked once.
pub fn is_well_ordered(links: &[AbilityLink]) -> bool {
    let mut ids = BTreeSet::new();
    let mut next = [0usize; 3];
    let mut last_type = None;
    for link in links {
        if !ids.insert(link.id) {
            return false;
        }
        if last_type.is_some_and(|t| t > link.buffer_type) {
            return false;
        }
        last_type = Some(link.buffer_type);
        let slot = &mut next[link.buffer_type as usize];
        if link.buffer_index != *slot {
            return false;
        }
        *slot += 1;
    }
    true
}
