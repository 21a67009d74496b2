//! Bringing the link list in line with the set of live abilities.

use std::collections::{BTreeMap, BTreeSet};

use crate::capability::BufferType;
use crate::link::{renumber, sort_links, AbilityId, AbilityLink};

/// Returns the ordered link list for `live` abilities (given in attach order).
///
/// - links to abilities that are gone are dropped, as are repeated links to one ability
/// - a link whose ability now reports another buffer type is dropped and re-created
/// - live abilities without a link get one at the end of their type's siblings
///
/// The result is stably sorted by `(buffer_type, buffer_index)` and renumbered densely per
/// type. Running it again on its own output with the same `live` set returns it unchanged.
pub fn reconcile(current: &[AbilityLink], live: &[(AbilityId, BufferType)]) -> Vec<AbilityLink> {
    let live_types: BTreeMap<AbilityId, BufferType> = live.iter().copied().collect();

    let mut linked = BTreeSet::new();
    let mut links: Vec<AbilityLink> = current
        .iter()
        .filter(|link| live_types.get(&link.id) == Some(&link.buffer_type))
        .filter(|link| linked.insert(link.id))
        .copied()
        .collect();

    let mut next_index: BTreeMap<BufferType, usize> = BTreeMap::new();
    for link in &links {
        let next = next_index.entry(link.buffer_type).or_insert(0);
        *next = (*next).max(link.buffer_index + 1);
    }

    for &(id, buffer_type) in live {
        if !linked.insert(id) {
            continue;
        }
        let next = next_index.entry(buffer_type).or_insert(0);
        links.push(AbilityLink::new(id, buffer_type, *next));
        *next += 1;
    }

    sort_links(&mut links);
    renumber(&mut links);
    links
}
