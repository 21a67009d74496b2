use ai_abilities::link::is_well_ordered;
use ai_abilities::{reconcile, AbilityId, AbilityLink, BufferType};

use BufferType::{Composite, Continuous, Discrete};

fn link(id: u64, buffer_type: BufferType, index: usize) -> AbilityLink {
    AbilityLink::new(AbilityId(id), buffer_type, index)
}

fn live(entries: &[(u64, BufferType)]) -> Vec<(AbilityId, BufferType)> {
    entries.iter().map(|(id, t)| (AbilityId(*id), *t)).collect()
}

#[test]
fn fresh_links_follow_attach_order_within_each_type() {
    let live = live(&[
        (0, Composite),
        (1, Discrete),
        (2, Continuous),
        (3, Discrete),
        (4, Composite),
    ]);

    let links = reconcile(&[], &live);

    assert_eq!(
        links,
        vec![
            link(1, Discrete, 0),
            link(3, Discrete, 1),
            link(2, Continuous, 0),
            link(0, Composite, 0),
            link(4, Composite, 1),
        ]
    );
    assert!(is_well_ordered(&links));
}

#[test]
fn reconcile_is_idempotent() {
    let live = live(&[(0, Discrete), (1, Composite), (2, Continuous), (3, Discrete)]);

    let once = reconcile(&[], &live);
    let twice = reconcile(&once, &live);

    assert_eq!(once, twice);
}

#[test]
fn existing_order_survives_and_new_abilities_append() {
    // Sibling order set by an earlier reconcile is kept even when it differs from
    // attach order.
    let current = vec![link(3, Discrete, 0), link(1, Discrete, 1)];
    let live = live(&[(1, Discrete), (3, Discrete), (5, Discrete)]);

    let links = reconcile(&current, &live);

    assert_eq!(
        links,
        vec![
            link(3, Discrete, 0),
            link(1, Discrete, 1),
            link(5, Discrete, 2)
        ]
    );
}

#[test]
fn dead_links_are_dropped_and_indices_densified() {
    let current = vec![
        link(0, Discrete, 0),
        link(1, Discrete, 1),
        link(2, Discrete, 2),
        link(3, Composite, 0),
        link(4, Composite, 1),
    ];
    let live = live(&[(0, Discrete), (2, Discrete), (4, Composite)]);

    let links = reconcile(&current, &live);

    assert_eq!(
        links,
        vec![
            link(0, Discrete, 0),
            link(2, Discrete, 1),
            link(4, Composite, 0)
        ]
    );
}

#[test]
fn duplicate_links_keep_the_first_occurrence() {
    let current = vec![
        link(7, Continuous, 0),
        link(8, Continuous, 1),
        link(7, Continuous, 2),
    ];
    let live = live(&[(7, Continuous), (8, Continuous)]);

    let links = reconcile(&current, &live);

    assert_eq!(links, vec![link(7, Continuous, 0), link(8, Continuous, 1)]);
    assert!(is_well_ordered(&links));
}

#[test]
fn ability_that_changed_type_is_relinked_under_its_new_type() {
    let current = vec![
        link(0, Discrete, 0),
        link(1, Discrete, 1),
        link(2, Continuous, 0),
    ];
    let live = live(&[(0, Discrete), (1, Continuous), (2, Continuous)]);

    let links = reconcile(&current, &live);

    assert_eq!(
        links,
        vec![
            link(0, Discrete, 0),
            link(2, Continuous, 0),
            link(1, Continuous, 1)
        ]
    );
}

#[test]
fn unsorted_input_is_sorted_stably() {
    let current = vec![
        link(4, Composite, 0),
        link(2, Continuous, 5),
        link(1, Discrete, 3),
        link(0, Discrete, 3),
    ];
    let live = live(&[(0, Discrete), (1, Discrete), (2, Continuous), (4, Composite)]);

    let links = reconcile(&current, &live);

    assert_eq!(
        links,
        vec![
            link(1, Discrete, 0),
            link(0, Discrete, 1),
            link(2, Continuous, 0),
            link(4, Composite, 0),
        ]
    );
}

#[test]
fn empty_live_set_clears_links() {
    let current = vec![link(0, Discrete, 0), link(1, Composite, 0)];
    assert!(reconcile(&current, &[]).is_empty());
}

#[test]
fn well_ordered_rejects_gaps_duplicates_and_type_regressions() {
    assert!(is_well_ordered(&[]));
    assert!(!is_well_ordered(&[link(0, Discrete, 1)]));
    assert!(!is_well_ordered(&[
        link(0, Discrete, 0),
        link(0, Continuous, 0)
    ]));
    assert!(!is_well_ordered(&[
        link(0, Continuous, 0),
        link(1, Discrete, 0)
    ]));
}
