use std::collections::HashMap;

use super::types::{AssignmentPlan, OccupantGroup, SlotId, Strategy, TargetSlot};

/// Assigns occupant groups from a replaced source range into the target
/// working set.
///
/// `origins` maps each source slot id to its parsed start time; `None`
/// marks a slot whose stored time string did not parse. With
/// `keep_together` off, every occupant becomes its own singleton group
/// before placement. The plan is built in one pass over read-only inputs;
/// the returned target slots are the only mutable state and belong to the
/// plan alone.
pub fn auto_map(
    groups: &[OccupantGroup],
    targets: Vec<TargetSlot>,
    origins: &HashMap<SlotId, Option<u32>>,
    strategy: Strategy,
    keep_together: bool,
    source_range_slot_ids: Vec<SlotId>,
) -> AssignmentPlan {
    let mut units: Vec<OccupantGroup> = if keep_together {
        groups.to_vec()
    } else {
        groups
            .iter()
            .flat_map(|g| {
                g.members.iter().cloned().map(move |member| OccupantGroup {
                    origin_slot_id: g.origin_slot_id,
                    members: vec![member],
                })
            })
            .collect()
    };

    // Visit order: origin time ascending, unknown origins last. Both the
    // unknown tail and equal-time ties fall back to the origin slot id, and
    // the sort is stable, so the order is fully deterministic.
    units.sort_by_key(|g| {
        let origin = origins.get(&g.origin_slot_id).copied().flatten();
        (origin.is_none(), origin.unwrap_or(0), g.origin_slot_id)
    });

    let mut slots = targets;
    slots.sort_by_key(|s| s.start_minutes);
    let mut unassigned: Vec<OccupantGroup> = Vec::new();

    for group in units {
        let size = group.size();
        if size == 0 {
            continue;
        }

        let chosen = match strategy {
            Strategy::ForwardOnly => {
                match origins.get(&group.origin_slot_id).copied().flatten() {
                    // Never guess a fallback position from unparseable data.
                    None => None,
                    Some(origin) => pick_forward_only(&slots, origin, size),
                }
            }
            Strategy::EarliestAvailable => pick_earliest_available(&slots, size),
        };

        match chosen {
            Some(index) => slots[index].assigned.extend(group.members),
            None => unassigned.push(group),
        }
    }

    AssignmentPlan {
        source_range_slot_ids,
        target_slots: slots,
        unassigned_groups: unassigned,
    }
}

/// First capacity-eligible slot in ascending start order. Origin is ignored.
fn pick_earliest_available(slots: &[TargetSlot], group_size: usize) -> Option<usize> {
    slots
        .iter()
        .position(|s| s.capacity_state().has_room_for(group_size))
}

/// First capacity-eligible slot at or after the origin time; the list is
/// sorted ascending, so the first hit minimizes distance. When every
/// capacity-eligible slot is earlier than the origin, the latest of them is
/// used instead of leaving the group out.
fn pick_forward_only(slots: &[TargetSlot], origin: u32, group_size: usize) -> Option<usize> {
    let forward = slots
        .iter()
        .position(|s| s.start_minutes >= origin && s.capacity_state().has_room_for(group_size));
    if forward.is_some() {
        return forward;
    }
    slots
        .iter()
        .rposition(|s| s.capacity_state().has_room_for(group_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remap::generate::generate_slots;
    use crate::remap::types::{Occupant, OccupantKind};

    fn member(id: &str, origin: SlotId) -> Occupant {
        Occupant {
            id: id.to_string(),
            kind: OccupantKind::Member,
            display_name: format!("Member {}", id),
            origin_slot_id: origin,
        }
    }

    fn group(origin: SlotId, ids: &[&str]) -> OccupantGroup {
        OccupantGroup {
            origin_slot_id: origin,
            members: ids.iter().map(|id| member(id, origin)).collect(),
        }
    }

    fn origins(entries: &[(SlotId, Option<u32>)]) -> HashMap<SlotId, Option<u32>> {
        entries.iter().copied().collect()
    }

    fn assigned_ids(slot: &TargetSlot) -> Vec<&str> {
        slot.assigned.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn test_forward_only_keep_together_scenario() {
        // 08:00 foursome and 08:10 threesome into fresh 08:00/08:15 slots.
        let groups = vec![group(10, &["a1", "a2", "a3", "a4"]), group(11, &["b1", "b2", "b3"])];
        let targets = vec![TargetSlot::new(1, 480, 4), TargetSlot::new(2, 495, 4)];
        let origins = origins(&[(10, Some(480)), (11, Some(490))]);

        let plan = auto_map(
            &groups,
            targets,
            &origins,
            Strategy::ForwardOnly,
            true,
            vec![10, 11],
        );

        assert!(plan.unassigned_groups.is_empty());
        assert_eq!(assigned_ids(&plan.target_slots[0]), vec!["a1", "a2", "a3", "a4"]);
        // 08:15 is the nearest slot at or after the 08:10 origin.
        assert_eq!(assigned_ids(&plan.target_slots[1]), vec!["b1", "b2", "b3"]);
    }

    #[test]
    fn test_forward_only_never_places_before_origin() {
        // Origin 08:30; 08:00 has room but 08:45 is the first feasible slot.
        let groups = vec![group(10, &["a"])];
        let targets = vec![TargetSlot::new(1, 480, 4), TargetSlot::new(2, 525, 4)];
        let origins = origins(&[(10, Some(510))]);

        let plan = auto_map(&groups, targets, &origins, Strategy::ForwardOnly, true, vec![10]);
        assert!(plan.target_slots[0].assigned.is_empty());
        assert_eq!(assigned_ids(&plan.target_slots[1]), vec!["a"]);
    }

    #[test]
    fn test_forward_only_fallback_picks_latest() {
        // Every capacity-eligible slot is before the origin; the latest one
        // wins, not the earliest.
        let groups = vec![group(10, &["a", "b"])];
        let targets = vec![
            TargetSlot::new(1, 480, 4),
            TargetSlot::new(2, 490, 4),
            TargetSlot::new(3, 500, 1),
        ];
        let origins = origins(&[(10, Some(600))]);

        let plan = auto_map(&groups, targets, &origins, Strategy::ForwardOnly, true, vec![10]);
        assert!(plan.unassigned_groups.is_empty());
        assert_eq!(assigned_ids(&plan.target_slots[1]), vec!["a", "b"]);
    }

    #[test]
    fn test_forward_only_skips_unparseable_origin() {
        let groups = vec![group(10, &["a"]), group(11, &["b"])];
        let targets = generate_slots(480, 500, 10, None, 4);
        let origins = origins(&[(10, None), (11, Some(480))]);

        let plan = auto_map(&groups, targets, &origins, Strategy::ForwardOnly, true, vec![10, 11]);
        // The unparseable-origin group is never mapped, only reported.
        assert_eq!(plan.unassigned_groups.len(), 1);
        assert_eq!(plan.unassigned_groups[0].origin_slot_id, 10);
        assert_eq!(assigned_ids(&plan.target_slots[0]), vec!["b"]);
    }

    #[test]
    fn test_earliest_available_fills_in_ascending_order() {
        let groups = vec![
            group(12, &["c"]),
            group(10, &["a"]),
            group(11, &["b"]),
        ];
        let targets = vec![
            TargetSlot::new(1, 480, 1),
            TargetSlot::new(2, 490, 1),
            TargetSlot::new(3, 500, 1),
        ];
        // Origins only affect visit order here; placement ignores them.
        let origins = origins(&[(10, Some(480)), (11, Some(490)), (12, Some(500))]);

        let plan = auto_map(
            &groups,
            targets,
            &origins,
            Strategy::EarliestAvailable,
            true,
            vec![10, 11, 12],
        );
        assert_eq!(assigned_ids(&plan.target_slots[0]), vec!["a"]);
        assert_eq!(assigned_ids(&plan.target_slots[1]), vec!["b"]);
        assert_eq!(assigned_ids(&plan.target_slots[2]), vec!["c"]);
    }

    #[test]
    fn test_earliest_available_no_capacity_leaves_unassigned() {
        let groups = vec![group(10, &["a", "b"]), group(11, &["c", "d"])];
        let targets = vec![TargetSlot::new(1, 480, 2)];
        let origins = origins(&[(10, Some(480)), (11, Some(490))]);

        let plan = auto_map(
            &groups,
            targets,
            &origins,
            Strategy::EarliestAvailable,
            true,
            vec![10, 11],
        );
        assert_eq!(assigned_ids(&plan.target_slots[0]), vec!["a", "b"]);
        assert_eq!(plan.unassigned_groups.len(), 1);
        assert_eq!(plan.unassigned_groups[0].origin_slot_id, 11);
    }

    #[test]
    fn test_earliest_available_places_unknown_origin_last() {
        let groups = vec![group(11, &["x"]), group(10, &["a"])];
        let targets = vec![TargetSlot::new(1, 480, 1), TargetSlot::new(2, 490, 1)];
        let origins = origins(&[(10, Some(480)), (11, None)]);

        let plan = auto_map(
            &groups,
            targets,
            &origins,
            Strategy::EarliestAvailable,
            true,
            vec![10, 11],
        );
        // Known-origin group visits first and takes the earlier slot.
        assert_eq!(assigned_ids(&plan.target_slots[0]), vec!["a"]);
        assert_eq!(assigned_ids(&plan.target_slots[1]), vec!["x"]);
    }

    #[test]
    fn test_keep_together_group_lands_whole_or_not_at_all() {
        // Capacity 3 cannot take the foursome; capacity 4 can.
        let groups = vec![group(10, &["a", "b", "c", "d"])];
        let targets = vec![TargetSlot::new(1, 480, 3), TargetSlot::new(2, 490, 4)];
        let origins = origins(&[(10, Some(480))]);

        let plan = auto_map(&groups, targets, &origins, Strategy::ForwardOnly, true, vec![10]);
        assert!(plan.target_slots[0].assigned.is_empty());
        assert_eq!(plan.target_slots[1].assigned.len(), 4);
    }

    #[test]
    fn test_keep_together_off_splits_into_singletons() {
        let groups = vec![group(10, &["a", "b", "c", "d"])];
        let targets = vec![TargetSlot::new(1, 480, 3), TargetSlot::new(2, 490, 4)];
        let origins = origins(&[(10, Some(480))]);

        let plan = auto_map(&groups, targets, &origins, Strategy::ForwardOnly, false, vec![10]);
        // Singletons fill the first slot to its limit, then spill forward.
        assert_eq!(assigned_ids(&plan.target_slots[0]), vec!["a", "b", "c"]);
        assert_eq!(assigned_ids(&plan.target_slots[1]), vec!["d"]);
        assert!(plan.unassigned_groups.is_empty());
    }

    #[test]
    fn test_visit_order_is_origin_time_then_slot_id() {
        // Same origin minute on two slots: lower slot id goes first.
        let groups = vec![group(20, &["late"]), group(10, &["early"])];
        let targets = vec![TargetSlot::new(1, 480, 1), TargetSlot::new(2, 490, 1)];
        let origins = origins(&[(10, Some(480)), (20, Some(480))]);

        let plan = auto_map(&groups, targets, &origins, Strategy::ForwardOnly, true, vec![10, 20]);
        assert_eq!(assigned_ids(&plan.target_slots[0]), vec!["early"]);
        assert_eq!(assigned_ids(&plan.target_slots[1]), vec!["late"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        fn arbitrary_groups() -> impl proptest::strategy::Strategy<Value = Vec<OccupantGroup>> {
            proptest::collection::vec(1usize..=4, 1..12).prop_map(|sizes| {
                sizes
                    .iter()
                    .enumerate()
                    .map(|(i, &size)| {
                        let origin = 10 + i as SlotId;
                        let ids: Vec<String> =
                            (0..size).map(|j| format!("o-{}-{}", origin, j)).collect();
                        OccupantGroup {
                            origin_slot_id: origin,
                            members: ids
                                .iter()
                                .map(|id| Occupant {
                                    id: id.clone(),
                                    kind: OccupantKind::Member,
                                    display_name: id.clone(),
                                    origin_slot_id: origin,
                                })
                                .collect(),
                        }
                    })
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn prop_capacity_never_exceeded(
                groups in arbitrary_groups(),
                capacities in proptest::collection::vec(0u32..=4, 1..10),
                forward in proptest::bool::ANY,
                keep_together in proptest::bool::ANY,
            ) {
                let targets: Vec<TargetSlot> = capacities
                    .iter()
                    .enumerate()
                    .map(|(i, &cap)| TargetSlot::new(i as SlotId + 1, 480 + 10 * i as u32, cap))
                    .collect();
                let origins: HashMap<SlotId, Option<u32>> = groups
                    .iter()
                    .map(|g| (g.origin_slot_id, Some(400 + 7 * g.origin_slot_id)))
                    .collect();
                let strategy = if forward { crate::remap::types::Strategy::ForwardOnly } else { crate::remap::types::Strategy::EarliestAvailable };
                let range_ids: Vec<SlotId> = groups.iter().map(|g| g.origin_slot_id).collect();

                let plan = auto_map(&groups, targets, &origins, strategy, keep_together, range_ids);

                // No slot over capacity.
                for slot in &plan.target_slots {
                    prop_assert!(slot.assigned.len() as u32 <= slot.capacity);
                }

                // Every occupant appears exactly once across assigned + unassigned.
                let mut seen: HashSet<String> = HashSet::new();
                for slot in &plan.target_slots {
                    for occ in &slot.assigned {
                        prop_assert!(seen.insert(occ.id.clone()), "duplicate {}", occ.id);
                    }
                }
                for g in &plan.unassigned_groups {
                    for occ in &g.members {
                        prop_assert!(seen.insert(occ.id.clone()), "duplicate {}", occ.id);
                    }
                }
                let expected: usize = groups.iter().map(|g| g.size()).sum();
                prop_assert_eq!(seen.len(), expected);

                // Keep-together groups never straddle two slots.
                if keep_together {
                    for g in &groups {
                        let mut homes = HashSet::new();
                        for slot in &plan.target_slots {
                            if slot.assigned.iter().any(|o| o.origin_slot_id == g.origin_slot_id) {
                                homes.insert(slot.id);
                            }
                        }
                        prop_assert!(homes.len() <= 1);
                    }
                }
            }
        }
    }
}
