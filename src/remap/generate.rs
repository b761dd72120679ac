use super::types::{SlotId, TargetSlot};

/// Generates an ascending run of empty target slots from `start` to `end`
/// (both in minutes since midnight, inclusive of any slot landing exactly on
/// `end`).
///
/// The cadence is `interval_a` between consecutive slots, or alternating
/// `interval_a, interval_b, interval_a, ...` when `interval_b` is given.
/// Ids are provisional (1-based emission order); `merge_slots` renumbers the
/// final working set.
pub fn generate_slots(
    start: u32,
    end: u32,
    interval_a: u32,
    interval_b: Option<u32>,
    capacity: u32,
) -> Vec<TargetSlot> {
    let mut slots = Vec::new();
    if interval_a == 0 || interval_b == Some(0) {
        return slots; // A zero interval would never advance
    }

    let mut current = start;
    let mut use_a = true;
    let mut next_id: SlotId = 1;
    while current <= end {
        slots.push(TargetSlot::new(next_id, current, capacity));
        next_id += 1;
        let step = if use_a {
            interval_a
        } else {
            interval_b.unwrap_or(interval_a)
        };
        if interval_b.is_some() {
            use_a = !use_a;
        }
        current += step;
    }
    slots
}

/// Merges manually authored slots with generated ones into one working set.
///
/// Union by `start_minutes`: when both sides name the same minute, the
/// existing slot wins (its capacity and any pre-assigned occupants survive;
/// the generated slot is discarded). The result is sorted ascending and ids
/// are renumbered sequentially so they are unique and stable within the
/// plan.
pub fn merge_slots(existing: Vec<TargetSlot>, generated: Vec<TargetSlot>) -> Vec<TargetSlot> {
    let mut merged = existing;
    for candidate in generated {
        if merged.iter().any(|s| s.start_minutes == candidate.start_minutes) {
            continue;
        }
        merged.push(candidate);
    }
    merged.sort_by_key(|s| s.start_minutes);
    for (index, slot) in merged.iter_mut().enumerate() {
        slot.id = (index + 1) as SlotId;
    }
    merged
}

/// Adds a single manually authored slot to the working set. Pure list
/// operation; mapping occupants is always a separate explicit step.
pub fn insert_slot(working: Vec<TargetSlot>, slot: TargetSlot) -> Vec<TargetSlot> {
    merge_slots(working, vec![slot])
}

/// Removes the slot at `start_minutes` from the working set, if present.
/// Pure list operation with no mapping side effects.
pub fn remove_slot(working: Vec<TargetSlot>, start_minutes: u32) -> Vec<TargetSlot> {
    let filtered: Vec<TargetSlot> = working
        .into_iter()
        .filter(|s| s.start_minutes != start_minutes)
        .collect();
    merge_slots(filtered, Vec::new())
}
