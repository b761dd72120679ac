use std::collections::HashMap;
use thiserror::Error;

use super::types::{OccupantGroup, SlotId, SourceSlot};
use crate::parser::parse_time;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("slot {0} not found on the teesheet")]
    UnknownSlot(SlotId),
    #[error("range bounds reversed: slot {from} comes after slot {to}")]
    ReversedBounds { from: SlotId, to: SlotId },
}

/// The contiguous run of source slots a remap replaces, plus everything the
/// mapper needs to know about it.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSelection {
    /// Ids of every slot in the range, in sheet order (occupied or not).
    pub slot_ids: Vec<SlotId>,
    /// One group per occupied source slot, occupant order preserved.
    pub groups: Vec<OccupantGroup>,
    /// Parsed start time per range slot. `None` marks a stored time string
    /// that failed to parse; the mapper decides what that means, not us.
    pub origin_minutes: HashMap<SlotId, Option<u32>>,
}

/// Selects the contiguous inclusive range between two slot ids on the sheet
/// and collects all occupants within it.
pub fn select_range(
    sheet: &[SourceSlot],
    from: SlotId,
    to: SlotId,
) -> Result<RangeSelection, RangeError> {
    let start = sheet
        .iter()
        .position(|s| s.id == from)
        .ok_or(RangeError::UnknownSlot(from))?;
    let end = sheet
        .iter()
        .position(|s| s.id == to)
        .ok_or(RangeError::UnknownSlot(to))?;
    if start > end {
        return Err(RangeError::ReversedBounds { from, to });
    }

    let mut slot_ids = Vec::new();
    let mut groups = Vec::new();
    let mut origin_minutes = HashMap::new();

    for slot in &sheet[start..=end] {
        slot_ids.push(slot.id);
        origin_minutes.insert(slot.id, parse_time(&slot.time).ok());
        if !slot.occupants.is_empty() {
            groups.push(OccupantGroup {
                origin_slot_id: slot.id,
                members: slot.occupants.clone(),
            });
        }
    }

    Ok(RangeSelection {
        slot_ids,
        groups,
        origin_minutes,
    })
}
