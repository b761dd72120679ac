use thiserror::Error;
use tracing::info;

use super::types::{SlotId, SourceSlot, TargetSlot};
use crate::parser::{format_time, parse_time};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("source slot {0} is no longer on the teesheet")]
    MissingSourceSlot(SlotId),
    #[error("source range is no longer contiguous at slot {0}")]
    RangeNotContiguous(SlotId),
    #[error("replacement slot at {time} collides with surviving slot {slot}")]
    TimeCollision { time: String, slot: SlotId },
    #[error("cannot apply a plan with an empty source range")]
    EmptySourceRange,
}

/// The sole writer of durable teesheet state. A remap produces a plan; only
/// an executor turns it into committed slots, all-or-nothing.
pub trait PlanExecutor {
    fn apply(
        &mut self,
        source_range: &[SlotId],
        targets: &[TargetSlot],
    ) -> Result<(), PersistenceError>;
}

/// In-memory teesheet, the portal's system of record.
/// (In production this sits in front of a database; the contract is the
/// same: `apply` either fully commits or leaves the sheet untouched.)
#[derive(Debug)]
pub struct Teesheet {
    slots: Vec<SourceSlot>,
    version: u64,
    next_slot_id: SlotId,
}

impl Default for Teesheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Teesheet {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            version: 0,
            next_slot_id: 1,
        }
    }

    pub fn from_slots(slots: Vec<SourceSlot>) -> Self {
        let next_slot_id = slots.iter().map(|s| s.id).max().map_or(1, |m| m + 1);
        Self {
            slots,
            version: 0,
            next_slot_id,
        }
    }

    pub fn slots(&self) -> &[SourceSlot] {
        &self.slots
    }

    /// Monotonic change counter. Preview hands this to the client; apply
    /// refuses to run against a different value, forcing a recompute from a
    /// fresh snapshot instead of a partial retry.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replaces the whole sheet (snapshot upload). Bumps the version so any
    /// plan computed against the old sheet is rejected.
    pub fn replace_all(&mut self, slots: Vec<SourceSlot>) {
        self.next_slot_id = slots.iter().map(|s| s.id).max().map_or(1, |m| m + 1);
        self.slots = slots;
        self.version += 1;
    }

    /// Index of the range start, after checking the whole range is present
    /// and contiguous in sheet order.
    fn locate_range(&self, source_range: &[SlotId]) -> Result<usize, PersistenceError> {
        let first = *source_range.first().ok_or(PersistenceError::EmptySourceRange)?;
        let start = self
            .slots
            .iter()
            .position(|s| s.id == first)
            .ok_or(PersistenceError::MissingSourceSlot(first))?;
        for (offset, &id) in source_range.iter().enumerate() {
            match self.slots.get(start + offset) {
                Some(slot) if slot.id == id => {}
                Some(_) => return Err(PersistenceError::RangeNotContiguous(id)),
                None => return Err(PersistenceError::MissingSourceSlot(id)),
            }
        }
        Ok(start)
    }
}

impl PlanExecutor for Teesheet {
    fn apply(
        &mut self,
        source_range: &[SlotId],
        targets: &[TargetSlot],
    ) -> Result<(), PersistenceError> {
        let start = self.locate_range(source_range)?;
        let end = start + source_range.len();

        // A replacement time may not land on a slot that survives the
        // splice. Surviving slots with unparseable times cannot collide.
        for target in targets {
            for (index, survivor) in self.slots.iter().enumerate() {
                if index >= start && index < end {
                    continue;
                }
                if parse_time(&survivor.time) == Ok(target.start_minutes) {
                    return Err(PersistenceError::TimeCollision {
                        time: format_time(target.start_minutes),
                        slot: survivor.id,
                    });
                }
            }
        }

        // All checks passed; build the complete replacement sheet before
        // touching stored state.
        let mut replacement: Vec<SourceSlot> = Vec::with_capacity(targets.len());
        let mut next_id = self.next_slot_id;
        for target in targets {
            replacement.push(SourceSlot {
                id: next_id,
                time: format_time(target.start_minutes),
                capacity: target.capacity,
                occupants: target.assigned.clone(),
            });
            next_id += 1;
        }

        let mut new_sheet = Vec::with_capacity(self.slots.len() - source_range.len() + targets.len());
        new_sheet.extend_from_slice(&self.slots[..start]);
        new_sheet.extend(replacement);
        new_sheet.extend_from_slice(&self.slots[end..]);

        self.slots = new_sheet;
        self.next_slot_id = next_id;
        self.version += 1;

        info!(
            removed = source_range.len(),
            inserted = targets.len(),
            version = self.version,
            "applied slot range replacement"
        );
        Ok(())
    }
}
