use serde::{Deserialize, Serialize};

/// Identifier for a teesheet slot. Persistent ids are handed out by the
/// store at commit time; ids inside an in-memory plan are only stable for
/// the lifetime of that plan.
pub type SlotId = u32;

/// Default seats per generated tee time.
pub const DEFAULT_SLOT_CAPACITY: u32 = 4;

/// Placeholder fill categories used on the teesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillKind {
    Blocked,
    League,
    Event,
}

/// What kind of occupant holds a teesheet position.
///
/// A closed set: each variant carries exactly the fields valid for it, so
/// downstream code matches on the variant instead of probing optional
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OccupantKind {
    Member,
    Guest { invited_by: String },
    Fill { fill: FillKind, label: Option<String> },
}

/// A member, guest, or placeholder fill occupying one tee time.
/// Immutable once read from the source range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: String,
    #[serde(flatten)]
    pub kind: OccupantKind,
    pub display_name: String,
    pub origin_slot_id: SlotId,
}

/// One stored row of the teesheet. The `time` string is kept raw; it is
/// parsed where needed and an unparseable value stays visible instead of
/// being replaced by a sortable sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSlot {
    pub id: SlotId,
    pub time: String,
    pub capacity: u32,
    pub occupants: Vec<Occupant>,
}

/// Capacity bookkeeping for a single slot. The mapper, the validator, and
/// the stats endpoint all query this type; capacity arithmetic lives nowhere
/// else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCapacity {
    pub limit: u32,
    pub occupied: u32,
}

impl SlotCapacity {
    pub fn new(limit: u32, occupied: u32) -> Self {
        Self { limit, occupied }
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.occupied)
    }

    pub fn has_room_for(&self, group_size: usize) -> bool {
        group_size as u32 <= self.remaining()
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }
}

/// A proposed tee time in a remap plan. Created empty by the generator or
/// supplied manually by the caller, then filled by the mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSlot {
    pub id: SlotId,
    pub start_minutes: u32,
    pub capacity: u32,
    pub assigned: Vec<Occupant>,
}

impl TargetSlot {
    pub fn new(id: SlotId, start_minutes: u32, capacity: u32) -> Self {
        Self {
            id,
            start_minutes,
            capacity,
            assigned: Vec::new(),
        }
    }

    pub fn capacity_state(&self) -> SlotCapacity {
        SlotCapacity::new(self.capacity, self.assigned.len() as u32)
    }
}

/// The unit the mapper assigns atomically: all occupants sharing an origin
/// slot under keep-together, or a single occupant otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupantGroup {
    pub origin_slot_id: SlotId,
    pub members: Vec<Occupant>,
}

impl OccupantGroup {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Policy for weighing a target slot's proximity to a group's original time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ForwardOnly,
    EarliestAvailable,
}

/// The proposed, not-yet-committed replacement of a slot range. Built in one
/// pass from read-only inputs; committing it is the executor's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentPlan {
    pub source_range_slot_ids: Vec<SlotId>,
    pub target_slots: Vec<TargetSlot>,
    pub unassigned_groups: Vec<OccupantGroup>,
}

/// Aggregate feasibility summary for a plan. Advisory only; the caller
/// decides whether to add capacity, add slots, or abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub total_occupants: u32,
    pub total_capacity: u32,
    pub overflow: bool,
}
