pub mod generate;
pub mod mapper;
pub mod range;
pub mod store;
pub mod types;
pub mod validate;

pub use generate::{generate_slots, insert_slot, merge_slots, remove_slot};
pub use mapper::auto_map;
pub use range::{select_range, RangeError, RangeSelection};
pub use store::{PersistenceError, PlanExecutor, Teesheet};
pub use types::{
    AssignmentPlan, FillKind, Occupant, OccupantGroup, OccupantKind, SlotCapacity, SlotId,
    SourceSlot, Strategy, TargetSlot, ValidationResult, DEFAULT_SLOT_CAPACITY,
};
pub use validate::validate_plan;

/// Everything a single remap run needs, already parsed and validated.
#[derive(Debug, Clone)]
pub struct RemapOptions {
    pub from: SlotId,
    pub to: SlotId,
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub interval_a: u32,
    pub interval_b: Option<u32>,
    pub capacity: u32,
    /// Manually authored slots merged with the generated run; on a time
    /// collision the manual slot wins.
    pub manual_slots: Vec<TargetSlot>,
    /// Times excluded from the working set after generation and merge.
    pub removed_times: Vec<u32>,
    pub strategy: Strategy,
    pub keep_together: bool,
}

/// Runs the full remap pipeline over a sheet snapshot: select the source
/// range, generate and merge the target working set, map every occupant
/// group, and summarize feasibility. Pure; committing the plan is a
/// separate step through a [`PlanExecutor`].
pub fn plan_remap(
    sheet: &[SourceSlot],
    opts: &RemapOptions,
) -> Result<(AssignmentPlan, ValidationResult), RangeError> {
    let selection = select_range(sheet, opts.from, opts.to)?;
    let generated = generate_slots(
        opts.start_minutes,
        opts.end_minutes,
        opts.interval_a,
        opts.interval_b,
        opts.capacity,
    );
    let mut working = Vec::new();
    for manual in &opts.manual_slots {
        working = insert_slot(working, manual.clone());
    }
    working = merge_slots(working, generated);
    for &minutes in &opts.removed_times {
        working = remove_slot(working, minutes);
    }
    let plan = auto_map(
        &selection.groups,
        working,
        &selection.origin_minutes,
        opts.strategy,
        opts.keep_together,
        selection.slot_ids,
    );
    let validation = validate_plan(&plan);
    Ok((plan, validation))
}
