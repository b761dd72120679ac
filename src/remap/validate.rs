use super::types::{AssignmentPlan, ValidationResult};

/// Aggregate capacity feasibility for a plan.
///
/// `total_occupants` is total demand: everyone the plan accounts for,
/// assigned or not. `overflow` compares that demand against the summed
/// capacity of the plan's target slots. Purely advisory; nothing here
/// resolves an overflow, the caller decides whether to add capacity, add
/// slots, or abort.
pub fn validate_plan(plan: &AssignmentPlan) -> ValidationResult {
    let assigned: u32 = plan
        .target_slots
        .iter()
        .map(|s| s.capacity_state().occupied)
        .sum();
    let unassigned: u32 = plan
        .unassigned_groups
        .iter()
        .map(|g| g.size() as u32)
        .sum();
    let total_capacity: u32 = plan.target_slots.iter().map(|s| s.capacity).sum();
    let total_occupants = assigned + unassigned;

    ValidationResult {
        total_occupants,
        total_capacity,
        overflow: total_occupants > total_capacity,
    }
}
