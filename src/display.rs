use std::fs::File;
use std::io::Write;

use crate::parser::format_time;
use crate::remap::types::{
    AssignmentPlan, Occupant, OccupantKind, SlotCapacity, SourceSlot, ValidationResult,
};

/// Formats an occupant for sheet listings: kind tag, name, and for guests
/// the inviting occupant.
pub fn format_occupant(occupant: &Occupant) -> String {
    match &occupant.kind {
        OccupantKind::Member => format!("[M] {}", occupant.display_name),
        OccupantKind::Guest { invited_by } => {
            format!("[G] {} (guest of {})", occupant.display_name, invited_by)
        }
        OccupantKind::Fill { label, .. } => match label {
            Some(text) => format!("[F] {}", text),
            None => "[F] blocked".to_string(),
        },
    }
}

/// Prints the current teesheet, one line per slot.
pub fn print_teesheet(title: &str, slots: &[SourceSlot]) {
    println!("\n=== {} ===", title);
    println!("Total slots: {}", slots.len());

    for slot in slots {
        let capacity = SlotCapacity::new(slot.capacity, slot.occupants.len() as u32);
        if slot.occupants.is_empty() {
            println!("  {} ({} open) -> [EMPTY]", slot.time, capacity.remaining());
        } else {
            let names: Vec<String> = slot.occupants.iter().map(format_occupant).collect();
            println!(
                "  {} ({} open) -> {}",
                slot.time,
                capacity.remaining(),
                names.join(", ")
            );
        }
    }
}

/// Prints a proposed plan with its feasibility summary.
pub fn print_plan(plan: &AssignmentPlan, validation: &ValidationResult) {
    println!("\n=== Proposed Remap ===");
    println!(
        "Replacing {} source slots with {} target slots",
        plan.source_range_slot_ids.len(),
        plan.target_slots.len()
    );
    println!(
        "Demand {} / capacity {}{}",
        validation.total_occupants,
        validation.total_capacity,
        if validation.overflow { "  !! OVERFLOW" } else { "" }
    );

    if !plan.unassigned_groups.is_empty() {
        let stranded: usize = plan.unassigned_groups.iter().map(|g| g.size()).sum();
        println!("Unplaced occupants ({}):", stranded);
        for group in &plan.unassigned_groups {
            for occupant in &group.members {
                println!(
                    "  - {} (from slot {})",
                    format_occupant(occupant),
                    group.origin_slot_id
                );
            }
        }
    }

    for slot in &plan.target_slots {
        let capacity = slot.capacity_state();
        if slot.assigned.is_empty() {
            println!(
                "  {} ({} open) -> [EMPTY]",
                format_time(slot.start_minutes),
                capacity.remaining()
            );
        } else {
            let names: Vec<String> = slot.assigned.iter().map(format_occupant).collect();
            println!(
                "  {} ({} open) -> {}",
                format_time(slot.start_minutes),
                capacity.remaining(),
                names.join(", ")
            );
        }
    }
}

/// Writes a teesheet to a file in the format: HH:MM occupant, occupant, ...
pub fn write_teesheet_to_file(
    title: &str,
    slots: &[SourceSlot],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;

    writeln!(file, "** {} **", title)?;
    for slot in slots {
        if slot.occupants.is_empty() {
            writeln!(file, "{} [EMPTY]", slot.time)?;
        } else {
            let names: Vec<String> = slot.occupants.iter().map(format_occupant).collect();
            writeln!(file, "{} {}", slot.time, names.join(", "))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remap::types::FillKind;

    #[test]
    fn test_format_occupant_variants() {
        let member = Occupant {
            id: "m-1".into(),
            kind: OccupantKind::Member,
            display_name: "A. Palmer".into(),
            origin_slot_id: 10,
        };
        assert_eq!(format_occupant(&member), "[M] A. Palmer");

        let guest = Occupant {
            id: "g-1".into(),
            kind: OccupantKind::Guest {
                invited_by: "m-1".into(),
            },
            display_name: "J. Nicklaus".into(),
            origin_slot_id: 10,
        };
        assert_eq!(format_occupant(&guest), "[G] J. Nicklaus (guest of m-1)");

        let fill = Occupant {
            id: "f-1".into(),
            kind: OccupantKind::Fill {
                fill: FillKind::League,
                label: Some("Tuesday League".into()),
            },
            display_name: String::new(),
            origin_slot_id: 10,
        };
        assert_eq!(format_occupant(&fill), "[F] Tuesday League");

        let blocked = Occupant {
            id: "f-2".into(),
            kind: OccupantKind::Fill {
                fill: FillKind::Blocked,
                label: None,
            },
            display_name: String::new(),
            origin_slot_id: 10,
        };
        assert_eq!(format_occupant(&blocked), "[F] blocked");
    }
}
