use csv::WriterBuilder;
use std::path::Path;

use crate::remap::types::{FillKind, OccupantKind, SourceSlot};

const HEADER: [&str; 9] = [
    "slot id",
    "tee time",
    "capacity",
    "kind",
    "occupant id",
    "display name",
    "invited by",
    "fill kind",
    "fill label",
];

fn fill_kind_name(fill: FillKind) -> &'static str {
    match fill {
        FillKind::Blocked => "blocked",
        FillKind::League => "league",
        FillKind::Event => "event",
    }
}

/// Renders the teesheet in the same CSV shape the import reader accepts:
/// one row per occupant, one bare row for each empty slot.
pub fn export_teesheet_to_string(
    slots: &[SourceSlot],
) -> Result<String, Box<dyn std::error::Error>> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(HEADER)?;

    for slot in slots {
        let slot_id = slot.id.to_string();
        let capacity = slot.capacity.to_string();

        if slot.occupants.is_empty() {
            wtr.write_record([
                slot_id.as_str(),
                slot.time.as_str(),
                capacity.as_str(),
                "",
                "",
                "",
                "",
                "",
                "",
            ])?;
            continue;
        }

        for occupant in &slot.occupants {
            let (kind, invited_by, fill_kind, fill_label) = match &occupant.kind {
                OccupantKind::Member => ("member", "", "", ""),
                OccupantKind::Guest { invited_by } => ("guest", invited_by.as_str(), "", ""),
                OccupantKind::Fill { fill, label } => (
                    "fill",
                    "",
                    fill_kind_name(*fill),
                    label.as_deref().unwrap_or(""),
                ),
            };
            wtr.write_record([
                slot_id.as_str(),
                slot.time.as_str(),
                capacity.as_str(),
                kind,
                occupant.id.as_str(),
                occupant.display_name.as_str(),
                invited_by,
                fill_kind,
                fill_label,
            ])?;
        }
    }

    let bytes = wtr.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

/// Writes the teesheet CSV to a file (CLI output path).
pub fn export_teesheet_to_csv(
    slots: &[SourceSlot],
    csv_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = export_teesheet_to_string(slots)?;
    std::fs::write(csv_path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::load_teesheet_from_str;
    use crate::remap::types::Occupant;

    fn sheet() -> Vec<SourceSlot> {
        vec![
            SourceSlot {
                id: 10,
                time: "08:00".into(),
                capacity: 4,
                occupants: vec![
                    Occupant {
                        id: "m-1".into(),
                        kind: OccupantKind::Member,
                        display_name: "A. Palmer".into(),
                        origin_slot_id: 10,
                    },
                    Occupant {
                        id: "g-1".into(),
                        kind: OccupantKind::Guest {
                            invited_by: "m-1".into(),
                        },
                        display_name: "J. Nicklaus".into(),
                        origin_slot_id: 10,
                    },
                ],
            },
            SourceSlot {
                id: 11,
                time: "08:10".into(),
                capacity: 2,
                occupants: vec![Occupant {
                    id: "f-1".into(),
                    kind: OccupantKind::Fill {
                        fill: FillKind::League,
                        label: Some("Tuesday League".into()),
                    },
                    display_name: String::new(),
                    origin_slot_id: 11,
                }],
            },
            SourceSlot {
                id: 12,
                time: "08:20".into(),
                capacity: 4,
                occupants: vec![],
            },
        ]
    }

    #[test]
    fn test_export_import_roundtrip() {
        let original = sheet();
        let text = export_teesheet_to_string(&original).unwrap();
        let reloaded = load_teesheet_from_str(&text).unwrap();
        assert_eq!(reloaded, original);
    }

    #[test]
    fn test_empty_slot_gets_a_bare_row() {
        let text = export_teesheet_to_string(&sheet()).unwrap();
        let empty_row = text
            .lines()
            .find(|l| l.starts_with("12,"))
            .expect("empty slot row present");
        assert_eq!(empty_row, "12,08:20,4,,,,,,");
    }
}
