use csv::Reader;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::remap::types::{
    FillKind, Occupant, OccupantKind, SlotId, SourceSlot, DEFAULT_SLOT_CAPACITY,
};

/// Errors from time-of-day parsing.
///
/// Malformed input is never coerced to a default minute value; every failure
/// mode gets its own variant so callers can decide what to do with it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty time string")]
    Empty,
    #[error("malformed time: {0:?}")]
    Malformed(String),
    #[error("hour {0} out of range for 24-hour time")]
    HourOutOfRange(u32),
    #[error("hour {0} invalid with an AM/PM suffix (expected 1-12)")]
    MeridiemHourOutOfRange(u32),
    #[error("minute {0} out of range")]
    MinuteOutOfRange(u32),
    #[error("second {0} out of range")]
    SecondOutOfRange(u32),
}

#[derive(Clone, Copy, PartialEq)]
enum Meridiem {
    Am,
    Pm,
}

/// Splits an optional trailing meridiem token off a trimmed time string.
/// Accepts AM/PM with or without dots, any case, with or without a space
/// before the token.
fn split_meridiem(trimmed: &str) -> Result<(&str, Option<Meridiem>), ParseError> {
    let suffix_start = trimmed
        .rfind(|c: char| !c.is_ascii_alphabetic() && c != '.')
        .map(|i| i + 1)
        .unwrap_or(0);
    let suffix = &trimmed[suffix_start..];
    if suffix.is_empty() {
        return Ok((trimmed, None));
    }

    let normalized: String = suffix
        .chars()
        .filter(|c| *c != '.')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    match normalized.as_str() {
        "AM" => Ok((&trimmed[..suffix_start], Some(Meridiem::Am))),
        "PM" => Ok((&trimmed[..suffix_start], Some(Meridiem::Pm))),
        _ => Err(ParseError::Malformed(trimmed.to_string())),
    }
}

fn parse_component(part: Option<&str>, raw: &str) -> Result<u32, ParseError> {
    let text = part.ok_or_else(|| ParseError::Malformed(raw.to_string()))?;
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::Malformed(raw.to_string()));
    }
    text.parse()
        .map_err(|_| ParseError::Malformed(raw.to_string()))
}

/// Parses a time-of-day string to minutes since midnight (0..=1439).
///
/// Accepts `HH:MM`, `H:MM`, an optional `:SS` component (validated, then
/// discarded), and an optional trailing meridiem token (`AM`, `PM`, `A.M.`,
/// `P.M.`, case-insensitive). With a meridiem the hour must be 1-12; without
/// one it must be 0-23. Minutes and seconds must be 0-59.
pub fn parse_time(raw: &str) -> Result<u32, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let (clock, meridiem) = split_meridiem(trimmed)?;
    let clock = clock.trim_end();
    if clock.is_empty() {
        return Err(ParseError::Malformed(raw.to_string()));
    }

    let mut fields = clock.split(':');
    let hour = parse_component(fields.next(), raw)?;
    let minute = parse_component(fields.next(), raw)?;
    let second = fields.next().map(|s| parse_component(Some(s), raw)).transpose()?;
    if fields.next().is_some() {
        return Err(ParseError::Malformed(raw.to_string()));
    }

    if minute > 59 {
        return Err(ParseError::MinuteOutOfRange(minute));
    }
    if let Some(sec) = second {
        if sec > 59 {
            return Err(ParseError::SecondOutOfRange(sec));
        }
    }

    let hour24 = match meridiem {
        Some(m) => {
            if !(1..=12).contains(&hour) {
                return Err(ParseError::MeridiemHourOutOfRange(hour));
            }
            match m {
                Meridiem::Am => hour % 12,
                Meridiem::Pm => hour % 12 + 12,
            }
        }
        None => {
            if hour > 23 {
                return Err(ParseError::HourOutOfRange(hour));
            }
            hour
        }
    };

    Ok(hour24 * 60 + minute)
}

/// Formats minutes since midnight as a canonical 24-hour `HH:MM` string.
pub fn format_time(minutes: u32) -> String {
    let hours = (minutes / 60) % 24;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours, mins)
}

fn parse_capacity(value: &str) -> u32 {
    value.trim().parse().unwrap_or(DEFAULT_SLOT_CAPACITY)
}

fn parse_occupant_kind(
    kind: &str,
    invited_by: &str,
    fill_kind: &str,
    fill_label: &str,
) -> Result<OccupantKind, String> {
    match kind.trim().to_lowercase().as_str() {
        "member" => Ok(OccupantKind::Member),
        "guest" => {
            let inviter = invited_by.trim();
            if inviter.is_empty() {
                return Err("guest row is missing the inviting occupant id".to_string());
            }
            Ok(OccupantKind::Guest {
                invited_by: inviter.to_string(),
            })
        }
        "fill" => {
            let fill = match fill_kind.trim().to_lowercase().as_str() {
                "" | "blocked" => FillKind::Blocked,
                "league" => FillKind::League,
                "event" => FillKind::Event,
                other => return Err(format!("unknown fill kind: {}", other)),
            };
            let label = fill_label.trim();
            Ok(OccupantKind::Fill {
                fill,
                label: (!label.is_empty()).then(|| label.to_string()),
            })
        }
        other => Err(format!("unknown occupant kind: {}", other)),
    }
}

/// Loads a teesheet snapshot from a CSV file.
///
/// One row per occupant; a slot with no occupants appears as a single row
/// with the occupant columns left empty. Rows belonging to one slot are
/// aggregated in file order.
pub fn load_teesheet<P: AsRef<Path>>(
    csv_path: P,
) -> Result<Vec<SourceSlot>, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_path(csv_path)?;
    load_from_reader(&mut reader)
}

/// Loads a teesheet snapshot from CSV text (used by the upload endpoint).
pub fn load_teesheet_from_str(
    csv_text: &str,
) -> Result<Vec<SourceSlot>, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_reader(csv_text.as_bytes());
    load_from_reader(&mut reader)
}

fn load_from_reader<R: std::io::Read>(
    reader: &mut Reader<R>,
) -> Result<Vec<SourceSlot>, Box<dyn std::error::Error>> {
    let headers = reader.headers()?;

    // Find column indices
    let slot_id_col = headers.iter().position(|h| h.contains("slot id")).unwrap_or(0);
    let time_col = headers.iter().position(|h| h.contains("tee time")).unwrap_or(1);
    let capacity_col = headers.iter().position(|h| h.contains("capacity")).unwrap_or(2);
    let kind_col = headers
        .iter()
        .position(|h| h.contains("kind") && !h.contains("fill"))
        .unwrap_or(3);
    let occupant_id_col = headers.iter().position(|h| h.contains("occupant id")).unwrap_or(4);
    let name_col = headers.iter().position(|h| h.contains("display name")).unwrap_or(5);
    let invited_by_col = headers.iter().position(|h| h.contains("invited by")).unwrap_or(6);
    let fill_kind_col = headers.iter().position(|h| h.contains("fill kind")).unwrap_or(7);
    let fill_label_col = headers.iter().position(|h| h.contains("fill label")).unwrap_or(8);

    let mut slots: Vec<SourceSlot> = Vec::new();
    let mut index_by_id: HashMap<SlotId, usize> = HashMap::new();

    for result in reader.records() {
        let record = result?;

        let slot_id_text = record.get(slot_id_col).unwrap_or("").trim();
        let time = record.get(time_col).unwrap_or("").trim().to_string();
        if slot_id_text.is_empty() || time.is_empty() {
            continue; // Skip incomplete records
        }
        let slot_id: SlotId = slot_id_text
            .parse()
            .map_err(|_| format!("invalid slot id: {}", slot_id_text))?;

        let slot_index = *index_by_id.entry(slot_id).or_insert_with(|| {
            slots.push(SourceSlot {
                id: slot_id,
                time: time.clone(),
                capacity: parse_capacity(record.get(capacity_col).unwrap_or("")),
                occupants: Vec::new(),
            });
            slots.len() - 1
        });

        let occupant_id = record.get(occupant_id_col).unwrap_or("").trim().to_string();
        if occupant_id.is_empty() {
            continue; // Row only declares the slot itself
        }

        let kind = parse_occupant_kind(
            record.get(kind_col).unwrap_or(""),
            record.get(invited_by_col).unwrap_or(""),
            record.get(fill_kind_col).unwrap_or(""),
            record.get(fill_label_col).unwrap_or(""),
        )
        .map_err(|e| format!("slot {}: {}", slot_id, e))?;

        slots[slot_index].occupants.push(Occupant {
            id: occupant_id,
            kind,
            display_name: record.get(name_col).unwrap_or("").trim().to_string(),
            origin_slot_id: slot_id,
        });
    }

    Ok(slots)
}
