use serde::Deserialize;

use crate::parser::parse_time;
use crate::remap::types::{SlotId, Strategy, TargetSlot, DEFAULT_SLOT_CAPACITY};
use crate::remap::RemapOptions;

/// Largest group a single tee time can hold; capacity requests above this
/// are operator mistakes.
const MAX_SLOT_CAPACITY: u32 = 8;

/// Remap request from the admin frontend. Times arrive as raw strings and
/// are parsed (never defaulted) during validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RemapRequest {
    pub from_slot_id: SlotId,
    pub to_slot_id: SlotId,
    pub start_time: String,
    pub end_time: String,
    pub interval_a: u32,
    #[serde(default)]
    pub interval_b: Option<u32>,
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Extra tee times to include alongside the generated run.
    #[serde(default)]
    pub manual_times: Vec<String>,
    /// Tee times to drop from the working set after generation.
    #[serde(default)]
    pub remove_times: Vec<String>,
    pub strategy: Strategy,
    #[serde(default = "default_keep_together")]
    pub keep_together: bool,
}

fn default_keep_together() -> bool {
    true
}

/// Validates a remap request and converts it into engine options.
pub fn validate_request(req: &RemapRequest) -> Result<RemapOptions, String> {
    let start_minutes = parse_time(&req.start_time)
        .map_err(|e| format!("invalid start time: {}", e))?;
    let end_minutes =
        parse_time(&req.end_time).map_err(|e| format!("invalid end time: {}", e))?;
    if start_minutes > end_minutes {
        return Err(format!(
            "start time {} is after end time {}",
            req.start_time.trim(),
            req.end_time.trim()
        ));
    }

    if req.interval_a == 0 {
        return Err("interval must be at least 1 minute".to_string());
    }
    if req.interval_b == Some(0) {
        return Err("alternate interval must be at least 1 minute".to_string());
    }

    let capacity = req.capacity.unwrap_or(DEFAULT_SLOT_CAPACITY);
    if capacity == 0 || capacity > MAX_SLOT_CAPACITY {
        return Err(format!(
            "capacity must be between 1 and {}",
            MAX_SLOT_CAPACITY
        ));
    }

    let mut manual_slots = Vec::new();
    for raw in &req.manual_times {
        let minutes =
            parse_time(raw).map_err(|e| format!("invalid manual slot time {:?}: {}", raw, e))?;
        manual_slots.push(TargetSlot::new(0, minutes, capacity));
    }

    let mut removed_times = Vec::new();
    for raw in &req.remove_times {
        let minutes =
            parse_time(raw).map_err(|e| format!("invalid removed slot time {:?}: {}", raw, e))?;
        removed_times.push(minutes);
    }

    Ok(RemapOptions {
        from: req.from_slot_id,
        to: req.to_slot_id,
        start_minutes,
        end_minutes,
        interval_a: req.interval_a,
        interval_b: req.interval_b,
        capacity,
        manual_slots,
        removed_times,
        strategy: req.strategy,
        keep_together: req.keep_together,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RemapRequest {
        RemapRequest {
            from_slot_id: 10,
            to_slot_id: 12,
            start_time: "08:00".to_string(),
            end_time: "09:00".to_string(),
            interval_a: 10,
            interval_b: None,
            capacity: None,
            manual_times: Vec::new(),
            remove_times: Vec::new(),
            strategy: Strategy::ForwardOnly,
            keep_together: true,
        }
    }

    #[test]
    fn test_valid_request_converts() {
        let opts = validate_request(&request()).unwrap();
        assert_eq!(opts.start_minutes, 480);
        assert_eq!(opts.end_minutes, 540);
        assert_eq!(opts.capacity, DEFAULT_SLOT_CAPACITY);
        assert!(opts.manual_slots.is_empty());
    }

    #[test]
    fn test_bad_start_time_is_not_defaulted() {
        let mut req = request();
        req.start_time = "25:00".to_string();
        let err = validate_request(&req).unwrap_err();
        assert!(err.contains("invalid start time"), "{}", err);
    }

    #[test]
    fn test_reversed_window_rejected() {
        let mut req = request();
        req.start_time = "10:00".to_string();
        req.end_time = "09:00".to_string();
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let mut req = request();
        req.interval_a = 0;
        assert!(validate_request(&req).is_err());

        let mut req = request();
        req.interval_b = Some(0);
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_capacity_bounds() {
        let mut req = request();
        req.capacity = Some(0);
        assert!(validate_request(&req).is_err());

        req.capacity = Some(9);
        assert!(validate_request(&req).is_err());

        req.capacity = Some(2);
        assert_eq!(validate_request(&req).unwrap().capacity, 2);
    }

    #[test]
    fn test_manual_times_parsed_with_meridiem() {
        let mut req = request();
        req.manual_times = vec!["8:05 AM".to_string()];
        let opts = validate_request(&req).unwrap();
        assert_eq!(opts.manual_slots.len(), 1);
        assert_eq!(opts.manual_slots[0].start_minutes, 485);

        req.manual_times = vec!["whenever".to_string()];
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_remove_times_parsed_and_validated() {
        let mut req = request();
        req.remove_times = vec!["08:30".to_string()];
        let opts = validate_request(&req).unwrap();
        assert_eq!(opts.removed_times, vec![510]);

        req.remove_times = vec!["25:00".to_string()];
        assert!(validate_request(&req).is_err());
    }
}
