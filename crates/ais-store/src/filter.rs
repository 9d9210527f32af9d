//! Query-time filtering of raw feed messages into a position snapshot.
//!
//! Pure functions over a store snapshot. Messages that fail validation are
//! silently excluded from the result; they are never removed from storage.

use serde_json::Value;

/// Message type tag carrying vessel coordinates. Matched exactly.
pub const POSITION_REPORT: &str = "PositionReport";

/// Maximum number of ships returned to a caller, independent of store size.
pub const SNAPSHOT_LIMIT: usize = 100;

/// Result of filtering a store snapshot.
///
/// `ships` holds at most [`SNAPSHOT_LIMIT`] raw messages (the most recent
/// survivors, original order preserved); `total` is the survivor count before
/// truncation, which the query response reports as `count`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSnapshot {
    pub total: usize,
    pub ships: Vec<Value>,
}

/// Filter raw messages down to valid position reports.
///
/// Keeps messages tagged exactly [`POSITION_REPORT`] whose resolved
/// coordinates are finite and in range (latitude `[-90, 90]`, longitude
/// `[-180, 180]`, boundaries inclusive). Relative order is preserved and the
/// returned ships are the raw messages, not a reshaped view.
pub fn filter_position_reports(messages: &[Value]) -> FilteredSnapshot {
    let surviving: Vec<&Value> = messages
        .iter()
        .filter(|msg| is_valid_position_report(msg))
        .collect();

    let total = surviving.len();
    let ships = surviving
        .iter()
        .skip(total.saturating_sub(SNAPSHOT_LIMIT))
        .map(|msg| (*msg).clone())
        .collect();

    FilteredSnapshot { total, ships }
}

fn is_valid_position_report(msg: &Value) -> bool {
    if msg.get("MessageType").and_then(Value::as_str) != Some(POSITION_REPORT) {
        return false;
    }

    let lat = resolve_coordinate(msg, "latitude");
    let lon = resolve_coordinate(msg, "longitude");

    match (lat, lon) {
        (Some(lat), Some(lon)) => {
            lat.is_finite()
                && lon.is_finite()
                && (-90.0..=90.0).contains(&lat)
                && (-180.0..=180.0).contains(&lon)
        }
        _ => false,
    }
}

/// Resolve a coordinate field from its candidate locations.
///
/// Precedence: `MetaData`, then `Payload`, then the top level. The first
/// location where the field is present and numeric wins; a non-numeric value
/// at a higher-precedence location falls through to the next.
fn resolve_coordinate(msg: &Value, field: &str) -> Option<f64> {
    msg.get("MetaData")
        .and_then(|meta| numeric_field(meta, field))
        .or_else(|| msg.get("Payload").and_then(|payload| numeric_field(payload, field)))
        .or_else(|| numeric_field(msg, field))
}

fn numeric_field(obj: &Value, field: &str) -> Option<f64> {
    obj.get(field).and_then(Value::as_f64)
}
