//! Scrollable facility list.

use crate::common::constants::LIST_ADDRESS_WIDTH;
use crate::common::utils::truncate_chars;
use crate::geo::format_distance;
use crate::search::{Facility, FacilityId};

use super::marker_for;

/// Two lines per facility: marker, name and distance, then the address.
///
/// The selected facility is drawn with a `>` cursor.
pub fn list_lines(facilities: &[&Facility], selection: Option<FacilityId>) -> Vec<String> {
    let mut lines = Vec::with_capacity(facilities.len() * 2);

    for (index, facility) in facilities.iter().enumerate() {
        let cursor = if selection == Some(facility.id) {
            '>'
        } else {
            ' '
        };
        lines.push(format!(
            "{cursor} [{}] {}  ({})",
            marker_for(index),
            facility.name,
            format_distance(facility.distance_km)
        ));
        lines.push(format!(
            "      {}",
            truncate_chars(&facility.address, LIST_ADDRESS_WIDTH)
        ));
    }

    lines
}
