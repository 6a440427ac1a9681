//! Character-cell map centered on the anchor.
//!
//! The map covers the same ±0.1° window the bounded search uses. Cells are
//! addressed row-major from the north-west corner; facilities outside the
//! window are not drawn.

use crate::common::constants::VIEWBOX_DELTA_DEGREES;
use crate::common::utils::truncate_chars;
use crate::geo::{Anchor, Coord, format_distance};
use crate::search::{Facility, FacilityId};

use super::marker_for;

const SELF_MARKER: char = '@';
const SELECTED_MARKER: char = '*';
const EMPTY_CELL: char = '.';

// Window edges computed from the anchor carry rounding error
const EDGE_TOLERANCE: f64 = 1e-9;

/// Grid cell for `coord`, if it falls inside the window around `center`.
pub fn project(center: &Coord, coord: &Coord, width: usize, height: usize) -> Option<(usize, usize)> {
    let span = 2.0 * VIEWBOX_DELTA_DEGREES;
    let x = (coord.lng - (center.lng - VIEWBOX_DELTA_DEGREES)) / span;
    let y = ((center.lat + VIEWBOX_DELTA_DEGREES) - coord.lat) / span;

    let inside = |v: f64| (-EDGE_TOLERANCE..=1.0 + EDGE_TOLERANCE).contains(&v);
    if !inside(x) || !inside(y) {
        return None;
    }
    let (x, y) = (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));

    let col = (x * (width - 1) as f64).round() as usize;
    let row = (y * (height - 1) as f64).round() as usize;
    Some((row, col))
}

/// Draw the map with a frame.
///
/// Facilities use the same markers as the list; the selected one is drawn as
/// `*` on top of everything else.
pub fn map_lines(
    anchor: &Anchor,
    facilities: &[&Facility],
    selection: Option<FacilityId>,
    width: usize,
    height: usize,
) -> Vec<String> {
    let mut grid = vec![vec![EMPTY_CELL; width]; height];
    let mut selected_cell = None;

    for (index, facility) in facilities.iter().enumerate() {
        if let Some((row, col)) = project(&anchor.coord, &facility.coord, width, height) {
            if selection == Some(facility.id) {
                selected_cell = Some((row, col));
            } else {
                grid[row][col] = marker_for(index);
            }
        }
    }

    if let Some((row, col)) = project(&anchor.coord, &anchor.coord, width, height) {
        grid[row][col] = SELF_MARKER;
    }
    if let Some((row, col)) = selected_cell {
        grid[row][col] = SELECTED_MARKER;
    }

    let border = format!("+{}+", "-".repeat(width));
    let mut lines = Vec::with_capacity(height + 2);
    lines.push(border.clone());
    for row in grid {
        lines.push(format!("|{}|", row.into_iter().collect::<String>()));
    }
    lines.push(border);
    lines
}

/// Info bubble for the selected facility.
pub fn info_bubble(facility: &Facility, width: usize) -> Vec<String> {
    vec![
        format!("{SELECTED_MARKER} {}", facility.name),
        format!("  {}", truncate_chars(&facility.address, width.saturating_sub(2))),
        format!("  {}", format_distance(facility.distance_km)),
    ]
}
