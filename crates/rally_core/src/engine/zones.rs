//! Court Zone Grid
//!
//! The court is split into a 3x3 grid. Rows are thirds along the length
//! (`y`), columns are thirds across the width (`x`). The net runs through
//! the middle row, so rows 0 and 2 hold the two baselines.
//!
//! ```text
//!               left  centre right
//! near base (0)  0      1      2
//! net       (1)  3      4      5
//! far base  (2)  6      7      8
//! ```
//!
//! Depth is always measured from the net, so mirror-image positions on the
//! two halves have the same depth.
//!
//! Adjacency is a fixed table rather than derived geometry: the centre zone
//! touches everything, edge-sharing zones touch, and non-centre diagonal
//! pairs do not.

use crate::models::ZoneId;
use once_cell::sync::Lazy;

pub const ZONE_COUNT: usize = 9;
pub const GRID_SIZE: usize = 3;
pub const CENTER_ZONE: ZoneId = 4;
pub const CORNER_ZONES: [ZoneId; 4] = [0, 2, 6, 8];

/// Depth third, measured from the net towards the player's own baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourtDepth {
    Front,
    Mid,
    Back,
}

const ADJACENCY: [[bool; ZONE_COUNT]; ZONE_COUNT] = {
    const T: bool = true;
    const F: bool = false;
    [
        //0  1  2  3  4  5  6  7  8
        [T, T, F, T, T, F, F, F, F], // 0
        [T, T, T, F, T, F, F, F, F], // 1
        [F, T, T, F, T, T, F, F, F], // 2
        [T, F, F, T, T, F, T, F, F], // 3
        [T, T, T, T, T, T, T, T, T], // 4
        [F, F, T, F, T, T, F, F, T], // 5
        [F, F, F, T, T, F, T, T, F], // 6
        [F, F, F, F, T, F, T, T, T], // 7
        [F, F, F, F, T, T, F, T, T], // 8
    ]
};

static STANDARD: Lazy<ZoneTable> = Lazy::new(ZoneTable::new);

/// Immutable adjacency and distance lookups, built once.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneTable {
    adjacency: [[bool; ZONE_COUNT]; ZONE_COUNT],
    distance: [[f64; ZONE_COUNT]; ZONE_COUNT],
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneTable {
    pub fn new() -> Self {
        let max = ((2 * 2 + 2 * 2) as f64).sqrt();
        let mut distance = [[0.0; ZONE_COUNT]; ZONE_COUNT];
        for a in 0..ZONE_COUNT {
            for b in 0..ZONE_COUNT {
                let dr = (a / GRID_SIZE) as f64 - (b / GRID_SIZE) as f64;
                let dc = (a % GRID_SIZE) as f64 - (b % GRID_SIZE) as f64;
                distance[a][b] = (dr * dr + dc * dc).sqrt() / max;
            }
        }
        Self { adjacency: ADJACENCY, distance }
    }

    /// Shared process-wide instance; never mutated.
    pub fn standard() -> &'static ZoneTable {
        &STANDARD
    }

    pub fn is_adjacent(&self, a: ZoneId, b: ZoneId) -> bool {
        self.adjacency[slot(a)][slot(b)]
    }

    /// Normalized grid distance between zone centres, 0.0 ..= 1.0.
    pub fn zone_distance(&self, a: ZoneId, b: ZoneId) -> f64 {
        self.distance[slot(a)][slot(b)]
    }

    /// Zones the opponent cannot cover from where they stand.
    ///
    /// Without a position the four corners are assumed open. With one, the
    /// opponent's zone and everything adjacent to it is removed; the result
    /// may be empty.
    pub fn find_open_court_zones(&self, opponent: Option<(f64, f64)>) -> Vec<ZoneId> {
        match opponent {
            None => CORNER_ZONES.to_vec(),
            Some((x, y)) => {
                let occupied = position_to_zone(x, y);
                all_zones()
                    .filter(|&z| !self.is_adjacent(occupied, z))
                    .collect()
            }
        }
    }

    /// True when `zone` is open or touches an open zone.
    pub fn touches_any(&self, zone: ZoneId, zones: &[ZoneId]) -> bool {
        zones.iter().any(|&z| self.is_adjacent(zone, z))
    }
}

/// Out-of-range ids resolve to the centre zone.
fn slot(zone: ZoneId) -> usize {
    if (zone as usize) < ZONE_COUNT {
        zone as usize
    } else {
        CENTER_ZONE as usize
    }
}

fn third(v: f64) -> usize {
    if v.is_nan() {
        return 0;
    }
    ((v * GRID_SIZE as f64).floor().max(0.0) as usize).min(GRID_SIZE - 1)
}

/// Maps a normalized position to its zone. Boundaries are inclusive-low:
/// `x = 1/3` belongs to the centre column.
pub fn position_to_zone(x: f64, y: f64) -> ZoneId {
    (third(y) * GRID_SIZE + third(x)) as ZoneId
}

/// Geometric centre of a zone; out-of-range ids give the centre zone's centre.
pub fn zone_to_position(zone: ZoneId) -> (f64, f64) {
    let z = slot(zone);
    let row = (z / GRID_SIZE) as f64;
    let col = (z % GRID_SIZE) as f64;
    let cell = 1.0 / GRID_SIZE as f64;
    ((col + 0.5) * cell, (row + 0.5) * cell)
}

pub fn all_zones() -> impl Iterator<Item = ZoneId> {
    0..ZONE_COUNT as ZoneId
}

pub fn zone_row(zone: ZoneId) -> usize {
    slot(zone) / GRID_SIZE
}

pub fn zone_col(zone: ZoneId) -> usize {
    slot(zone) % GRID_SIZE
}

/// 0.0 on the net line, 1.0 on either baseline.
pub fn depth_from_net(y: f64, net_line: f64) -> f64 {
    let half = net_line.max(1.0 - net_line);
    if half.is_nan() || half <= 0.0 || y.is_nan() {
        return 0.0;
    }
    ((y - net_line).abs() / half).clamp(0.0, 1.0)
}

pub fn depth_third(depth: f64) -> CourtDepth {
    if depth < 1.0 / 3.0 {
        CourtDepth::Front
    } else if depth < 2.0 / 3.0 {
        CourtDepth::Mid
    } else {
        CourtDepth::Back
    }
}

pub fn court_depth(y: f64, net_line: f64) -> CourtDepth {
    depth_third(depth_from_net(y, net_line))
}

/// Coarse depth of a zone. The middle row straddles the net; the outer rows
/// are each side's back court, whichever half they belong to.
pub fn zone_depth(zone: ZoneId) -> CourtDepth {
    match zone_row(zone) {
        1 => CourtDepth::Front,
        _ => CourtDepth::Back,
    }
}

pub fn is_corner(zone: ZoneId) -> bool {
    CORNER_ZONES.contains(&zone)
}

pub fn is_valid_zone(zone: ZoneId) -> bool {
    (zone as usize) < ZONE_COUNT
}
