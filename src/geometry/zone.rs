use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of the coordinate space.
pub const WIDTH_MAX: f64 = 10.0;
/// Height of the coordinate space.
pub const HEIGHT_MAX: f64 = 10.0;

/// Tolerance used when comparing shared edges and the square test in `split`.
///
/// Zones are produced by repeated halving of a power-of-two-friendly space, so
/// edges normally match exactly; the tolerance only absorbs rounding in
/// coordinates that came over the wire. Two edges closer than this are the same
/// edge, which is what routing termination relies on.
pub const EDGE_EPSILON: f64 = 1e-9;

fn same_edge(a: f64, b: f64) -> bool {
    (a - b).abs() <= EDGE_EPSILON
}

/// True when the span starting at `start2` with length `len2` overlaps
/// `[start1, start1 + len1)` with positive length.
fn spans_overlap(start1: f64, len1: f64, start2: f64, len2: f64) -> bool {
    (start2 >= start1 && start2 < start1 + len1) || (start2 < start1 && start2 + len2 > start1)
}

/// Cardinal side of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Bottom,
    Right,
    Top,
}

impl Direction {
    /// Table order, also the order neighbors are flattened in for routing.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Bottom,
        Direction::Right,
        Direction::Top,
    ];

    /// Order in which an incoming neighbor update is classified.
    pub const UPDATE_PRIORITY: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Bottom,
        Direction::Top,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Top => Direction::Bottom,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Bottom => "bottom",
            Direction::Right => "right",
            Direction::Top => "top",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction argument of an adjacency query: one side, or any of the four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Adjacency {
    Side(Direction),
    Any,
}

impl FromStr for Adjacency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Adjacency::Side(Direction::Left)),
            "bottom" => Ok(Adjacency::Side(Direction::Bottom)),
            "right" => Ok(Adjacency::Side(Direction::Right)),
            "top" => Ok(Adjacency::Side(Direction::Top)),
            "any" => Ok(Adjacency::Any),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// How a zone was halved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitKind {
    /// Owner keeps the left half, the sibling takes the right half.
    Vertical,
    /// Owner keeps the lower half, the sibling takes the upper half.
    Horizontal,
}

impl SplitKind {
    /// Side of the owner that the sibling now occupies.
    pub fn sibling_side(self) -> Direction {
        match self {
            SplitKind::Vertical => Direction::Right,
            SplitKind::Horizontal => Direction::Top,
        }
    }

    /// Sides whose neighbors must be re-partitioned between owner and sibling.
    pub fn shared_sides(self) -> [Direction; 2] {
        match self {
            SplitKind::Vertical => [Direction::Top, Direction::Bottom],
            SplitKind::Horizontal => [Direction::Right, Direction::Left],
        }
    }
}

/// An axis-aligned, half-open rectangle `[x, x + width) x [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Zone {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole coordinate space, assigned to the first peer of a network.
    pub fn full() -> Self {
        Self::new(0.0, 0.0, WIDTH_MAX, HEIGHT_MAX)
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True when the rectangle lies inside the coordinate space.
    pub fn is_within_space(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width > 0.0
            && self.height > 0.0
            && self.x + self.width <= WIDTH_MAX + EDGE_EPSILON
            && self.y + self.height <= HEIGHT_MAX + EDGE_EPSILON
    }

    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        self.x <= px && px < self.x + self.width && self.y <= py && py < self.y + self.height
    }

    /// True when the interiors of the two rectangles intersect.
    pub fn overlaps(&self, other: &Zone) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// `other` sits directly above this zone.
    pub fn is_top_neighbor(&self, other: &Zone) -> bool {
        same_edge(self.y + self.height, other.y)
            && spans_overlap(self.x, self.width, other.x, other.width)
    }

    /// `other` sits directly below this zone.
    pub fn is_bottom_neighbor(&self, other: &Zone) -> bool {
        same_edge(other.y + other.height, self.y)
            && spans_overlap(self.x, self.width, other.x, other.width)
    }

    /// `other` sits directly to the left of this zone.
    pub fn is_left_neighbor(&self, other: &Zone) -> bool {
        same_edge(other.x + other.width, self.x)
            && spans_overlap(self.y, self.height, other.y, other.height)
    }

    /// `other` sits directly to the right of this zone.
    pub fn is_right_neighbor(&self, other: &Zone) -> bool {
        same_edge(self.x + self.width, other.x)
            && spans_overlap(self.y, self.height, other.y, other.height)
    }

    pub fn is_neighbor_in(&self, other: &Zone, direction: Direction) -> bool {
        match direction {
            Direction::Left => self.is_left_neighbor(other),
            Direction::Bottom => self.is_bottom_neighbor(other),
            Direction::Right => self.is_right_neighbor(other),
            Direction::Top => self.is_top_neighbor(other),
        }
    }

    pub fn is_neighbor(&self, other: &Zone) -> bool {
        Direction::ALL
            .iter()
            .any(|&direction| self.is_neighbor_in(other, direction))
    }

    pub fn matches(&self, other: &Zone, adjacency: Adjacency) -> bool {
        match adjacency {
            Adjacency::Side(direction) => self.is_neighbor_in(other, direction),
            Adjacency::Any => self.is_neighbor(other),
        }
    }

    /// First direction (left, right, bottom, top) in which `other` is adjacent.
    pub fn neighbor_direction(&self, other: &Zone) -> Option<Direction> {
        Direction::UPDATE_PRIORITY
            .into_iter()
            .find(|&direction| self.is_neighbor_in(other, direction))
    }

    /// Halves this zone in place and returns the sibling half.
    pub fn split(&mut self) -> (SplitKind, Zone) {
        if same_edge(self.width, self.height) {
            let half = self.width / 2.0;
            self.width = half;
            let sibling = Zone::new(self.x + half, self.y, half, self.height);
            (SplitKind::Vertical, sibling)
        } else {
            let half = self.height / 2.0;
            self.height = half;
            let sibling = Zone::new(self.x, self.y + half, self.width, half);
            (SplitKind::Horizontal, sibling)
        }
    }

    /// Euclidean distance from the centroid to a point.
    pub fn centroid_distance(&self, px: f64, py: f64) -> f64 {
        (self.mid_x() - px).hypot(self.mid_y() - py)
    }

    /// Euclidean distance from the closed rectangle to a point, 0 on or inside it.
    pub fn edge_distance(&self, px: f64, py: f64) -> f64 {
        let dx = (self.x - px).max(px - (self.x + self.width)).max(0.0);
        let dy = (self.y - py).max(py - (self.y + self.height)).max(0.0);
        dx.hypot(dy)
    }

    pub fn distance_to(&self, px: f64, py: f64) -> PointDistance {
        PointDistance {
            contains: self.contains_point(px, py),
            to_zone: self.edge_distance(px, py),
            to_centroid: self.centroid_distance(px, py),
        }
    }
}

/// How far a zone is from a routing target.
///
/// Ordered by containment first, then distance to the rectangle, then distance
/// to the centroid. The rectangle distance strictly shrinks on every hop of a
/// correctly tiled space.
///
/// `to_centroid` is the plain zone-to-point distance a peer reports when
/// asked how far it is from a point; the other two fields refine the order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDistance {
    pub contains: bool,
    pub to_zone: f64,
    /// Same value as `Zone::centroid_distance`.
    pub to_centroid: f64,
}

impl PointDistance {
    /// Strictly closer than `other`; equal distances are not closer.
    pub fn closer_than(&self, other: &PointDistance) -> bool {
        if self.contains != other.contains {
            return self.contains;
        }
        if self.to_zone != other.to_zone {
            return self.to_zone < other.to_zone;
        }
        self.to_centroid < other.to_centroid
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X({:.2} - {:.2}) Y({:.2} - {:.2})",
            self.x,
            self.x + self.width,
            self.y,
            self.y + self.height
        )
    }
}
