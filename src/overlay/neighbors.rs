//! Neighbor table maintenance
//!
//! The table is corrected lazily: an entry only changes when an update about
//! that peer arrives, or when a split rebuilds the affected sides.

use super::types::{NeighborTable, PeerHandle, PeerId};
use crate::geometry::{Direction, Zone};

/// What `apply_update` did with an incoming `(zone, handle)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateEffect {
    Added(Direction),
    Duplicate(Direction),
    Evicted,
    Ignored,
}

impl NeighborTable {
    pub fn side(&self, direction: Direction) -> &Vec<PeerHandle> {
        match direction {
            Direction::Left => &self.left,
            Direction::Bottom => &self.bottom,
            Direction::Right => &self.right,
            Direction::Top => &self.top,
        }
    }

    pub fn side_mut(&mut self, direction: Direction) -> &mut Vec<PeerHandle> {
        match direction {
            Direction::Left => &mut self.left,
            Direction::Bottom => &mut self.bottom,
            Direction::Right => &mut self.right,
            Direction::Top => &mut self.top,
        }
    }

    /// All handles flattened in left, bottom, right, top order.
    pub fn all(&self) -> Vec<PeerHandle> {
        Direction::ALL
            .iter()
            .flat_map(|&direction| self.side(direction).iter().copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        Direction::ALL
            .iter()
            .map(|&direction| self.side(direction).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, direction: Direction, id: PeerId) -> bool {
        self.side(direction).iter().any(|handle| handle.id == id)
    }

    pub fn ids(&self, direction: Direction) -> Vec<PeerId> {
        self.side(direction).iter().map(|handle| handle.id).collect()
    }

    /// Appends `handle` unless a handle with the same id is already on that side.
    pub fn insert(&mut self, direction: Direction, handle: PeerHandle) -> bool {
        if self.contains(direction, handle.id) {
            return false;
        }
        self.side_mut(direction).push(handle);
        true
    }

    /// Removes `id` from every side. Returns true if anything was removed.
    pub fn evict(&mut self, id: PeerId) -> bool {
        let before = self.len();
        for direction in Direction::ALL {
            self.side_mut(direction).retain(|handle| handle.id != id);
        }
        self.len() != before
    }

    /// Classifies `(zone, handle)` against `own` and records or evicts it.
    pub fn apply_update(&mut self, own: &Zone, zone: &Zone, handle: PeerHandle) -> UpdateEffect {
        match own.neighbor_direction(zone) {
            Some(direction) => {
                if self.insert(direction, handle) {
                    UpdateEffect::Added(direction)
                } else {
                    UpdateEffect::Duplicate(direction)
                }
            }
            None => {
                if self.evict(handle.id) {
                    UpdateEffect::Evicted
                } else {
                    UpdateEffect::Ignored
                }
            }
        }
    }

    pub fn describe(&self) -> String {
        let sides: Vec<String> = Direction::ALL
            .iter()
            .map(|&direction| {
                let ids: Vec<String> = self
                    .side(direction)
                    .iter()
                    .map(|handle| handle.id.to_string())
                    .collect();
                format!("{}: [{}]", direction, ids.join(" "))
            })
            .collect();
        sides.join(", ")
    }
}
