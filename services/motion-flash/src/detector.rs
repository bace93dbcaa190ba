//! Rising-edge detection over successive room polls

use std::collections::HashMap;

use crate::status::{RoomId, RoomStatus};

/// Tracks the last observed motion flag of every room seen so far.
///
/// Entries are never removed: a room missing from a later poll keeps its
/// previous value, so it only fires again after it has been seen without
/// motion in between.
#[derive(Debug, Default)]
pub struct MotionEdgeDetector {
    states: HashMap<RoomId, bool>,
}

impl MotionEdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a poll and return the rooms whose motion went from off to on,
    /// in payload order. Unseen rooms count as previously off.
    pub fn observe<'a>(&mut self, rooms: &'a [RoomStatus]) -> Vec<&'a RoomStatus> {
        let mut rising = Vec::new();
        for room in rooms {
            let previous = self
                .states
                .insert(room.id.clone(), room.motion_detected)
                .unwrap_or(false);
            if room.motion_detected && !previous {
                rising.push(room);
            }
        }
        rising
    }

    /// Last recorded motion flag for a room, if it was ever seen
    pub fn last_state(&self, id: &RoomId) -> Option<bool> {
        self.states.get(id).copied()
    }

    pub fn tracked_rooms(&self) -> usize {
        self.states.len()
    }
}
