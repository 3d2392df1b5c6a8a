//! Positional playback queue
//!
//! An ordered list of tracks with a cursor. Position, not track id, is the unit
//! of identity: the same track may sit at several positions and each one is
//! played, removed and moved independently.
//!
//! ```text
//! entries:  [A] [B] [C] [B] [D]
//!                ^
//!              cursor = 1       up_next = C, B, D
//! ```
//!
//! Invariant: `cursor` is `Some(i)` with `i < entries.len()` whenever the queue is
//! non-empty, and `None` exactly when it is empty.

use crate::error::{PlaybackError, Result};
use crate::shuffle::{pick_unvisited, shuffle_rng};
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use tempo_core::TrackRef;

#[derive(Debug, Clone)]
pub struct PlaybackQueue {
    /// Tracks in play order
    entries: Vec<TrackRef>,

    /// Current position
    cursor: Option<usize>,

    /// Positions already left behind during the current shuffle pass
    shuffle_history: BTreeSet<usize>,

    /// Source of shuffle picks
    rng: StdRng,
}

impl PlaybackQueue {
    /// Create an empty queue with an entropy-seeded shuffle generator
    pub fn new() -> Self {
        Self::with_rng(shuffle_rng(None))
    }

    /// Create an empty queue whose shuffle order is reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(shuffle_rng(Some(seed)))
    }

    /// Create an empty queue with an injected shuffle generator
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            shuffle_history: BTreeSet::new(),
            rng,
        }
    }

    /// Replace the queue contents
    ///
    /// The cursor lands on the first position holding `starting_at`, or on the
    /// first position if it is not in `tracks`.
    pub fn set_queue(&mut self, tracks: Vec<TrackRef>, starting_at: &TrackRef) {
        self.cursor = if tracks.is_empty() {
            None
        } else {
            Some(tracks.iter().position(|t| t == starting_at).unwrap_or(0))
        };
        self.entries = tracks;
        self.shuffle_history.clear();
    }

    /// Entry at the cursor
    pub fn current(&self) -> Option<&TrackRef> {
        self.cursor.and_then(|i| self.entries.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    /// All entries in play order
    pub fn tracks(&self) -> &[TrackRef] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&TrackRef> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance the cursor
    ///
    /// Sequential mode moves one position forward and stops at the end (no
    /// wraparound). Shuffle mode jumps to a random position not yet visited in
    /// this pass. Returns `None` without touching state when nothing is left.
    pub fn next(&mut self, shuffle: bool) -> Option<&TrackRef> {
        let cursor = self.cursor?;

        let target = if shuffle {
            let target =
                pick_unvisited(self.entries.len(), cursor, &self.shuffle_history, &mut self.rng)?;
            self.shuffle_history.insert(cursor);
            target
        } else if cursor + 1 < self.entries.len() {
            cursor + 1
        } else {
            return None;
        };

        self.cursor = Some(target);
        self.entries.get(target)
    }

    /// Step back one position
    ///
    /// Always positional, even while shuffling.
    pub fn previous(&mut self) -> Option<&TrackRef> {
        let cursor = self.cursor.filter(|&c| c > 0)?;
        self.cursor = Some(cursor - 1);
        self.entries.get(cursor - 1)
    }

    /// Entries strictly after the cursor, in positional order
    ///
    /// The iterator is lazy and `Clone`, so callers can walk it more than once.
    pub fn up_next(&self) -> std::slice::Iter<'_, TrackRef> {
        let start = self.cursor.map_or(self.entries.len(), |c| c + 1);
        self.entries[start..].iter()
    }

    /// Insert a track right after the cursor, leaving the cursor in place
    pub fn add_next(&mut self, track: TrackRef) {
        match self.cursor {
            Some(cursor) => {
                let at = cursor + 1;
                self.entries.insert(at, track);
                self.shift_history_from(at);
            }
            None => {
                self.entries.push(track);
                self.cursor = Some(0);
            }
        }
    }

    /// Append a track
    pub fn add_at_end(&mut self, track: TrackRef) {
        self.entries.push(track);
        if self.cursor.is_none() {
            self.cursor = Some(0);
        }
    }

    /// Remove the entry at `index`
    ///
    /// Removing an entry before the cursor keeps the cursor on the same track.
    /// Removing the entry under the cursor leaves the cursor numerically unchanged,
    /// so it now denotes the following track, clamped to the new end.
    pub fn remove_at(&mut self, index: usize) -> Option<TrackRef> {
        if index >= self.entries.len() {
            return None;
        }

        let removed = self.entries.remove(index);

        self.shuffle_history = self
            .shuffle_history
            .iter()
            .filter(|&&h| h != index)
            .map(|&h| if h > index { h - 1 } else { h })
            .collect();

        self.cursor = match self.cursor {
            _ if self.entries.is_empty() => None,
            Some(cursor) if index < cursor => Some(cursor - 1),
            Some(cursor) => Some(cursor.min(self.entries.len() - 1)),
            None => None,
        };

        Some(removed)
    }

    /// Move the entries at `from_offsets` so they sit before the entry that was at
    /// `to_offset` (or at the end when `to_offset == len`), keeping their relative
    /// order. The cursor follows the entry it pointed at.
    pub fn move_entries(&mut self, from_offsets: &[usize], to_offset: usize) -> Result<()> {
        let len = self.entries.len();
        if to_offset > len {
            return Err(PlaybackError::IndexOutOfBounds(to_offset));
        }

        let mut moving = from_offsets.to_vec();
        moving.sort_unstable();
        moving.dedup();
        if let Some(&bad) = moving.iter().find(|&&i| i >= len) {
            return Err(PlaybackError::IndexOutOfBounds(bad));
        }
        if moving.is_empty() {
            return Ok(());
        }

        // order[new_position] = old_position
        let mut order: Vec<usize> = (0..len)
            .filter(|i| moving.binary_search(i).is_err())
            .collect();
        let insert_at = to_offset - moving.iter().filter(|&&i| i < to_offset).count();
        order.splice(insert_at..insert_at, moving);

        let mut old_to_new = vec![0; len];
        for (new, &old) in order.iter().enumerate() {
            old_to_new[old] = new;
        }

        let mut slots: Vec<Option<TrackRef>> =
            std::mem::take(&mut self.entries).into_iter().map(Some).collect();
        self.entries = order.iter().filter_map(|&old| slots[old].take()).collect();

        self.cursor = self.cursor.map(|c| old_to_new[c]);
        self.shuffle_history = self.shuffle_history.iter().map(|&h| old_to_new[h]).collect();

        Ok(())
    }

    /// Jump straight to `index`
    ///
    /// The position left behind counts as visited for the current shuffle pass.
    pub fn jump_to(&mut self, index: usize) -> Option<&TrackRef> {
        if index >= self.entries.len() {
            return None;
        }
        if let Some(cursor) = self.cursor.filter(|&c| c != index) {
            self.shuffle_history.insert(cursor);
        }
        self.cursor = Some(index);
        self.entries.get(index)
    }

    /// Back to the first position with a fresh shuffle pass
    pub fn restart(&mut self) {
        self.cursor = if self.entries.is_empty() { None } else { Some(0) };
        self.shuffle_history.clear();
    }

    /// Clear entire queue
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
        self.shuffle_history.clear();
    }

    /// Number of positions visited in the current shuffle pass, cursor included
    pub fn shuffle_visited(&self) -> usize {
        let cursor_unvisited = self
            .cursor
            .is_some_and(|c| !self.shuffle_history.contains(&c));
        self.shuffle_history.len() + usize::from(cursor_unvisited)
    }

    /// Renumber history after an insertion at `at`
    fn shift_history_from(&mut self, at: usize) {
        self.shuffle_history = self
            .shuffle_history
            .iter()
            .map(|&h| if h >= at { h + 1 } else { h })
            .collect();
    }
}

impl Default for PlaybackQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn create_test_track(id: &str) -> TrackRef {
        TrackRef::new(id, format!("Track {id}"), PathBuf::from(format!("/music/{id}.mp3")))
    }

    fn tracks(ids: &[&str]) -> Vec<TrackRef> {
        ids.iter().map(|id| create_test_track(id)).collect()
    }

    fn ids(queue: &PlaybackQueue) -> Vec<&str> {
        queue.tracks().iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn set_queue_starts_at_matching_track() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a", "b", "c"]);
        queue.set_queue(list.clone(), &list[1]);

        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(queue.current().unwrap().id.as_str(), "b");
    }

    #[test]
    fn set_queue_unknown_start_falls_back_to_first() {
        let mut queue = PlaybackQueue::with_seed(0);
        queue.set_queue(tracks(&["a", "b"]), &create_test_track("zzz"));

        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn set_queue_picks_first_duplicate() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a", "b", "a"]);
        queue.set_queue(list.clone(), &list[2]);

        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn set_queue_empty_has_no_cursor() {
        let mut queue = PlaybackQueue::with_seed(0);
        queue.set_queue(Vec::new(), &create_test_track("a"));

        assert_eq!(queue.current_index(), None);
        assert!(queue.current().is_none());
    }

    #[test]
    fn sequential_next_stops_at_end() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a", "b"]);
        queue.set_queue(list.clone(), &list[0]);

        assert_eq!(queue.next(false).unwrap().id.as_str(), "b");
        assert!(queue.next(false).is_none());
        assert_eq!(queue.current_index(), Some(1));
    }

    #[test]
    fn previous_at_start_is_none() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a", "b"]);
        queue.set_queue(list.clone(), &list[0]);

        assert!(queue.previous().is_none());
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn add_next_on_empty_queue_sets_cursor() {
        let mut queue = PlaybackQueue::with_seed(0);
        queue.add_next(create_test_track("x"));

        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(queue.current().unwrap().id.as_str(), "x");
    }

    #[test]
    fn add_at_end_keeps_cursor() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a", "b"]);
        queue.set_queue(list.clone(), &list[1]);
        queue.add_at_end(create_test_track("z"));

        assert_eq!(ids(&queue), vec!["a", "b", "z"]);
        assert_eq!(queue.current_index(), Some(1));
    }

    #[test]
    fn remove_before_cursor_keeps_current_track() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a", "b", "c"]);
        queue.set_queue(list.clone(), &list[2]);

        let removed = queue.remove_at(0).unwrap();
        assert_eq!(removed.id.as_str(), "a");
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(queue.current().unwrap().id.as_str(), "c");
    }

    #[test]
    fn remove_at_cursor_points_at_following_track() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a", "b", "c"]);
        queue.set_queue(list.clone(), &list[1]);

        queue.remove_at(1);
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(queue.current().unwrap().id.as_str(), "c");
    }

    #[test]
    fn remove_last_entry_under_cursor_clamps() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a", "b", "c"]);
        queue.set_queue(list.clone(), &list[2]);

        queue.remove_at(2);
        assert_eq!(queue.current_index(), Some(1));
    }

    #[test]
    fn remove_only_entry_empties_cursor() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a"]);
        queue.set_queue(list.clone(), &list[0]);

        queue.remove_at(0);
        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), None);
    }

    #[test]
    fn remove_out_of_bounds_is_none() {
        let mut queue = PlaybackQueue::with_seed(0);
        queue.set_queue(tracks(&["a"]), &create_test_track("a"));

        assert!(queue.remove_at(5).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn move_forward_keeps_cursor_on_same_entry() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a", "b", "c", "d"]);
        queue.set_queue(list.clone(), &list[1]);

        // Move "a" to before "d"
        queue.move_entries(&[0], 3).unwrap();
        assert_eq!(ids(&queue), vec!["b", "c", "a", "d"]);
        assert_eq!(queue.current().unwrap().id.as_str(), "b");
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn move_several_to_end() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a", "b", "c", "d", "e"]);
        queue.set_queue(list.clone(), &list[3]);

        queue.move_entries(&[3, 0], 5).unwrap();
        assert_eq!(ids(&queue), vec!["b", "c", "e", "a", "d"]);
        assert_eq!(queue.current_index(), Some(4));
    }

    #[test]
    fn move_backward_before_target() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a", "b", "c", "d"]);
        queue.set_queue(list.clone(), &list[0]);

        queue.move_entries(&[3], 1).unwrap();
        assert_eq!(ids(&queue), vec!["a", "d", "b", "c"]);
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn move_duplicate_track_tracks_position_not_id() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a", "b", "a"]);
        queue.set_queue(list.clone(), &list[0]);
        queue.next(false);
        queue.next(false); // cursor on the second "a"

        queue.move_entries(&[2], 0).unwrap();
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn move_out_of_bounds_rejected() {
        let mut queue = PlaybackQueue::with_seed(0);
        queue.set_queue(tracks(&["a", "b"]), &create_test_track("a"));

        assert!(matches!(
            queue.move_entries(&[2], 0),
            Err(PlaybackError::IndexOutOfBounds(2))
        ));
        assert!(matches!(
            queue.move_entries(&[0], 3),
            Err(PlaybackError::IndexOutOfBounds(3))
        ));
        assert_eq!(ids(&queue), vec!["a", "b"]);
    }

    #[test]
    fn shuffle_history_survives_insertion() {
        let mut queue = PlaybackQueue::with_seed(3);
        let list = tracks(&["a", "b", "c"]);
        queue.set_queue(list.clone(), &list[0]);

        queue.next(true);
        queue.add_next(create_test_track("x"));

        // 4 entries, 2 visited: exactly 2 more shuffle picks before the pass ends
        assert!(queue.next(true).is_some());
        assert!(queue.next(true).is_some());
        assert!(queue.next(true).is_none());
    }

    #[test]
    fn jump_to_moves_cursor() {
        let mut queue = PlaybackQueue::with_seed(0);
        let list = tracks(&["a", "b", "c"]);
        queue.set_queue(list.clone(), &list[0]);

        assert_eq!(queue.jump_to(2).unwrap().id.as_str(), "c");
        assert_eq!(queue.shuffle_visited(), 2);
        assert!(queue.jump_to(3).is_none());
        assert_eq!(queue.current_index(), Some(2));
    }

    #[test]
    fn restart_clears_shuffle_pass() {
        let mut queue = PlaybackQueue::with_seed(5);
        let list = tracks(&["a", "b", "c"]);
        queue.set_queue(list.clone(), &list[0]);
        queue.next(true);
        queue.next(true);
        assert!(queue.next(true).is_none());

        queue.restart();
        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(queue.shuffle_visited(), 1);
        assert!(queue.next(true).is_some());
    }
}
