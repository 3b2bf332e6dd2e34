use serde::{Deserialize, Serialize};

use super::catalog::TrackId;

/// Ordered queue of episodes plus the playback cursor.
///
/// `index` always points at a valid track while the playlist is
/// non-empty, and is 0 when it is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistState {
    tracks: Vec<TrackId>,
    index: usize,
    playing: bool,
    /// Fraction of the current track already played, in `[0, 1]`.
    elapsed: f64,
}

/// What a removal did to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    /// Position the track occupied before removal.
    pub position: usize,
    /// Whether the track under the cursor is now a different one.
    pub current_changed: bool,
}

impl PlaylistState {
    pub fn new(first: TrackId) -> Self {
        Self {
            tracks: vec![first],
            index: 0,
            playing: false,
            elapsed: 0.0,
        }
    }

    pub fn tracks(&self) -> &[TrackId] {
        &self.tracks
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current(&self) -> Option<&TrackId> {
        self.tracks.get(self.index)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn set_elapsed(&mut self, fraction: f64) {
        self.elapsed = fraction.clamp(0.0, 1.0);
    }

    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.tracks.len()
    }

    /// Move the cursor forward. Returns `false` at the last track.
    pub fn advance(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.index += 1;
        self.elapsed = 0.0;
        true
    }

    /// Move the cursor back. Returns `false` at the first track.
    pub fn retreat(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.index -= 1;
        self.elapsed = 0.0;
        true
    }

    pub fn push(&mut self, id: TrackId) {
        self.tracks.push(id);
    }

    /// Remove the first occurrence of `id`.
    ///
    /// Entries behind the cursor shift it back by one so it keeps pointing
    /// at the same track. Removing the current track moves the cursor to the
    /// previous entry, or keeps it at 0 when there is none.
    pub fn remove(&mut self, id: &TrackId) -> Option<Removal> {
        let position = self.tracks.iter().position(|t| t == id)?;
        self.tracks.remove(position);

        let current_changed = if position < self.index {
            self.index -= 1;
            false
        } else if position == self.index {
            self.index = self.index.saturating_sub(1);
            self.elapsed = 0.0;
            true
        } else {
            false
        };

        if self.tracks.is_empty() {
            self.index = 0;
            self.playing = false;
        }

        Some(Removal {
            position,
            current_changed,
        })
    }
}
