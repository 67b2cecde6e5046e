//! Track types and the editable timeline.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use tracing::debug;
use uuid::Uuid;

use crate::element::Element;
use crate::snapshot::TimelineSnapshot;

/// Kind of track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Media,
    Audio,
    Text,
}

impl TrackKind {
    /// Audio and text tracks carry no raster contribution.
    pub fn composites_visually(self) -> bool {
        matches!(self, TrackKind::Media)
    }
}

/// A track containing elements. Track order in the timeline is z-order:
/// later tracks draw on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: Uuid,
    /// Track name
    pub name: String,
    /// Track kind
    pub kind: TrackKind,
    /// Elements in this track
    pub elements: Vec<Element>,
    /// Is track muted
    pub muted: bool,
    /// The main media track created with the timeline
    #[serde(default)]
    pub is_main: bool,
}

impl Track {
    /// Create a new empty track.
    pub fn new(name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            elements: Vec::new(),
            muted: false,
            is_main: false,
        }
    }

    /// Elements active at the given time.
    pub fn elements_at(&self, time: f64) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(move |el| el.active_at(time))
    }

    /// Find an element by ID.
    pub fn find_element(&self, id: Uuid) -> Option<&Element> {
        self.elements.iter().find(|el| el.id == id)
    }

    /// Find an element mutably by ID.
    pub fn find_element_mut(&mut self, id: Uuid) -> Option<&mut Element> {
        self.elements.iter_mut().find(|el| el.id == id)
    }

    /// Latest end time of any element on this track.
    pub fn end_time(&self) -> f64 {
        self.elements
            .iter()
            .map(|el| el.window().end())
            .fold(0.0, f64::max)
    }

    pub(crate) fn hash_content<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.kind.hash(state);
        self.muted.hash(state);
        self.elements.len().hash(state);
        for el in &self.elements {
            el.hash_content(state);
        }
    }
}

/// The editable timeline: an ordered list of tracks mutated by editing
/// operations. Compositing never reads this directly; it works against
/// immutable [`TimelineSnapshot`] values captured from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    /// Tracks in z-order (later = on top)
    pub tracks: Vec<Track>,
}

impl Timeline {
    /// Create a timeline with the main media track.
    pub fn new() -> Self {
        let mut timeline = Self { tracks: Vec::new() };
        timeline.ensure_main_track();
        timeline
    }

    /// Guarantee one main media track exists (inserted at the bottom of
    /// the z-order when missing, e.g. after loading legacy data).
    pub fn ensure_main_track(&mut self) {
        if !self.tracks.iter().any(|t| t.is_main) {
            let mut main = Track::new("Main Track", TrackKind::Media);
            main.is_main = true;
            self.tracks.insert(0, main);
        }
    }

    /// Add a new track of the given kind. Returns its ID.
    pub fn add_track(&mut self, kind: TrackKind) -> Uuid {
        let name = match kind {
            TrackKind::Media => "Media Track",
            TrackKind::Audio => "Audio Track",
            TrackKind::Text => "Text Track",
        };
        let track = Track::new(name, kind);
        let id = track.id;
        self.tracks.push(track);
        debug!(track = %id, ?kind, "added track");
        id
    }

    /// Find a track by ID.
    pub fn find_track(&self, id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Find a track mutably by ID.
    pub fn find_track_mut(&mut self, id: Uuid) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Add an element to a track. Returns the element ID, or `None` if
    /// the track does not exist.
    pub fn add_element(&mut self, track_id: Uuid, element: Element) -> Option<Uuid> {
        let track = self.find_track_mut(track_id)?;
        let id = element.id;
        track.elements.push(element);
        Some(id)
    }

    /// Remove an element from whichever track holds it.
    pub fn remove_element(&mut self, element_id: Uuid) -> Option<Element> {
        for track in &mut self.tracks {
            if let Some(pos) = track.elements.iter().position(|el| el.id == element_id) {
                return Some(track.elements.remove(pos));
            }
        }
        None
    }

    /// Move an element to a new start time (and optionally another track).
    pub fn move_element(
        &mut self,
        element_id: Uuid,
        new_start: f64,
        new_track: Option<Uuid>,
    ) -> bool {
        let Some(mut element) = self.remove_element(element_id) else {
            return false;
        };
        element.start_time = new_start.max(0.0);
        let target = match new_track {
            Some(id) if self.find_track(id).is_some() => self.find_track_mut(id),
            _ => self.tracks.iter_mut().find(|t| t.is_main),
        };
        match target {
            Some(track) => {
                track.elements.push(element);
                true
            }
            None => false,
        }
    }

    /// Derived total duration: latest end of any element, zero when empty.
    pub fn total_duration(&self) -> f64 {
        self.tracks.iter().map(|t| t.end_time()).fold(0.0, f64::max)
    }

    /// Capture an immutable snapshot for compositing.
    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot::capture(&self.tracks)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
