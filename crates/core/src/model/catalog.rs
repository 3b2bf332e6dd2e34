use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;

/// Identifier of a track in the catalog (`"tata"`, `"ssr"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        TrackId(s.to_string())
    }
}

impl From<String> for TrackId {
    fn from(s: String) -> Self {
        TrackId(s)
    }
}

impl PartialEq<&str> for TrackId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub duration_sec: f64,
    pub image_url: Option<String>,
}

impl Track {
    /// Media URL served by the static file server.
    pub fn media_src(&self) -> String {
        format!("/mp3/{}.mp3", self.id)
    }

    /// Caption shown above the player timeline.
    pub fn display_title(&self) -> String {
        format!("{} - Totally Tooling Tips", self.title)
    }
}

/// The fixed set of episodes the podcast page knows about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Episodes of "Totally Tooling Tips" used by the demo pages.
    pub fn demo() -> Self {
        let track = |id: &str, title: &str, image: Option<&str>| Track {
            id: TrackId::from(id),
            title: title.to_string(),
            duration_sec: 2.0 * 60.0,
            image_url: image.map(str::to_string),
        };
        Self::new(vec![
            track("tata", "Ta ta for now", None),
            track("ssr", "Server-side Rendering", Some("/img/rob.png")),
            track("github", "GitHub Workflow Pro-Tips", Some("/img/matt.png")),
            track("lighthouse", "Lighthouse", Some("/img/eric.png")),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&Track, WidgetError> {
        self.get(id)
            .ok_or_else(|| WidgetError::UnknownTrack(id.to_string()))
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::demo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_catalog_has_four_two_minute_episodes() {
        let catalog = Catalog::demo();
        assert_eq!(catalog.tracks().len(), 4);
        assert!(catalog.tracks().iter().all(|t| t.duration_sec == 120.0));
    }

    #[test]
    fn media_src_and_title() {
        let catalog = Catalog::demo();
        let ssr = catalog.get("ssr").cloned();
        let Some(ssr) = ssr else {
            panic!("ssr missing from demo catalog");
        };
        assert_eq!(ssr.media_src(), "/mp3/ssr.mp3");
        assert_eq!(
            ssr.display_title(),
            "Server-side Rendering - Totally Tooling Tips"
        );
        assert_eq!(ssr.image_url.as_deref(), Some("/img/rob.png"));
    }

    #[test]
    fn unknown_track_is_an_error() {
        let catalog = Catalog::demo();
        assert!(matches!(
            catalog.require("podcast-42"),
            Err(WidgetError::UnknownTrack(id)) if id == "podcast-42"
        ));
    }
}
