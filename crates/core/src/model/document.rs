use std::fmt;

use portal_handoff_protocol::SurfaceCommand;
use serde::{Deserialize, Serialize};
use url::Url;

use super::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub u32);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document#{}", self.0)
    }
}

/// Which page a document renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentRole {
    /// The article page that embeds the podcast ("PORTALOG").
    Article,
    /// The podcast page that gets embedded and promoted ("TTT").
    Podcast,
}

/// Per-document state shared by every component of one page.
///
/// Built once when the document loads and handed to the controller and
/// widgets explicitly; nothing reaches for a global document.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    id: DocumentId,
    role: DocumentRole,
    url: Url,
    surface: Surface,
    /// Whether this document currently lives inside another's portal.
    embedded: bool,
    now_ms: f64,
}

impl DocumentContext {
    pub fn new(id: DocumentId, role: DocumentRole, url: Url, surface: Surface) -> Self {
        Self {
            id,
            role,
            url,
            surface,
            embedded: false,
            now_ms: 0.0,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn role(&self) -> DocumentRole {
        self.role
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn set_embedded(&mut self, embedded: bool) {
        self.embedded = embedded;
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn set_now(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }

    pub fn apply(&mut self, commands: &[SurfaceCommand]) {
        self.surface.apply(commands, self.now_ms);
    }

    pub(crate) fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }
}
