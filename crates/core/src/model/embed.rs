use portal_handoff_protocol::{PortalId, Rect};
use serde::Serialize;
use url::Url;

use super::document::DocumentId;

/// Owning reference to a document shown through a portal.
///
/// Not `Clone`: there is exactly one owner at a time. Activation consumes
/// the handle, and adopting a predecessor mints a fresh one for the
/// receiving side.
#[derive(Debug, PartialEq, Eq)]
pub struct PortalHandle {
    id: PortalId,
    target: DocumentId,
    src: Url,
}

impl PortalHandle {
    pub(crate) fn new(id: PortalId, target: DocumentId, src: Url) -> Self {
        Self { id, target, src }
    }

    pub fn id(&self) -> PortalId {
        self.id
    }

    /// Document rendered inside the portal.
    pub fn target(&self) -> DocumentId {
        self.target
    }

    pub fn src(&self) -> &Url {
        &self.src
    }
}

/// The host's view of the currently embedded guest.
#[derive(Debug)]
pub struct EmbedHandle {
    portal: PortalHandle,
    /// Container box when the guest was (re)installed.
    geometry: Rect,
    animating: bool,
}

/// Serializable view of an [`EmbedHandle`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedSummary {
    pub portal: PortalId,
    pub origin: String,
    pub src: String,
    pub y: f64,
    pub width: f64,
    pub animating: bool,
}

impl EmbedHandle {
    pub fn new(portal: PortalHandle, geometry: Rect) -> Self {
        Self {
            portal,
            geometry,
            animating: false,
        }
    }

    pub fn portal(&self) -> &PortalHandle {
        &self.portal
    }

    pub fn origin(&self) -> String {
        self.portal.src().origin().ascii_serialization()
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Record the container box at the moment the exit animation starts.
    pub fn begin_animation(&mut self, geometry: Rect) {
        self.geometry = geometry;
        self.animating = true;
    }

    pub fn end_animation(&mut self) {
        self.animating = false;
    }

    /// Give up the portal, e.g. to hand it to an activation request.
    pub fn into_portal(self) -> PortalHandle {
        self.portal
    }

    pub fn summary(&self) -> EmbedSummary {
        EmbedSummary {
            portal: self.portal.id(),
            origin: self.origin(),
            src: self.portal.src().to_string(),
            y: self.geometry.y,
            width: self.geometry.w,
            animating: self.animating,
        }
    }
}
