use std::collections::BTreeMap;

use portal_handoff_protocol::{ActivationPayload, PortalId};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::error::LifecycleError;
use crate::model::{DocumentId, PortalHandle};

/// A promotion request waiting on the embedding primitive.
#[derive(Debug)]
pub struct ActivationRequest {
    portal: PortalHandle,
    requester: DocumentId,
    payload: Option<ActivationPayload>,
}

impl ActivationRequest {
    pub fn requester(&self) -> DocumentId {
        self.requester
    }

    pub fn portal(&self) -> &PortalHandle {
        &self.portal
    }

    pub fn payload(&self) -> Option<&ActivationPayload> {
        self.payload.as_ref()
    }

    /// Give the portal back, e.g. when the primitive rejects the request.
    pub fn into_portal(self) -> PortalHandle {
        self.portal
    }
}

/// The request could not be queued; the caller gets its portal back.
#[derive(Debug, Error)]
#[error("activation refused: {error}")]
pub struct Refused {
    pub portal: PortalHandle,
    #[source]
    pub error: LifecycleError,
}

/// Result of a completed promotion.
#[derive(Debug)]
pub struct Promotion {
    /// Document that is now top-level.
    pub promoted: DocumentId,
    /// Document that was top-level and is now the predecessor.
    pub demoted: DocumentId,
    pub event: PortalActivateEvent,
}

/// What the promoted document receives (`portalactivate`).
#[derive(Debug)]
pub struct PortalActivateEvent {
    data: Option<ActivationPayload>,
    predecessor: PortalHandle,
}

impl PortalActivateEvent {
    pub fn data(&self) -> Option<&ActivationPayload> {
        self.data.as_ref()
    }

    /// Take ownership of the payload and the predecessor portal.
    pub fn adopt_predecessor(self) -> (Option<ActivationPayload>, PortalHandle) {
        (self.data, self.predecessor)
    }
}

/// How the requester's pending activation ended.
#[derive(Debug)]
pub enum ActivationOutcome {
    Activated,
    Rejected { portal: PortalHandle, reason: String },
}

/// In-process stand-in for the browser's embedding primitive.
///
/// Knows which document lives at which URL, mints portal handles, tracks
/// the top-level document and holds at most one outstanding activation.
#[derive(Debug, Default)]
pub struct PortalRegistry {
    documents: BTreeMap<DocumentId, Url>,
    next_document: u32,
    next_portal: u64,
    top: Option<DocumentId>,
    in_flight: Option<ActivationRequest>,
}

impl PortalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loaded document. The first one becomes top-level.
    pub fn register(&mut self, url: Url) -> DocumentId {
        let id = DocumentId(self.next_document);
        self.next_document += 1;
        self.documents.insert(id, url);
        if self.top.is_none() {
            self.top = Some(id);
        }
        id
    }

    pub fn url_of(&self, id: DocumentId) -> Option<&Url> {
        self.documents.get(&id)
    }

    pub fn top(&self) -> Option<DocumentId> {
        self.top
    }

    /// Create a `<portal src=..>` for the document served at `src`.
    pub fn open(&mut self, src: Url) -> Result<PortalHandle, LifecycleError> {
        let target = self
            .documents
            .iter()
            .find(|(_, url)| same_resource(url, &src))
            .map(|(id, _)| *id)
            .ok_or_else(|| LifecycleError::UnknownDocument(src.clone()))?;
        Ok(self.mint(target, src))
    }

    fn mint(&mut self, target: DocumentId, src: Url) -> PortalHandle {
        let id = PortalId(self.next_portal);
        self.next_portal += 1;
        debug!(%id, %target, %src, "portal created");
        PortalHandle::new(id, target, src)
    }

    pub fn in_flight(&self) -> Option<&ActivationRequest> {
        self.in_flight.as_ref()
    }

    /// Queue a promotion of `portal`'s document. Only one request may be
    /// outstanding; a second one is refused and its portal returned.
    pub fn request_activation(
        &mut self,
        portal: PortalHandle,
        requester: DocumentId,
        payload: Option<ActivationPayload>,
    ) -> Result<(), Refused> {
        if let Some(pending) = &self.in_flight {
            return Err(Refused {
                portal,
                error: LifecycleError::ActivationInFlight(pending.requester),
            });
        }
        info!(portal = %portal.id(), %requester, "activation requested");
        self.in_flight = Some(ActivationRequest {
            portal,
            requester,
            payload,
        });
        Ok(())
    }

    pub(crate) fn take_in_flight(&mut self) -> Option<ActivationRequest> {
        self.in_flight.take()
    }

    /// Promote the requested document and hand the requester to it as a
    /// predecessor. Consumes the requester's portal.
    pub(crate) fn promote(&mut self, request: ActivationRequest) -> Result<Promotion, LifecycleError> {
        let ActivationRequest {
            portal,
            requester,
            payload,
        } = request;
        let promoted = portal.target();
        let requester_url = self
            .documents
            .get(&requester)
            .cloned()
            .ok_or(LifecycleError::UnknownPage(requester))?;
        drop(portal);

        self.top = Some(promoted);
        let predecessor = self.mint(requester, requester_url);
        info!(%promoted, demoted = %requester, "activation completed");
        Ok(Promotion {
            promoted,
            demoted: requester,
            event: PortalActivateEvent {
                data: payload,
                predecessor,
            },
        })
    }
}

/// Portals load by origin and path; query and fragment do not pick a
/// different document.
fn same_resource(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin() && a.path() == b.path()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap_or_else(|e| panic!("bad test url {s}: {e}"))
    }

    fn registry() -> (PortalRegistry, DocumentId, DocumentId) {
        let mut registry = PortalRegistry::new();
        let article = registry.register(url("http://localhost:3000/"));
        let podcast = registry.register(url("http://localhost:3000/ttt"));
        (registry, article, podcast)
    }

    #[test]
    fn first_document_is_top() {
        let (registry, article, _) = registry();
        assert_eq!(registry.top(), Some(article));
    }

    #[test]
    fn open_resolves_by_origin_and_path() {
        let (mut registry, _, podcast) = registry();
        let portal = registry.open(url("http://localhost:3000/ttt?autoplay=1"));
        assert!(portal.is_ok_and(|p| p.target() == podcast));
        let missing = registry.open(url("http://localhost:3001/ttt"));
        assert!(matches!(missing, Err(LifecycleError::UnknownDocument(_))));
    }

    #[test]
    fn second_request_is_refused_with_portal_returned() {
        let (mut registry, article, podcast) = registry();
        let first = registry.open(url("http://localhost:3000/ttt"));
        let second = registry.open(url("http://localhost:3000/ttt"));
        let (Ok(first), Ok(second)) = (first, second) else {
            panic!("podcast should be reachable");
        };
        let second_id = second.id();
        assert!(registry.request_activation(first, article, None).is_ok());
        let refused = registry.request_activation(second, podcast, None);
        let Err(refused) = refused else {
            panic!("second request should be refused");
        };
        assert_eq!(refused.portal.id(), second_id);
        assert!(matches!(
            refused.error,
            LifecycleError::ActivationInFlight(id) if id == article
        ));
    }

    #[test]
    fn promotion_swaps_top_and_mints_predecessor() {
        let (mut registry, article, podcast) = registry();
        let Ok(portal) = registry.open(url("http://localhost:3000/ttt")) else {
            panic!("podcast should be reachable");
        };
        let old_id = portal.id();
        let payload = ActivationPayload::new(true, "W", "/w.png", 420.0, 360.0, 378.0);
        assert!(registry.request_activation(portal, article, Some(payload)).is_ok());
        let Some(request) = registry.take_in_flight() else {
            panic!("request should be pending");
        };
        let Ok(promotion) = registry.promote(request) else {
            panic!("promotion should succeed");
        };
        assert_eq!(registry.top(), Some(podcast));
        assert_eq!(promotion.promoted, podcast);
        assert_eq!(promotion.demoted, article);
        assert!(promotion.event.data().is_some_and(|d| d.followed()));
        let (_, predecessor) = promotion.event.adopt_predecessor();
        assert_eq!(predecessor.target(), article);
        assert_ne!(predecessor.id(), old_id);
        assert!(registry.in_flight().is_none());
    }
}
