//! The two documents of the demo, each a [`DocumentContext`] plus the
//! controller and widgets that live in it.

pub mod article;
pub mod podcast;

pub use article::{ArticlePage, ArticleSnapshot};
pub use podcast::{PodcastPage, PodcastSnapshot};

use crate::error::Result;
use crate::lifecycle::{ActivationOutcome, Boundary, Inbound, PortalActivateEvent};
use crate::model::{DocumentContext, TransitionEnd};

/// Event entry points shared by both documents, so the session can route
/// by [`crate::model::DocumentId`] without knowing which page it holds.
pub trait Page {
    fn ctx(&self) -> &DocumentContext;

    fn ctx_mut(&mut self) -> &mut DocumentContext;

    fn on_transition_end(&mut self, boundary: &mut Boundary, end: TransitionEnd) -> Result<()>;

    fn on_message(&mut self, message: Inbound);

    /// We were promoted to top-level.
    fn on_portal_activate(&mut self, event: PortalActivateEvent);

    /// An activation this page requested has settled.
    fn on_activation_resolved(&mut self, outcome: ActivationOutcome);

    /// Earliest time something is scheduled to happen on this page.
    fn next_deadline(&self) -> Option<f64> {
        self.ctx().surface().next_deadline()
    }

    /// Move the page clock to `now_ms` and dispatch every `transitionend`
    /// that is due.
    fn advance_to(&mut self, boundary: &mut Boundary, now_ms: f64) -> Result<()> {
        let ctx = self.ctx_mut();
        ctx.set_now(now_ms);
        let ended = ctx.surface_mut().take_finished(now_ms);
        for end in ended {
            self.on_transition_end(boundary, end)?;
        }
        Ok(())
    }
}
