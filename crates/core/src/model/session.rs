use portal_handoff_protocol::ControlCommand;
use serde::Serialize;
use tracing::{debug, info};

use super::catalog::Catalog;
use super::document::{DocumentContext, DocumentId, DocumentRole};
use super::surface::Surface;
use crate::config::DemoConfig;
use crate::error::{LifecycleError, Result};
use crate::lifecycle::{ActivationOutcome, Boundary, PlayerButton};
use crate::pages::{ArticlePage, ArticleSnapshot, Page, PodcastPage, PodcastSnapshot};
use crate::widgets::AudioController;
use portal_handoff_protocol::ElementId;

/// Serializable view of a whole session at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub now_ms: f64,
    pub top: Option<DocumentRole>,
    pub activation_in_flight: bool,
    pub pending_messages: usize,
    pub dropped_messages: usize,
    pub article: ArticleSnapshot,
    pub podcast: PodcastSnapshot,
}

/// Both documents of the demo sharing one simulated browser tab.
///
/// Owns the [`Boundary`] and routes primitive events (promotion,
/// `transitionend`, delivered messages) to the page they belong to. The
/// clock only moves through [`Session::advance`].
#[derive(Debug)]
pub struct Session {
    boundary: Boundary,
    article: ArticlePage,
    podcast: PodcastPage,
    now_ms: f64,
    auto_resolve: bool,
}

impl Session {
    /// Load the article at `/` and the podcast at the guest path, embed the
    /// podcast and boot both pages.
    pub fn new(config: &DemoConfig) -> Result<Self> {
        let mut boundary = Boundary::new();
        let host_url = config.host_url()?;
        let guest_url = config.guest_url()?;
        let article_id = boundary.registry.register(host_url.clone());
        let podcast_id = boundary.registry.register(guest_url.clone());

        let layout = config.layout;
        let article_ctx = DocumentContext::new(
            article_id,
            DocumentRole::Article,
            host_url,
            Surface::new(layout.viewport_width)
                .with_layout(ElementId::EmbedContainer, layout.embed_container),
        );
        let podcast_ctx = DocumentContext::new(
            podcast_id,
            DocumentRole::Podcast,
            guest_url,
            Surface::new(layout.viewport_width).with_layout(ElementId::HeroImg, layout.hero),
        );
        let audio = AudioController::new(
            Catalog::demo(),
            &config.initial_track,
            layout.timeline_width,
        )?;

        let mut article = ArticlePage::new(article_ctx, config);
        let mut podcast = PodcastPage::new(podcast_ctx, audio);
        article.load(&mut boundary, config)?;
        if !article.is_fallback() {
            podcast.ctx_mut().set_embedded(true);
        }
        podcast.boot();
        info!(article = %article_id, podcast = %podcast_id, "session loaded");

        Ok(Self {
            boundary,
            article,
            podcast,
            now_ms: 0.0,
            auto_resolve: config.auto_resolve,
        })
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn article(&self) -> &ArticlePage {
        &self.article
    }

    pub fn podcast(&self) -> &PodcastPage {
        &self.podcast
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Role of the top-level document.
    pub fn top(&self) -> Option<DocumentRole> {
        let top = self.boundary.registry.top()?;
        self.role_of(top)
    }

    fn role_of(&self, id: DocumentId) -> Option<DocumentRole> {
        if id == self.article.ctx().id() {
            Some(DocumentRole::Article)
        } else if id == self.podcast.ctx().id() {
            Some(DocumentRole::Podcast)
        } else {
            None
        }
    }

    fn with_page<T>(
        &mut self,
        id: DocumentId,
        f: impl FnOnce(&mut dyn Page, &mut Boundary) -> T,
    ) -> Result<T> {
        let page: &mut dyn Page = if id == self.article.ctx().id() {
            &mut self.article
        } else if id == self.podcast.ctx().id() {
            &mut self.podcast
        } else {
            return Err(LifecycleError::UnknownPage(id).into());
        };
        Ok(f(page, &mut self.boundary))
    }

    fn top_is(&self, role: DocumentRole) -> bool {
        self.top() == Some(role)
    }

    /// Click on the embedded podcast in the article.
    pub fn click_overlay(&mut self) -> Result<bool> {
        if !self.top_is(DocumentRole::Article) {
            debug!("overlay is not on screen");
            return Ok(false);
        }
        let started = self.article.click_overlay(&mut self.boundary);
        self.pump()?;
        Ok(started)
    }

    /// A button on the article's player overlay.
    pub fn click_player(&mut self, button: PlayerButton) -> Result<()> {
        if !self.top_is(DocumentRole::Article) {
            debug!(?button, "player overlay is not on screen");
            return Ok(());
        }
        self.article.click_player(&mut self.boundary, button)?;
        self.pump()
    }

    /// Click on the predecessor shown behind the podcast's lightbox.
    pub fn click_backdrop(&mut self) -> Result<()> {
        if !self.top_is(DocumentRole::Podcast) {
            debug!("no backdrop on screen");
            return Ok(());
        }
        self.podcast.click_backdrop(&mut self.boundary);
        self.pump()
    }

    /// The article's own follow button.
    pub fn click_host_follow(&mut self) {
        if self.top_is(DocumentRole::Article) {
            self.article.click_follow();
        }
    }

    /// The podcast's writer-follow card.
    pub fn click_guest_follow(&mut self) -> Result<()> {
        if !self.top_is(DocumentRole::Podcast) {
            debug!("follow card is not on screen");
            return Ok(());
        }
        self.podcast.click_follow(&mut self.boundary)?;
        self.pump()
    }

    pub fn toggle_recommendation(&mut self, id: &str) -> Result<bool> {
        self.podcast.toggle_recommendation(id)
    }

    /// The podcast's own player buttons.
    pub fn control_podcast(&mut self, command: ControlCommand) {
        if self.top_is(DocumentRole::Podcast) {
            self.podcast.control(command);
        }
    }

    /// Move the clock forward by `ms`, firing every scheduled event in time
    /// order and settling the boundary after each.
    pub fn advance(&mut self, ms: f64) -> Result<()> {
        let target = self.now_ms + ms.max(0.0);
        loop {
            let next = [self.article.next_deadline(), self.podcast.next_deadline()]
                .into_iter()
                .flatten()
                .filter(|t| *t <= target)
                .min_by(f64::total_cmp);
            let Some(at) = next else {
                break;
            };
            self.step_to(at)?;
        }
        self.step_to(target)
    }

    fn step_to(&mut self, at: f64) -> Result<()> {
        self.now_ms = self.now_ms.max(at);
        let now = self.now_ms;
        self.article.advance_to(&mut self.boundary, now)?;
        self.podcast.advance_to(&mut self.boundary, now)?;
        self.pump()
    }

    /// Deliver queued messages and, with auto-resolve on, complete any
    /// pending activation. Runs until nothing is left to do.
    pub fn pump(&mut self) -> Result<()> {
        loop {
            let registry = &self.boundary.registry;
            let delivery = self
                .boundary
                .messenger
                .next_delivery(|id| registry.url_of(id).cloned());
            if let Some(delivery) = delivery {
                self.with_page(delivery.to, |page, _| page.on_message(delivery.message))?;
                continue;
            }
            if self.auto_resolve && self.boundary.registry.in_flight().is_some() {
                self.resolve_activation()?;
                continue;
            }
            return Ok(());
        }
    }

    /// Complete the pending activation: promote its target and hand the
    /// requester to it as predecessor.
    pub fn resolve_activation(&mut self) -> Result<()> {
        let request = self
            .boundary
            .registry
            .take_in_flight()
            .ok_or(LifecycleError::NoPendingActivation)?;
        let promotion = self.boundary.registry.promote(request)?;
        let (promoted, demoted) = (promotion.promoted, promotion.demoted);

        self.with_page(promoted, |page, _| page.ctx_mut().set_embedded(false))?;
        self.with_page(demoted, |page, _| page.ctx_mut().set_embedded(true))?;
        self.with_page(promoted, |page, _| page.on_portal_activate(promotion.event))?;
        self.with_page(demoted, |page, _| {
            page.on_activation_resolved(ActivationOutcome::Activated);
        })?;
        self.pump()
    }

    /// Fail the pending activation; the requester gets its portal back.
    pub fn reject_activation(&mut self, reason: &str) -> Result<()> {
        let request = self
            .boundary
            .registry
            .take_in_flight()
            .ok_or(LifecycleError::NoPendingActivation)?;
        let requester = request.requester();
        let outcome = ActivationOutcome::Rejected {
            portal: request.into_portal(),
            reason: reason.to_string(),
        };
        self.with_page(requester, |page, _| page.on_activation_resolved(outcome))?;
        self.pump()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            now_ms: self.now_ms,
            top: self.top(),
            activation_in_flight: self.boundary.registry.in_flight().is_some(),
            pending_messages: self.boundary.messenger.pending(),
            dropped_messages: self.boundary.messenger.dropped(),
            article: self.article.snapshot(),
            podcast: self.podcast.snapshot(),
        }
    }
}
