use portal_handoff_protocol::{ElementId, SurfaceCommand};
use serde::Serialize;
use tracing::info;

use super::Page;
use crate::config::DemoConfig;
use crate::error::Result;
use crate::lifecycle::{
    ActivationOutcome, Boundary, HostController, HostPhase, Inbound, PlayerButton,
    PortalActivateEvent,
};
use crate::model::{DocumentContext, EmbedHandle, EmbedSummary, Surface, TransitionEnd};
use crate::widgets::FollowButton;

/// The PORTALOG article that embeds the podcast.
#[derive(Debug)]
pub struct ArticlePage {
    ctx: DocumentContext,
    controller: HostController,
    follow: FollowButton,
    /// No embedding primitive: an inline frame and a banner instead.
    fallback: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleSnapshot {
    pub embedded: bool,
    pub phase: HostPhase,
    pub embed: Option<EmbedSummary>,
    pub follow: FollowButton,
    pub player_playing: bool,
    pub fallback: bool,
    pub follow_listener_registrations: u32,
    pub surface: Surface,
}

impl ArticlePage {
    pub fn new(mut ctx: DocumentContext, config: &DemoConfig) -> Self {
        ctx.apply(&[
            SurfaceCommand::SetDisplay {
                target: ElementId::HitTarget,
                visible: false,
            },
            SurfaceCommand::SetDisplay {
                target: ElementId::PlayerUi,
                visible: false,
            },
            SurfaceCommand::SetDisplay {
                target: ElementId::FallbackBanner,
                visible: false,
            },
        ]);
        Self {
            ctx,
            controller: HostController::new(config.writer.clone()),
            follow: FollowButton::default(),
            fallback: false,
        }
    }

    /// Boot the article: embed the podcast, or fall back to an inline frame
    /// when portals are unavailable.
    pub fn load(&mut self, boundary: &mut Boundary, config: &DemoConfig) -> Result<()> {
        if !config.portals_supported {
            info!("portals unavailable, showing inline frame fallback");
            self.fallback = true;
            self.ctx.apply(&[SurfaceCommand::SetDisplay {
                target: ElementId::FallbackBanner,
                visible: true,
            }]);
            return Ok(());
        }
        let origin = config.embed_origin()?;
        self.controller
            .populate(&mut self.ctx, boundary, &origin, &config.guest_path)
    }

    pub fn controller(&self) -> &HostController {
        &self.controller
    }

    pub fn follow(&self) -> &FollowButton {
        &self.follow
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn click_overlay(&mut self, boundary: &mut Boundary) -> bool {
        if self.fallback {
            return false;
        }
        self.controller.on_overlay_click(&mut self.ctx, boundary)
    }

    pub fn click_player(&mut self, boundary: &mut Boundary, button: PlayerButton) -> Result<()> {
        self.controller.on_player_button(&self.ctx, boundary, button)
    }

    pub fn click_follow(&mut self) {
        self.follow.click();
    }

    pub fn snapshot(&self) -> ArticleSnapshot {
        ArticleSnapshot {
            embedded: self.ctx.is_embedded(),
            phase: self.controller.phase(),
            embed: self.controller.embed().map(EmbedHandle::summary),
            follow: self.follow.clone(),
            player_playing: self.controller.is_player_playing(),
            fallback: self.fallback,
            follow_listener_registrations: self.controller.follow_listener_registrations(),
            surface: self.ctx.surface().clone(),
        }
    }
}

impl Page for ArticlePage {
    fn ctx(&self) -> &DocumentContext {
        &self.ctx
    }

    fn ctx_mut(&mut self) -> &mut DocumentContext {
        &mut self.ctx
    }

    fn on_transition_end(&mut self, boundary: &mut Boundary, end: TransitionEnd) -> Result<()> {
        let followed = self.follow.is_followed();
        self.controller
            .on_transition_end(&mut self.ctx, boundary, end, followed)
    }

    fn on_message(&mut self, message: Inbound) {
        self.controller.on_message(&mut self.follow, message);
    }

    fn on_portal_activate(&mut self, event: PortalActivateEvent) {
        self.controller.on_portal_activate(&mut self.ctx, event);
    }

    fn on_activation_resolved(&mut self, outcome: ActivationOutcome) {
        self.controller.on_activation_resolved(&mut self.ctx, outcome);
    }
}
