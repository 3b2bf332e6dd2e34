use portal_handoff_protocol::{ControlCommand, ElementId, SurfaceCommand};
use serde::Serialize;
use tracing::debug;

use super::Page;
use crate::error::Result;
use crate::lifecycle::{
    ActivationOutcome, Boundary, GuestController, HandBack, Inbound, PortalActivateEvent,
};
use crate::model::{DisplayMode, DocumentContext, Surface, TransitionEnd};
use crate::widgets::{AudioController, FollowWidget, PodcastWidgets, Recommendations};

/// The Totally Tooling Tips podcast page.
#[derive(Debug)]
pub struct PodcastPage {
    ctx: DocumentContext,
    controller: GuestController,
    widgets: PodcastWidgets,
}

#[derive(Debug, Clone, Serialize)]
pub struct PodcastSnapshot {
    pub embedded: bool,
    pub mode: DisplayMode,
    pub hand_back: HandBack,
    pub audio: AudioController,
    pub follow: Option<FollowWidget>,
    pub recommendations: Recommendations,
    pub surface: Surface,
}

impl PodcastPage {
    pub fn new(mut ctx: DocumentContext, audio: AudioController) -> Self {
        ctx.apply(&[
            SurfaceCommand::SetDisplay {
                target: ElementId::Follow,
                visible: false,
            },
            SurfaceCommand::SetDisplay {
                target: ElementId::Lightbox,
                visible: false,
            },
            SurfaceCommand::SetOpacity {
                target: ElementId::Lightbox,
                opacity: 0.0,
            },
        ]);
        Self {
            ctx,
            controller: GuestController::new(),
            widgets: PodcastWidgets::new(audio),
        }
    }

    /// Run the page's boot logic once its embedding state is known.
    pub fn boot(&mut self) {
        self.controller.boot(&mut self.ctx);
    }

    pub fn controller(&self) -> &GuestController {
        &self.controller
    }

    pub fn widgets(&self) -> &PodcastWidgets {
        &self.widgets
    }

    pub fn audio(&self) -> &AudioController {
        &self.widgets.audio
    }

    pub fn mode(&self) -> DisplayMode {
        self.controller.mode()
    }

    pub fn click_backdrop(&mut self, boundary: &mut Boundary) {
        self.controller
            .on_backdrop_click(&mut self.ctx, boundary, &mut self.widgets);
    }

    pub fn click_follow(&mut self, boundary: &mut Boundary) -> Result<()> {
        self.controller
            .click_follow(&self.ctx, boundary, &mut self.widgets)
    }

    pub fn toggle_recommendation(&mut self, id: &str) -> Result<bool> {
        let PodcastWidgets {
            audio,
            recommendations,
            ..
        } = &mut self.widgets;
        Ok(recommendations.toggle(&self.ctx, audio, id)?)
    }

    /// The page's own player buttons, used while it is top-level.
    pub fn control(&mut self, command: ControlCommand) {
        if self.ctx.is_embedded() {
            debug!(?command, "player covered by the host overlay");
            return;
        }
        self.widgets.audio.apply_control(&mut self.ctx, command);
    }

    /// `timeupdate` from the media element.
    pub fn time_update(&mut self, current_sec: f64) {
        self.widgets.audio.on_time_update(current_sec);
    }

    pub fn snapshot(&self) -> PodcastSnapshot {
        PodcastSnapshot {
            embedded: self.ctx.is_embedded(),
            mode: self.controller.mode(),
            hand_back: self.controller.hand_back(),
            audio: self.widgets.audio.clone(),
            follow: self.widgets.follow.clone(),
            recommendations: self.widgets.recommendations.clone(),
            surface: self.ctx.surface().clone(),
        }
    }
}

impl Page for PodcastPage {
    fn ctx(&self) -> &DocumentContext {
        &self.ctx
    }

    fn ctx_mut(&mut self) -> &mut DocumentContext {
        &mut self.ctx
    }

    fn on_transition_end(&mut self, boundary: &mut Boundary, end: TransitionEnd) -> Result<()> {
        self.controller.on_transition_end(&mut self.ctx, boundary, end);
        Ok(())
    }

    fn on_message(&mut self, message: Inbound) {
        self.controller
            .on_message(&mut self.ctx, &mut self.widgets, message);
    }

    fn on_portal_activate(&mut self, event: PortalActivateEvent) {
        self.controller
            .on_portal_activate(&mut self.ctx, &mut self.widgets, event);
    }

    fn on_activation_resolved(&mut self, outcome: ActivationOutcome) {
        self.controller
            .on_activation_resolved(&mut self.ctx, &mut self.widgets, outcome);
    }

    fn next_deadline(&self) -> Option<f64> {
        let surface = self.ctx.surface().next_deadline();
        let audio = self.widgets.audio.next_deadline();
        match (surface, audio) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn advance_to(&mut self, boundary: &mut Boundary, now_ms: f64) -> Result<()> {
        self.ctx.set_now(now_ms);
        for end in self.ctx.surface_mut().take_finished(now_ms) {
            self.on_transition_end(boundary, end)?;
        }
        self.widgets.audio.tick(&self.ctx);
        Ok(())
    }
}
