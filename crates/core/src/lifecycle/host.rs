use portal_handoff_protocol::{
    ActivationPayload, AnimatedProperty, ControlCommand, ElementId, PortalMessage, Rect,
    SurfaceCommand, Transform, Transition,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use super::Boundary;
use super::messenger::Inbound;
use super::registry::{ActivationOutcome, PortalActivateEvent};
use crate::error::{LifecycleError, Result};
use crate::model::{DocumentContext, EmbedHandle, PortalHandle, TransitionEnd};
use crate::widgets::FollowButton;

/// Where the container's top edge lands at the end of the exit animation,
/// lined up with the guest's hero image.
pub const TARGET_Y_PX: f64 = 170.0;
const EXIT_SCALE: f64 = 1.05;
const EXIT_MS: u32 = 600;

/// Identity sent along with an activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterProfile {
    pub name: String,
    pub photo_src: String,
}

impl Default for WriterProfile {
    fn default() -> Self {
        Self {
            name: "Yusuke Utsunomiya".to_string(),
            photo_src: "/img/profile.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerButton {
    Prev,
    PlayPause,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "phase")]
pub enum HostPhase {
    /// Nothing embedded yet.
    Unpopulated,
    Idle,
    /// Exit animation running from `initial`.
    Animating { initial: Rect },
    /// Promotion requested, waiting on the primitive.
    Activating { initial: Rect },
}

/// Drives the article page: embeds the podcast, animates it out and
/// requests its promotion, then takes it back when handed a predecessor.
#[derive(Debug)]
pub struct HostController {
    embed: Option<EmbedHandle>,
    phase: HostPhase,
    writer: WriterProfile,
    /// `playing` attribute of the overlay's play button.
    player_playing: bool,
    follow_listener_wired: bool,
    follow_listener_registrations: u32,
}

impl HostController {
    pub fn new(writer: WriterProfile) -> Self {
        Self {
            embed: None,
            phase: HostPhase::Unpopulated,
            writer,
            player_playing: false,
            follow_listener_wired: false,
            follow_listener_registrations: 0,
        }
    }

    pub fn phase(&self) -> HostPhase {
        self.phase
    }

    pub fn embed(&self) -> Option<&EmbedHandle> {
        self.embed.as_ref()
    }

    pub fn writer(&self) -> &WriterProfile {
        &self.writer
    }

    pub fn is_player_playing(&self) -> bool {
        self.player_playing
    }

    /// How many times the follow-status listener has been attached.
    pub fn follow_listener_registrations(&self) -> u32 {
        self.follow_listener_registrations
    }

    /// Embed the document at `origin` + `path` and put the hit target and
    /// player overlay over it.
    pub fn populate(
        &mut self,
        ctx: &mut DocumentContext,
        boundary: &mut Boundary,
        origin: &Url,
        path: &str,
    ) -> Result<()> {
        let src = origin.join(path).map_err(LifecycleError::from)?;
        let portal = boundary.registry.open(src)?;
        info!(portal = %portal.id(), src = %portal.src(), "podcast embedded");
        ctx.apply(&[
            SurfaceCommand::AttachPortal {
                target: ElementId::EmbedContainer,
                portal: portal.id(),
            },
            SurfaceCommand::SetDisplay {
                target: ElementId::HitTarget,
                visible: true,
            },
            SurfaceCommand::SetDisplay {
                target: ElementId::PlayerUi,
                visible: true,
            },
        ]);
        let geometry = ctx.surface().bounding_rect(ElementId::EmbedContainer);
        self.embed = Some(EmbedHandle::new(portal, geometry));
        self.phase = HostPhase::Idle;
        Ok(())
    }

    /// Click on the hit target. Starts the exit animation unless one is
    /// already running or an activation is pending. Returns whether it did.
    pub fn on_overlay_click(&mut self, ctx: &mut DocumentContext, boundary: &mut Boundary) -> bool {
        if self.phase != HostPhase::Idle {
            debug!(phase = ?self.phase, "overlay click ignored");
            return false;
        }
        let Some(embed) = self.embed.as_mut() else {
            debug!("overlay click with nothing embedded");
            return false;
        };
        let initial = ctx.surface().bounding_rect(ElementId::EmbedContainer);
        embed.begin_animation(initial);
        ctx.apply(&[
            SurfaceCommand::SetDisplay {
                target: ElementId::PlayerUi,
                visible: false,
            },
            SurfaceCommand::SetTransition {
                target: ElementId::EmbedContainer,
                transition: Some(Transition::new(AnimatedProperty::Transform, EXIT_MS)),
            },
            SurfaceCommand::SetTransform {
                target: ElementId::EmbedContainer,
                transform: Transform {
                    translate_y: TARGET_Y_PX - initial.y,
                    scale: EXIT_SCALE,
                },
            },
        ]);
        if let Err(error) = boundary.messenger.post(
            ctx.url(),
            embed.portal(),
            &ControlCommand::Hide.into(),
            None,
        ) {
            warn!(%error, "could not ask the podcast to hide its player");
        }
        self.phase = HostPhase::Animating { initial };
        true
    }

    /// Only the container's `transform` transition ends the animation.
    pub fn on_transition_end(
        &mut self,
        ctx: &mut DocumentContext,
        boundary: &mut Boundary,
        end: TransitionEnd,
        followed: bool,
    ) -> Result<()> {
        if end.target != ElementId::EmbedContainer || end.property != AnimatedProperty::Transform {
            return Ok(());
        }
        let HostPhase::Animating { initial } = self.phase else {
            debug!(phase = ?self.phase, "stray container transition ignored");
            return Ok(());
        };
        let activated = ctx.surface().bounding_rect(ElementId::EmbedContainer);
        let payload = ActivationPayload::new(
            followed,
            &self.writer.name,
            &self.writer.photo_src,
            initial.y,
            initial.w,
            activated.w,
        );
        self.activate(ctx, boundary, payload)
    }

    /// Hand the embedded portal to the primitive for promotion.
    pub fn activate(
        &mut self,
        ctx: &mut DocumentContext,
        boundary: &mut Boundary,
        payload: ActivationPayload,
    ) -> Result<()> {
        let embed = self.embed.take().ok_or(LifecycleError::NoEmbeddedPortal)?;
        let geometry = embed.geometry();
        match boundary
            .registry
            .request_activation(embed.into_portal(), ctx.id(), Some(payload))
        {
            Ok(()) => {
                self.phase = HostPhase::Activating { initial: geometry };
                Ok(())
            }
            Err(refused) => {
                self.recover(ctx, refused.portal, geometry);
                Err(refused.error.into())
            }
        }
    }

    /// The promotion we requested has settled.
    pub fn on_activation_resolved(&mut self, ctx: &mut DocumentContext, outcome: ActivationOutcome) {
        match outcome {
            ActivationOutcome::Activated => {
                ctx.apply(&neutral_container());
                self.phase = HostPhase::Idle;
                if ctx.is_embedded() {
                    ctx.apply(&[SurfaceCommand::SetScrollbars { visible: false }]);
                    self.wire_follow_listener();
                }
            }
            ActivationOutcome::Rejected { portal, reason } => {
                warn!(%reason, "activation rejected, keeping the podcast embedded");
                let geometry = match self.phase {
                    HostPhase::Activating { initial } | HostPhase::Animating { initial } => initial,
                    _ => ctx.surface().bounding_rect(ElementId::EmbedContainer),
                };
                self.recover(ctx, portal, geometry);
            }
        }
    }

    fn recover(&mut self, ctx: &mut DocumentContext, portal: PortalHandle, geometry: Rect) {
        ctx.apply(&neutral_container());
        ctx.apply(&[SurfaceCommand::SetDisplay {
            target: ElementId::PlayerUi,
            visible: true,
        }]);
        let mut embed = EmbedHandle::new(portal, geometry);
        embed.end_animation();
        self.embed = Some(embed);
        self.phase = HostPhase::Idle;
    }

    fn wire_follow_listener(&mut self) {
        if self.follow_listener_wired {
            return;
        }
        self.follow_listener_wired = true;
        self.follow_listener_registrations += 1;
        debug!("follow status listener attached");
    }

    /// `portalactivate` on the article: the podcast handed us back.
    pub fn on_portal_activate(&mut self, ctx: &mut DocumentContext, event: PortalActivateEvent) {
        let (_, predecessor) = event.adopt_predecessor();
        self.on_predecessor_return(ctx, predecessor);
    }

    /// Replace whatever was embedded with `predecessor` and bring the
    /// overlay back.
    pub fn on_predecessor_return(&mut self, ctx: &mut DocumentContext, predecessor: PortalHandle) {
        if let Some(old) = self.embed.take() {
            debug!(portal = %old.portal().id(), "stale embed replaced");
        }
        ctx.apply(&[
            SurfaceCommand::DetachPortal {
                target: ElementId::EmbedContainer,
            },
            SurfaceCommand::AttachPortal {
                target: ElementId::EmbedContainer,
                portal: predecessor.id(),
            },
            SurfaceCommand::SetDisplay {
                target: ElementId::PlayerUi,
                visible: true,
            },
            SurfaceCommand::SetScrollbars { visible: true },
        ]);
        let geometry = ctx.surface().bounding_rect(ElementId::EmbedContainer);
        info!(portal = %predecessor.id(), "podcast re-embedded");
        self.embed = Some(EmbedHandle::new(predecessor, geometry));
        self.phase = HostPhase::Idle;
    }

    /// A button on the player overlay.
    pub fn on_player_button(
        &mut self,
        ctx: &DocumentContext,
        boundary: &mut Boundary,
        button: PlayerButton,
    ) -> Result<()> {
        if !ctx.surface().is_visible(ElementId::PlayerUi) {
            debug!(?button, "player overlay is hidden");
            return Ok(());
        }
        let embed = self.embed.as_ref().ok_or(LifecycleError::NoEmbeddedPortal)?;
        let command = match button {
            PlayerButton::Prev => ControlCommand::Prev,
            PlayerButton::Next => ControlCommand::Next,
            PlayerButton::PlayPause => {
                self.player_playing = !self.player_playing;
                if self.player_playing {
                    ControlCommand::Play
                } else {
                    ControlCommand::Pause
                }
            }
        };
        boundary
            .messenger
            .post(ctx.url(), embed.portal(), &command.into(), None)?;
        Ok(())
    }

    /// A message from the podcast page, only heard once the follow listener
    /// is wired.
    pub fn on_message(&mut self, follow: &mut FollowButton, message: Inbound) {
        match message {
            Inbound::Message(PortalMessage::FollowStatus { is_followed }) => {
                if !self.follow_listener_wired {
                    debug!("follow status arrived before the listener was wired");
                    return;
                }
                follow.set_followed(is_followed);
            }
            Inbound::Message(PortalMessage::Control { control }) => {
                debug!(?control, "article has no player to control");
            }
            Inbound::Unknown(data) => {
                warn!(%data, "unrecognised message ignored");
            }
        }
    }
}

fn neutral_container() -> [SurfaceCommand; 2] {
    [
        SurfaceCommand::SetTransition {
            target: ElementId::EmbedContainer,
            transition: None,
        },
        SurfaceCommand::SetTransform {
            target: ElementId::EmbedContainer,
            transform: Transform::IDENTITY,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentId, DocumentRole, Surface};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap_or_else(|e| panic!("bad test url {s}: {e}"))
    }

    struct Fixture {
        boundary: Boundary,
        ctx: DocumentContext,
        host: HostController,
    }

    fn fixture() -> Fixture {
        let mut boundary = Boundary::new();
        let article = boundary.registry.register(url("http://localhost:3000/"));
        boundary.registry.register(url("http://localhost:3000/ttt"));
        let ctx = DocumentContext::new(
            article,
            DocumentRole::Article,
            url("http://localhost:3000/"),
            Surface::new(400.0)
                .with_layout(ElementId::EmbedContainer, Rect::new(20.0, 420.0, 360.0, 240.0)),
        );
        Fixture {
            boundary,
            ctx,
            host: HostController::new(WriterProfile::default()),
        }
    }

    fn populated() -> Fixture {
        let mut f = fixture();
        let origin = url("http://localhost:3000/");
        let populated = f.host.populate(&mut f.ctx, &mut f.boundary, &origin, "/ttt");
        assert!(populated.is_ok());
        f
    }

    const CONTAINER_TRANSFORM: TransitionEnd = TransitionEnd {
        target: ElementId::EmbedContainer,
        property: AnimatedProperty::Transform,
    };

    #[test]
    fn populate_embeds_podcast_and_shows_overlay() {
        let f = populated();
        assert_eq!(f.host.phase(), HostPhase::Idle);
        let embed = f.host.embed().map(EmbedHandle::summary);
        assert!(embed.as_ref().is_some_and(|e| e.y == 420.0 && e.width == 360.0));
        assert!(embed.is_some_and(|e| e.origin == "http://localhost:3000"));
        assert!(f.ctx.surface().is_visible(ElementId::PlayerUi));
        assert!(f.ctx.surface().portal_in(ElementId::EmbedContainer).is_some());
    }

    #[test]
    fn populate_with_unknown_path_fails() {
        let mut f = fixture();
        let origin = url("http://localhost:3000/");
        let result = f.host.populate(&mut f.ctx, &mut f.boundary, &origin, "/nope");
        assert!(result.is_err());
        assert_eq!(f.host.phase(), HostPhase::Unpopulated);
    }

    #[test]
    fn overlay_click_animates_and_hides_guest_player() {
        let mut f = populated();
        assert!(f.host.on_overlay_click(&mut f.ctx, &mut f.boundary));
        assert!(!f.ctx.surface().is_visible(ElementId::PlayerUi));
        let rect = f.ctx.surface().bounding_rect(ElementId::EmbedContainer);
        assert!((rect.y - TARGET_Y_PX).abs() < 1e-9);
        assert_eq!(f.ctx.surface().next_deadline(), Some(600.0));
        assert_eq!(f.boundary.messenger.pending(), 1);
    }

    #[test]
    fn second_overlay_click_is_debounced() {
        let mut f = populated();
        assert!(f.host.on_overlay_click(&mut f.ctx, &mut f.boundary));
        assert!(!f.host.on_overlay_click(&mut f.ctx, &mut f.boundary));
        assert_eq!(f.boundary.messenger.pending(), 1);
    }

    #[test]
    fn transform_end_requests_activation_with_payload() {
        let mut f = populated();
        f.host.on_overlay_click(&mut f.ctx, &mut f.boundary);
        let result = f
            .host
            .on_transition_end(&mut f.ctx, &mut f.boundary, CONTAINER_TRANSFORM, true);
        assert!(result.is_ok());
        assert!(matches!(f.host.phase(), HostPhase::Activating { .. }));
        assert!(f.host.embed().is_none());

        let payload = f.boundary.registry.in_flight().and_then(|r| r.payload());
        let Some(payload) = payload else {
            panic!("activation should carry a payload");
        };
        assert!(payload.followed());
        assert_eq!(payload.initial_y(), 420.0);
        assert_eq!(payload.initial_width(), 360.0);
        assert!((payload.activated_width() - 378.0).abs() < 1e-9);
        assert_eq!(payload.name(), "Yusuke Utsunomiya");
    }

    #[test]
    fn other_transitions_are_ignored() {
        let mut f = populated();
        f.host.on_overlay_click(&mut f.ctx, &mut f.boundary);
        let opacity = TransitionEnd {
            target: ElementId::EmbedContainer,
            property: AnimatedProperty::Opacity,
        };
        let result = f.host.on_transition_end(&mut f.ctx, &mut f.boundary, opacity, false);
        assert!(result.is_ok());
        assert!(matches!(f.host.phase(), HostPhase::Animating { .. }));
        assert!(f.boundary.registry.in_flight().is_none());
    }

    #[test]
    fn rejection_restores_embed_and_overlay() {
        let mut f = populated();
        f.host.on_overlay_click(&mut f.ctx, &mut f.boundary);
        let _ = f
            .host
            .on_transition_end(&mut f.ctx, &mut f.boundary, CONTAINER_TRANSFORM, false);
        let Some(request) = f.boundary.registry.take_in_flight() else {
            panic!("activation should be in flight");
        };
        let portal = request.into_portal();
        f.host.on_activation_resolved(
            &mut f.ctx,
            ActivationOutcome::Rejected {
                portal,
                reason: "user gesture required".into(),
            },
        );
        assert_eq!(f.host.phase(), HostPhase::Idle);
        assert!(f.host.embed().is_some_and(|e| !e.is_animating()));
        assert!(f.ctx.surface().is_visible(ElementId::PlayerUi));
        assert!(f.ctx.surface().style(ElementId::EmbedContainer).transform.is_identity());
        assert!(f.host.on_overlay_click(&mut f.ctx, &mut f.boundary));
    }

    #[test]
    fn follow_listener_wired_once() {
        let mut f = populated();
        f.ctx.set_embedded(true);
        f.host.on_activation_resolved(&mut f.ctx, ActivationOutcome::Activated);
        f.host.on_activation_resolved(&mut f.ctx, ActivationOutcome::Activated);
        assert_eq!(f.host.follow_listener_registrations(), 1);
        assert!(!f.ctx.surface().scrollbars_visible());
    }

    #[test]
    fn follow_status_needs_wired_listener() {
        let mut f = populated();
        let mut button = FollowButton::default();
        let status = Inbound::Message(PortalMessage::follow_status(true));
        f.host.on_message(&mut button, status.clone());
        assert!(!button.is_followed());

        f.ctx.set_embedded(true);
        f.host.on_activation_resolved(&mut f.ctx, ActivationOutcome::Activated);
        f.host.on_message(&mut button, status);
        assert!(button.is_followed());
    }

    #[test]
    fn play_button_toggles_and_posts() {
        let mut f = populated();
        let ok = f
            .host
            .on_player_button(&f.ctx, &mut f.boundary, PlayerButton::PlayPause);
        assert!(ok.is_ok());
        assert!(f.host.is_player_playing());
        let _ = f
            .host
            .on_player_button(&f.ctx, &mut f.boundary, PlayerButton::PlayPause);
        assert!(!f.host.is_player_playing());
        assert_eq!(f.boundary.messenger.pending(), 2);
    }

    #[test]
    fn predecessor_return_reinstalls_embed() {
        let mut f = populated();
        let guest = DocumentId(1);
        let Ok(handle) = f.boundary.registry.open(url("http://localhost:3000/ttt")) else {
            panic!("podcast should be registered");
        };
        assert_eq!(handle.target(), guest);
        let id = handle.id();
        f.host.on_predecessor_return(&mut f.ctx, handle);
        assert_eq!(f.ctx.surface().portal_in(ElementId::EmbedContainer), Some(id));
        assert!(f.host.embed().is_some_and(|e| e.portal().id() == id));
        assert!(f.ctx.surface().scrollbars_visible());
    }
}
