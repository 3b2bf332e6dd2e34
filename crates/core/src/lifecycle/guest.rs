use portal_handoff_protocol::{
    ActivationPayload, AnimatedProperty, ElementId, FadeAnimation, Length, PortalId,
    PortalMessage, SurfaceCommand, Transition,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::Boundary;
use super::messenger::Inbound;
use super::registry::{ActivationOutcome, PortalActivateEvent};
use crate::error::{LifecycleError, Result};
use crate::model::{DisplayMode, DocumentContext, PortalHandle, TransitionEnd};
use crate::widgets::{FollowWidget, PodcastWidgets};

/// Vertical distance between the top of the podcast page and its hero
/// image; the article animates its container up to this line.
pub const HERO_OFFSET_PX: f64 = 170.0;

const HERO_RETURN_MS: u32 = 600;
const MAIN_SHRINK_MS: u32 = 300;
const CARD_MARGIN_TOP_PX: f64 = 50.0;
const CARD_SHADOW: &str = "0 -3px 5px rgba(0,0,0,0.19)";
const CARD_RADIUS: &str = "5px 5px 0px 0px";
const BACKDROP_OPACITY: f64 = 0.6;
const PAGE_BACKGROUND: &str = "#FFF";

/// The transition whose end triggers the hand-back.
const HERO_TOP: TransitionEnd = TransitionEnd {
    target: ElementId::HeroImg,
    property: AnimatedProperty::Top,
};

/// Inputs for entering `ACTIVATED`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivatedOptions {
    pub followed: bool,
    pub name: String,
    pub photo_src: String,
    pub activated_width: f64,
    pub predecessor: PortalId,
}

impl ActivatedOptions {
    pub fn from_payload(payload: &ActivationPayload, predecessor: PortalId) -> Self {
        Self {
            followed: payload.followed(),
            name: payload.name().to_string(),
            photo_src: payload.photo_src().to_string(),
            activated_width: payload.activated_width(),
            predecessor,
        }
    }
}

/// A display-mode change together with the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ModeRequest {
    Reset,
    Embed,
    Activated(ActivatedOptions),
    PredecessorActivate { initial_y: f64, initial_width: f64 },
}

impl ModeRequest {
    pub fn mode(&self) -> DisplayMode {
        match self {
            ModeRequest::Reset => DisplayMode::Reset,
            ModeRequest::Embed => DisplayMode::Embed,
            ModeRequest::Activated(_) => DisplayMode::Activated,
            ModeRequest::PredecessorActivate { .. } => DisplayMode::PredecessorActivate,
        }
    }
}

/// Style mutations that put the podcast page into the requested mode.
///
/// Pure: the result depends only on the request.
pub fn display_commands(request: &ModeRequest) -> Vec<SurfaceCommand> {
    match request {
        ModeRequest::Reset => reset_commands(),
        ModeRequest::Embed => {
            let mut cmds: Vec<SurfaceCommand> = ElementId::GUEST_CHROME
                .iter()
                .map(|&target| SurfaceCommand::SetDisplay {
                    target,
                    visible: false,
                })
                .collect();
            cmds.push(SurfaceCommand::SetScrollbars { visible: false });
            cmds
        }
        ModeRequest::Activated(options) => activated_commands(options),
        ModeRequest::PredecessorActivate {
            initial_y,
            initial_width,
        } => {
            let mut cmds = vec![
                SurfaceCommand::SetBoxShadow {
                    target: ElementId::Main,
                    shadow: None,
                },
                SurfaceCommand::SetBackground {
                    target: ElementId::Main,
                    color: None,
                },
            ];
            cmds.extend(
                ElementId::GUEST_CHROME
                    .iter()
                    .map(|&target| SurfaceCommand::SetOpacity {
                        target,
                        opacity: 0.0,
                    }),
            );
            cmds.extend([
                SurfaceCommand::SetTransition {
                    target: ElementId::HeroImg,
                    transition: Some(Transition::new(AnimatedProperty::Top, HERO_RETURN_MS)),
                },
                SurfaceCommand::SetOffset {
                    target: ElementId::HeroImg,
                    property: AnimatedProperty::Top,
                    px: initial_y - HERO_OFFSET_PX,
                },
                SurfaceCommand::SetTransition {
                    target: ElementId::Main,
                    transition: Some(Transition::new(AnimatedProperty::Width, MAIN_SHRINK_MS)),
                },
                SurfaceCommand::SetWidth {
                    target: ElementId::Main,
                    width: Length::Px(*initial_width),
                },
            ]);
            cmds
        }
    }
}

fn reset_commands() -> Vec<SurfaceCommand> {
    let mut cmds = Vec::with_capacity(24);
    for target in ElementId::GUEST_CHROME {
        cmds.push(SurfaceCommand::SetDisplay {
            target,
            visible: target != ElementId::Follow,
        });
        cmds.push(SurfaceCommand::SetOpacity {
            target,
            opacity: 1.0,
        });
    }
    cmds.extend([
        SurfaceCommand::SetTransition {
            target: ElementId::Main,
            transition: None,
        },
        SurfaceCommand::SetWidth {
            target: ElementId::Main,
            width: Length::full(),
        },
        SurfaceCommand::SetMarginTop {
            target: ElementId::Main,
            px: 0.0,
        },
        SurfaceCommand::SetBoxShadow {
            target: ElementId::Main,
            shadow: None,
        },
        SurfaceCommand::SetBorderRadius {
            target: ElementId::Main,
            radius: None,
        },
        SurfaceCommand::SetBackground {
            target: ElementId::Main,
            color: Some(PAGE_BACKGROUND.to_string()),
        },
        SurfaceCommand::SetDisplay {
            target: ElementId::Lightbox,
            visible: false,
        },
        SurfaceCommand::SetOpacity {
            target: ElementId::Lightbox,
            opacity: 0.0,
        },
        SurfaceCommand::SetTransition {
            target: ElementId::HeroImg,
            transition: None,
        },
        SurfaceCommand::SetOffset {
            target: ElementId::HeroImg,
            property: AnimatedProperty::Top,
            px: 0.0,
        },
        SurfaceCommand::DetachPortal {
            target: ElementId::Embed,
        },
        SurfaceCommand::UnmountFollowWidget,
    ]);
    cmds
}

fn activated_commands(options: &ActivatedOptions) -> Vec<SurfaceCommand> {
    let mut cmds = Vec::with_capacity(20);
    for target in [ElementId::Header, ElementId::Detail, ElementId::Recommendation] {
        cmds.push(SurfaceCommand::Animate {
            target,
            animation: FadeAnimation::FadeIn,
        });
        cmds.push(SurfaceCommand::SetDisplay {
            target,
            visible: true,
        });
    }
    cmds.push(SurfaceCommand::SetScrollbars { visible: true });

    if options.followed {
        cmds.push(SurfaceCommand::SetDisplay {
            target: ElementId::Follow,
            visible: false,
        });
    } else {
        cmds.extend([
            SurfaceCommand::MountFollowWidget {
                name: options.name.clone(),
                photo_src: options.photo_src.clone(),
            },
            SurfaceCommand::SetDisplay {
                target: ElementId::Follow,
                visible: true,
            },
            SurfaceCommand::Animate {
                target: ElementId::Follow,
                animation: FadeAnimation::FadeIn,
            },
        ]);
    }

    cmds.extend([
        SurfaceCommand::SetWidth {
            target: ElementId::Main,
            width: Length::Px(options.activated_width),
        },
        SurfaceCommand::SetMarginTop {
            target: ElementId::Main,
            px: CARD_MARGIN_TOP_PX,
        },
        SurfaceCommand::SetBoxShadow {
            target: ElementId::Main,
            shadow: Some(CARD_SHADOW.to_string()),
        },
        SurfaceCommand::SetBorderRadius {
            target: ElementId::Main,
            radius: Some(CARD_RADIUS.to_string()),
        },
        SurfaceCommand::SetDisplay {
            target: ElementId::Lightbox,
            visible: true,
        },
        SurfaceCommand::SetOpacity {
            target: ElementId::Lightbox,
            opacity: BACKDROP_OPACITY,
        },
        SurfaceCommand::Animate {
            target: ElementId::Lightbox,
            animation: FadeAnimation::FadeInBackdrop,
        },
        SurfaceCommand::AttachPortal {
            target: ElementId::Embed,
            portal: options.predecessor,
        },
    ]);
    cmds
}

/// Where the hand-back stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandBack {
    Idle,
    /// Collapse animation running; waiting for the hero's `top` to land.
    Animating,
    /// Predecessor activation requested, waiting on the primitive.
    Requested,
    /// The primitive refused; a backdrop click tries again.
    Rejected,
}

/// Drives the podcast page through its display modes.
#[derive(Debug)]
pub struct GuestController {
    mode: DisplayMode,
    predecessor: Option<PortalHandle>,
    /// `initialY`/`initialWidth` from the last payload, used to animate
    /// back into the predecessor's container.
    return_y: f64,
    return_width: f64,
    hand_back: HandBack,
}

impl GuestController {
    pub fn new() -> Self {
        Self {
            mode: DisplayMode::Reset,
            predecessor: None,
            return_y: 0.0,
            return_width: 0.0,
            hand_back: HandBack::Idle,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn predecessor(&self) -> Option<&PortalHandle> {
        self.predecessor.as_ref()
    }

    pub fn hand_back(&self) -> HandBack {
        self.hand_back
    }

    /// A document that loads inside a portal starts out embedded; a
    /// top-level load stays as it is.
    pub fn boot(&mut self, ctx: &mut DocumentContext) {
        if ctx.is_embedded() {
            self.set_display_mode(ctx, ModeRequest::Embed);
        }
    }

    /// Switch modes if the transition table allows it. Returns whether the
    /// request was applied; illegal requests change nothing.
    pub fn set_display_mode(&mut self, ctx: &mut DocumentContext, request: ModeRequest) -> bool {
        let target = request.mode();
        if !self.mode.can_enter(target) {
            debug!(from = %self.mode, to = %target, "display mode change ignored");
            return false;
        }
        ctx.apply(&display_commands(&request));
        debug!(from = %self.mode, to = %target, "display mode changed");
        self.mode = target;
        true
    }

    /// `portalactivate`: we were promoted and receive our former host.
    pub fn on_portal_activate(
        &mut self,
        ctx: &mut DocumentContext,
        widgets: &mut PodcastWidgets,
        event: PortalActivateEvent,
    ) {
        let (data, predecessor) = event.adopt_predecessor();
        if !self.mode.can_enter(DisplayMode::Activated) {
            warn!(mode = %self.mode, "activation arrived outside EMBED, predecessor dropped");
            return;
        }
        let options = match &data {
            Some(payload) => {
                self.return_y = payload.initial_y();
                self.return_width = payload.initial_width();
                ActivatedOptions::from_payload(payload, predecessor.id())
            }
            None => {
                warn!("activation carried no payload, showing predecessor without follow card");
                ActivatedOptions {
                    followed: true,
                    name: String::new(),
                    photo_src: String::new(),
                    activated_width: ctx.surface().viewport_width(),
                    predecessor: predecessor.id(),
                }
            }
        };

        widgets.audio.show(ctx);
        widgets.audio.handle_activation(ctx);
        widgets.follow =
            (!options.followed).then(|| FollowWidget::new(&options.name, &options.photo_src));
        self.predecessor = Some(predecessor);
        self.hand_back = HandBack::Idle;
        self.set_display_mode(ctx, ModeRequest::Activated(options));
    }

    /// Click on the dimmed predecessor behind the lightbox.
    pub fn on_backdrop_click(
        &mut self,
        ctx: &mut DocumentContext,
        boundary: &mut Boundary,
        widgets: &mut PodcastWidgets,
    ) {
        match (self.mode, self.hand_back) {
            (DisplayMode::Activated, _) => {
                let request = ModeRequest::PredecessorActivate {
                    initial_y: self.return_y,
                    initial_width: self.return_width,
                };
                if self.set_display_mode(ctx, request) {
                    self.hand_back = HandBack::Animating;
                    widgets.audio.hide(ctx);
                    if !ctx.surface().is_running(HERO_TOP) {
                        debug!("hero already in place, handing back at once");
                        self.request_hand_back(ctx, boundary);
                    }
                }
            }
            (DisplayMode::PredecessorActivate, HandBack::Rejected) => {
                self.request_hand_back(ctx, boundary);
            }
            _ => debug!(mode = %self.mode, "backdrop click ignored"),
        }
    }

    pub fn on_transition_end(
        &mut self,
        ctx: &mut DocumentContext,
        boundary: &mut Boundary,
        end: TransitionEnd,
    ) {
        if end != HERO_TOP {
            return;
        }
        if self.hand_back != HandBack::Animating {
            debug!(state = ?self.hand_back, "hero transition ignored");
            return;
        }
        self.request_hand_back(ctx, boundary);
    }

    fn request_hand_back(&mut self, ctx: &mut DocumentContext, boundary: &mut Boundary) {
        if self.mode != DisplayMode::PredecessorActivate {
            return;
        }
        let Some(predecessor) = self.predecessor.take() else {
            debug!("no predecessor to hand back to");
            return;
        };
        match boundary
            .registry
            .request_activation(predecessor, ctx.id(), None)
        {
            Ok(()) => self.hand_back = HandBack::Requested,
            Err(refused) => {
                warn!(error = %refused.error, "predecessor activation refused");
                self.predecessor = Some(refused.portal);
                self.hand_back = HandBack::Rejected;
            }
        }
    }

    /// The predecessor activation we requested has settled.
    pub fn on_activation_resolved(
        &mut self,
        ctx: &mut DocumentContext,
        widgets: &mut PodcastWidgets,
        outcome: ActivationOutcome,
    ) {
        match outcome {
            ActivationOutcome::Activated => {
                info!("predecessor is top-level again");
                self.hand_back = HandBack::Idle;
                widgets.audio.show(ctx);
                widgets.audio.handle_activation(ctx);
                self.set_display_mode(ctx, ModeRequest::Reset);
                self.set_display_mode(ctx, ModeRequest::Embed);
            }
            ActivationOutcome::Rejected { portal, reason } => {
                warn!(%reason, "predecessor activation rejected, staying collapsed");
                self.predecessor = Some(portal);
                self.hand_back = HandBack::Rejected;
            }
        }
    }

    /// A message from the document holding us in its portal.
    pub fn on_message(
        &mut self,
        ctx: &mut DocumentContext,
        widgets: &mut PodcastWidgets,
        message: Inbound,
    ) {
        match message {
            Inbound::Message(PortalMessage::Control { control }) => {
                widgets.audio.apply_control(ctx, control);
            }
            Inbound::Message(PortalMessage::FollowStatus { is_followed }) => {
                debug!(is_followed, "follow status has no listener on this page");
            }
            Inbound::Unknown(data) => {
                warn!(%data, "unrecognised message ignored");
            }
        }
    }

    /// Click on the writer-follow card: flip it and tell the predecessor.
    pub fn click_follow(
        &mut self,
        ctx: &DocumentContext,
        boundary: &mut Boundary,
        widgets: &mut PodcastWidgets,
    ) -> Result<()> {
        if !ctx.surface().is_visible(ElementId::Follow) {
            debug!("follow card is not shown");
            return Ok(());
        }
        let Some(widget) = widgets.follow.as_mut() else {
            debug!("no follow card mounted");
            return Ok(());
        };
        let message = widget.click();
        let predecessor = self
            .predecessor
            .as_ref()
            .ok_or(LifecycleError::NoEmbeddedPortal)?;
        boundary
            .messenger
            .post(ctx.url(), predecessor, &message, Some(predecessor.src()))?;
        Ok(())
    }
}

impl Default for GuestController {
    fn default() -> Self {
        Self::new()
    }
}
