use std::collections::BTreeMap;

use portal_handoff_protocol::{
    AnimatedProperty, ElementId, FadeAnimation, Length, PortalId, Rect, SurfaceCommand,
    Transform, Transition,
};
use serde::Serialize;

/// Computed style of one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementStyle {
    pub visible: bool,
    pub opacity: f64,
    pub width: Length,
    pub margin_top: f64,
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub box_shadow: Option<String>,
    pub border_radius: Option<String>,
    /// `None` is transparent.
    pub background: Option<String>,
    pub transition: Option<Transition>,
    pub transform: Transform,
    pub animations: Vec<FadeAnimation>,
    pub portal: Option<PortalId>,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
            width: Length::full(),
            margin_top: 0.0,
            top: 0.0,
            bottom: 0.0,
            left: 0.0,
            box_shadow: None,
            border_radius: None,
            background: None,
            transition: None,
            transform: Transform::IDENTITY,
            animations: Vec::new(),
            portal: None,
        }
    }
}

/// A `transitionend` the surface will report once its deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionEnd {
    pub target: ElementId,
    pub property: AnimatedProperty,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RunningTransition {
    end: TransitionEnd,
    ends_at_ms: f64,
}

/// Writer-follow widget mounted in the follow slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MountedFollow {
    pub name: String,
    pub photo_src: String,
}

/// The style state of one document.
///
/// Controllers never mutate it field by field; they hand it
/// [`SurfaceCommand`]s. Property changes made while a matching transition
/// is configured are tracked so the owning page can be told when they end.
#[derive(Debug, Clone, Serialize)]
pub struct Surface {
    viewport_width: f64,
    elements: BTreeMap<ElementId, ElementStyle>,
    #[serde(skip)]
    layout: BTreeMap<ElementId, Rect>,
    scrollbars: bool,
    follow_widget: Option<MountedFollow>,
    #[serde(skip)]
    running: Vec<RunningTransition>,
}

impl Surface {
    pub fn new(viewport_width: f64) -> Self {
        Self {
            viewport_width,
            elements: BTreeMap::new(),
            layout: BTreeMap::new(),
            scrollbars: true,
            follow_widget: None,
            running: Vec::new(),
        }
    }

    /// Static layout box of an element, before transforms.
    pub fn with_layout(mut self, id: ElementId, rect: Rect) -> Self {
        self.layout.insert(id, rect);
        self
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    pub fn style(&self, id: ElementId) -> ElementStyle {
        self.elements.get(&id).cloned().unwrap_or_default()
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        self.elements.get(&id).is_none_or(|s| s.visible)
    }

    pub fn opacity(&self, id: ElementId) -> f64 {
        self.elements.get(&id).map_or(1.0, |s| s.opacity)
    }

    pub fn width(&self, id: ElementId) -> Length {
        self.elements.get(&id).map_or(Length::full(), |s| s.width)
    }

    pub fn portal_in(&self, id: ElementId) -> Option<PortalId> {
        self.elements.get(&id).and_then(|s| s.portal)
    }

    pub fn scrollbars_visible(&self) -> bool {
        self.scrollbars
    }

    pub fn follow_widget(&self) -> Option<&MountedFollow> {
        self.follow_widget.as_ref()
    }

    /// Equivalent of `getBoundingClientRect()`: layout box with the
    /// element's transform applied, scaled around its top-center.
    pub fn bounding_rect(&self, id: ElementId) -> Rect {
        let base = self
            .layout
            .get(&id)
            .copied()
            .unwrap_or_else(|| Rect::new(0.0, 0.0, self.viewport_width, 0.0));
        let t = self.elements.get(&id).map(|s| s.transform).unwrap_or_default();
        let w = base.w * t.scale;
        Rect::new(
            base.x - (w - base.w) / 2.0,
            base.y + t.translate_y,
            w,
            base.h * t.scale,
        )
    }

    /// Apply commands in order at time `now_ms`.
    pub fn apply(&mut self, commands: &[SurfaceCommand], now_ms: f64) {
        for command in commands {
            self.apply_one(command, now_ms);
        }
    }

    fn apply_one(&mut self, command: &SurfaceCommand, now_ms: f64) {
        match command {
            SurfaceCommand::SetDisplay { target, visible } => {
                self.element(*target).visible = *visible;
            }
            SurfaceCommand::SetOpacity { target, opacity } => {
                let changed = self.element(*target).opacity != *opacity;
                self.element(*target).opacity = *opacity;
                self.track(*target, AnimatedProperty::Opacity, changed, now_ms);
            }
            SurfaceCommand::SetWidth { target, width } => {
                let changed = self.element(*target).width != *width;
                self.element(*target).width = *width;
                self.track(*target, AnimatedProperty::Width, changed, now_ms);
            }
            SurfaceCommand::SetMarginTop { target, px } => {
                self.element(*target).margin_top = *px;
            }
            SurfaceCommand::SetOffset {
                target,
                property,
                px,
            } => {
                let style = self.element(*target);
                let slot = match property {
                    AnimatedProperty::Top => &mut style.top,
                    AnimatedProperty::Bottom => &mut style.bottom,
                    AnimatedProperty::Left => &mut style.left,
                    AnimatedProperty::Transform
                    | AnimatedProperty::Width
                    | AnimatedProperty::Opacity => return,
                };
                let changed = *slot != *px;
                *slot = *px;
                self.track(*target, *property, changed, now_ms);
            }
            SurfaceCommand::SetBoxShadow { target, shadow } => {
                self.element(*target).box_shadow = shadow.clone();
            }
            SurfaceCommand::SetBorderRadius { target, radius } => {
                self.element(*target).border_radius = radius.clone();
            }
            SurfaceCommand::SetBackground { target, color } => {
                self.element(*target).background = color.clone();
            }
            SurfaceCommand::SetTransition { target, transition } => {
                self.element(*target).transition = *transition;
                if transition.is_none() {
                    self.running.retain(|r| r.end.target != *target);
                }
            }
            SurfaceCommand::SetTransform { target, transform } => {
                let changed = self.element(*target).transform != *transform;
                self.element(*target).transform = *transform;
                self.track(*target, AnimatedProperty::Transform, changed, now_ms);
            }
            SurfaceCommand::Animate { target, animation } => {
                let style = self.element(*target);
                if !style.animations.contains(animation) {
                    style.animations.push(*animation);
                }
                style.opacity = animation.final_opacity();
            }
            SurfaceCommand::SetScrollbars { visible } => {
                self.scrollbars = *visible;
            }
            SurfaceCommand::MountFollowWidget { name, photo_src } => {
                self.follow_widget = Some(MountedFollow {
                    name: name.clone(),
                    photo_src: photo_src.clone(),
                });
            }
            SurfaceCommand::UnmountFollowWidget => {
                self.follow_widget = None;
            }
            SurfaceCommand::AttachPortal { target, portal } => {
                self.element(*target).portal = Some(*portal);
            }
            SurfaceCommand::DetachPortal { target } => {
                self.element(*target).portal = None;
            }
        }
    }

    fn element(&mut self, id: ElementId) -> &mut ElementStyle {
        self.elements.entry(id).or_default()
    }

    fn track(&mut self, target: ElementId, property: AnimatedProperty, changed: bool, now_ms: f64) {
        if !changed {
            return;
        }
        let Some(transition) = self.elements.get(&target).and_then(|s| s.transition) else {
            return;
        };
        if transition.property != property || transition.duration_ms == 0 {
            return;
        }
        let end = TransitionEnd { target, property };
        self.running.retain(|r| r.end != end);
        self.running.push(RunningTransition {
            end,
            ends_at_ms: now_ms + f64::from(transition.duration_ms),
        });
    }

    /// Whether `end` is still scheduled to fire.
    pub fn is_running(&self, end: TransitionEnd) -> bool {
        self.running.iter().any(|r| r.end == end)
    }

    /// Earliest pending `transitionend`, if any.
    pub fn next_deadline(&self) -> Option<f64> {
        self.running
            .iter()
            .map(|r| r.ends_at_ms)
            .min_by(f64::total_cmp)
    }

    /// Drain every transition that has finished by `now_ms`, in end order.
    pub fn take_finished(&mut self, now_ms: f64) -> Vec<TransitionEnd> {
        let mut finished: Vec<RunningTransition> = Vec::new();
        self.running.retain(|r| {
            if r.ends_at_ms <= now_ms {
                finished.push(*r);
                false
            } else {
                true
            }
        });
        finished.sort_by(|a, b| a.ends_at_ms.total_cmp(&b.ends_at_ms));
        finished.into_iter().map(|r| r.end).collect()
    }
}
