use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::types::{Length, PortalId, Transform};

/// A single, stateless presentation mutation.
///
/// Controllers emit a `Vec<SurfaceCommand>` per display-mode change. A
/// surface (the in-process model, the terminal view, or a real page via
/// the wasm bridge) applies them in order; each command carries all the
/// data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceCommand {
    /// `display: block` when `visible`, `display: none` otherwise.
    SetDisplay { target: ElementId, visible: bool },

    SetOpacity { target: ElementId, opacity: f64 },

    SetWidth { target: ElementId, width: Length },

    SetMarginTop { target: ElementId, px: f64 },

    /// Vertical offset of a positioned element (`top` or `bottom`,
    /// depending on the element's anchoring).
    SetOffset {
        target: ElementId,
        property: AnimatedProperty,
        px: f64,
    },

    /// `None` clears the shadow.
    SetBoxShadow {
        target: ElementId,
        shadow: Option<String>,
    },

    SetBorderRadius {
        target: ElementId,
        radius: Option<String>,
    },

    /// `None` means transparent.
    SetBackground {
        target: ElementId,
        color: Option<String>,
    },

    /// Replace the element's transition. `None` clears it.
    SetTransition {
        target: ElementId,
        transition: Option<Transition>,
    },

    SetTransform {
        target: ElementId,
        transform: Transform,
    },

    /// Run a one-shot opacity animation on the element.
    Animate {
        target: ElementId,
        animation: FadeAnimation,
    },

    /// Toggle the document's scrollbars.
    SetScrollbars { visible: bool },

    /// Insert the writer-follow widget into the follow slot, replacing any
    /// widget already there.
    MountFollowWidget { name: String, photo_src: String },

    UnmountFollowWidget,

    /// Insert an embedded portal into the target container.
    AttachPortal { target: ElementId, portal: PortalId },

    /// Remove whichever portal the target container holds, if any.
    DetachPortal { target: ElementId },
}

/// A CSS transition on one property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub property: AnimatedProperty,
    pub duration_ms: u32,
}

impl Transition {
    pub fn new(property: AnimatedProperty, duration_ms: u32) -> Self {
        Self {
            property,
            duration_ms,
        }
    }
}

/// Properties whose transitions the lifecycle listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimatedProperty {
    Transform,
    Top,
    Bottom,
    Left,
    Width,
    Opacity,
}

impl AnimatedProperty {
    /// CSS property name, as reported by `transitionend`.
    pub fn css_name(&self) -> &'static str {
        match self {
            AnimatedProperty::Transform => "transform",
            AnimatedProperty::Top => "top",
            AnimatedProperty::Bottom => "bottom",
            AnimatedProperty::Left => "left",
            AnimatedProperty::Width => "width",
            AnimatedProperty::Opacity => "opacity",
        }
    }

    pub fn from_css_name(name: &str) -> Option<Self> {
        match name {
            "transform" => Some(AnimatedProperty::Transform),
            "top" => Some(AnimatedProperty::Top),
            "bottom" => Some(AnimatedProperty::Bottom),
            "left" => Some(AnimatedProperty::Left),
            "width" => Some(AnimatedProperty::Width),
            "opacity" => Some(AnimatedProperty::Opacity),
            _ => None,
        }
    }
}

/// Keyframe animations shipped with the page stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeAnimation {
    /// Opacity 0 → 1 (`animateOpacityTo_1_0`).
    FadeIn,
    /// Opacity 0 → 0.6, used by the lightbox backdrop (`animateOpacityTo_0_6`).
    FadeInBackdrop,
}

impl FadeAnimation {
    pub fn class_name(&self) -> &'static str {
        match self {
            FadeAnimation::FadeIn => "animateOpacityTo_1_0",
            FadeAnimation::FadeInBackdrop => "animateOpacityTo_0_6",
        }
    }

    /// Opacity the element rests at once the animation completes.
    pub fn final_opacity(&self) -> f64 {
        match self {
            FadeAnimation::FadeIn => 1.0,
            FadeAnimation::FadeInBackdrop => 0.6,
        }
    }
}
