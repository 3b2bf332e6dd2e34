use std::fmt;

use serde::{Deserialize, Serialize};

/// Bounding box of an element as laid out on screen, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// A CSS length as the surface understands it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl Length {
    pub fn full() -> Self {
        Length::Percent(100.0)
    }

    /// Resolve against the width of the containing block.
    pub fn resolve(&self, container: f64) -> f64 {
        match self {
            Length::Px(px) => *px,
            Length::Percent(pct) => container * pct / 100.0,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(px) => write!(f, "{px}px"),
            Length::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// `translateY(..) scale(..)`, the only transform shape the demo uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translate_y: f64,
    pub scale: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate_y: 0.0,
        scale: 1.0,
    };

    pub fn is_identity(&self) -> bool {
        self.translate_y == 0.0 && self.scale == 1.0
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Opaque identifier of an embedded portal element.
///
/// Surfaces only ever see the id; the owning handle stays with whichever
/// controller holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortalId(pub u64);

impl fmt::Display for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "portal#{}", self.0)
    }
}
