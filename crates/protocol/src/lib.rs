pub mod commands;
pub mod element;
pub mod messages;
pub mod types;

pub use commands::{AnimatedProperty, FadeAnimation, SurfaceCommand, Transition};
pub use element::ElementId;
pub use messages::{ActivationPayload, ControlCommand, PortalMessage};
pub use types::{Length, PortalId, Rect, Transform};
