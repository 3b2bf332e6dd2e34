pub mod guest;
pub mod host;
pub mod messenger;
pub mod registry;

pub use guest::{ActivatedOptions, GuestController, HandBack, ModeRequest, display_commands};
pub use host::{HostController, HostPhase, PlayerButton, WriterProfile};
pub use messenger::{Delivery, Inbound, Messenger};
pub use registry::{
    ActivationOutcome, ActivationRequest, PortalActivateEvent, PortalRegistry, Promotion, Refused,
};

/// Everything that spans documents: the embedding primitive and the
/// message channel. Pages borrow it for the duration of one event.
#[derive(Debug, Default)]
pub struct Boundary {
    pub registry: PortalRegistry,
    pub messenger: Messenger,
}

impl Boundary {
    pub fn new() -> Self {
        Self::default()
    }
}
