use serde::{Deserialize, Serialize};

/// Data handed to the guest at the moment of activation.
///
/// Built once by the host from its container geometry and follow state,
/// then moved into the activation request. The guest consumes it exactly
/// once, so there are no setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationPayload {
    followed: bool,
    name: String,
    photo_src: String,
    /// Container top (px) before the exit animation started.
    initial_y: f64,
    /// Container width (px) before the exit animation started.
    initial_width: f64,
    /// Container width (px) once the exit animation finished.
    activated_width: f64,
}

impl ActivationPayload {
    pub fn new(
        followed: bool,
        name: impl Into<String>,
        photo_src: impl Into<String>,
        initial_y: f64,
        initial_width: f64,
        activated_width: f64,
    ) -> Self {
        Self {
            followed,
            name: name.into(),
            photo_src: photo_src.into(),
            initial_y,
            initial_width,
            activated_width,
        }
    }

    pub fn followed(&self) -> bool {
        self.followed
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn photo_src(&self) -> &str {
        &self.photo_src
    }

    pub fn initial_y(&self) -> f64 {
        self.initial_y
    }

    pub fn initial_width(&self) -> f64 {
        self.initial_width
    }

    pub fn activated_width(&self) -> f64 {
        self.activated_width
    }
}

/// Playback commands a host may send to an embedded podcast page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlCommand {
    Play,
    Pause,
    Next,
    Prev,
    /// Slide the player chrome away ahead of promotion.
    Hide,
}

/// Everything that may legally cross the same-origin boundary.
///
/// On the wire these are bare objects without a type tag:
/// `{"control": "play"}` or `{"isFollowed": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortalMessage {
    Control {
        control: ControlCommand,
    },
    FollowStatus {
        #[serde(rename = "isFollowed")]
        is_followed: bool,
    },
}

impl PortalMessage {
    pub fn control(command: ControlCommand) -> Self {
        PortalMessage::Control { control: command }
    }

    pub fn follow_status(is_followed: bool) -> Self {
        PortalMessage::FollowStatus { is_followed }
    }
}

impl From<ControlCommand> for PortalMessage {
    fn from(command: ControlCommand) -> Self {
        PortalMessage::control(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_camel_case_wire_names() {
        let payload = ActivationPayload::new(false, "X", "/p.png", 120.0, 300.0, 600.0);
        let json = serde_json::to_value(&payload).unwrap_or_default();
        assert_eq!(json["photoSrc"], "/p.png");
        assert_eq!(json["initialY"], 120.0);
        assert_eq!(json["activatedWidth"], 600.0);
        assert_eq!(json["initialWidth"], 300.0);
        assert_eq!(json["followed"], false);
    }

    #[test]
    fn control_message_wire_shape() {
        let json = serde_json::to_string(&PortalMessage::control(ControlCommand::Hide))
            .unwrap_or_default();
        assert_eq!(json, r#"{"control":"hide"}"#);
    }

    #[test]
    fn follow_message_wire_shape() {
        let msg: PortalMessage = serde_json::from_str(r#"{"isFollowed":true}"#)
            .unwrap_or(PortalMessage::follow_status(false));
        assert_eq!(msg, PortalMessage::follow_status(true));
    }

    #[test]
    fn unknown_control_is_rejected() {
        let parsed = serde_json::from_str::<PortalMessage>(r#"{"control":"rewind"}"#);
        assert!(parsed.is_err());
    }
}
