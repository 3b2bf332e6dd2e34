use portal_handoff_protocol::PortalMessage;
use serde::Serialize;

/// "Follow in PORTALOG" card shown on the podcast page after activation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowWidget {
    name: String,
    photo_src: String,
    followed: bool,
}

impl FollowWidget {
    pub fn new(name: impl Into<String>, photo_src: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            photo_src: photo_src.into(),
            followed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn photo_src(&self) -> &str {
        &self.photo_src
    }

    pub fn is_followed(&self) -> bool {
        self.followed
    }

    pub fn label(&self) -> &'static str {
        if self.followed {
            "Following"
        } else {
            "Follow in PORTALOG"
        }
    }

    /// Flip the state and build the notification for the predecessor.
    pub fn click(&mut self) -> PortalMessage {
        self.followed = !self.followed;
        PortalMessage::follow_status(self.followed)
    }
}

/// The article page's own follow button.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FollowButton {
    followed: bool,
}

impl FollowButton {
    pub fn is_followed(&self) -> bool {
        self.followed
    }

    pub fn label(&self) -> &'static str {
        if self.followed { "Following" } else { "Follow" }
    }

    pub fn click(&mut self) {
        self.followed = !self.followed;
    }

    pub fn set_followed(&mut self, followed: bool) {
        self.followed = followed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_click_toggles_and_reports() {
        let mut widget = FollowWidget::new("Yusuke Utsunomiya", "/img/profile.png");
        assert_eq!(widget.label(), "Follow in PORTALOG");
        assert_eq!(widget.click(), PortalMessage::follow_status(true));
        assert_eq!(widget.label(), "Following");
        assert_eq!(widget.click(), PortalMessage::follow_status(false));
        assert!(!widget.is_followed());
    }

    #[test]
    fn button_labels() {
        let mut button = FollowButton::default();
        assert_eq!(button.label(), "Follow");
        button.click();
        assert_eq!(button.label(), "Following");
        button.set_followed(false);
        assert!(!button.is_followed());
    }
}
