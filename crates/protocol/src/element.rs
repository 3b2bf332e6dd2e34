use serde::{Deserialize, Serialize};

/// Semantic element tokens resolved by each document's surface.
///
/// A page never looks elements up by selector; controllers address them
/// through these tokens and the surface owns the actual style state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementId {
    Body,

    // Podcast (guest) page
    Main,
    Header,
    Detail,
    Follow,
    Recommendation,
    Lightbox,
    Embed,
    HeroImg,
    AudioController,

    // Article (host) page
    EmbedContainer,
    HitTarget,
    PlayerUi,
    FollowButton,
    FallbackBanner,
}

impl ElementId {
    /// Chrome that is hidden while the podcast page is embedded and faded
    /// out while it hands control back.
    pub const GUEST_CHROME: [ElementId; 4] = [
        ElementId::Header,
        ElementId::Detail,
        ElementId::Follow,
        ElementId::Recommendation,
    ];
}
