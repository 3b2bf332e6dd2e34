pub mod audio;
pub mod follow;
pub mod progress;
pub mod reco;

pub use audio::{AudioController, MediaElement, MediaEvent, PlaybackState};
pub use follow::{FollowButton, FollowWidget};
pub use progress::ProgressIndicator;
pub use reco::{RECOMMENDED, RecommendationItem, Recommendations};

/// Widgets living on the podcast page.
#[derive(Debug, Clone)]
pub struct PodcastWidgets {
    pub audio: AudioController,
    /// Present once an activation without a prior follow mounted it.
    pub follow: Option<FollowWidget>,
    pub recommendations: Recommendations,
}

impl PodcastWidgets {
    pub fn new(audio: AudioController) -> Self {
        Self {
            audio,
            follow: None,
            recommendations: Recommendations::new(),
        }
    }
}
