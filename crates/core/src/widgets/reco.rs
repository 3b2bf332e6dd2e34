use serde::Serialize;

use super::audio::AudioController;
use crate::error::WidgetError;
use crate::model::{DocumentContext, TrackId};

/// Episodes offered under "Listen more of TTT".
pub const RECOMMENDED: [&str; 3] = ["ssr", "lighthouse", "github"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationItem {
    pub id: TrackId,
    pub added: bool,
}

impl RecommendationItem {
    pub fn icon(&self) -> &'static str {
        if self.added { "/img/added.png" } else { "/img/add.png" }
    }
}

/// Add/remove toggles that feed the player's playlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    items: Vec<RecommendationItem>,
}

impl Recommendations {
    pub fn new() -> Self {
        Self {
            items: RECOMMENDED
                .iter()
                .map(|id| RecommendationItem {
                    id: TrackId::from(*id),
                    added: false,
                })
                .collect(),
        }
    }

    pub fn items(&self) -> &[RecommendationItem] {
        &self.items
    }

    /// Flip one item, queueing or dequeueing it. Returns the new state.
    pub fn toggle(
        &mut self,
        ctx: &DocumentContext,
        audio: &mut AudioController,
        id: &str,
    ) -> Result<bool, WidgetError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| WidgetError::NotRecommended(id.to_string()))?;
        if item.added {
            audio.remove_from_playlist(ctx, id);
            item.added = false;
        } else {
            audio.add_to_playlist(id)?;
            item.added = true;
        }
        Ok(item.added)
    }
}

impl Default for Recommendations {
    fn default() -> Self {
        Self::new()
    }
}
