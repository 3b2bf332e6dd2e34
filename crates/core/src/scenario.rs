//! Scripted user journeys, replayed against a [`Session`].
//!
//! A script is a TOML list of steps:
//!
//! ```toml
//! [[step]]
//! action = "click-overlay"
//!
//! [[step]]
//! action = "advance"
//! ms = 600
//!
//! [[step]]
//! action = "snapshot"
//! ```

use std::path::Path;

use portal_handoff_protocol::ControlCommand;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::lifecycle::PlayerButton;
use crate::model::{Session, SessionSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    ClickOverlay,
    ClickPlayer { button: PlayerButton },
    ClickBackdrop,
    ClickHostFollow,
    ClickGuestFollow,
    ToggleRecommendation { id: String },
    /// The podcast's own player, while it is top-level.
    Control { command: ControlCommand },
    Advance { ms: f64 },
    ResolveActivation,
    RejectActivation { reason: String },
    Snapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Apply one step. Returns a snapshot for `snapshot` steps.
pub fn run_step(session: &mut Session, step: &Step) -> Result<Option<SessionSnapshot>> {
    debug!(?step, now_ms = session.now_ms(), "step");
    match step {
        Step::ClickOverlay => {
            session.click_overlay()?;
        }
        Step::ClickPlayer { button } => session.click_player(*button)?,
        Step::ClickBackdrop => session.click_backdrop()?,
        Step::ClickHostFollow => session.click_host_follow(),
        Step::ClickGuestFollow => session.click_guest_follow()?,
        Step::ToggleRecommendation { id } => {
            session.toggle_recommendation(id)?;
        }
        Step::Control { command } => session.control_podcast(*command),
        Step::Advance { ms } => session.advance(*ms)?,
        Step::ResolveActivation => session.resolve_activation()?,
        Step::RejectActivation { reason } => session.reject_activation(reason)?,
        Step::Snapshot => return Ok(Some(session.snapshot())),
    }
    Ok(None)
}

/// Run every step in order, collecting the requested snapshots. The final
/// state is always appended.
pub fn run_script(session: &mut Session, script: &Script) -> Result<Vec<SessionSnapshot>> {
    let mut snapshots = Vec::new();
    for step in &script.steps {
        if let Some(snapshot) = run_step(session, step)? {
            snapshots.push(snapshot);
        }
    }
    snapshots.push(session.snapshot());
    Ok(snapshots)
}
