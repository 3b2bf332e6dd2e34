use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual presentation of a podcast document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayMode {
    /// Standalone, nothing embedded, nothing embedding us.
    Reset,
    /// Rendered inside another document's portal.
    Embed,
    /// Just promoted; the predecessor sits behind a lightbox.
    Activated,
    /// Collapsing back so the predecessor can be promoted again.
    PredecessorActivate,
}

/// Every legal `(from, to)` pair. Anything else is rejected.
const TRANSITIONS: [(DisplayMode, DisplayMode); 4] = [
    (DisplayMode::Embed, DisplayMode::Activated),
    (DisplayMode::Activated, DisplayMode::PredecessorActivate),
    (DisplayMode::PredecessorActivate, DisplayMode::Reset),
    (DisplayMode::Reset, DisplayMode::Embed),
];

impl DisplayMode {
    pub fn can_enter(self, target: DisplayMode) -> bool {
        TRANSITIONS.contains(&(self, target))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Reset => "RESET",
            DisplayMode::Embed => "EMBED",
            DisplayMode::Activated => "ACTIVATED",
            DisplayMode::PredecessorActivate => "PREDECESSOR_ACTIVATE",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DisplayMode; 4] = [
        DisplayMode::Reset,
        DisplayMode::Embed,
        DisplayMode::Activated,
        DisplayMode::PredecessorActivate,
    ];

    #[test]
    fn exactly_four_legal_transitions() {
        let legal = ALL
            .iter()
            .flat_map(|from| ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_enter(*to))
            .count();
        assert_eq!(legal, 4);
    }

    #[test]
    fn cycle_returns_to_embed() {
        let mut mode = DisplayMode::Embed;
        for next in [
            DisplayMode::Activated,
            DisplayMode::PredecessorActivate,
            DisplayMode::Reset,
            DisplayMode::Embed,
        ] {
            assert!(mode.can_enter(next), "{mode} -> {next}");
            mode = next;
        }
        assert_eq!(mode, DisplayMode::Embed);
    }

    #[test]
    fn self_transitions_are_illegal() {
        for mode in ALL {
            assert!(!mode.can_enter(mode));
        }
    }

    #[test]
    fn serializes_in_upper_snake_case() {
        let json = serde_json::to_string(&DisplayMode::PredecessorActivate).unwrap_or_default();
        assert_eq!(json, "\"PREDECESSOR_ACTIVATE\"");
    }
}
