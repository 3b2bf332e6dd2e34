use std::sync::Mutex;

use portal_handoff_core::lifecycle::{ActivatedOptions, Inbound, ModeRequest, display_commands};
use portal_handoff_core::model::DisplayMode;
use portal_handoff_core::scenario::{Step, run_step};
use portal_handoff_core::{DemoConfig, Session};
use portal_handoff_protocol::{ActivationPayload, ControlCommand, PortalId, PortalMessage};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

static SESSIONS: Mutex<Vec<Session>> = Mutex::new(Vec::new());

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReturnGeometry {
    initial_y: f64,
    initial_width: f64,
}

/// What a page received, after shape checking.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum Decoded {
    Control { control: ControlCommand },
    FollowStatus { is_followed: bool },
    Unknown,
}

fn parse_mode(mode: &str) -> Result<DisplayMode, String> {
    serde_json::from_value(serde_json::Value::String(mode.to_string()))
        .map_err(|_| format!("unknown display mode: {mode}"))
}

fn mode_request(mode: &str, options_json: &str, predecessor: u64) -> Result<ModeRequest, String> {
    let request = match parse_mode(mode)? {
        DisplayMode::Reset => ModeRequest::Reset,
        DisplayMode::Embed => ModeRequest::Embed,
        DisplayMode::Activated => {
            let payload: ActivationPayload =
                serde_json::from_str(options_json).map_err(|e| e.to_string())?;
            ModeRequest::Activated(ActivatedOptions::from_payload(
                &payload,
                PortalId(predecessor),
            ))
        }
        DisplayMode::PredecessorActivate => {
            let geometry: ReturnGeometry =
                serde_json::from_str(options_json).map_err(|e| e.to_string())?;
            ModeRequest::PredecessorActivate {
                initial_y: geometry.initial_y,
                initial_width: geometry.initial_width,
            }
        }
    };
    Ok(request)
}

fn commands_json(mode: &str, options_json: &str, predecessor: u64) -> Result<String, String> {
    let request = mode_request(mode, options_json, predecessor)?;
    serde_json::to_string(&display_commands(&request)).map_err(|e| e.to_string())
}

fn decode_json(data: &str) -> Result<String, String> {
    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| e.to_string())?;
    let decoded = match Inbound::decode(value) {
        Inbound::Message(PortalMessage::Control { control }) => Decoded::Control { control },
        Inbound::Message(PortalMessage::FollowStatus { is_followed }) => {
            Decoded::FollowStatus { is_followed }
        }
        Inbound::Unknown(_) => Decoded::Unknown,
    };
    serde_json::to_string(&decoded).map_err(|e| e.to_string())
}

fn js_err(message: impl std::fmt::Display) -> JsError {
    JsError::new(&message.to_string())
}

/// Style commands for entering `mode`, as JSON. `options_json` is the
/// activation payload for `ACTIVATED`, `{initialY, initialWidth}` for
/// `PREDECESSOR_ACTIVATE`, and ignored otherwise.
#[wasm_bindgen]
pub fn mode_commands(mode: &str, options_json: &str, predecessor: u64) -> Result<String, JsError> {
    commands_json(mode, options_json, predecessor).map_err(js_err)
}

/// Whether the display-mode table allows `from -> to`.
#[wasm_bindgen]
pub fn can_enter(from: &str, to: &str) -> Result<bool, JsError> {
    let from = parse_mode(from).map_err(js_err)?;
    let to = parse_mode(to).map_err(js_err)?;
    Ok(from.can_enter(to))
}

/// Classify a `message` event payload.
#[wasm_bindgen]
pub fn decode_message(data: &str) -> Result<String, JsError> {
    decode_json(data).map_err(js_err)
}

/// Start a simulated session from TOML settings. Returns a handle.
#[wasm_bindgen]
pub fn create_session(config_toml: &str) -> Result<usize, JsError> {
    let config = DemoConfig::from_toml_str(config_toml).map_err(js_err)?;
    let session = Session::new(&config).map_err(js_err)?;
    let mut sessions = SESSIONS
        .lock()
        .map_err(|_| JsError::new("session store poisoned"))?;
    let idx = sessions.len();
    sessions.push(session);
    Ok(idx)
}

/// Apply one JSON step (`{"action": "click-overlay"}`) and return the
/// session snapshot as JSON.
#[wasm_bindgen]
pub fn session_step(handle: usize, step_json: &str) -> Result<String, JsError> {
    let step: Step = serde_json::from_str(step_json).map_err(js_err)?;
    let mut sessions = SESSIONS
        .lock()
        .map_err(|_| JsError::new("session store poisoned"))?;
    let session = sessions
        .get_mut(handle)
        .ok_or_else(|| JsError::new("invalid session handle"))?;
    let snapshot = match run_step(session, &step).map_err(js_err)? {
        Some(snapshot) => snapshot,
        None => session.snapshot(),
    };
    serde_json::to_string(&snapshot).map_err(js_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activated_commands_from_payload() {
        let payload = r#"{"followed":false,"name":"X","photoSrc":"/p.png","initialY":120,"activatedWidth":600,"initialWidth":300}"#;
        let json = commands_json("ACTIVATED", payload, 4).unwrap_or_default();
        let commands: serde_json::Value = serde_json::from_str(&json).unwrap_or_default();
        let commands = commands.as_array().cloned().unwrap_or_default();
        assert!(commands.iter().any(|c| c["MountFollowWidget"]["name"] == "X"));
        assert!(commands.iter().any(|c| c["SetWidth"]["width"]["Px"] == 600.0));
        assert!(commands.iter().any(|c| c["AttachPortal"]["portal"] == 4));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(commands_json("MINIMIZED", "{}", 0).is_err());
        assert!(parse_mode("EMBED").is_ok_and(|m| m == DisplayMode::Embed));
    }

    #[test]
    fn predecessor_activate_needs_geometry() {
        assert!(commands_json("PREDECESSOR_ACTIVATE", "{}", 0).is_err());
        assert!(
            commands_json(
                "PREDECESSOR_ACTIVATE",
                r#"{"initialY":420,"initialWidth":360}"#,
                0
            )
            .is_ok()
        );
    }

    #[test]
    fn decodes_both_shapes_and_unknown() {
        assert_eq!(
            decode_json(r#"{"control":"next"}"#).ok().as_deref(),
            Some(r#"{"kind":"control","control":"next"}"#)
        );
        assert_eq!(
            decode_json(r#"{"isFollowed":true}"#).ok().as_deref(),
            Some(r#"{"kind":"follow-status","is_followed":true}"#)
        );
        assert_eq!(
            decode_json(r#"{"control":"seek"}"#).ok().as_deref(),
            Some(r#"{"kind":"unknown"}"#)
        );
        assert!(decode_json("not json").is_err());
    }
}
