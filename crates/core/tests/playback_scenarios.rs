//! Integration test: drive the podcast player through the article's overlay
//! and the podcast's own controls, across promotion and hand-back.

use portal_handoff_core::DemoConfig;
use portal_handoff_core::lifecycle::PlayerButton;
use portal_handoff_core::model::{DocumentRole, Session};
use portal_handoff_core::widgets::{MediaEvent, PlaybackState};
use portal_handoff_protocol::ControlCommand;

fn session() -> Session {
    Session::new(&DemoConfig::default()).expect("session should load")
}

fn current_track(session: &Session) -> Option<String> {
    session
        .podcast()
        .audio()
        .media()
        .map(|m| m.track.as_str().to_string())
}

#[test]
fn queue_and_skip_from_the_host_overlay() {
    let mut session = session();
    session.click_player(PlayerButton::PlayPause).expect("play");
    let audio = session.podcast().audio();
    assert_eq!(audio.state(), PlaybackState::Playing);
    assert_eq!(audio.playlist().index(), 0);

    assert!(session.toggle_recommendation("ssr").expect("add ssr"));
    assert!(session.podcast().audio().has_next());

    session.click_player(PlayerButton::Next).expect("next");
    let audio = session.podcast().audio();
    assert_eq!(audio.playlist().index(), 1);
    assert_eq!(current_track(&session).as_deref(), Some("ssr"));
    assert_eq!(session.podcast().audio().state(), PlaybackState::Playing);

    session.click_player(PlayerButton::Next).expect("next at end");
    assert_eq!(session.podcast().audio().playlist().index(), 1);
    assert_eq!(current_track(&session).as_deref(), Some("ssr"));
}

#[test]
fn pause_while_stopped_is_a_noop() {
    let mut session = session();
    let events = session.podcast().audio().media_events().to_vec();
    session.click_player(PlayerButton::PlayPause).expect("play");
    session.click_player(PlayerButton::PlayPause).expect("pause");
    session.click_player(PlayerButton::PlayPause).expect("play");
    session.click_player(PlayerButton::PlayPause).expect("pause");
    let audio = session.podcast().audio();
    assert_eq!(audio.state(), PlaybackState::Stopped);
    assert_eq!(
        audio.media_events().len(),
        events.len() + 4,
        "each toggle should produce exactly one play or pause"
    );
}

#[test]
fn playlist_survives_promotion() {
    let mut session = session();
    session.toggle_recommendation("lighthouse").expect("add");
    session.click_player(PlayerButton::PlayPause).expect("play");
    session.advance(10_000.0).expect("listen a while");

    assert!(session.click_overlay().expect("overlay"));
    session.advance(600.0).expect("exit animation");
    assert_eq!(session.top(), Some(DocumentRole::Podcast));

    let audio = session.podcast().audio();
    assert_eq!(audio.state(), PlaybackState::Playing);
    assert_eq!(audio.playlist().len(), 2);
    assert!(audio.is_visible());
    let elapsed = audio.playlist().elapsed();
    assert!((elapsed - 10.6 / 120.0).abs() < 1e-6, "elapsed {elapsed}");

    session.control_podcast(ControlCommand::Next);
    assert_eq!(current_track(&session).as_deref(), Some("lighthouse"));
}

#[test]
fn track_end_stops_and_reloads() {
    let mut session = session();
    session.click_player(PlayerButton::PlayPause).expect("play");
    session.advance(120_000.0).expect("play to the end");
    let audio = session.podcast().audio();
    assert_eq!(audio.state(), PlaybackState::Stopped);
    assert_eq!(
        audio.media_events().last(),
        Some(&MediaEvent::Load {
            src: "/mp3/tata.mp3".into()
        })
    );
    assert_eq!(audio.progress().fraction(session.now_ms()), 0.0);
}

#[test]
fn removing_the_only_queued_extra_keeps_current() {
    let mut session = session();
    session.toggle_recommendation("github").expect("add");
    assert!(!session.toggle_recommendation("github").expect("remove"));
    let audio = session.podcast().audio();
    assert_eq!(audio.playlist().len(), 1);
    assert!(!audio.has_next());
    assert_eq!(current_track(&session).as_deref(), Some("tata"));
}

#[test]
fn own_controls_ignored_while_embedded() {
    let mut session = session();
    session.control_podcast(ControlCommand::Play);
    assert_eq!(session.podcast().audio().state(), PlaybackState::Stopped);
}
