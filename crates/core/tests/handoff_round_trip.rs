//! Integration test: promote the embedded podcast, hand the article back,
//! and check both pages end up where they started.

use portal_handoff_core::DemoConfig;
use portal_handoff_core::config::Routing;
use portal_handoff_core::lifecycle::{HandBack, HostPhase, PlayerButton};
use portal_handoff_core::config::Layout;
use portal_handoff_core::model::{DisplayMode, DocumentRole, EmbedHandle, Session};
use portal_handoff_core::pages::Page;
use portal_handoff_core::widgets::FollowWidget;
use portal_handoff_protocol::{ElementId, Length, Rect};

const EXIT_MS: f64 = 600.0;
const HERO_MS: f64 = 600.0;

fn session_with(config: DemoConfig) -> Session {
    Session::new(&config).expect("session should load")
}

fn session() -> Session {
    session_with(DemoConfig::default())
}

fn promote(session: &mut Session) {
    assert!(session.click_overlay().expect("overlay click"));
    session.advance(EXIT_MS).expect("advance through exit animation");
    assert_eq!(session.top(), Some(DocumentRole::Podcast));
}

#[test]
fn round_trip_restores_embed_and_mode() {
    let mut session = session();
    let before = session
        .article()
        .controller()
        .embed()
        .map(EmbedHandle::summary)
        .expect("podcast embedded on load");

    promote(&mut session);
    let podcast = session.podcast();
    assert_eq!(podcast.mode(), DisplayMode::Activated);
    let surface = podcast.ctx().surface();
    assert!(surface.is_visible(ElementId::Lightbox));
    assert!(surface.portal_in(ElementId::Embed).is_some());
    assert_eq!(
        surface.width(ElementId::Main),
        Length::Px(before.width * 1.05)
    );

    session.click_backdrop().expect("backdrop click");
    assert_eq!(session.podcast().mode(), DisplayMode::PredecessorActivate);
    assert_eq!(session.top(), Some(DocumentRole::Podcast));
    session.advance(HERO_MS).expect("advance through collapse");

    assert_eq!(session.top(), Some(DocumentRole::Article));
    assert_eq!(session.podcast().mode(), DisplayMode::Embed);
    assert_eq!(session.podcast().controller().hand_back(), HandBack::Idle);
    let after = session
        .article()
        .controller()
        .embed()
        .map(EmbedHandle::summary)
        .expect("podcast re-embedded");
    assert_eq!(after.origin, before.origin);
    assert_eq!(after.y, before.y);
    assert_eq!(after.width, before.width);
    assert!(session.article().ctx().surface().scrollbars_visible());
    assert!(
        session
            .article()
            .ctx()
            .surface()
            .is_visible(ElementId::PlayerUi)
    );
    assert!(session.podcast().audio().is_visible());
}

#[test]
fn activation_payload_reaches_the_podcast() {
    let mut session = session();
    promote(&mut session);
    let surface = session.podcast().ctx().surface();
    let follow = surface.follow_widget().expect("follow card mounted");
    assert_eq!(follow.name, "Yusuke Utsunomiya");
    assert_eq!(follow.photo_src, "/img/profile.png");
    assert!(surface.is_visible(ElementId::Follow));
}

#[test]
fn followed_writer_skips_follow_card() {
    let mut session = session();
    session.click_host_follow();
    assert!(session.article().follow().is_followed());
    promote(&mut session);
    let surface = session.podcast().ctx().surface();
    assert!(surface.follow_widget().is_none());
    assert!(!surface.is_visible(ElementId::Follow));
}

#[test]
fn double_click_starts_one_animation() {
    let mut session = session();
    assert!(session.click_overlay().expect("first click"));
    assert!(!session.click_overlay().expect("second click"));
    session.advance(300.0).expect("advance");
    assert!(!session.click_overlay().expect("click mid-animation"));
    session.advance(300.0).expect("advance");
    assert_eq!(session.top(), Some(DocumentRole::Podcast));
    assert!(!session.snapshot().activation_in_flight);
}

#[test]
fn click_during_pending_activation_is_ignored() {
    let mut session = session_with(DemoConfig {
        auto_resolve: false,
        ..DemoConfig::default()
    });
    session.click_overlay().expect("click");
    session.advance(EXIT_MS).expect("advance");
    assert!(matches!(
        session.article().controller().phase(),
        HostPhase::Activating { .. }
    ));
    assert!(!session.click_overlay().expect("click while activating"));
    session.resolve_activation().expect("resolve");
    assert_eq!(session.top(), Some(DocumentRole::Podcast));
}

#[test]
fn stalled_activation_stays_pending() {
    let mut session = session_with(DemoConfig {
        auto_resolve: false,
        ..DemoConfig::default()
    });
    session.click_overlay().expect("click");
    session.advance(10_000.0).expect("advance");
    assert!(session.snapshot().activation_in_flight);
    assert_eq!(session.top(), Some(DocumentRole::Article));
}

#[test]
fn rejected_activation_recovers_host() {
    let mut session = session_with(DemoConfig {
        auto_resolve: false,
        ..DemoConfig::default()
    });
    session.click_overlay().expect("click");
    session.advance(EXIT_MS).expect("advance");
    session
        .reject_activation("no user activation")
        .expect("reject");

    let article = session.article();
    assert_eq!(article.controller().phase(), HostPhase::Idle);
    assert!(article.controller().embed().is_some());
    assert!(article.ctx().surface().is_visible(ElementId::PlayerUi));
    assert!(
        article
            .ctx()
            .surface()
            .style(ElementId::EmbedContainer)
            .transform
            .is_identity()
    );
    assert_eq!(session.podcast().mode(), DisplayMode::Embed);
    // The hide request already reached the podcast and there is no command
    // to bring its player back, so the preview stays without one.
    assert!(!session.podcast().audio().is_visible());

    assert!(session.click_overlay().expect("retry click"));
}

#[test]
fn hand_back_without_hero_travel_completes() {
    let mut session = session_with(DemoConfig {
        layout: Layout {
            embed_container: Rect::new(20.0, 170.0, 360.0, 240.0),
            ..Layout::default()
        },
        ..DemoConfig::default()
    });
    promote(&mut session);

    session.click_backdrop().expect("backdrop click");
    assert_eq!(session.top(), Some(DocumentRole::Article));
    assert_eq!(session.podcast().mode(), DisplayMode::Embed);
    assert_eq!(session.podcast().controller().hand_back(), HandBack::Idle);

    promote(&mut session);
    assert_eq!(session.podcast().mode(), DisplayMode::Activated);
}

#[test]
fn fade_ins_do_not_pile_up_across_cycles() {
    let mut session = session();
    for _ in 0..5 {
        promote(&mut session);
        session.click_backdrop().expect("backdrop");
        session.advance(HERO_MS).expect("collapse");
    }
    let header = session.podcast().ctx().surface().style(ElementId::Header);
    assert_eq!(header.animations.len(), 1);
}

#[test]
fn rejected_hand_back_can_be_retried() {
    let mut session = session_with(DemoConfig {
        auto_resolve: false,
        ..DemoConfig::default()
    });
    session.click_overlay().expect("click");
    session.advance(EXIT_MS).expect("advance");
    session.resolve_activation().expect("promote podcast");

    session.click_backdrop().expect("backdrop");
    session.advance(HERO_MS).expect("collapse");
    assert_eq!(session.podcast().controller().hand_back(), HandBack::Requested);
    session.reject_activation("busy").expect("reject");
    assert_eq!(session.podcast().mode(), DisplayMode::PredecessorActivate);
    assert_eq!(session.podcast().controller().hand_back(), HandBack::Rejected);
    assert!(session.podcast().controller().predecessor().is_some());

    session.click_backdrop().expect("retry");
    session.resolve_activation().expect("hand back");
    assert_eq!(session.top(), Some(DocumentRole::Article));
    assert_eq!(session.podcast().mode(), DisplayMode::Embed);
}

#[test]
fn follow_listener_registered_once_across_cycles() {
    let mut session = session();
    for _ in 0..3 {
        promote(&mut session);
        session.click_backdrop().expect("backdrop");
        session.advance(HERO_MS).expect("collapse");
        assert_eq!(session.top(), Some(DocumentRole::Article));
    }
    assert_eq!(
        session
            .article()
            .controller()
            .follow_listener_registrations(),
        1
    );
}

#[test]
fn guest_follow_updates_host_button() {
    let mut session = session();
    promote(&mut session);
    session.click_guest_follow().expect("follow");
    assert!(session.article().follow().is_followed());
    assert_eq!(
        session.podcast().widgets().follow.as_ref().map(FollowWidget::label),
        Some("Following")
    );
    session.click_guest_follow().expect("unfollow");
    assert!(!session.article().follow().is_followed());
}

#[test]
fn port_variant_drops_cross_origin_messages() {
    let mut session = session_with(DemoConfig {
        routing: Routing::SeparatePorts { guest_port: 3001 },
        ..DemoConfig::default()
    });
    session
        .click_player(PlayerButton::PlayPause)
        .expect("play click");
    assert_eq!(session.snapshot().dropped_messages, 1);
    assert!(!session.podcast().audio().playlist().is_playing());

    // Promotion still works across origins; only the hide request is lost.
    promote(&mut session);
    assert_eq!(session.snapshot().dropped_messages, 2);
    session.click_guest_follow().expect("follow");
    assert_eq!(session.snapshot().dropped_messages, 3);
    assert!(!session.article().follow().is_followed());
}

#[test]
fn host_player_controls_embedded_podcast() {
    let mut session = session();
    session
        .click_player(PlayerButton::PlayPause)
        .expect("play");
    assert!(session.podcast().audio().playlist().is_playing());
    assert!(session.article().controller().is_player_playing());
    session
        .click_player(PlayerButton::PlayPause)
        .expect("pause");
    assert!(!session.podcast().audio().playlist().is_playing());
}
