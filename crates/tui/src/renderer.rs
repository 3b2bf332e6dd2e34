use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use portal_handoff_core::lifecycle::PlayerButton;
use portal_handoff_core::model::{DocumentRole, SessionSnapshot, Surface};
use portal_handoff_core::widgets::{PlaybackState, RECOMMENDED};
use portal_handoff_core::{DemoConfig, Session};
use portal_handoff_protocol::{ControlCommand, ElementId};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};
use tracing::warn;

const FRAME: Duration = Duration::from_millis(50);
const HELP: &str = " o overlay | b backdrop | space play | [ ] prev/next | f follow | 1-3 queue | a/r resolve/reject | q quit ";

pub fn run(config: &DemoConfig) -> Result<()> {
    let mut session = Session::new(config)?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut session);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    session: &mut Session,
) -> Result<()> {
    let mut status = String::from("ready");
    let mut last = Instant::now();

    loop {
        let snapshot = session.snapshot();
        terminal.draw(|frame| draw(frame, &snapshot, &status))?;

        if event::poll(FRAME)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    break;
                }
                if let Err(error) = handle_key(session, key.code) {
                    warn!(%error, "action failed");
                    status = error.to_string();
                } else {
                    status = format!("{:?}", key.code);
                }
            }
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last).as_secs_f64() * 1_000.0;
        last = now;
        session.advance(elapsed)?;
    }
    Ok(())
}

fn handle_key(session: &mut Session, code: KeyCode) -> portal_handoff_core::Result<()> {
    let top = session.top();
    match code {
        KeyCode::Char('o') => {
            session.click_overlay()?;
        }
        KeyCode::Char('b') => session.click_backdrop()?,
        KeyCode::Char(' ') => match top {
            Some(DocumentRole::Article) => session.click_player(PlayerButton::PlayPause)?,
            _ => {
                let command = match session.podcast().audio().state() {
                    PlaybackState::Playing => ControlCommand::Pause,
                    PlaybackState::Stopped => ControlCommand::Play,
                };
                session.control_podcast(command);
            }
        },
        KeyCode::Char('[') => match top {
            Some(DocumentRole::Article) => session.click_player(PlayerButton::Prev)?,
            _ => session.control_podcast(ControlCommand::Prev),
        },
        KeyCode::Char(']') => match top {
            Some(DocumentRole::Article) => session.click_player(PlayerButton::Next)?,
            _ => session.control_podcast(ControlCommand::Next),
        },
        KeyCode::Char('f') => match top {
            Some(DocumentRole::Article) => session.click_host_follow(),
            _ => session.click_guest_follow()?,
        },
        KeyCode::Char(c @ '1'..='3') => {
            let index = usize::from(c as u8 - b'1');
            if let Some(id) = RECOMMENDED.get(index) {
                session.toggle_recommendation(id)?;
            }
        }
        KeyCode::Char('a') => session.resolve_activation()?,
        KeyCode::Char('r') => session.reject_activation("rejected from the terminal")?,
        _ => {}
    }
    Ok(())
}

fn draw(frame: &mut Frame, snapshot: &SessionSnapshot, status: &str) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(10),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let top = match snapshot.top {
        Some(DocumentRole::Article) => "article",
        Some(DocumentRole::Podcast) => "podcast",
        None => "-",
    };
    let title = format!(
        " portal-handoff | t={:.0}ms | top: {top} | in flight: {} | dropped msgs: {} ",
        snapshot.now_ms, snapshot.activation_in_flight, snapshot.dropped_messages
    );
    frame.render_widget(
        Paragraph::new(title).style(Style::default().fg(Color::White).bg(Color::DarkGray)),
        header,
    );

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(body);
    draw_article(frame, left, snapshot, snapshot.top == Some(DocumentRole::Article));
    draw_podcast(frame, right, snapshot, snapshot.top == Some(DocumentRole::Podcast));

    frame.render_widget(
        Paragraph::new(format!("{HELP}| {status}")).style(Style::default().fg(Color::Gray)),
        footer,
    );
}

fn pane(title: &str, is_top: bool) -> Block<'_> {
    let style = if is_top {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn flag(label: impl std::fmt::Display, on: bool) -> Span<'static> {
    let style = if on {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(format!("{label} "), style)
}

fn element_line(surface: &Surface, ids: &[(ElementId, &str)]) -> Line<'static> {
    Line::from(
        ids.iter()
            .map(|(id, label)| flag(label, surface.is_visible(*id) && surface.opacity(*id) > 0.0))
            .collect::<Vec<_>>(),
    )
}

fn draw_article(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot, is_top: bool) {
    let article = &snapshot.article;
    let surface = &article.surface;
    let container = surface.bounding_rect(ElementId::EmbedContainer);

    let mut lines = vec![
        Line::from(format!("phase: {:?}", article.phase)),
        Line::from(vec![
            flag("embedded", article.embedded),
            flag("fallback", article.fallback),
            flag("scrollbars", surface.scrollbars_visible()),
        ]),
        element_line(
            surface,
            &[
                (ElementId::HitTarget, "hit-target"),
                (ElementId::PlayerUi, "player-ui"),
                (ElementId::FallbackBanner, "banner"),
            ],
        ),
        Line::from(format!(
            "container: y={:.0} w={:.0} scale={:.2}",
            container.y,
            container.w,
            surface.style(ElementId::EmbedContainer).transform.scale
        )),
    ];
    match &article.embed {
        Some(embed) => lines.push(Line::from(format!(
            "embed: {} {} (y={:.0}, w={:.0})",
            embed.portal, embed.src, embed.y, embed.width
        ))),
        None => lines.push(Line::from("embed: none")),
    }
    lines.push(Line::from(format!(
        "follow: [{}]  overlay play: {}",
        article.follow.label(),
        article.player_playing
    )));
    lines.push(Line::from(format!(
        "follow listeners: {}",
        article.follow_listener_registrations
    )));

    frame.render_widget(
        Paragraph::new(lines).block(pane(" PORTALOG article ", is_top)),
        area,
    );
}

fn draw_podcast(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot, is_top: bool) {
    let podcast = &snapshot.podcast;
    let surface = &podcast.surface;
    let audio = &podcast.audio;

    let block = pane(" TTT podcast ", is_top);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let [text_area, gauge_area] =
        Layout::vertical([Constraint::Min(6), Constraint::Length(1)]).areas(inner);

    let queue: Vec<Span<'_>> = audio
        .playlist()
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let style = if i == audio.playlist().index() {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Span::styled(format!("{id} "), style)
        })
        .collect();
    let reco: Vec<Span<'_>> = podcast
        .recommendations
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| flag(format_args!("{}:{}", i + 1, item.id), item.added))
        .collect();

    let mut lines = vec![
        Line::from(format!("mode: {}  hand-back: {:?}", podcast.mode, podcast.hand_back)),
        Line::from(vec![
            flag("embedded", podcast.embedded),
            flag("scrollbars", surface.scrollbars_visible()),
            flag("player", audio.is_visible()),
        ]),
        element_line(
            surface,
            &[
                (ElementId::Header, "header"),
                (ElementId::Detail, "detail"),
                (ElementId::Follow, "follow"),
                (ElementId::Recommendation, "reco"),
                (ElementId::Lightbox, "lightbox"),
            ],
        ),
        Line::from(format!(
            "main: {}  hero top: {:.0}",
            surface.width(ElementId::Main),
            surface.style(ElementId::HeroImg).top
        )),
        Line::from(format!("{:?}  {}", audio.state(), audio.title())),
        Line::from(queue),
        Line::from(reco),
    ];
    if let Some(follow) = &podcast.follow {
        lines.push(Line::from(format!(
            "{} [{}]",
            follow.name(),
            follow.label()
        )));
    }
    frame.render_widget(Paragraph::new(lines), text_area);

    let ratio = audio.progress().fraction(snapshot.now_ms).clamp(0.0, 1.0);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(ratio),
        gauge_area,
    );
}
