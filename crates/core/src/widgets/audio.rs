use portal_handoff_protocol::{AnimatedProperty, ControlCommand, ElementId, SurfaceCommand, Transition};
use serde::Serialize;
use tracing::debug;

use super::progress::ProgressIndicator;
use crate::error::WidgetError;
use crate::model::{Catalog, DocumentContext, PlaylistState, TrackId};

const PLAYER_HEIGHT_PX: f64 = 80.0;
const HIDE_MS: u32 = 600;
const SHOW_MS: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// Side effects on the underlying `<audio>` element, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MediaEvent {
    Load { src: String },
    Play,
    Pause,
}

/// The loaded `<audio>` element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaElement {
    pub track: TrackId,
    pub src: String,
    pub duration_sec: f64,
}

/// The podcast player widget.
///
/// A two-state machine (`STOPPED`/`PLAYING`) over a [`PlaylistState`].
/// The playlist survives activation and hand-back; only the widget's
/// visibility changes.
#[derive(Debug, Clone, Serialize)]
pub struct AudioController {
    #[serde(skip)]
    catalog: Catalog,
    playlist: PlaylistState,
    media: Option<MediaElement>,
    progress: ProgressIndicator,
    title: String,
    visible: bool,
    media_events: Vec<MediaEvent>,
}

impl AudioController {
    pub fn new(catalog: Catalog, first: &str, timeline_width: f64) -> Result<Self, WidgetError> {
        let first = catalog.require(first)?.id.clone();
        let mut controller = Self {
            catalog,
            playlist: PlaylistState::new(first),
            media: None,
            progress: ProgressIndicator::new(timeline_width),
            title: String::new(),
            visible: true,
            media_events: Vec::new(),
        };
        controller.load_current();
        Ok(controller)
    }

    pub fn state(&self) -> PlaybackState {
        if self.playlist.is_playing() {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    pub fn playlist(&self) -> &PlaylistState {
        &self.playlist
    }

    pub fn media(&self) -> Option<&MediaElement> {
        self.media.as_ref()
    }

    pub fn media_events(&self) -> &[MediaEvent] {
        &self.media_events
    }

    pub fn progress(&self) -> &ProgressIndicator {
        &self.progress
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_prev(&self) -> bool {
        self.playlist.has_prev()
    }

    pub fn has_next(&self) -> bool {
        self.playlist.has_next()
    }

    /// Icon on the play button.
    pub fn play_icon(&self) -> &'static str {
        match self.state() {
            PlaybackState::Playing => "/img/pause.png",
            PlaybackState::Stopped => "/img/play.png",
        }
    }

    pub fn apply_control(&mut self, ctx: &mut DocumentContext, command: ControlCommand) {
        match command {
            ControlCommand::Play => self.play(ctx),
            ControlCommand::Pause => self.pause(ctx),
            ControlCommand::Next => self.next(ctx),
            ControlCommand::Prev => self.prev(ctx),
            ControlCommand::Hide => self.hide(ctx),
        }
    }

    /// Start the current track. Does nothing while already playing.
    pub fn play(&mut self, ctx: &DocumentContext) {
        if self.playlist.is_playing() {
            return;
        }
        let Some(media) = &self.media else {
            debug!("play ignored: playlist is empty");
            return;
        };
        let remaining = media.duration_sec * (1.0 - self.progress.fraction(ctx.now_ms()));
        self.media_events.push(MediaEvent::Play);
        self.playlist.set_playing(true);
        self.progress.run_to_end(ctx.now_ms(), remaining);
    }

    /// Stop and freeze the knob where it is rendered.
    pub fn pause(&mut self, ctx: &DocumentContext) {
        if !self.playlist.is_playing() {
            return;
        }
        self.media_events.push(MediaEvent::Pause);
        self.playlist.set_playing(false);
        self.progress.freeze(ctx.now_ms());
        self.playlist.set_elapsed(self.progress.fraction(ctx.now_ms()));
    }

    pub fn next(&mut self, ctx: &DocumentContext) {
        if !self.playlist.advance() {
            return;
        }
        self.switch_track(ctx);
    }

    pub fn prev(&mut self, ctx: &DocumentContext) {
        if !self.playlist.retreat() {
            return;
        }
        self.switch_track(ctx);
    }

    pub fn add_to_playlist(&mut self, id: &str) -> Result<(), WidgetError> {
        let id = self.catalog.require(id)?.id.clone();
        self.playlist.push(id);
        Ok(())
    }

    /// Remove `id`. Returns whether it was queued at all.
    pub fn remove_from_playlist(&mut self, ctx: &DocumentContext, id: &str) -> bool {
        let Some(removal) = self.playlist.remove(&TrackId::from(id)) else {
            return false;
        };
        if removal.current_changed {
            self.switch_track(ctx);
        }
        true
    }

    /// Load the track under the cursor, resuming if we were playing.
    fn switch_track(&mut self, ctx: &DocumentContext) {
        let was_playing = self.playlist.is_playing();
        self.playlist.set_playing(false);
        self.load_current();
        if was_playing {
            self.play(ctx);
        }
    }

    /// Replace the `<audio>` element with one for the current track.
    fn load_current(&mut self) {
        self.progress.reset();
        self.playlist.set_elapsed(0.0);
        let track = self
            .playlist
            .current()
            .and_then(|id| self.catalog.get(id.as_str()))
            .cloned();
        match track {
            Some(track) => {
                let src = track.media_src();
                self.media_events.push(MediaEvent::Load { src: src.clone() });
                self.title = track.display_title();
                self.media = Some(MediaElement {
                    track: track.id,
                    src,
                    duration_sec: track.duration_sec,
                });
            }
            None => {
                self.title.clear();
                self.media = None;
            }
        }
    }

    /// Slide the player out of view.
    pub fn hide(&mut self, ctx: &mut DocumentContext) {
        self.visible = false;
        ctx.apply(&slide(HIDE_MS, -PLAYER_HEIGHT_PX));
    }

    /// Slide the player back in.
    pub fn show(&mut self, ctx: &mut DocumentContext) {
        self.visible = true;
        ctx.apply(&slide(SHOW_MS, 0.0));
    }

    /// The document was just promoted or handed back and the knob may have
    /// been re-attached; restart its transition from where it is rendered.
    pub fn handle_activation(&mut self, ctx: &DocumentContext) {
        let now = ctx.now_ms();
        self.progress.freeze(now);
        self.playlist.set_elapsed(self.progress.fraction(now));
        if let (true, Some(media)) = (self.playlist.is_playing(), &self.media) {
            let remaining = media.duration_sec * (1.0 - self.playlist.elapsed());
            self.progress.run_to_end(now, remaining);
        }
    }

    /// `timeupdate` from real playback.
    pub fn on_time_update(&mut self, current_sec: f64) {
        let Some(media) = &self.media else {
            return;
        };
        self.progress.seek_to_media_time(current_sec, media.duration_sec);
        self.playlist.set_elapsed(current_sec / media.duration_sec);
    }

    /// `ended`: stop and rewind the current track.
    pub fn on_ended(&mut self, ctx: &DocumentContext) {
        self.pause(ctx);
        self.load_current();
    }

    /// When the knob will reach the end, if it is running.
    pub fn next_deadline(&self) -> Option<f64> {
        if self.playlist.is_playing() {
            self.progress.finishes_at()
        } else {
            None
        }
    }

    /// Advance simulated playback to the context's clock.
    pub fn tick(&mut self, ctx: &DocumentContext) {
        if self
            .next_deadline()
            .is_some_and(|end| end <= ctx.now_ms())
        {
            self.on_ended(ctx);
        }
    }
}

fn slide(duration_ms: u32, bottom: f64) -> [SurfaceCommand; 2] {
    [
        SurfaceCommand::SetTransition {
            target: ElementId::AudioController,
            transition: Some(Transition::new(AnimatedProperty::Bottom, duration_ms)),
        },
        SurfaceCommand::SetOffset {
            target: ElementId::AudioController,
            property: AnimatedProperty::Bottom,
            px: bottom,
        },
    ]
}
