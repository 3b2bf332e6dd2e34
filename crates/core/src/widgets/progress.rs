use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct Motion {
    from: f64,
    to: f64,
    started_ms: f64,
    duration_ms: f64,
}

/// The knob on the player timeline.
///
/// It moves either by explicit media time updates or by a single linear
/// `left` transition toward the end of the timeline. In the second case
/// the style value is already the end position, so the current position
/// has to be read back from the rendered geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressIndicator {
    timeline_width: f64,
    /// Styled `left`, px.
    left: f64,
    motion: Option<Motion>,
}

impl ProgressIndicator {
    pub fn new(timeline_width: f64) -> Self {
        Self {
            timeline_width,
            left: 0.0,
            motion: None,
        }
    }

    pub fn timeline_width(&self) -> f64 {
        self.timeline_width
    }

    /// Rendered `left` at `now_ms`.
    pub fn rendered_left(&self, now_ms: f64) -> f64 {
        let Some(m) = self.motion else {
            return self.left;
        };
        if m.duration_ms <= 0.0 {
            return m.to;
        }
        let t = ((now_ms - m.started_ms) / m.duration_ms).clamp(0.0, 1.0);
        m.from + (m.to - m.from) * t
    }

    /// Fraction of the timeline covered at `now_ms`.
    pub fn fraction(&self, now_ms: f64) -> f64 {
        if self.timeline_width <= 0.0 {
            return 0.0;
        }
        (self.rendered_left(now_ms) / self.timeline_width).clamp(0.0, 1.0)
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    /// When the running transition reaches the end of the timeline.
    pub fn finishes_at(&self) -> Option<f64> {
        self.motion.map(|m| m.started_ms + m.duration_ms.max(0.0))
    }

    /// Run from the current position to the end over `remaining_sec`.
    pub fn run_to_end(&mut self, now_ms: f64, remaining_sec: f64) {
        let from = self.rendered_left(now_ms);
        self.left = self.timeline_width;
        self.motion = Some(Motion {
            from,
            to: self.timeline_width,
            started_ms: now_ms,
            duration_ms: remaining_sec.max(0.0) * 1000.0,
        });
    }

    /// Stop the transition where it currently is.
    pub fn freeze(&mut self, now_ms: f64) {
        self.left = self.rendered_left(now_ms);
        self.motion = None;
    }

    /// Position from a `timeupdate`: `width * current / duration`.
    pub fn seek_to_media_time(&mut self, current_sec: f64, duration_sec: f64) {
        if duration_sec <= 0.0 {
            return;
        }
        self.motion = None;
        self.left = (self.timeline_width * current_sec / duration_sec).clamp(0.0, self.timeline_width);
    }

    /// Back to the start with no transition.
    pub fn reset(&mut self) {
        self.left = 0.0;
        self.motion = None;
    }
}
