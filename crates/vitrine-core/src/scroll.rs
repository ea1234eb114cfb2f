//! # Scroll progress
//!
//! A tracked region (usually one page section) is reduced to two scroll
//! offsets: where it starts *entering* the viewport and where it has
//! finished *leaving* it. Progress is the position of the current scroll
//! offset between those two, clamped to [0, 1].
//!
//! Boundaries are described by [`EdgePair`]s, each naming an edge of the
//! region and an edge of the viewport that meet at that boundary:
//!
//! ```rust
//! use vitrine_core::*;
//!
//! // default: region top meets viewport bottom -> region bottom meets viewport top
//! let offsets = ScrollOffsets::default();
//! let region = ScrollRegion::resolve(Rect::new(0.0, 1800.0, 1200.0, 600.0), 800.0, &offsets);
//! assert_eq!(region.enter, 1000.0);
//! assert_eq!(region.leave, 2400.0);
//! assert_eq!(region.progress_at(1700.0), 0.5);
//! ```
//!
//! [`ScrollProgressTracker`] keeps that computation current while scroll and
//! resize events arrive, throttled to a minimum interval with a trailing
//! flush so the resting value is always exact.

use std::str::FromStr;
use std::time::Duration;

use web_time::Instant;

use crate::error::ScrollOffsetParseError;
use crate::{Rect, Signal, Subscription};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    Start,
    Center,
    End,
    /// Fraction of the extent from the start edge (0 = start, 1 = end).
    Fraction(f32),
}

impl Edge {
    pub fn fraction(self) -> f32 {
        match self {
            Edge::Start => 0.0,
            Edge::Center => 0.5,
            Edge::End => 1.0,
            Edge::Fraction(f) => f,
        }
    }
}

impl FromStr for Edge {
    type Err = ScrollOffsetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ScrollOffsetParseError(s.to_string());
        match s {
            "start" => Ok(Edge::Start),
            "center" => Ok(Edge::Center),
            "end" => Ok(Edge::End),
            other => {
                let (num, scale) = match other.strip_suffix('%') {
                    Some(pct) => (pct, 100.0),
                    None => (other, 1.0),
                };
                let f: f32 = num.parse().map_err(|_| err())?;
                if !f.is_finite() {
                    return Err(err());
                }
                Ok(Edge::Fraction(f / scale))
            }
        }
    }
}

/// "Region edge meets viewport edge".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgePair {
    pub target: Edge,
    pub viewport: Edge,
}

impl EdgePair {
    pub const fn new(target: Edge, viewport: Edge) -> Self {
        Self { target, viewport }
    }

    /// Scroll offset at which this pair of edges line up.
    pub fn scroll_offset(&self, bounds: &Rect, viewport_height: f32) -> f32 {
        bounds.y + self.target.fraction() * bounds.h - self.viewport.fraction() * viewport_height
    }
}

impl FromStr for EdgePair {
    type Err = ScrollOffsetParseError;

    /// Parses `"<target> <viewport>"`, e.g. `"start end"` or `"end 25%"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(t), Some(v), None) => Ok(EdgePair {
                target: t.parse().map_err(|_| ScrollOffsetParseError(s.to_string()))?,
                viewport: v.parse().map_err(|_| ScrollOffsetParseError(s.to_string()))?,
            }),
            _ => Err(ScrollOffsetParseError(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollOffsets {
    pub enter: EdgePair,
    pub leave: EdgePair,
}

impl Default for ScrollOffsets {
    /// Region enters at the bottom of the viewport and leaves at the top.
    fn default() -> Self {
        Self {
            enter: EdgePair::new(Edge::Start, Edge::End),
            leave: EdgePair::new(Edge::End, Edge::Start),
        }
    }
}

impl ScrollOffsets {
    pub fn parse(enter: &str, leave: &str) -> Result<Self, ScrollOffsetParseError> {
        Ok(Self {
            enter: enter.parse()?,
            leave: leave.parse()?,
        })
    }
}

/// Resolved boundary markers of a tracked region, in scroll-offset space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRegion {
    pub enter: f32,
    pub leave: f32,
}

impl ScrollRegion {
    pub fn from_offsets(enter: f32, leave: f32) -> Self {
        Self { enter, leave }
    }

    pub fn resolve(bounds: Rect, viewport_height: f32, offsets: &ScrollOffsets) -> Self {
        Self {
            enter: offsets.enter.scroll_offset(&bounds, viewport_height),
            leave: offsets.leave.scroll_offset(&bounds, viewport_height),
        }
    }

    /// Unclamped progress; may fall outside [0, 1] at extreme offsets.
    pub fn raw_progress_at(&self, scroll_y: f32) -> f32 {
        let span = self.leave - self.enter;
        if span <= f32::EPSILON {
            return if scroll_y >= self.leave { 1.0 } else { 0.0 };
        }
        (scroll_y - self.enter) / span
    }

    pub fn progress_at(&self, scroll_y: f32) -> f32 {
        self.raw_progress_at(scroll_y).clamp(0.0, 1.0)
    }
}

/// Leading-edge rate limiter.
#[derive(Clone, Copy, Debug)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    pub fn ready(&self, now: Instant) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    pub fn mark(&mut self, now: Instant) {
        self.last_run = Some(now);
    }

    pub fn next_allowed(&self) -> Option<Instant> {
        self.last_run.map(|last| last + self.interval)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Binding {
    /// Not attached to any layout yet.
    Detached,
    /// Region derived from a bounding box; re-derived on relayout.
    Layout { bounds: Rect, viewport_height: f32 },
    /// Region given directly as scroll offsets.
    Fixed(ScrollRegion),
}

/// Keeps one region's progress current as the viewport scrolls.
#[derive(Debug)]
pub struct ScrollProgressTracker {
    offsets: ScrollOffsets,
    binding: Binding,
    scroll_y: f32,
    pending: bool,
    throttle: Throttle,
    progress: Signal<f32>,
}

impl ScrollProgressTracker {
    pub fn new(offsets: ScrollOffsets, throttle: Duration) -> Self {
        Self {
            offsets,
            binding: Binding::Detached,
            scroll_y: 0.0,
            pending: false,
            throttle: Throttle::new(throttle),
            progress: Signal::new(0.0),
        }
    }

    /// Tracker over explicit boundary offsets, skipping layout.
    pub fn for_region(region: ScrollRegion, throttle: Duration) -> Self {
        let mut t = Self::new(ScrollOffsets::default(), throttle);
        t.binding = Binding::Fixed(region);
        t
    }

    pub fn attach(&mut self, bounds: Rect, viewport_height: f32) {
        self.binding = Binding::Layout {
            bounds,
            viewport_height,
        };
        self.recompute(None);
    }

    /// Back to the unattached state; progress reports 0.
    pub fn detach(&mut self) {
        self.binding = Binding::Detached;
        self.pending = false;
        self.progress.set(0.0);
    }

    /// Layout change (resize, content reflow). Applied immediately.
    pub fn relayout(&mut self, bounds: Rect, viewport_height: f32) {
        if let Binding::Fixed(_) = self.binding {
            return;
        }
        self.attach(bounds, viewport_height);
    }

    pub fn is_attached(&self) -> bool {
        self.binding != Binding::Detached
    }

    pub fn region(&self) -> Option<ScrollRegion> {
        match self.binding {
            Binding::Detached => None,
            Binding::Layout {
                bounds,
                viewport_height,
            } => Some(ScrollRegion::resolve(bounds, viewport_height, &self.offsets)),
            Binding::Fixed(region) => Some(region),
        }
    }

    /// Records the new offset. Recomputes right away unless the throttle
    /// window is still open, in which case the update is deferred until
    /// [`flush`](Self::flush). Returns whether progress was recomputed.
    pub fn on_scroll(&mut self, scroll_y: f32, now: Instant) -> bool {
        self.scroll_y = scroll_y;
        if self.throttle.ready(now) {
            self.recompute(Some(now));
            true
        } else {
            self.pending = true;
            false
        }
    }

    /// Applies a deferred update once the throttle window has closed.
    pub fn flush(&mut self, now: Instant) -> bool {
        if self.pending && self.throttle.ready(now) {
            self.recompute(Some(now));
            true
        } else {
            false
        }
    }

    /// When a deferred update can be flushed, if one is waiting.
    pub fn flush_due_at(&self) -> Option<Instant> {
        if self.pending {
            self.throttle.next_allowed()
        } else {
            None
        }
    }

    pub fn current_progress(&self) -> f32 {
        self.progress.get()
    }

    pub fn progress(&self) -> Signal<f32> {
        self.progress.clone()
    }

    pub fn subscribe(&self, f: impl Fn(f32) + 'static) -> Subscription {
        self.progress.subscribe(move |p| f(*p))
    }

    fn recompute(&mut self, now: Option<Instant>) {
        self.pending = false;
        if let Some(now) = now {
            self.throttle.mark(now);
        }
        let p = self
            .region()
            .map(|r| r.progress_at(self.scroll_y))
            .unwrap_or(0.0);
        if p != self.progress.get() {
            self.progress.set(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_THROTTLE: Duration = Duration::ZERO;

    #[test]
    fn fixed_region_progress() {
        let t0 = Instant::now();
        let mut t =
            ScrollProgressTracker::for_region(ScrollRegion::from_offsets(1000.0, 2000.0), NO_THROTTLE);
        t.on_scroll(1000.0, t0);
        assert_eq!(t.current_progress(), 0.0);
        t.on_scroll(1500.0, t0);
        assert_eq!(t.current_progress(), 0.5);
        t.on_scroll(2500.0, t0);
        assert_eq!(t.current_progress(), 1.0);
        t.on_scroll(200.0, t0);
        assert_eq!(t.current_progress(), 0.0);
    }

    #[test]
    fn unattached_reports_zero() {
        let mut t = ScrollProgressTracker::new(ScrollOffsets::default(), NO_THROTTLE);
        t.on_scroll(5000.0, Instant::now());
        assert!(!t.is_attached());
        assert_eq!(t.current_progress(), 0.0);
    }

    #[test]
    fn tall_region_is_monotonic() {
        let now = Instant::now();
        let mut t = ScrollProgressTracker::new(ScrollOffsets::default(), NO_THROTTLE);
        // Region three viewports tall.
        t.attach(Rect::new(0.0, 1000.0, 800.0, 2400.0), 800.0);
        let mut last = -1.0;
        for step in 0..=80 {
            t.on_scroll(step as f32 * 50.0, now);
            let p = t.current_progress();
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= last, "progress went backwards at step {step}");
            last = p;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn throttled_updates_flush_to_latest_offset() {
        let t0 = Instant::now();
        let mut t = ScrollProgressTracker::for_region(
            ScrollRegion::from_offsets(0.0, 100.0),
            Duration::from_millis(16),
        );
        assert!(t.on_scroll(10.0, t0));
        assert!(!t.on_scroll(20.0, t0 + Duration::from_millis(5)));
        assert!(!t.on_scroll(40.0, t0 + Duration::from_millis(10)));
        assert_eq!(t.current_progress(), 0.1);
        assert_eq!(t.flush_due_at(), Some(t0 + Duration::from_millis(16)));

        assert!(!t.flush(t0 + Duration::from_millis(12)));
        assert!(t.flush(t0 + Duration::from_millis(16)));
        assert_eq!(t.current_progress(), 0.4);
        assert_eq!(t.flush_due_at(), None);
    }

    #[test]
    fn relayout_moves_boundaries() {
        let now = Instant::now();
        let mut t = ScrollProgressTracker::new(ScrollOffsets::default(), NO_THROTTLE);
        t.attach(Rect::new(0.0, 1000.0, 800.0, 1000.0), 1000.0);
        t.on_scroll(1000.0, now);
        // enter 0, leave 2000
        assert_eq!(t.current_progress(), 0.5);
        t.relayout(Rect::new(0.0, 1500.0, 800.0, 1000.0), 1000.0);
        // enter 500, leave 2500
        assert_eq!(t.current_progress(), 0.25);
        t.detach();
        assert_eq!(t.current_progress(), 0.0);
    }

    #[test]
    fn parses_edge_descriptors() {
        let o = ScrollOffsets::parse("start end", "end start").unwrap();
        assert_eq!(o, ScrollOffsets::default());
        let p: EdgePair = "center 25%".parse().unwrap();
        assert_eq!(p, EdgePair::new(Edge::Center, Edge::Fraction(0.25)));
        assert!("start".parse::<EdgePair>().is_err());
        assert!("start middle".parse::<EdgePair>().is_err());
    }
}
