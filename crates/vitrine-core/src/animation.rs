//! Easing curves, tween specs, and the injected animation clock.
//!
//! Nothing in this crate reads the wall clock directly: every component that
//! cares about time receives an `Rc<dyn Clock>` (or an explicit `Instant`).
//! Platforms install [`SystemClock`]; tests drive a [`ManualClock`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use web_time::Instant;

use crate::{Color, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Maps linear time `t` in [0, 1] to eased progress.
    pub fn interpolate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationSpec {
    pub duration: Duration,
    pub easing: Easing,
    pub delay: Duration,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(300),
            easing: Easing::EaseInOut,
            delay: Duration::ZERO,
        }
    }
}

impl AnimationSpec {
    pub fn tween(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Eased progress in [0, 1] at `elapsed` since the animation was started.
    /// Stays at 0 for the whole delay.
    pub fn progress_at(&self, elapsed: Duration) -> f32 {
        if elapsed < self.delay {
            return 0.0;
        }
        let running = elapsed - self.delay;
        if self.duration.is_zero() || running >= self.duration {
            return 1.0;
        }
        let t = running.as_secs_f32() / self.duration.as_secs_f32();
        self.easing.interpolate(t)
    }

    /// Total time from start until the value settles.
    pub fn total(&self) -> Duration {
        self.delay + self.duration
    }
}

pub trait Interpolate {
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Interpolate for Vec2 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        Vec2 {
            x: self.x.interpolate(&other.x, t),
            y: self.y.interpolate(&other.y, t),
        }
    }
}

impl Interpolate for Color {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        let ch = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8;
        Color(
            ch(self.0, other.0),
            ch(self.1, other.1),
            ch(self.2, other.2),
            ch(self.3, other.3),
        )
    }
}

pub trait Clock {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    t: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            t: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.t.set(self.t.get() + by);
    }

    pub fn set(&self, t: Instant) {
        self.t.set(t);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.t.get()
    }
}

/// Value that eases from its current position to a target over an
/// [`AnimationSpec`], sampled at caller-supplied instants.
#[derive(Clone, Debug)]
pub struct AnimatedValue<T: Interpolate + Clone> {
    current: T,
    target: T,
    start: T,
    spec: AnimationSpec,
    start_time: Option<Instant>,
}

impl<T: Interpolate + Clone> AnimatedValue<T> {
    pub fn new(initial: T, spec: AnimationSpec) -> Self {
        Self {
            current: initial.clone(),
            target: initial.clone(),
            start: initial,
            spec,
            start_time: None,
        }
    }

    /// Retargets from wherever the value currently is.
    pub fn set_target(&mut self, target: T, now: Instant) {
        self.start = self.current.clone();
        self.target = target;
        self.start_time = Some(now);
    }

    /// Advances to `now`; returns `true` while still animating (including the delay).
    pub fn update(&mut self, now: Instant) -> bool {
        let Some(start) = self.start_time else {
            return false;
        };
        let elapsed = now.saturating_duration_since(start);
        if elapsed >= self.spec.total() {
            self.current = self.target.clone();
            self.start_time = None;
            return false;
        }
        let eased = self.spec.progress_at(elapsed);
        self.current = self.start.interpolate(&self.target, eased);
        true
    }

    pub fn get(&self) -> &T {
        &self.current
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn is_animating(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn spec(&self) -> &AnimationSpec {
        &self.spec
    }
}
