//! # Reveal-once entrance animations
//!
//! Every animated element owns a [`RevealController`]: a two-state machine
//! that starts `Hidden` and flips to `Visible` the first time the element's
//! visible fraction of the viewport meets its threshold. The flip is
//! permanent: scrolling away and back never replays the entrance.
//!
//! The state change is immediate; the fade/slide that follows is a timed
//! easing sampled with [`RevealController::visuals`].
//!
//! A [`RevealGroup`] gates a list of children on a parent: when the parent
//! reveals, child `i` is told to start after `schedule.delay_for(i)`. Grouped
//! children do not watch the viewport themselves.
//!
//! ```rust
//! use std::rc::Rc;
//! use std::time::Duration;
//! use vitrine_core::*;
//!
//! let clock = ManualClock::default();
//! let timers = Timers::new(Rc::new(clock.clone()));
//!
//! let parent = Rc::new(RevealController::new(RevealConfig::default()));
//! let children: Vec<_> = (0..3)
//!     .map(|_| Rc::new(RevealController::new(RevealConfig::default())))
//!     .collect();
//! let group = RevealGroup::new(
//!     parent.clone(),
//!     children.clone(),
//!     StaggerSchedule::new(Duration::from_millis(100)),
//!     timers.clone(),
//! );
//!
//! parent.observe(1.0, clock.now());
//! assert!(children[0].is_visible());
//! assert!(!children[1].is_visible());
//!
//! clock.advance(Duration::from_millis(100));
//! timers.run_due();
//! assert!(children[1].is_visible());
//! # group.dispose();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use web_time::Instant;

use crate::{
    AnimatedValue, AnimationSpec, Dispose, Easing, Interpolate, Rect, Signal, Subscription,
    TimerHandle, Timers, Vec2,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RevealState {
    #[default]
    Hidden,
    Visible,
}

/// `threshold == 0` means any non-zero overlap counts.
pub fn meets_threshold(fraction: f32, threshold: f32) -> bool {
    if threshold <= 0.0 {
        fraction > 0.0
    } else {
        fraction >= threshold
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealConfig {
    /// Minimum visible fraction of the element, in [0, 1].
    pub threshold: f32,
    /// Easing of the entrance. `spec.delay` postpones the motion only.
    pub spec: AnimationSpec,
    /// Where the element sits, relative to its resting place, while hidden.
    pub hidden_offset: Vec2,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            spec: AnimationSpec::tween(Duration::from_millis(600), Easing::EaseOut),
            hidden_offset: Vec2::new(0.0, 20.0),
        }
    }
}

impl RevealConfig {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.spec.duration = duration;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.spec.delay = delay;
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.hidden_offset = offset;
        self
    }
}

/// Sampled presentation of a revealing element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealVisuals {
    pub opacity: f32,
    pub offset: Vec2,
}

impl RevealVisuals {
    pub const SHOWN: RevealVisuals = RevealVisuals {
        opacity: 1.0,
        offset: Vec2::ZERO,
    };

    pub fn hidden(offset: Vec2) -> Self {
        Self {
            opacity: 0.0,
            offset,
        }
    }
}

impl Interpolate for RevealVisuals {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        Self {
            opacity: self.opacity.interpolate(&other.opacity, t),
            offset: self.offset.interpolate(&other.offset, t),
        }
    }
}

pub struct RevealController {
    config: RevealConfig,
    state: Signal<RevealState>,
    started_at: Cell<Option<Instant>>,
    anim: RefCell<AnimatedValue<RevealVisuals>>,
}

impl std::fmt::Debug for RevealController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealController")
            .field("state", &self.state())
            .field("started_at", &self.started_at.get())
            .field("threshold", &self.config.threshold)
            .finish()
    }
}

impl RevealController {
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            state: Signal::new(RevealState::Hidden),
            started_at: Cell::new(None),
            anim: RefCell::new(AnimatedValue::new(
                RevealVisuals::hidden(config.hidden_offset),
                config.spec,
            )),
        }
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    pub fn state(&self) -> RevealState {
        self.state.get()
    }

    pub fn is_visible(&self) -> bool {
        self.state() == RevealState::Visible
    }

    /// Feeds one intersection measurement. Returns `true` only on the call
    /// that performs the `Hidden → Visible` transition.
    pub fn observe(&self, fraction: f32, now: Instant) -> bool {
        if self.is_visible() || !meets_threshold(fraction, self.config.threshold) {
            return false;
        }
        self.reveal(now)
    }

    /// Starts the entrance at `at` regardless of intersection. No-op once visible.
    pub fn reveal(&self, at: Instant) -> bool {
        if self.is_visible() {
            return false;
        }
        self.started_at.set(Some(at));
        self.anim.borrow_mut().set_target(RevealVisuals::SHOWN, at);
        log::debug!("reveal: hidden -> visible");
        self.state.set(RevealState::Visible);
        true
    }

    /// When the transition fired, if it has.
    pub fn started_at(&self) -> Option<Instant> {
        self.started_at.get()
    }

    /// When the parameters begin to move (transition time plus configured delay).
    pub fn easing_starts_at(&self) -> Option<Instant> {
        self.started_at.get().map(|t| t + self.config.spec.delay)
    }

    pub fn visuals(&self, now: Instant) -> RevealVisuals {
        let mut anim = self.anim.borrow_mut();
        anim.update(now);
        *anim.get()
    }

    /// `f` runs once, when the element becomes visible.
    pub fn on_reveal(&self, f: impl Fn() + 'static) -> Subscription {
        self.state.subscribe(move |s| {
            if *s == RevealState::Visible {
                f();
            }
        })
    }

    /// Watches `bounds` through `observer` until the element reveals, then
    /// stops observing. The returned cleanup stops it early (unmount).
    pub fn bind(self: &Rc<Self>, observer: &dyn IntersectionObserver, bounds: Rect) -> Dispose {
        if self.is_visible() {
            return Dispose::noop();
        }
        let weak = Rc::downgrade(self);
        let slot: Rc<RefCell<Option<Dispose>>> = Rc::new(RefCell::new(None));
        let stop = observer.observe(
            bounds,
            self.config.threshold,
            Box::new({
                let slot = slot.clone();
                move |entry: IntersectionEntry| {
                    let Some(controller) = weak.upgrade() else {
                        return;
                    };
                    if controller.observe(entry.fraction, entry.time) {
                        let d = slot.borrow_mut().take();
                        if let Some(d) = d {
                            d.run();
                        }
                    }
                }
            }),
        );
        *slot.borrow_mut() = Some(stop.clone());
        stop
    }
}

/// Child delay = `initial_delay + index × increment`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaggerSchedule {
    pub initial_delay: Duration,
    pub increment: Duration,
}

impl StaggerSchedule {
    pub fn new(increment: Duration) -> Self {
        Self {
            initial_delay: Duration::ZERO,
            increment,
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn delay_for(&self, index: usize) -> Duration {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        self.initial_delay
            .saturating_add(self.increment.saturating_mul(index))
    }
}

/// Parent-gated staggered reveal.
pub struct RevealGroup {
    parent: Rc<RevealController>,
    children: Rc<[Rc<RevealController>]>,
    schedule: StaggerSchedule,
    pending: Rc<RefCell<SmallVec<[TimerHandle; 8]>>>,
    subscription: Subscription,
}

impl std::fmt::Debug for RevealGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealGroup")
            .field("parent", &self.parent.state())
            .field("children", &self.children.len())
            .field("schedule", &self.schedule)
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

impl RevealGroup {
    pub fn new(
        parent: Rc<RevealController>,
        children: impl IntoIterator<Item = Rc<RevealController>>,
        schedule: StaggerSchedule,
        timers: Timers,
    ) -> Self {
        let children: Rc<[Rc<RevealController>]> = children.into_iter().collect();
        let pending: Rc<RefCell<SmallVec<[TimerHandle; 8]>>> = Rc::default();

        let start = {
            let children = children.clone();
            let pending = pending.clone();
            let parent = Rc::downgrade(&parent);
            move || {
                let Some(at) = parent.upgrade().and_then(|p| p.started_at()) else {
                    return;
                };
                for (i, child) in children.iter().enumerate() {
                    let Some(due) = at.checked_add(schedule.delay_for(i)) else {
                        log::warn!("reveal stagger for child {i} is out of range, skipping");
                        continue;
                    };
                    if due <= timers.now() {
                        child.reveal(due);
                    } else {
                        let child = child.clone();
                        let handle = timers.schedule_at(due, move || {
                            child.reveal(due);
                        });
                        pending.borrow_mut().push(handle);
                    }
                }
            }
        };

        let already_visible = parent.is_visible();
        let start = Rc::new(start);
        let subscription = parent.on_reveal({
            let start = start.clone();
            move || start()
        });
        if already_visible {
            start();
        }

        Self {
            parent,
            children,
            schedule,
            pending,
            subscription,
        }
    }

    pub fn parent(&self) -> &Rc<RevealController> {
        &self.parent
    }

    pub fn children(&self) -> &[Rc<RevealController>] {
        &self.children
    }

    pub fn schedule(&self) -> StaggerSchedule {
        self.schedule
    }

    /// Children that are scheduled but not yet told to start.
    pub fn pending(&self) -> usize {
        self.pending
            .borrow()
            .iter()
            .filter(|h| h.is_pending())
            .count()
    }

    /// Stops listening to the parent and cancels every scheduled child start.
    pub fn dispose(&self) {
        self.subscription.unsubscribe();
        for handle in self.pending.borrow_mut().drain(..) {
            handle.cancel();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub fraction: f32,
    pub time: Instant,
}

/// "Tell me when region R crosses visibility threshold T."
pub trait IntersectionObserver {
    fn observe(
        &self,
        bounds: Rect,
        threshold: f32,
        on_cross: Box<dyn Fn(IntersectionEntry)>,
    ) -> Dispose;
}

new_key_type! {
    pub struct ObservationKey;
}

struct Target {
    bounds: Rect,
    threshold: f32,
    inside: bool,
    on_cross: Rc<dyn Fn(IntersectionEntry)>,
}

/// Geometric observer driven by explicit viewport checks (one per scroll or
/// resize event). Callbacks fire on the outside → inside edge only.
#[derive(Clone, Default)]
pub struct ViewportIntersections {
    targets: Rc<RefCell<SlotMap<ObservationKey, Target>>>,
}

impl std::fmt::Debug for ViewportIntersections {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportIntersections")
            .field("targets", &self.len())
            .finish()
    }
}

impl ViewportIntersections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.targets.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Measures every target against `viewport`; returns how many callbacks fired.
    pub fn check(&self, viewport: Rect, now: Instant) -> usize {
        let crossed: Vec<(Rc<dyn Fn(IntersectionEntry)>, f32)> = {
            let mut targets = self.targets.borrow_mut();
            targets
                .values_mut()
                .filter_map(|t| {
                    let fraction = t.bounds.visible_fraction(&viewport);
                    let inside = meets_threshold(fraction, t.threshold);
                    let entered = inside && !t.inside;
                    t.inside = inside;
                    entered.then(|| (t.on_cross.clone(), fraction))
                })
                .collect()
        };
        for (cb, fraction) in &crossed {
            cb(IntersectionEntry {
                fraction: *fraction,
                time: now,
            });
        }
        crossed.len()
    }
}

impl IntersectionObserver for ViewportIntersections {
    fn observe(
        &self,
        bounds: Rect,
        threshold: f32,
        on_cross: Box<dyn Fn(IntersectionEntry)>,
    ) -> Dispose {
        let key = self.targets.borrow_mut().insert(Target {
            bounds,
            threshold,
            inside: false,
            on_cross: Rc::from(on_cross),
        });
        let weak = Rc::downgrade(&self.targets);
        Dispose::new(move || {
            if let Some(targets) = weak.upgrade() {
                targets.borrow_mut().remove(key);
            }
        })
    }
}
