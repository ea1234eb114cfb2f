//! Mounted page sections.
//!
//! A section owns at most one [`ScrollProgressTracker`] (driving its
//! [`SectionMotion`] and ornament) and a set of entrance reveals. Everything
//! it registers (viewport subscriptions, trailing flush timers, intersection
//! observations, stagger timers) is owned by the page scope.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use vitrine_core::{
    Dispose, Instant, InterpolationError, Rect, RevealConfig, RevealController, RevealGroup,
    Scope, ScrollOffsets, ScrollProgressTracker, StaggerSchedule, TimerHandle, Timers,
    ValueInterpolator, Vec2, ViewportIntersections,
};

use crate::config::PageConfig;
use crate::dirty::{Dirty, DirtyCell};
use crate::layout::{FooterLayout, SKILLS_PER_CATEGORY, SectionId, SectionLayout};
use crate::ornament::{MotionParams, Ornament};
use crate::viewport::Viewport;

/// Everything a mounting section registers against.
pub(crate) struct MountContext<'a> {
    pub scope: &'a Scope,
    pub timers: &'a Timers,
    pub viewport: &'a Rc<Viewport>,
    pub intersections: &'a ViewportIntersections,
    pub dirty: &'a DirtyCell,
    pub config: &'a PageConfig,
}

/// Scroll-progress → presentation mapping of one section.
#[derive(Clone, Debug, Default)]
pub struct SectionMotion {
    offset_y: Option<ValueInterpolator>,
    opacity: Option<ValueInterpolator>,
    rotation: Option<ValueInterpolator>,
}

impl SectionMotion {
    pub fn for_section(id: SectionId) -> Result<Self, InterpolationError> {
        let mut m = Self::default();
        match id {
            SectionId::Home => {}
            SectionId::About => {
                m.offset_y = Some(ValueInterpolator::linear((0.0, 1.0), (50.0f32, -50.0))?);
                m.opacity = Some(ValueInterpolator::new(
                    [0.0, 0.3, 0.7, 1.0],
                    [0.0f32, 1.0, 1.0, 0.0],
                )?);
            }
            SectionId::Projects => {
                m.offset_y = Some(ValueInterpolator::linear((0.0, 1.0), (100.0f32, -100.0))?);
            }
            SectionId::Skills => {
                m.rotation = Some(ValueInterpolator::linear((0.0, 1.0), (0.0f32, 360.0))?);
            }
            SectionId::Contact => {
                m.offset_y = Some(ValueInterpolator::linear((0.0, 1.0), (100.0f32, -100.0))?);
                m.rotation = Some(ValueInterpolator::linear((0.0, 1.0), (0.0f32, 45.0))?);
            }
        }
        Ok(m)
    }

    /// No parameter depends on scroll progress.
    pub fn is_static(&self) -> bool {
        self.offset_y.is_none() && self.opacity.is_none() && self.rotation.is_none()
    }

    pub fn sample(&self, progress: f32) -> MotionParams {
        let rest = MotionParams::default();
        MotionParams {
            offset_y: self.offset_y.as_ref().map_or(rest.offset_y, |i| i.map(progress)),
            opacity: self.opacity.as_ref().map_or(rest.opacity, |i| i.map(progress)),
            rotation_deg: self.rotation.as_ref().map_or(rest.rotation_deg, |i| i.map(progress)),
        }
    }
}

/// How the entrances of one block are triggered.
pub(crate) enum RevealPlan {
    /// The container starts as soon as it is mounted; children follow.
    OnMount {
        container: RevealConfig,
        children: RevealConfig,
        stagger: StaggerSchedule,
    },
    /// Every child watches the viewport on its own.
    Independent(Box<dyn Fn(usize) -> RevealConfig>),
    /// The container watches the viewport; children only follow it.
    Gated {
        container: RevealConfig,
        children: RevealConfig,
        stagger: StaggerSchedule,
    },
}

impl RevealPlan {
    pub(crate) fn for_section(id: SectionId, duration: Duration) -> Self {
        let base = RevealConfig::default().with_duration(duration);
        match id {
            SectionId::Home => {
                let container = base.with_delay(Duration::from_millis(300)).with_offset(Vec2::ZERO);
                RevealPlan::OnMount {
                    container,
                    children: base,
                    stagger: StaggerSchedule::new(Duration::from_millis(200))
                        .with_initial_delay(container.spec.total()),
                }
            }
            SectionId::About => RevealPlan::Independent(Box::new(move |i| {
                let dx = if i % 2 == 0 { -50.0 } else { 50.0 };
                base.with_threshold(0.3)
                    .with_delay(Duration::from_millis(200) * i as u32)
                    .with_offset(Vec2::new(dx, 0.0))
            })),
            SectionId::Projects => RevealPlan::Independent(Box::new(move |i| {
                base.with_threshold(0.3)
                    .with_delay(Duration::from_millis(200) * i as u32)
                    .with_offset(Vec2::new(0.0, 50.0))
            })),
            // Bars fill over a fixed second, staggered within their category.
            SectionId::Skills => RevealPlan::Independent(Box::new(|i| {
                RevealConfig::default()
                    .with_duration(Duration::from_secs(1))
                    .with_delay(Duration::from_millis(100) * (i % SKILLS_PER_CATEGORY) as u32)
                    .with_offset(Vec2::ZERO)
            })),
            SectionId::Contact => RevealPlan::Gated {
                container: base,
                children: base,
                stagger: StaggerSchedule::new(Duration::from_millis(100))
                    .with_initial_delay(base.spec.total()),
            },
        }
    }

    pub(crate) fn footer(duration: Duration) -> Self {
        let base = RevealConfig::default().with_duration(duration);
        RevealPlan::Gated {
            container: base,
            children: base.with_offset(Vec2::new(0.0, 10.0)),
            stagger: StaggerSchedule::new(Duration::from_millis(100)),
        }
    }
}

/// Where the reveal targets of a block sit in the document.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RevealGeometry {
    pub heading: Option<Rect>,
    pub container: Rect,
    pub items: Vec<Rect>,
}

impl RevealGeometry {
    pub(crate) fn for_section(layout: &SectionLayout) -> Self {
        match layout.id {
            // The hero container is its own heading.
            SectionId::Home => Self {
                heading: None,
                container: layout.heading,
                items: layout.items.clone(),
            },
            _ => Self {
                heading: Some(layout.heading),
                container: enclosing(&layout.items).unwrap_or(layout.bounds),
                items: layout.items.clone(),
            },
        }
    }

    pub(crate) fn for_footer(footer: &FooterLayout) -> Self {
        Self {
            heading: None,
            container: footer.bounds,
            items: footer.items.clone(),
        }
    }

    fn rect(&self, target: Target) -> Option<Rect> {
        match target {
            Target::Heading => self.heading,
            Target::Container => Some(self.container),
            Target::Item(i) => self.items.get(i).copied(),
        }
    }
}

fn enclosing(rects: &[Rect]) -> Option<Rect> {
    let (first, rest) = rects.split_first()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.right(), first.bottom());
    for r in rest {
        x0 = x0.min(r.x);
        y0 = y0.min(r.y);
        x1 = x1.max(r.right());
        y1 = y1.max(r.bottom());
    }
    Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Heading,
    Container,
    Item(usize),
}

struct Watch {
    controller: Rc<RevealController>,
    target: Target,
    stop: Dispose,
}

/// Entrance reveals of one block (a section or the footer).
pub struct Reveals {
    heading: Option<Rc<RevealController>>,
    container: Option<Rc<RevealController>>,
    items: Vec<Rc<RevealController>>,
    group: Option<Rc<RevealGroup>>,
    watches: Rc<RefCell<Vec<Watch>>>,
    intersections: ViewportIntersections,
}

impl std::fmt::Debug for Reveals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reveals")
            .field("heading", &self.heading)
            .field("container", &self.container)
            .field("items", &self.items.len())
            .field("watching", &self.watches.borrow().len())
            .finish()
    }
}

impl Reveals {
    pub(crate) fn mount(plan: RevealPlan, geometry: &RevealGeometry, ctx: &MountContext<'_>) -> Self {
        let now = ctx.timers.now();
        let heading_config = RevealConfig::default().with_duration(ctx.config.reveal_duration());
        let heading = geometry
            .heading
            .map(|_| Rc::new(RevealController::new(heading_config)));
        let item_count = geometry.items.len();

        let (container, items, group, starts_now) = match plan {
            RevealPlan::OnMount {
                container,
                children,
                stagger,
            } => {
                let (c, items, g) = grouped(container, children, stagger, item_count, ctx.timers);
                (Some(c), items, Some(g), true)
            }
            RevealPlan::Gated {
                container,
                children,
                stagger,
            } => {
                let (c, items, g) = grouped(container, children, stagger, item_count, ctx.timers);
                (Some(c), items, Some(g), false)
            }
            RevealPlan::Independent(config_for) => {
                let items = (0..item_count)
                    .map(|i| Rc::new(RevealController::new(config_for(i))))
                    .collect();
                (None, items, None, false)
            }
        };

        let this = Self {
            heading,
            container,
            items,
            group,
            watches: Rc::default(),
            intersections: ctx.intersections.clone(),
        };

        for c in this.controllers() {
            let dirty = ctx.dirty.clone();
            ctx.scope
                .own(c.on_reveal(move || dirty.mark(Dirty::REVEAL)).into_dispose());
        }
        if let Some(group) = &this.group {
            let group = group.clone();
            ctx.scope.add_disposer(move || group.dispose());
        }
        {
            let watches = this.watches.clone();
            ctx.scope.add_disposer(move || {
                for w in watches.borrow_mut().drain(..) {
                    w.stop.run();
                }
            });
        }

        this.watch_all(geometry, starts_now);
        if starts_now && let Some(c) = &this.container {
            c.reveal(now);
        }
        this
    }

    fn controllers(&self) -> impl Iterator<Item = &Rc<RevealController>> {
        self.heading
            .iter()
            .chain(self.container.iter())
            .chain(self.items.iter())
    }

    /// Binds every still-hidden controller that observes the viewport itself.
    fn watch_all(&self, geometry: &RevealGeometry, container_on_mount: bool) {
        let mut targets: Vec<(Rc<RevealController>, Target)> = Vec::new();
        if let Some(h) = &self.heading {
            targets.push((h.clone(), Target::Heading));
        }
        match (&self.container, &self.group) {
            (Some(c), Some(_)) => {
                if !container_on_mount {
                    targets.push((c.clone(), Target::Container));
                }
            }
            _ => {
                targets.extend(
                    self.items
                        .iter()
                        .enumerate()
                        .map(|(i, c)| (c.clone(), Target::Item(i))),
                );
            }
        }

        let mut watches = self.watches.borrow_mut();
        for (controller, target) in targets {
            if controller.is_visible() {
                continue;
            }
            let Some(rect) = geometry.rect(target) else {
                continue;
            };
            let stop = controller.bind(&self.intersections, rect);
            watches.push(Watch {
                controller,
                target,
                stop,
            });
        }
    }

    /// Re-targets pending observations at the new geometry.
    pub(crate) fn relayout(&self, geometry: &RevealGeometry) {
        let previous: Vec<Watch> = self.watches.borrow_mut().drain(..).collect();
        let mut watches = self.watches.borrow_mut();
        for w in previous {
            w.stop.run();
            if w.controller.is_visible() {
                continue;
            }
            let Some(rect) = geometry.rect(w.target) else {
                continue;
            };
            let stop = w.controller.bind(&self.intersections, rect);
            watches.push(Watch { stop, ..w });
        }
    }

    pub fn heading(&self) -> Option<&Rc<RevealController>> {
        self.heading.as_ref()
    }

    /// Parent of a staggered group, if the block has one.
    pub fn container(&self) -> Option<&Rc<RevealController>> {
        self.container.as_ref()
    }

    pub fn items(&self) -> &[Rc<RevealController>] {
        &self.items
    }

    /// Number of observations still waiting for their element to show.
    pub fn watching(&self) -> usize {
        self.watches
            .borrow()
            .iter()
            .filter(|w| !w.stop.is_spent())
            .count()
    }

    /// Some entrance is still moving at `now`, or is scheduled to.
    pub fn is_easing(&self, now: Instant) -> bool {
        let scheduled = self.group.as_ref().is_some_and(|g| g.pending() > 0);
        scheduled
            || self.controllers().any(|c| {
                c.started_at()
                    .is_some_and(|t| now < t + c.config().spec.total())
            })
    }
}

fn grouped(
    container: RevealConfig,
    children: RevealConfig,
    stagger: StaggerSchedule,
    count: usize,
    timers: &Timers,
) -> (
    Rc<RevealController>,
    Vec<Rc<RevealController>>,
    Rc<RevealGroup>,
) {
    let parent = Rc::new(RevealController::new(container));
    let items: Vec<_> = (0..count)
        .map(|_| Rc::new(RevealController::new(children)))
        .collect();
    let group = RevealGroup::new(parent.clone(), items.iter().cloned(), stagger, timers.clone());
    (parent, items, Rc::new(group))
}

/// One mounted section.
pub struct Section {
    id: SectionId,
    layout: RefCell<SectionLayout>,
    motion: Rc<SectionMotion>,
    params: Rc<Cell<MotionParams>>,
    tracker: Option<Rc<RefCell<ScrollProgressTracker>>>,
    reveals: Reveals,
}

impl std::fmt::Debug for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Section")
            .field("id", &self.id)
            .field("progress", &self.progress())
            .field("params", &self.params.get())
            .field("reveals", &self.reveals)
            .finish()
    }
}

impl Section {
    pub(crate) fn mount(
        layout: SectionLayout,
        motion: SectionMotion,
        ornament: Box<dyn Ornament>,
        ctx: &MountContext<'_>,
    ) -> Self {
        let id = layout.id;
        let motion = Rc::new(motion);
        let ornament = Rc::new(RefCell::new(ornament));
        let params = Rc::new(Cell::new(MotionParams::default()));

        let tracker = if motion.is_static() {
            None
        } else {
            Some(track(&layout, &motion, &ornament, &params, ctx))
        };
        let initial = params.get();
        ornament.borrow_mut().apply(&initial);

        let reveals = Reveals::mount(
            RevealPlan::for_section(id, ctx.config.reveal_duration()),
            &RevealGeometry::for_section(&layout),
            ctx,
        );
        log::debug!("mounted section {id} ({} reveal items)", reveals.items().len());

        Self {
            id,
            layout: RefCell::new(layout),
            motion,
            params,
            tracker,
            reveals,
        }
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        self.layout.borrow().bounds
    }

    pub fn layout(&self) -> SectionLayout {
        self.layout.borrow().clone()
    }

    pub fn motion(&self) -> &SectionMotion {
        &self.motion
    }

    /// Progress through the section's scroll region; 0 for static sections.
    pub fn progress(&self) -> f32 {
        self.tracker
            .as_ref()
            .map_or(0.0, |t| t.borrow().current_progress())
    }

    pub fn motion_params(&self) -> MotionParams {
        self.params.get()
    }

    pub fn reveals(&self) -> &Reveals {
        &self.reveals
    }

    pub(crate) fn relayout(&self, layout: SectionLayout, viewport_height: f32) {
        if let Some(tracker) = &self.tracker {
            tracker.borrow_mut().relayout(layout.bounds, viewport_height);
        }
        self.reveals.relayout(&RevealGeometry::for_section(&layout));
        *self.layout.borrow_mut() = layout;
    }
}

/// Attaches a tracker to the section and keeps it fed from the viewport.
///
/// A throttled scroll leaves one trailing flush scheduled for the moment the
/// throttle window closes, so the final offset of a burst is never lost.
fn track(
    layout: &SectionLayout,
    motion: &Rc<SectionMotion>,
    ornament: &Rc<RefCell<Box<dyn Ornament>>>,
    params: &Rc<Cell<MotionParams>>,
    ctx: &MountContext<'_>,
) -> Rc<RefCell<ScrollProgressTracker>> {
    let tracker = Rc::new(RefCell::new(ScrollProgressTracker::new(
        ScrollOffsets::default(),
        ctx.config.scroll_throttle(),
    )));

    let sub = tracker.borrow().subscribe({
        let motion = motion.clone();
        let ornament = ornament.clone();
        let params = params.clone();
        let dirty = ctx.dirty.clone();
        move |p| {
            let sampled = motion.sample(p);
            params.set(sampled);
            ornament.borrow_mut().apply(&sampled);
            dirty.mark(Dirty::MOTION);
        }
    });
    ctx.scope.own(sub.into_dispose());

    {
        let mut t = tracker.borrow_mut();
        t.attach(layout.bounds, ctx.viewport.size().height);
        t.on_scroll(ctx.viewport.scroll_y(), ctx.timers.now());
    }
    params.set(motion.sample(tracker.borrow().current_progress()));

    let trailing: Rc<RefCell<Option<TimerHandle>>> = Rc::default();
    let sub = ctx.viewport.on_scroll({
        let tracker = tracker.clone();
        let trailing = trailing.clone();
        let timers = ctx.timers.clone();
        move |y| {
            let mut t = tracker.borrow_mut();
            if t.on_scroll(y, timers.now()) {
                return;
            }
            let Some(due) = t.flush_due_at() else {
                return;
            };
            let mut slot = trailing.borrow_mut();
            if slot.as_ref().is_some_and(TimerHandle::is_pending) {
                return;
            }
            let tracker = tracker.clone();
            *slot = Some(timers.schedule_at(due, move || {
                tracker.borrow_mut().flush(due);
            }));
        }
    });
    ctx.scope.own(sub.into_dispose());
    ctx.scope.add_disposer(move || {
        if let Some(handle) = trailing.borrow_mut().take() {
            handle.cancel();
        }
    });

    tracker
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_tables_match_sections() {
        let about = SectionMotion::for_section(SectionId::About).unwrap();
        assert_eq!(about.sample(0.0).offset_y, 50.0);
        assert_eq!(about.sample(1.0).offset_y, -50.0);
        assert_eq!(about.sample(0.5).opacity, 1.0);
        assert_eq!(about.sample(0.0).opacity, 0.0);
        assert!((about.sample(0.15).opacity - 0.5).abs() < 1e-5);

        let skills = SectionMotion::for_section(SectionId::Skills).unwrap();
        assert_eq!(skills.sample(0.5).rotation_deg, 180.0);
        assert_eq!(skills.sample(0.5).offset_y, 0.0);

        let contact = SectionMotion::for_section(SectionId::Contact).unwrap();
        let p = contact.sample(0.5);
        assert_eq!((p.offset_y, p.rotation_deg), (0.0, 22.5));

        let home = SectionMotion::for_section(SectionId::Home).unwrap();
        assert!(home.is_static());
        assert_eq!(home.sample(0.7), MotionParams::default());
    }

    #[test]
    fn enclosing_covers_all_rects() {
        let r = enclosing(&[
            Rect::new(10.0, 10.0, 10.0, 10.0),
            Rect::new(0.0, 30.0, 5.0, 5.0),
        ]);
        assert_eq!(r, Some(Rect::new(0.0, 10.0, 20.0, 25.0)));
        assert_eq!(enclosing(&[]), None);
    }
}
