//! # PageShell
//!
//! The host-facing state of the whole page. A host feeds it events (frame
//! ticks, scroll, resize, clicks) and repaints whatever the returned
//! [`Dirty`] flags name:
//!
//! ```rust
//! use std::rc::Rc;
//! use std::time::Duration;
//! use vitrine_core::{ManualClock, MemoryStorage, Size};
//! use vitrine_page::{Dirty, PageConfig, PageLayout, PageShell};
//!
//! let clock = ManualClock::default();
//! let layout = PageLayout::standard(Size::new(1280.0, 800.0));
//! let mut shell = PageShell::new(
//!     PageConfig::default(),
//!     Rc::new(clock.clone()),
//!     MemoryStorage::default(),
//!     layout,
//! )
//! .unwrap();
//!
//! assert!(shell.is_loading());
//! clock.advance(Duration::from_secs(2));
//! assert!(shell.tick().contains(Dirty::MOUNT));
//! assert!(!shell.is_loading());
//! ```
//!
//! Everything the mounted page registers lives in one scope; [`PageShell::unmount`]
//! (or dropping the shell) cancels it all, including timers that have not
//! fired yet.

use std::collections::HashMap;
use std::rc::Rc;

use vitrine_core::{
    Clock, Instant, InterpolationError, Scope, Theme, ThemeStorage, ThemeStore, Timers,
    ViewportIntersections,
};

use crate::config::PageConfig;
use crate::contact::ContactForm;
use crate::dirty::{Dirty, DirtyCell};
use crate::error::PageError;
use crate::gate::{GatePhase, LoadingGate};
use crate::layout::{PageLayout, SectionId};
use crate::ornament::{NullOrnament, Ornament};
use crate::section::{MountContext, RevealGeometry, RevealPlan, Reveals, Section, SectionMotion};
use crate::surfaces::{Backdrop, NavBar, ThemeToggle};
use crate::viewport::Viewport;

/// The page as it exists once the splash is gone.
#[derive(Debug)]
struct MountedPage {
    nav: Rc<NavBar>,
    toggle: ThemeToggle,
    backdrop: Backdrop,
    sections: Vec<Section>,
    footer: Reveals,
    contact: ContactForm,
}

pub struct PageShell {
    config: PageConfig,
    clock: Rc<dyn Clock>,
    started_at: Instant,
    timers: Timers,
    theme: ThemeStore,
    gate: LoadingGate,
    root: Scope,
    dirty: DirtyCell,
    layout: PageLayout,
    viewport: Rc<Viewport>,
    intersections: ViewportIntersections,
    motions: HashMap<SectionId, SectionMotion>,
    ornaments: HashMap<SectionId, Box<dyn Ornament>>,
    page: Option<MountedPage>,
}

impl std::fmt::Debug for PageShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageShell")
            .field("phase", &self.gate.phase())
            .field("theme", &self.theme.get())
            .field("viewport", &self.viewport)
            .field("mounted", &self.page.is_some())
            .field("alive", &self.root.is_alive())
            .finish()
    }
}

impl PageShell {
    /// Starts the splash. The page itself mounts on the first [`tick`](Self::tick)
    /// after `config.loading_delay_ms`.
    pub fn new(
        config: PageConfig,
        clock: Rc<dyn Clock>,
        storage: impl ThemeStorage + 'static,
        layout: PageLayout,
    ) -> Result<Self, PageError> {
        let motions = SectionId::ALL
            .into_iter()
            .map(|id| Ok((id, SectionMotion::for_section(id)?)))
            .collect::<Result<HashMap<_, _>, InterpolationError>>()?;

        let started_at = clock.now();
        let timers = Timers::new(clock.clone());
        let theme = ThemeStore::with_key(storage, config.theme_key.clone());
        let root = Scope::new();
        let dirty = DirtyCell::default();
        let viewport = Rc::new(Viewport::new(layout.viewport, layout.content_height()));

        let gate = LoadingGate::start(&timers, config.loading_delay());
        root.own(gate.disposer());
        {
            let dirty = dirty.clone();
            root.own(viewport.on_scroll(move |_| dirty.mark(Dirty::SCROLL)).into_dispose());
        }

        log::info!(
            "page shell started: theme={}, splash for {:?}",
            theme.get(),
            config.loading_delay()
        );

        Ok(Self {
            config,
            clock,
            started_at,
            timers,
            theme,
            gate,
            root,
            dirty,
            layout,
            viewport,
            intersections: ViewportIntersections::new(),
            motions,
            ornaments: HashMap::new(),
            page: None,
        })
    }

    /// Decorative surface behind one section. Only takes effect before mount.
    pub fn with_ornament(mut self, id: SectionId, ornament: impl Ornament + 'static) -> Self {
        if self.page.is_some() {
            log::warn!("ornament for {id} ignored: page already mounted");
            return self;
        }
        self.ornaments.insert(id, Box::new(ornament));
        self
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn phase(&self) -> GatePhase {
        self.gate.phase()
    }

    /// Still showing the splash.
    pub fn is_loading(&self) -> bool {
        self.page.is_none()
    }

    pub fn is_alive(&self) -> bool {
        self.root.is_alive()
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn theme_store(&self) -> &ThemeStore {
        &self.theme
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn nav(&self) -> Option<&NavBar> {
        self.page.as_ref().map(|p| &*p.nav)
    }

    pub fn theme_toggle(&self) -> Option<&ThemeToggle> {
        self.page.as_ref().map(|p| &p.toggle)
    }

    pub fn backdrop(&self) -> Option<&Backdrop> {
        self.page.as_ref().map(|p| &p.backdrop)
    }

    pub fn sections(&self) -> &[Section] {
        self.page.as_ref().map_or(&[], |p| p.sections.as_slice())
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections().iter().find(|s| s.id() == id)
    }

    pub fn footer(&self) -> Option<&Reveals> {
        self.page.as_ref().map(|p| &p.footer)
    }

    pub fn contact(&self) -> Option<&ContactForm> {
        self.page.as_ref().map(|p| &p.contact)
    }

    /// Frame step: fires due timers, mounts the page once the splash is
    /// over, advances anchor pans and re-checks reveal targets.
    pub fn tick(&mut self) -> Dirty {
        if !self.is_alive() {
            return Dirty::empty();
        }
        let now = self.now();
        self.timers.run_due();

        if self.page.is_none() && self.gate.is_ready() {
            self.mount(now);
        }

        if let Some(page) = &self.page {
            self.viewport.tick(now);
            self.timers.run_due();
            self.intersections.check(self.viewport.rect(), now);
            if page.footer.is_easing(now)
                || page.sections.iter().any(|s| s.reveals().is_easing(now))
            {
                self.dirty.mark(Dirty::REVEAL);
            }
        }
        self.dirty.take()
    }

    /// User scroll to offset `y` (clamped). Interrupts an anchor pan.
    pub fn scroll_to(&mut self, y: f32) -> Dirty {
        if !self.is_alive() || self.page.is_none() {
            return Dirty::empty();
        }
        self.viewport.user_scroll(y);
        self.intersections.check(self.viewport.rect(), self.now());
        self.dirty.take()
    }

    /// New viewport size together with the layout measured for it.
    pub fn resize(&mut self, layout: PageLayout) -> Dirty {
        if !self.is_alive() {
            return Dirty::empty();
        }
        self.layout = layout;
        if let Some(page) = &self.page {
            let height = self.layout.viewport.height;
            for section in &page.sections {
                if let Some(l) = self.layout.section(section.id()) {
                    section.relayout(l.clone(), height);
                }
            }
            page.footer
                .relayout(&RevealGeometry::for_footer(&self.layout.footer));
        }
        self.viewport
            .resize(self.layout.viewport, self.layout.content_height());
        if self.page.is_some() {
            self.intersections.check(self.viewport.rect(), self.now());
        }
        self.dirty.mark(Dirty::LAYOUT);
        self.dirty.take()
    }

    pub fn toggle_theme(&mut self) -> Dirty {
        if !self.is_alive() {
            return Dirty::empty();
        }
        let theme = self.theme.toggle();
        log::info!("theme toggled to {theme}");
        self.dirty.take()
    }

    /// Smoothly pans to the section behind `anchor` (`"about"` or `"#about"`)
    /// and closes the mobile menu. Unknown anchors do nothing.
    pub fn navigate(&mut self, anchor: &str) -> Dirty {
        if !self.is_alive() || self.page.is_none() {
            return Dirty::empty();
        }
        let Some(target) = SectionId::from_anchor(anchor)
            .and_then(|id| self.layout.anchor_offset(id))
        else {
            log::debug!("navigate: no section for anchor {anchor:?}");
            return Dirty::empty();
        };
        self.viewport
            .pan_to(target, self.config.smooth_scroll(), self.now());
        self.set_menu_open(false);
        self.dirty.take()
    }

    pub fn toggle_menu(&mut self) -> Dirty {
        let open = self.nav().is_some_and(|n| !n.is_menu_open());
        self.set_menu_open(open);
        self.dirty.take()
    }

    pub fn close_menu(&mut self) -> Dirty {
        self.set_menu_open(false);
        self.dirty.take()
    }

    /// Tears the page down. Pending timers, subscriptions and observations
    /// are cancelled; later events are ignored.
    pub fn unmount(&mut self) -> Dirty {
        if !self.is_alive() {
            return Dirty::empty();
        }
        self.root.dispose();
        self.page = None;
        self.dirty.take();
        log::info!("page unmounted");
        Dirty::empty()
    }

    fn set_menu_open(&self, open: bool) {
        if let Some(page) = &self.page
            && page.nav.set_menu_open(open)
        {
            self.dirty.mark(Dirty::NAV);
        }
    }

    fn mount(&mut self, now: Instant) {
        let scope = self.root.child();
        let dirty = &self.dirty;

        let nav = Rc::new(NavBar::mount(
            &self.theme,
            &scope,
            dirty,
            self.config.nav_scrolled_threshold,
            self.viewport.scroll_y(),
        ));
        {
            let nav = nav.clone();
            let dirty = dirty.clone();
            scope.own(
                self.viewport
                    .on_scroll(move |y| {
                        if nav.on_scroll(y) {
                            dirty.mark(Dirty::NAV);
                        }
                    })
                    .into_dispose(),
            );
        }
        let toggle = ThemeToggle::mount(&self.theme, &scope, dirty);
        let backdrop = Backdrop::mount(&self.theme, &scope, dirty);

        let ctx = MountContext {
            scope: &scope,
            timers: &self.timers,
            viewport: &self.viewport,
            intersections: &self.intersections,
            dirty,
            config: &self.config,
        };
        let sections = self
            .layout
            .sections
            .iter()
            .map(|layout| {
                let motion = self.motions.get(&layout.id).cloned().unwrap_or_default();
                let ornament = self
                    .ornaments
                    .remove(&layout.id)
                    .unwrap_or_else(|| Box::new(NullOrnament));
                Section::mount(layout.clone(), motion, ornament, &ctx)
            })
            .collect();
        let footer = Reveals::mount(
            RevealPlan::footer(self.config.reveal_duration()),
            &RevealGeometry::for_footer(&self.layout.footer),
            &ctx,
        );
        let contact = ContactForm::mount(
            &scope,
            &self.timers,
            dirty,
            self.config.submit_delay(),
            self.config.success_reset(),
        );

        self.page = Some(MountedPage {
            nav,
            toggle,
            backdrop,
            sections,
            footer,
            contact,
        });
        self.dirty
            .mark(Dirty::MOUNT | Dirty::THEME | Dirty::NAV | Dirty::LAYOUT);
        log::info!(
            "page mounted after {:?}",
            now.saturating_duration_since(self.started_at)
        );
    }
}

impl Drop for PageShell {
    fn drop(&mut self) {
        self.root.dispose();
    }
}
