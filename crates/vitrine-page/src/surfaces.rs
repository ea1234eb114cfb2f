//! Theme-dependent surfaces of the page chrome.
//!
//! Each surface keeps the theme it last observed from the [`ThemeStore`]
//! subscription it owns; the subscription is handed to the mounting scope so
//! it is detached when the page unmounts.

use std::cell::Cell;
use std::rc::Rc;

use vitrine_core::{Brush, Color, LinearGradient, Scope, Theme, ThemeStore};

use crate::dirty::{Dirty, DirtyCell};

/// Colors of the page chrome for one theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub background: Brush,
    pub nav_surface: Color,
    pub nav_text: Color,
    pub accent: Color,
    pub toggle_surface: Color,
    pub toggle_icon: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: LinearGradient::diagonal(
                    Color::from_hex("#EFF6FF"),
                    Color::from_hex("#F1F5F9"),
                ),
                nav_surface: Color::WHITE.with_opacity(0.9),
                nav_text: Color::from_hex("#334155"),
                accent: Color::from_hex("#2563EB"),
                toggle_surface: Color::WHITE,
                toggle_icon: Color::from_hex("#1E293B"),
            },
            Theme::Dark => Self {
                background: LinearGradient::diagonal(
                    Color::from_hex("#0F172A"),
                    Color::from_hex("#172554"),
                ),
                nav_surface: Color::from_hex("#0F172A").with_opacity(0.9),
                nav_text: Color::from_hex("#E2E8F0"),
                accent: Color::from_hex("#60A5FA"),
                toggle_surface: Color::from_hex("#1E293B"),
                toggle_icon: Color::from_hex("#FACC15"),
            },
        }
    }
}

fn follow_theme(store: &ThemeStore, scope: &Scope, dirty: &DirtyCell) -> Rc<Cell<Theme>> {
    let observed = Rc::new(Cell::new(store.get()));
    let sub = store.subscribe({
        let observed = observed.clone();
        let dirty = dirty.clone();
        move |t| {
            observed.set(t);
            dirty.mark(Dirty::THEME);
        }
    });
    scope.own(sub.into_dispose());
    observed
}

/// Fixed top navigation bar.
#[derive(Debug)]
pub struct NavBar {
    theme: Rc<Cell<Theme>>,
    scrolled: Cell<bool>,
    menu_open: Cell<bool>,
    threshold: f32,
}

impl NavBar {
    pub(crate) fn mount(
        store: &ThemeStore,
        scope: &Scope,
        dirty: &DirtyCell,
        threshold: f32,
        scroll_y: f32,
    ) -> Self {
        Self {
            theme: follow_theme(store, scope, dirty),
            scrolled: Cell::new(scroll_y > threshold),
            menu_open: Cell::new(false),
            threshold,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled.get()
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open.get()
    }

    /// Transparent over the hero, solid once the page has scrolled.
    pub fn surface(&self) -> Color {
        if self.is_scrolled() {
            Palette::for_theme(self.theme()).nav_surface
        } else {
            Color::TRANSPARENT
        }
    }

    /// Returns `true` when the scrolled state flipped.
    pub(crate) fn on_scroll(&self, scroll_y: f32) -> bool {
        let scrolled = scroll_y > self.threshold;
        self.scrolled.replace(scrolled) != scrolled
    }

    pub(crate) fn set_menu_open(&self, open: bool) -> bool {
        self.menu_open.replace(open) != open
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleIcon {
    /// Offered while light: switch to dark.
    Moon,
    /// Offered while dark: switch to light.
    Sun,
}

/// Floating theme toggle button.
#[derive(Debug)]
pub struct ThemeToggle {
    theme: Rc<Cell<Theme>>,
}

impl ThemeToggle {
    pub(crate) fn mount(store: &ThemeStore, scope: &Scope, dirty: &DirtyCell) -> Self {
        Self {
            theme: follow_theme(store, scope, dirty),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn icon(&self) -> ToggleIcon {
        match self.theme() {
            Theme::Light => ToggleIcon::Moon,
            Theme::Dark => ToggleIcon::Sun,
        }
    }

    pub fn icon_color(&self) -> Color {
        Palette::for_theme(self.theme()).toggle_icon
    }
}

/// Full-page background gradient.
#[derive(Debug)]
pub struct Backdrop {
    theme: Rc<Cell<Theme>>,
}

impl Backdrop {
    pub(crate) fn mount(store: &ThemeStore, scope: &Scope, dirty: &DirtyCell) -> Self {
        Self {
            theme: follow_theme(store, scope, dirty),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn brush(&self) -> Brush {
        Palette::for_theme(self.theme()).background
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::MemoryStorage;

    #[test]
    fn surfaces_follow_store_until_unmounted() {
        let store = ThemeStore::new(MemoryStorage::default());
        let scope = Scope::new();
        let dirty = DirtyCell::default();
        let toggle = ThemeToggle::mount(&store, &scope, &dirty);
        let backdrop = Backdrop::mount(&store, &scope, &dirty);
        assert_eq!(toggle.icon(), ToggleIcon::Moon);

        store.toggle();
        assert_eq!(toggle.icon(), ToggleIcon::Sun);
        assert_eq!(backdrop.brush(), Palette::for_theme(Theme::Dark).background);
        assert_eq!(dirty.take(), Dirty::THEME);

        scope.dispose();
        assert_eq!(store.subscriber_count(), 0);
        store.toggle();
        assert_eq!(toggle.theme(), Theme::Dark);
        assert!(dirty.take().is_empty());
    }

    #[test]
    fn nav_surface_tracks_scroll_threshold() {
        let store = ThemeStore::new(MemoryStorage::default());
        let scope = Scope::new();
        let nav = NavBar::mount(&store, &scope, &DirtyCell::default(), 10.0, 0.0);
        assert_eq!(nav.surface(), Color::TRANSPARENT);
        assert!(!nav.on_scroll(10.0));
        assert!(nav.on_scroll(11.0));
        assert_eq!(nav.surface(), Palette::for_theme(Theme::Light).nav_surface);
        assert!(!nav.on_scroll(400.0));
    }
}
