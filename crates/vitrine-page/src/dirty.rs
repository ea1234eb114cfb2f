use std::cell::Cell;
use std::rc::Rc;

use bitflags::bitflags;

bitflags! {
    /// What a page event changed, so the host only repaints what it must.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Dirty: u16 {
        /// Splash dismissed, page mounted.
        const MOUNT  = 1 << 0;
        /// Theme-dependent surfaces (nav, toggle icon, background).
        const THEME  = 1 << 1;
        /// Viewport offset moved.
        const SCROLL = 1 << 2;
        /// Nav bar surface or mobile menu.
        const NAV    = 1 << 3;
        /// Scroll-linked motion parameters of some section.
        const MOTION = 1 << 4;
        /// An element started its entrance.
        const REVEAL = 1 << 5;
        /// Contact form status or fields.
        const FORM   = 1 << 6;
        /// Viewport size or section geometry.
        const LAYOUT = 1 << 7;
    }
}

/// Accumulator shared by the callbacks of one page.
#[derive(Clone, Debug, Default)]
pub(crate) struct DirtyCell(Rc<Cell<Dirty>>);

impl DirtyCell {
    pub(crate) fn mark(&self, flags: Dirty) {
        self.0.set(self.0.get() | flags);
    }

    pub(crate) fn take(&self) -> Dirty {
        self.0.replace(Dirty::empty())
    }
}
