//! # Viewport
//!
//! The scrolled window onto the page. Its offset and size are signals every
//! section subscribes to independently; nothing else owns scroll state.
//!
//! Anchor navigation pans the offset with an eased animation that the host
//! loop advances through [`Viewport::tick`]. A user scroll interrupts it.

use std::cell::{Cell, RefCell};

use vitrine_core::{AnimatedValue, AnimationSpec, Easing, Instant, Rect, Signal, Size, Subscription};

pub struct Viewport {
    scroll: Signal<f32>,
    size: Signal<Size>,
    content_height: Cell<f32>,
    pan: RefCell<Option<AnimatedValue<f32>>>,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("scroll_y", &self.scroll_y())
            .field("size", &self.size())
            .field("content_height", &self.content_height.get())
            .field("panning", &self.is_panning())
            .finish()
    }
}

impl Viewport {
    pub fn new(size: Size, content_height: f32) -> Self {
        Self {
            scroll: Signal::new(0.0),
            size: Signal::new(size),
            content_height: Cell::new(content_height),
            pan: RefCell::new(None),
        }
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll.get()
    }

    pub fn size(&self) -> Size {
        self.size.get()
    }

    /// Visible part of the document.
    pub fn rect(&self) -> Rect {
        let size = self.size();
        Rect::new(0.0, self.scroll_y(), size.width, size.height)
    }

    pub fn max_scroll(&self) -> f32 {
        (self.content_height.get() - self.size().height).max(0.0)
    }

    /// Sets the offset (clamped to the scrollable range). Subscribers hear
    /// about it only when the offset actually moved. Non-finite offsets are
    /// ignored.
    pub fn set_scroll(&self, y: f32) -> bool {
        if !y.is_finite() {
            log::debug!("viewport: ignoring scroll offset {y}");
            return false;
        }
        let y = y.clamp(0.0, self.max_scroll());
        if y == self.scroll_y() {
            return false;
        }
        self.scroll.set(y);
        true
    }

    /// User-initiated scroll: cancels any anchor pan in flight.
    pub fn user_scroll(&self, y: f32) -> bool {
        if !y.is_finite() {
            return false;
        }
        self.pan.borrow_mut().take();
        self.set_scroll(y)
    }

    pub fn resize(&self, size: Size, content_height: f32) {
        self.content_height.set(content_height.max(0.0));
        self.size.set(size);
        let clamped = self.scroll_y().min(self.max_scroll());
        self.set_scroll(clamped);
    }

    pub fn on_scroll(&self, f: impl Fn(f32) + 'static) -> Subscription {
        self.scroll.subscribe(move |y| f(*y))
    }

    /// Starts an eased pan to `target`.
    pub fn pan_to(&self, target: f32, duration: std::time::Duration, now: Instant) {
        let target = target.clamp(0.0, self.max_scroll());
        let mut anim = AnimatedValue::new(
            self.scroll_y(),
            AnimationSpec::tween(duration, Easing::EaseInOut),
        );
        anim.set_target(target, now);
        *self.pan.borrow_mut() = Some(anim);
    }

    pub fn is_panning(&self) -> bool {
        self.pan.borrow().is_some()
    }

    /// Advances an anchor pan. Returns `true` if the offset moved.
    pub fn tick(&self, now: Instant) -> bool {
        let step = {
            let mut pan = self.pan.borrow_mut();
            let Some(anim) = pan.as_mut() else {
                return false;
            };
            let running = anim.update(now);
            let y = *anim.get();
            if !running {
                *pan = None;
            }
            y
        };
        self.set_scroll(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn scroll_is_clamped_to_content() {
        let v = Viewport::new(Size::new(1200.0, 800.0), 3000.0);
        assert!(v.set_scroll(5000.0));
        assert_eq!(v.scroll_y(), 2200.0);
        assert!(!v.set_scroll(2200.0));
        v.resize(Size::new(1200.0, 1000.0), 2500.0);
        assert_eq!(v.scroll_y(), 1500.0);
    }

    #[test]
    fn non_finite_offsets_are_ignored() {
        let v = Viewport::new(Size::new(1200.0, 800.0), 3000.0);
        v.set_scroll(400.0);
        assert!(!v.set_scroll(f32::NAN));
        assert!(!v.user_scroll(f32::INFINITY));
        assert_eq!(v.scroll_y(), 400.0);
        assert_eq!(v.rect().y, 400.0);
    }

    #[test]
    fn pan_reaches_target_and_user_scroll_interrupts() {
        let t0 = Instant::now();
        let v = Viewport::new(Size::new(1200.0, 800.0), 5000.0);
        v.pan_to(1000.0, Duration::from_millis(600), t0);
        assert!(v.tick(t0 + Duration::from_millis(300)));
        let mid = v.scroll_y();
        assert!(mid > 0.0 && mid < 1000.0);
        v.tick(t0 + Duration::from_millis(600));
        assert_eq!(v.scroll_y(), 1000.0);
        assert!(!v.is_panning());

        v.pan_to(3000.0, Duration::from_millis(600), t0);
        v.user_scroll(200.0);
        assert!(!v.tick(t0 + Duration::from_millis(300)));
        assert_eq!(v.scroll_y(), 200.0);
    }
}
