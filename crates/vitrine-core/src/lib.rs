//! # Presentation state for scroll-driven pages
//!
//! Vitrine's core is the small amount of real state behind a long, animated
//! single-page site. There are four components, built on a handful of
//! single-threaded primitives:
//!
//! - [`ThemeStore`]: light/dark flag, persisted, with subscribers.
//! - [`ScrollProgressTracker`]: per-region progress in [0, 1] from the scroll offset.
//! - [`ValueInterpolator`]: piecewise-linear mapping from progress to motion values.
//! - [`RevealController`] / [`RevealGroup`]: one-shot entrance animations,
//!   optionally staggered under a parent.
//!
//! ## Signals
//!
//! `Signal<T>` is a cloneable handle to a piece of observable state:
//!
//! ```rust
//! use vitrine_core::*;
//!
//! let count = signal(0);
//! let sub = count.subscribe(|v| println!("count = {v}"));
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! sub.unsubscribe();
//! ```
//!
//! ## Scopes and cleanup
//!
//! A component's lifetime is a [`Scope`]. Subscriptions, timers and viewport
//! observations hand their cleanup to it, so unmounting tears everything
//! down and no deferred callback fires against a dead component:
//!
//! ```rust
//! use std::rc::Rc;
//! use std::time::Duration;
//! use vitrine_core::*;
//!
//! let clock = ManualClock::default();
//! let timers = Timers::new(Rc::new(clock.clone()));
//! let scope = Scope::new();
//!
//! scope.own(timers.schedule(Duration::from_secs(2), || unreachable!()).into_dispose());
//! scope.dispose();
//!
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(timers.run_due(), 0);
//! ```
//!
//! ## Time
//!
//! Nothing here reads the wall clock on its own. Components take an
//! `Rc<dyn Clock>` (or an explicit `Instant`); hosts pass a [`SystemClock`]
//! and tests a [`ManualClock`].

pub mod animation;
pub mod color;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod interpolate;
pub mod locals;
pub mod reveal;
pub mod scope;
pub mod scroll;
pub mod signal;
pub mod theme;
pub mod timer;


pub use animation::*;
pub use color::*;
pub use effects::*;
pub use error::*;
pub use geometry::*;
pub use interpolate::*;
pub use locals::*;
pub use reveal::*;
pub use scope::*;
pub use scroll::*;
pub use signal::*;
pub use theme::*;
pub use timer::*;

pub use web_time::Instant;
