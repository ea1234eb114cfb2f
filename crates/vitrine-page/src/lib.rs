//! # Vitrine page
//!
//! A single-page portfolio (hero, about, projects, skills, contact, footer)
//! as pure presentation state on top of `vitrine-core`. A host owns the
//! window and the renderer; it forwards events to a [`PageShell`] and reads
//! back theme surfaces, per-section motion parameters and reveal visuals.
//!
//! - A [`LoadingGate`] holds a splash for a fixed delay, then the page
//!   mounts exactly once.
//! - Every section with scroll-linked motion owns a throttled
//!   `ScrollProgressTracker` fed from the shared [`Viewport`].
//! - Entrances run through `RevealController`s, either independently per
//!   element or staggered behind a container.
//! - [`NavBar`], [`ThemeToggle`] and [`Backdrop`] follow the `ThemeStore`.

pub mod config;
pub mod contact;
pub mod dirty;
pub mod error;
pub mod gate;
pub mod layout;
pub mod ornament;
pub mod section;
pub mod shell;
pub mod surfaces;
pub mod viewport;

#[cfg(test)]
mod tests;

pub use config::{ConfigError, PageConfig};
pub use contact::{ContactFields, ContactForm, Field, SubmitStatus};
pub use dirty::Dirty;
pub use error::PageError;
pub use gate::{GatePhase, LoadingGate};
pub use layout::{FooterLayout, PageLayout, SectionId, SectionLayout};
pub use ornament::{MotionParams, NullOrnament, Ornament};
pub use section::{Reveals, Section, SectionMotion};
pub use shell::PageShell;
pub use surfaces::{Backdrop, NavBar, Palette, ThemeToggle, ToggleIcon};
pub use viewport::Viewport;
