//! # Context locals
//!
//! Thread-local provider frames that hand shared objects down a subtree
//! without threading them through every constructor:
//!
//! ```rust
//! use vitrine_core::*;
//!
//! let store = ThemeStore::new(MemoryStorage::default());
//! provide_theme_store(store.clone(), || {
//!     // anything built here can call `theme_store()`
//!     assert_eq!(current_theme(), Theme::Light);
//! });
//! ```
//!
//! Frames are popped when the closure returns (or unwinds), so nothing leaks
//! into sibling subtrees.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;

use crate::{Theme, ThemeStore};

thread_local! {
    static LOCALS_STACK: RefCell<Vec<HashMap<TypeId, Box<dyn Any>>>> = const { RefCell::new(Vec::new()) };
}

fn with_locals_frame<R>(f: impl FnOnce() -> R) -> R {
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            LOCALS_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }
    LOCALS_STACK.with(|st| st.borrow_mut().push(HashMap::new()));
    let _guard = Guard;
    f()
}

/// Runs `f` with `value` visible to [`local`] lookups of type `T`.
pub fn provide<T: Clone + 'static, R>(value: T, f: impl FnOnce() -> R) -> R {
    with_locals_frame(|| {
        LOCALS_STACK.with(|st| {
            if let Some(top) = st.borrow_mut().last_mut() {
                top.insert(TypeId::of::<T>(), Box::new(value));
            }
        });
        f()
    })
}

/// Innermost provided value of type `T`.
pub fn local<T: Clone + 'static>() -> Option<T> {
    LOCALS_STACK.with(|st| {
        st.borrow()
            .iter()
            .rev()
            .find_map(|frame| frame.get(&TypeId::of::<T>()))
            .and_then(|v| v.downcast_ref::<T>().cloned())
    })
}

pub fn provide_theme_store<R>(store: ThemeStore, f: impl FnOnce() -> R) -> R {
    provide(store, f)
}

pub fn theme_store() -> Option<ThemeStore> {
    local::<ThemeStore>()
}

/// Active theme of the provided store; light when none is provided.
pub fn current_theme() -> Theme {
    theme_store().map(|s| s.get()).unwrap_or_default()
}
