use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::Dispose;

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Weak<ScopeInner>>> = const { RefCell::new(None) };
}

/// Lifetime of a mounted component.
///
/// Everything a component starts (subscriptions, timers, observations) hands
/// its cleanup to the scope; [`Scope::dispose`] tears it all down, children
/// first. Dropping the last handle does the same.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    alive: Cell<bool>,
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Scope>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("alive", &self.inner.alive.get())
            .field("disposers", &self.inner.disposers.borrow().len())
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                alive: Cell::new(true),
                disposers: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Runs `f` with this scope as the current one (see [`crate::effect`]).
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        struct Restore(Option<Weak<ScopeInner>>);
        impl Drop for Restore {
            fn drop(&mut self) {
                let prev = self.0.take();
                CURRENT_SCOPE.with(|current| *current.borrow_mut() = prev);
            }
        }
        let prev = CURRENT_SCOPE.with(|current| {
            current
                .borrow_mut()
                .replace(Rc::downgrade(&self.inner))
        });
        let _restore = Restore(prev);
        f()
    }

    /// Registers cleanup. On an already disposed scope it runs immediately.
    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        if self.inner.alive.get() {
            self.inner.disposers.borrow_mut().push(Box::new(disposer));
        } else {
            disposer();
        }
    }

    pub fn own(&self, d: Dispose) {
        self.add_disposer(move || d.run());
    }

    pub fn child(&self) -> Scope {
        let child = Scope::new();
        if self.inner.alive.get() {
            self.inner.children.borrow_mut().push(child.clone());
        } else {
            child.dispose();
        }
        child
    }

    pub fn is_alive(&self) -> bool {
        self.inner.alive.get()
    }

    /// Cheap liveness probe for deferred callbacks that must not fire
    /// against a torn-down component.
    pub fn liveness(&self) -> Liveness {
        Liveness(Rc::downgrade(&self.inner))
    }

    pub fn dispose(&self) {
        self.inner.teardown();
    }
}

impl ScopeInner {
    fn teardown(&self) {
        if !self.alive.replace(false) {
            return;
        }
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.dispose();
        }
        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[derive(Clone, Debug)]
pub struct Liveness(Weak<ScopeInner>);

impl Liveness {
    pub fn is_alive(&self) -> bool {
        self.0.upgrade().is_some_and(|s| s.alive.get())
    }
}

pub fn current_scope() -> Option<Scope> {
    CURRENT_SCOPE.with(|current| {
        current
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade().map(|inner| Scope { inner }))
    })
}
