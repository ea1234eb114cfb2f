use std::cell::RefCell;
use std::rc::Rc;

/// Cleanup action that runs at most once.
#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl std::fmt::Debug for Dispose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispose")
            .field("pending", &!self.is_spent())
            .finish()
    }
}

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    pub fn noop() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_spent(&self) -> bool {
        self.0.borrow().is_none()
    }
}

/// Runs `f()` immediately and ties the returned cleanup to the current scope,
/// if one is active.
pub fn effect<F>(f: F) -> Dispose
where
    F: FnOnce() -> Dispose,
{
    let d = f();
    if let Some(scope) = crate::scope::current_scope() {
        scope.own(d.clone());
    }
    d
}

/// Helper to build the cleanup returned from an [`effect`].
pub fn on_unmount(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}
