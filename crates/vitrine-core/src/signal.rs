use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{SlotMap, new_key_type};

use crate::Dispose;

new_key_type! {
    pub struct SubscriberKey;
}

type Subscriber<T> = Rc<dyn Fn(&T)>;

/// Observable value shared by cloning the handle.
///
/// Writers notify every subscriber synchronously. Notification walks a
/// snapshot of the subscriber keys taken before the first call, so a
/// subscriber added mid-notification does not see the in-flight value, and
/// one removed mid-notification is never called again.
pub struct Signal<T: 'static>(Rc<RefCell<Inner<T>>>);

struct Inner<T> {
    value: T,
    subs: SlotMap<SubscriberKey, Subscriber<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("Signal")
            .field("value", &inner.value)
            .field("subscribers", &inner.subs.len())
            .finish()
    }
}

impl<T: Clone> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            value,
            subs: SlotMap::with_key(),
        })))
    }

    pub fn get(&self) -> T {
        self.0.borrow().value.clone()
    }

    pub fn set(&self, v: T) {
        self.0.borrow_mut().value = v;
        self.notify();
    }

    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        f(&mut self.0.borrow_mut().value);
        self.notify();
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        let key = self.0.borrow_mut().subs.insert(Rc::new(f));
        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.0);
        Subscription {
            key,
            detach: Rc::new(move |key| {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().subs.remove(key);
                }
            }),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.borrow().subs.len()
    }

    fn notify(&self) {
        let (value, keys) = {
            let inner = self.0.borrow();
            let keys: Vec<SubscriberKey> = inner.subs.keys().collect();
            (inner.value.clone(), keys)
        };
        for key in keys {
            // Re-check on every step: an earlier callback may have detached this one.
            let sub = self.0.borrow().subs.get(key).cloned();
            if let Some(sub) = sub {
                sub(&value);
            }
        }
    }
}

pub fn signal<T: Clone>(t: T) -> Signal<T> {
    Signal::new(t)
}

/// Detach handle returned by [`Signal::subscribe`].
///
/// Dropping it does *not* detach; owners must call [`Subscription::unsubscribe`]
/// or hand it to a `Scope` through [`Subscription::into_dispose`].
#[derive(Clone)]
pub struct Subscription {
    key: SubscriberKey,
    detach: Rc<dyn Fn(SubscriberKey)>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Subscription").field(&self.key).finish()
    }
}

impl Subscription {
    /// Safe to call more than once.
    pub fn unsubscribe(&self) {
        (self.detach)(self.key);
    }

    pub fn into_dispose(self) -> Dispose {
        Dispose::new(move || self.unsubscribe())
    }
}
