//! Simulated contact form.
//!
//! Submission never leaves the process: after a fixed delay it always
//! succeeds, clears the fields, and shows a confirmation that goes away on
//! its own. Both delays are timers owned by the page scope.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use vitrine_core::{Scope, Signal, Subscription, TimerHandle, Timers};

use crate::dirty::{Dirty, DirtyCell};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Subject => &mut self.subject,
            Field::Message => &mut self.message,
        }
    }
}

#[derive(Debug)]
pub struct ContactForm {
    fields: Rc<RefCell<ContactFields>>,
    status: Signal<SubmitStatus>,
    pending: Rc<RefCell<Option<TimerHandle>>>,
    timers: Timers,
    submit_delay: Duration,
    success_reset: Duration,
    dirty: DirtyCell,
}

impl ContactForm {
    pub(crate) fn mount(
        scope: &Scope,
        timers: &Timers,
        dirty: &DirtyCell,
        submit_delay: Duration,
        success_reset: Duration,
    ) -> Self {
        let pending: Rc<RefCell<Option<TimerHandle>>> = Rc::default();
        scope.add_disposer({
            let pending = pending.clone();
            move || {
                if let Some(handle) = pending.borrow_mut().take()
                    && handle.cancel()
                {
                    log::debug!("contact form unmounted with a pending timer");
                }
            }
        });
        Self {
            fields: Rc::default(),
            status: Signal::new(SubmitStatus::Idle),
            pending,
            timers: timers.clone(),
            submit_delay,
            success_reset,
            dirty: dirty.clone(),
        }
    }

    pub fn status(&self) -> SubmitStatus {
        self.status.get()
    }

    pub fn fields(&self) -> ContactFields {
        self.fields.borrow().clone()
    }

    pub fn set_field(&self, field: Field, value: impl Into<String>) {
        *self.fields.borrow_mut().slot(field) = value.into();
        self.dirty.mark(Dirty::FORM);
    }

    pub fn on_status(&self, f: impl Fn(SubmitStatus) + 'static) -> Subscription {
        self.status.subscribe(move |s| f(*s))
    }

    /// Starts a submission. Returns `false` (and does nothing) while one is
    /// already in flight. Submitting from `Succeeded` drops the pending reset.
    pub fn submit(&self) -> bool {
        if self.status() == SubmitStatus::Submitting {
            log::debug!("contact form: submit ignored while submitting");
            return false;
        }
        if let Some(previous) = self.pending.borrow_mut().take() {
            previous.cancel();
        }
        self.status.set(SubmitStatus::Submitting);
        self.dirty.mark(Dirty::FORM);

        let handle = self.timers.schedule(self.submit_delay, {
            let fields = self.fields.clone();
            let status = self.status.clone();
            let pending = self.pending.clone();
            let dirty = self.dirty.clone();
            let timers = self.timers.clone();
            let reset = self.success_reset;
            move || {
                fields.replace(ContactFields::default());
                status.set(SubmitStatus::Succeeded);
                dirty.mark(Dirty::FORM);
                log::info!("contact form submitted");

                let handle = timers.schedule(reset, move || {
                    status.set(SubmitStatus::Idle);
                    dirty.mark(Dirty::FORM);
                });
                *pending.borrow_mut() = Some(handle);
            }
        });
        *self.pending.borrow_mut() = Some(handle);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::ManualClock;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn form() -> (ManualClock, Timers, Scope, DirtyCell, ContactForm) {
        let clock = ManualClock::default();
        let timers = Timers::new(Rc::new(clock.clone()));
        let scope = Scope::new();
        let dirty = DirtyCell::default();
        let form = ContactForm::mount(&scope, &timers, &dirty, ms(1500), ms(5000));
        (clock, timers, scope, dirty, form)
    }

    #[test]
    fn submit_succeeds_then_resets() {
        let (clock, timers, _scope, dirty, form) = form();
        form.set_field(Field::Name, "Ada");
        form.set_field(Field::Message, "Hello");
        assert_eq!(form.fields().get(Field::Name), "Ada");

        assert!(form.submit());
        assert_eq!(form.status(), SubmitStatus::Submitting);
        assert!(!form.submit());

        clock.advance(ms(1499));
        timers.run_due();
        assert_eq!(form.status(), SubmitStatus::Submitting);
        assert_eq!(form.fields().name, "Ada");

        clock.advance(ms(1));
        timers.run_due();
        assert_eq!(form.status(), SubmitStatus::Succeeded);
        assert_eq!(form.fields(), ContactFields::default());
        assert!(dirty.take().contains(Dirty::FORM));

        clock.advance(ms(5000));
        timers.run_due();
        assert_eq!(form.status(), SubmitStatus::Idle);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn unmount_cancels_pending_submission() {
        let (clock, timers, scope, _dirty, form) = form();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _s = form.on_status({
            let seen = seen.clone();
            move |s| seen.borrow_mut().push(s)
        });
        form.submit();
        scope.dispose();
        clock.advance(ms(10_000));
        assert_eq!(timers.run_due(), 0);
        assert_eq!(form.status(), SubmitStatus::Submitting);
        assert_eq!(*seen.borrow(), vec![SubmitStatus::Submitting]);
    }

    #[test]
    fn resubmit_during_success_restarts() {
        let (clock, timers, _scope, _dirty, form) = form();
        form.submit();
        clock.advance(ms(1500));
        timers.run_due();
        assert!(form.submit());
        clock.advance(ms(5000));
        timers.run_due();
        // the old reset was dropped; the second submission completed instead
        assert_eq!(form.status(), SubmitStatus::Succeeded);
    }
}
