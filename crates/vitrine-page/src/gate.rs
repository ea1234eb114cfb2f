use std::cell::RefCell;
use std::time::Duration;

use vitrine_core::{Dispose, Signal, Subscription, TimerHandle, Timers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatePhase {
    Splash,
    Ready,
}

/// Fixed-delay splash in front of the first render.
///
/// Opens exactly once; there is no way back to the splash.
#[derive(Debug)]
pub struct LoadingGate {
    phase: Signal<GatePhase>,
    timer: RefCell<Option<TimerHandle>>,
}

impl LoadingGate {
    pub fn start(timers: &Timers, delay: Duration) -> Self {
        let phase = Signal::new(GatePhase::Splash);
        let timer = timers.schedule(delay, {
            let phase = phase.clone();
            move || {
                log::debug!("loading gate open");
                phase.set(GatePhase::Ready);
            }
        });
        Self {
            phase,
            timer: RefCell::new(Some(timer)),
        }
    }

    pub fn phase(&self) -> GatePhase {
        self.phase.get()
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == GatePhase::Ready
    }

    pub fn on_ready(&self, f: impl Fn() + 'static) -> Subscription {
        self.phase.subscribe(move |p| {
            if *p == GatePhase::Ready {
                f();
            }
        })
    }

    /// Cleanup for the owner's scope: a gate torn down while still showing
    /// the splash never opens.
    pub fn disposer(&self) -> Dispose {
        match self.timer.borrow_mut().take() {
            Some(handle) => handle.into_dispose(),
            None => Dispose::noop(),
        }
    }
}
