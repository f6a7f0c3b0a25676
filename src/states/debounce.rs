// Coalesces bursts of edits into a single deferred action.
//
// Time is supplied by the caller in seconds (egui's `input.time`). The host
// calls `poll` every frame and asks for a repaint after `remaining`, so a
// quiet UI still wakes up when the window closes.

/// Quiescence window between the last edit and the deferred action.
pub const DEBOUNCE_WINDOW_SECS: f64 = 0.75;

#[derive(Debug)]
struct Pending<A> {
    action: A,
    due: f64,
}

#[derive(Debug)]
pub struct Debouncer<A> {
    window: f64,
    pending: Option<Pending<A>>,
}

impl<A> Default for Debouncer<A> {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW_SECS)
    }
}

impl<A> Debouncer<A> {
    pub fn new(window: f64) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Replace any pending action and restart the window from `now`.
    pub fn schedule(&mut self, action: A, now: f64) {
        self.pending = Some(Pending {
            action,
            due: now + self.window,
        });
    }

    /// Take the pending action once its window has elapsed.
    pub fn poll(&mut self, now: f64) -> Option<A> {
        match &self.pending {
            Some(p) if now >= p.due => self.pending.take().map(|p| p.action),
            _ => None,
        }
    }

    /// Take the pending action immediately, regardless of the deadline.
    pub fn flush(&mut self) -> Option<A> {
        self.pending.take().map(|p| p.action)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Seconds left until the pending action fires, if any.
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.pending.as_ref().map(|p| (p.due - now).max(0.0))
    }
}
