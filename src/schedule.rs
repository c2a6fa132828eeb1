use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Trailing-edge debounce: each request pushes the deadline out, and one
/// redraw fires once requests stop for `delay`.
#[derive(Debug, Clone)]
pub struct RedrawScheduler {
    delay: Duration,
    state: Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Idle,
    At(Instant),
    /// The delay does not fit in an `Instant`; only an explicit draw clears it.
    Unbounded,
}

impl Default for RedrawScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl RedrawScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: Pending::Idle,
        }
    }

    pub fn request(&mut self, now: Instant) {
        self.state = match now.checked_add(self.delay) {
            Some(due) => Pending::At(due),
            None => Pending::Unbounded,
        };
    }

    pub fn is_pending(&self) -> bool {
        self.state != Pending::Idle
    }

    /// When the pending redraw fires; `None` when idle or unbounded.
    pub fn due_at(&self) -> Option<Instant> {
        match self.state {
            Pending::At(due) => Some(due),
            Pending::Idle | Pending::Unbounded => None,
        }
    }

    /// Consumes the pending redraw if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.state {
            Pending::At(due) if now >= due => {
                self.state = Pending::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.state = Pending::Idle;
    }
}
