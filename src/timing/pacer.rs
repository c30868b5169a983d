use std::cell::{Cell, RefCell};
use std::thread;
use std::time::{Duration, Instant};

/// Source of time and of settle pauses between a write and the next read.
///
/// The engine is single-threaded; every pause goes through here so hosts can
/// run it against a real clock or a virtual one.
pub trait Pacer {
    /// Milliseconds on this pacer's clock.
    fn now_ms(&self) -> u64;

    /// Pause so the page's own reactive logic can settle.
    fn settle(&self, duration: Duration);
}

/// Wall-clock pacer that really sleeps.
pub struct SystemPacer {
    started: Instant,
}

impl SystemPacer {
    pub fn new() -> Self {
        SystemPacer {
            started: Instant::now(),
        }
    }
}

impl Default for SystemPacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pacer for SystemPacer {
    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn settle(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Virtual clock: pauses advance time instantly and are recorded.
#[derive(Debug, Default)]
pub struct VirtualPacer {
    now: Cell<u64>,
    pauses: RefCell<Vec<u64>>,
}

impl VirtualPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward without recording a pause.
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    /// Every pause taken so far, in milliseconds.
    pub fn pauses(&self) -> Vec<u64> {
        self.pauses.borrow().clone()
    }

    pub fn total_paused_ms(&self) -> u64 {
        self.pauses.borrow().iter().sum()
    }
}

impl Pacer for VirtualPacer {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn settle(&self, duration: Duration) {
        let ms = duration.as_millis() as u64;
        self.pauses.borrow_mut().push(ms);
        self.advance(ms);
    }
}
