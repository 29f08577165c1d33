/*
 * The monotonic millisecond clock the control logic runs on. The firmware
 * reads the embassy time driver, the tests and the simulation step a
 * `ManualClock` by hand.
 *
 * Wraparound is not handled: a `u64` of milliseconds does not overflow in
 * the lifetime of the device.
 */

use core::cell::Cell;

pub trait Clock {
    /// Milliseconds since boot. Never decreases.
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub const fn new(start_ms: u64) -> Self {
        ManualClock {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: u64) {
        // a monotonic clock does not run backwards
        if now_ms > self.now.get() {
            self.now.set(now_ms);
        }
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
