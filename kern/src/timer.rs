//! Application timers (component 4.10). Each runs a tick-driven countdown
//! and optionally invokes a callback on expiration.

use abi::{Error, KernResult, TimerEnable};

pub struct Timer {
    enabled: bool,
    value: u32,
    initial: u32,
    reschedule: u32,
    expirations: u32,
    callback: Option<(fn(usize), usize)>,
}

impl Timer {
    pub const fn new(initial: u32, reschedule: u32, callback: Option<(fn(usize), usize)>) -> Self {
        Timer {
            enabled: false,
            value: 0,
            initial,
            reschedule,
            expirations: 0,
            callback,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn remaining(&self) -> u32 {
        self.value
    }

    pub fn expirations(&self) -> u32 {
        self.expirations
    }

    /// `timer_control`: on enable, loads `value` from `initial` if no prior
    /// expiration has occurred, else from `reschedule`; on disable, marks
    /// the timer inactive.
    pub fn control(&mut self, enable: TimerEnable) {
        match enable {
            TimerEnable::Enable => {
                let load = if self.expirations == 0 {
                    self.initial
                } else {
                    self.reschedule
                };
                // Guards "value == 0 iff not running": a configured period
                // of zero still arms, expiring on the very next tick rather
                // than leaving an enabled timer at value == 0.
                self.value = load.max(1);
                self.enabled = true;
            }
            TimerEnable::Disable => {
                self.enabled = false;
            }
        }
    }

    /// `timer_reset`: requires the timer be currently disabled, restores
    /// `value` to `initial` and `expirations` to zero, then applies
    /// `enable`.
    pub fn reset(&mut self, enable: TimerEnable) -> KernResult<()> {
        if self.enabled {
            return Err(Error::NotDisabled);
        }
        self.expirations = 0;
        self.value = self.initial;
        self.control(enable);
        Ok(())
    }

    /// Advances this timer by one tick. If it expires, increments the
    /// expiration count, invokes the callback if configured, and either
    /// reloads `value` from `reschedule` (if nonzero) or disables the
    /// timer. Returns `true` iff this tick caused an expiration.
    pub fn tick(&mut self, index: usize) -> bool {
        if !self.enabled {
            return false;
        }
        self.value -= 1;
        if self.value != 0 {
            return false;
        }
        self.expirations += 1;
        if let Some((callback, parameter)) = self.callback {
            callback(parameter);
        }
        let _ = index;
        if self.reschedule != 0 {
            self.value = self.reschedule;
        } else {
            self.enabled = false;
        }
        true
    }
}
