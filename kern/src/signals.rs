//! Per-task signal flags (component 4.9).
//!
//! Signals are not an object class with their own table — they live
//! directly on [`crate::task::Task`] — so this module holds the two
//! operations rather than a type. Signals never block, never wake a
//! waiter, and never trigger a reschedule.

use crate::task::Task;

/// ORs `mask` into `target`'s signal flags.
pub fn send(target: &mut Task, mask: u8) {
    target.signals |= mask;
}

/// Atomically reads and clears a task's signal flags.
pub fn receive(active: &mut Task) -> u8 {
    let flags = active.signals;
    active.signals = 0;
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy() {}

    #[test]
    fn send_ors_into_flags() {
        let mut t = Task::new(dummy, None);
        send(&mut t, 0b0001);
        send(&mut t, 0b0100);
        assert_eq!(t.signals, 0b0101);
    }

    #[test]
    fn receive_reads_and_clears() {
        let mut t = Task::new(dummy, None);
        send(&mut t, 0b1111);
        assert_eq!(receive(&mut t), 0b1111);
        assert_eq!(t.signals, 0);
    }
}
