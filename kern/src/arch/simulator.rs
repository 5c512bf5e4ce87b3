//! Host-testable stand-in for the bare-metal architecture backend.
//!
//! Selected whenever this crate is not built for `target_os = "none"`,
//! which in practice means every `cargo test` run. There is exactly one
//! "CPU" (the host thread running the test), so critical sections are
//! no-ops and a "context swap" is bookkeeping only — there is no separate
//! stack to switch to. This is sufficient to exercise every scheduling
//! decision and object-table mutation in this crate without real
//! concurrency or real hardware.

use crate::task::Task;

/// On the simulator backend a task never really runs on its own stack, so
/// there is nothing to save beyond a sanity-check marker recording which
/// task last "ran" here, for use in tests that want to assert a swap
/// happened.
#[derive(Debug, Default)]
pub struct SavedState {
    swapped_in: bool,
}

impl SavedState {
    pub fn fresh(_entry: u32, _initial_sp: u32) -> Self {
        SavedState::default()
    }
}

pub(super) fn cs_enter() {}

pub(super) fn cs_exit() {}

/// See [`crate::arch::switch_context`]. On the simulator this only updates
/// the bookkeeping marker in each task's save slot.
pub unsafe fn switch_to(from: &mut Task, to: &mut Task) {
    from.save.swapped_in = false;
    to.save.swapped_in = true;
}

pub fn install_logger() {
    static LOGGER: HostLogger = HostLogger;
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Trace);
}

struct HostLogger;

impl log::Log for HostLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}
