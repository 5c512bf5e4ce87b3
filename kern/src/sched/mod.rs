//! The four interchangeable scheduling policies (component 4.11).
//!
//! Three of the four — [`round_robin`], [`time_slice`], [`priority`] — share
//! the [`Scheduler`] trait and are selected as a type parameter on
//! [`crate::kernel::Kernel`], so the compiler links in exactly one
//! `reschedule` implementation per build. The fourth, [`rtc`]
//! (run-to-completion), has no stacks, no saved context, and no concept of
//! "the next task" beyond "the next one in the round" — it is different
//! enough in kind that it is not shaped to fit this trait, and is instead a
//! standalone execution loop invoked directly by application startup code.

pub mod priority;
pub mod round_robin;
pub mod rtc;
pub mod time_slice;

pub use priority::Priority;
pub use round_robin::RoundRobin;
pub use rtc::Rtc;
pub use time_slice::TimeSlice;

use crate::task::Task;

/// A hint passed into [`Scheduler::reschedule`] describing why a reschedule
/// is being requested, so schedulers that care (today, only
/// [`priority::Priority`]) can make a cheaper decision than a full scan.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Hint {
    /// No specific task is known to be newly eligible; perform a full scan.
    None,
    /// This task just transitioned to `Ready`. Schedulers that preempt on
    /// wake use this to decide whether to switch without scanning.
    Woke(usize),
}

/// Shared interface of the three schedulers that use real stacks and
/// context switches.
pub trait Scheduler {
    /// Whether `Kernel::relinquish` is a supported operation under this
    /// policy. [`priority::Priority`] does not provide it (component 4.11).
    const HAS_RELINQUISH: bool = true;

    /// Whether a blocking-capable service call may honor `Suspend::Yes`.
    /// False only for [`rtc::Rtc`], where blocking is forbidden at build
    /// time (component 4.11) and every such call instead returns
    /// `Error::InvalidSuspend` the moment it is asked to block.
    const BLOCKING_ALLOWED: bool = true;

    /// Whether `Kernel::task_relinquish` is a no-op rather than a real
    /// reschedule. True only for [`rtc::Rtc`], where a task that runs to
    /// completion is never going to yield mid-flight.
    const RELINQUISH_IS_NOOP: bool = false;

    /// Whether a service call's wake of a blocked task should immediately
    /// reconsider who is active, rather than just marking the woken task
    /// `Ready` and leaving the currently active task running. True only for
    /// [`priority::Priority`] (component 4.11): round-robin and time-slice
    /// only reschedule on relinquish, block, or tick.
    const PREEMPTS_ON_WAKE: bool = false;

    /// Whether this policy has a tick-driven countdown that forces a
    /// reschedule at zero. True only for [`time_slice::TimeSlice`]; the
    /// countdown storage lives on `Kernel` itself since it isn't
    /// per-task state.
    const HAS_TIME_SLICE: bool = false;

    /// Picks the task that runs first at boot: the lowest-indexed ready
    /// task. Panics if none is ready, since that is a configuration error
    /// no running kernel can recover from.
    fn select_initial(tasks: &[Task]) -> usize {
        tasks
            .iter()
            .position(|t| t.state.is_ready())
            .expect("no ready task at boot")
    }

    /// Chooses which task should be active given that `active` just
    /// relinquished, blocked, or that `hint` reports a relevant wake.
    /// Returns the chosen task's index, which may be `active` unchanged.
    fn reschedule(active: usize, tasks: &[Task], hint: Hint) -> usize;
}

/// Scans `tasks` cyclically starting just after `start`, for the first
/// index satisfying `pred`, wrapping around through and including `start`
/// itself. Shared by [`round_robin`] and [`time_slice`], which pick the
/// next ready task by strictly increasing index modulo the table length.
pub(crate) fn scan_from(start: usize, tasks: &[Task], pred: impl Fn(&Task) -> bool) -> usize {
    let n = tasks.len();
    for offset in 1..=n {
        let i = (start + offset) % n;
        if pred(&tasks[i]) {
            return i;
        }
    }
    panic!("no ready task");
}
