//! The periodic tick handler (component 4.12).
//!
//! Invoked once per tick interrupt. There is no separate trap/epilogue
//! boundary in this crate (design note on inline assembly, component 9): a
//! tick that needs to change who is active performs its own reschedule and
//! context swap inline, rather than returning a hint for the interrupt
//! return path to act on.

use crate::kernel::Kernel;
use crate::sched::{Hint, Scheduler};
use crate::task::TaskState;

impl<
        S: Scheduler,
        const NTASKS: usize,
        const NPOOLS: usize,
        const NMAILBOXES: usize,
        const NQUEUES: usize,
        const NPIPES: usize,
        const NSEMAPHORES: usize,
        const NEVENTGROUPS: usize,
        const NTIMERS: usize,
    > Kernel<S, NTASKS, NPOOLS, NMAILBOXES, NQUEUES, NPIPES, NSEMAPHORES, NEVENTGROUPS, NTIMERS>
{
    /// Runs one tick (component 4.12): advances every timer, the wall
    /// clock, every sleeping task's countdown, and — under time-slice
    /// scheduling only — the time-slice countdown. Performs a reschedule at
    /// the end if the time slice expired, or if the active policy preempts
    /// on wake and a sleeping task just became ready. Runs under the
    /// `ManagedIsr` execution context throughout, matching this crate's
    /// choice to fold the ISR epilogue into the handler body (design note
    /// on inline assembly, component 9) rather than defer the reschedule.
    pub fn tick(&mut self) {
        let _isr = crate::arch::ManagedIsrGuard::enter();

        for (index, timer) in self.timers_mut().iter_mut().enumerate() {
            if timer.tick(index) {
                crate::arch::klog::trace!("timer {} expired", index);
            }
        }

        self.clock_mut().advance();

        let mut lowest_woken = None;
        for (index, task) in self.tasks_mut().iter_mut().enumerate() {
            if task.sleep_ticks > 0 {
                task.sleep_ticks -= 1;
                if task.sleep_ticks == 0 && task.state == TaskState::Sleeping {
                    task.state = TaskState::Ready;
                    lowest_woken = Some(lowest_woken.map_or(index, |w: usize| w.min(index)));
                }
            }
        }

        let force = self.tick_time_slice();

        if force {
            self.force_reschedule(Hint::None);
        } else if let Some(woken) = lowest_woken {
            if S::PREEMPTS_ON_WAKE {
                self.force_reschedule(Hint::Woke(woken));
            }
        }
    }

    /// Decrements the time-slice countdown (no-op for any scheduler but
    /// `TimeSlice`, since `S::HAS_TIME_SLICE` is false there) and reports
    /// whether it just reached zero.
    fn tick_time_slice(&mut self) -> bool {
        if !S::HAS_TIME_SLICE {
            return false;
        }
        let (remaining, reload) = self.slice_state();
        if *remaining > 0 {
            *remaining -= 1;
        }
        if *remaining == 0 {
            *remaining = reload;
            true
        } else {
            false
        }
    }
}
