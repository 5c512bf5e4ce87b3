//! Time-slice scheduling: identical task-selection order to round-robin,
//! plus a tick-driven countdown that forces a reschedule when it reaches
//! zero (component 4.11). The countdown itself lives on
//! [`crate::kernel::Kernel`] and is driven from [`crate::tick`]; this
//! module only supplies the task-selection half of the policy.

use crate::task::Task;

use super::{scan_from, Hint, Scheduler};

/// Zero-sized marker selecting the time-slice policy at the type level.
pub struct TimeSlice;

impl Scheduler for TimeSlice {
    const HAS_TIME_SLICE: bool = true;

    fn reschedule(active: usize, tasks: &[Task], _hint: Hint) -> usize {
        scan_from(active, tasks, |t| t.state.is_ready())
    }
}
